use std::str::FromStr;

use colored::Colorize;
use comfy_table::{Cell, Table};
use rust_decimal::Decimal;

use super::{parse_date_arg, App};
use crate::categories::find_by_name;
use crate::classifier::TrainOutcome;
use crate::error::{MoneyError, Result};
use crate::fmt::money;
use crate::ledger::{delete_record, list_records, update_record, CategoryChange, Learning, RecordEdit, RecordFilter};

pub fn list(app: &App, month: Option<String>, uncategorized: bool, limit: Option<usize>) -> Result<()> {
    let filter = RecordFilter { month, uncategorized, limit };
    let records = list_records(&app.conn, &app.owner, &filter)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Description", "Amount", "Category"]);
    for record in &records {
        table.add_row(vec![
            Cell::new(record.id),
            Cell::new(record.date),
            Cell::new(&record.description),
            Cell::new(money(record.amount)),
            Cell::new(record.category.as_ref().map(|c| c.name.as_str()).unwrap_or("")),
        ]);
    }
    println!("Transactions ({})\n{table}", records.len());
    Ok(())
}

pub fn edit(
    app: &App,
    id: i64,
    date: Option<String>,
    description: Option<String>,
    amount: Option<String>,
    category: Option<String>,
    clear_category: bool,
) -> Result<()> {
    let category = match (category, clear_category) {
        (_, true) => Some(CategoryChange::Clear),
        (Some(name), false) => {
            let found = find_by_name(&app.conn, &app.owner, &name)?
                .ok_or_else(|| MoneyError::UnknownCategory(name.clone()))?;
            Some(CategoryChange::Set(found.id))
        }
        (None, false) => None,
    };
    let amount = amount
        .map(|raw| {
            Decimal::from_str(&raw.replace(',', ""))
                .map_err(|_| MoneyError::InvalidInput(format!("Invalid amount '{raw}'")))
        })
        .transpose()?;
    let edit = RecordEdit {
        date: date.as_deref().map(parse_date_arg).transpose()?,
        description,
        amount,
        category,
    };

    let report = update_record(&app.conn, &app.classifier, &app.owner, id, &edit)?;
    let record = &report.record;
    println!(
        "Updated {id}: {} | {} | {} | {}",
        record.date,
        record.description,
        money(record.amount),
        record.category.as_ref().map(|c| c.name.as_str()).unwrap_or("(none)")
    );
    match report.learned {
        Some(Learning::Retrained(TrainOutcome::Trained { samples, .. })) => {
            println!("{}", format!("Learned from this change ({samples} examples).").green())
        }
        Some(Learning::Retrained(TrainOutcome::Cleared(_))) => println!("Learned from this change."),
        Some(Learning::RetrainFailed(reason)) => println!(
            "{}",
            format!("Saved, but the classifier could not retrain: {reason}. Run `moneymind train retrain`.").yellow()
        ),
        None => {}
    }
    Ok(())
}

pub fn delete(app: &App, id: i64) -> Result<()> {
    delete_record(&app.conn, &app.owner, id)?;
    println!("Deleted transaction {id}");
    Ok(())
}
