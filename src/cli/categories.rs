use comfy_table::{Cell, Table};

use super::App;
use crate::categories::{add_category, delete_category, edit_category, list_categories};
use crate::error::{MoneyError, Result};
use crate::models::CategoryKind;

pub fn list(app: &App) -> Result<()> {
    let categories = list_categories(&app.conn, &app.owner)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Kind", "Scope"]);
    for cat in categories {
        table.add_row(vec![
            Cell::new(cat.id),
            Cell::new(&cat.name),
            Cell::new(cat.kind),
            Cell::new(if cat.is_global() { "global" } else { "mine" }),
        ]);
    }
    println!("Categories\n{table}");
    Ok(())
}

fn parse_kind(kind: &str) -> Result<CategoryKind> {
    CategoryKind::parse(kind).ok_or_else(|| {
        MoneyError::InvalidInput(format!("Invalid category kind: {kind} (must be 'income' or 'expense')"))
    })
}

pub fn add(app: &App, name: &str, kind: &str, global: bool) -> Result<()> {
    let kind = parse_kind(kind)?;
    let owner = if global { None } else { Some(app.owner.as_str()) };
    let category = add_category(&app.conn, owner, name, kind)?;
    println!("Added category {}: {} ({})", category.id, category.name, category.kind);
    Ok(())
}

pub fn edit(app: &App, id: i64, name: Option<&str>, kind: Option<&str>, global: bool) -> Result<()> {
    if name.is_none() && kind.is_none() {
        return Err(MoneyError::InvalidInput("Nothing to change; pass --name or --kind".into()));
    }
    let kind = kind.map(parse_kind).transpose()?;
    let report = edit_category(&app.conn, &app.classifier, &app.owner, id, name, kind, global)?;
    let category = &report.category;
    println!("Updated category {}: {} ({})", category.id, category.name, category.kind);
    if report.retrain.is_some() {
        println!("Classifier retrained.");
    }
    Ok(())
}

pub fn delete(app: &App, id: i64, global: bool) -> Result<()> {
    let report = delete_category(&app.conn, &app.classifier, &app.owner, id, global)?;
    println!(
        "Deleted category {id}; {} transactions now uncategorized, {} training examples removed",
        report.records_cleared, report.examples_removed
    );
    if report.retrain.is_some() {
        println!("Classifier retrained.");
    }
    Ok(())
}
