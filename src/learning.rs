//! Feeding user corrections and administrator label batches back into the
//! classifier. Every path appends to the corpus first and then refits once.

use std::path::Path;

use rusqlite::Connection;
use tracing::info;

use crate::categories::ensure_category;
use crate::classifier::{TextClassifier, TrainOutcome};
use crate::error::{MoneyError, Result};
use crate::importer::read_table;
use crate::ledger_parser::{column_for_header, Column, RawCell};
use crate::training::{add_example, upsert_example, Upsert};

/// A user assigned `category_id` to a record described by `text`: store one
/// verified example. The caller commits and then refits once.
pub fn store_correction(conn: &Connection, owner: &str, text: &str, category_id: i64) -> Result<()> {
    add_example(conn, text, category_id, Some(owner), true)?;
    info!(owner, text, category_id, "learned from correction");
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRow {
    pub text: String,
    pub category: String,
}

impl LabelRow {
    pub fn new(text: &str, category: &str) -> Self {
        Self {
            text: text.trim().to_string(),
            category: category.trim().to_string(),
        }
    }
}

fn cell_text(cell: Option<&RawCell>) -> String {
    match cell {
        Some(RawCell::Text(s)) => s.trim().to_string(),
        Some(RawCell::Number(n)) => n.to_string(),
        Some(RawCell::Date(d)) => d.to_string(),
        Some(RawCell::Empty) | None => String::new(),
    }
}

/// Read a two-column (text, category) table. A header row naming the
/// description and category columns is honoured; without one the first two
/// columns are used and the first row is data.
pub fn load_label_file(path: &Path) -> Result<Vec<LabelRow>> {
    let (headers, mut rows) = read_table(path)?;
    if headers.is_empty() {
        return Ok(Vec::new());
    }

    let find = |wanted: Column| headers.iter().position(|h| column_for_header(h) == Some(wanted));
    let (text_col, category_col) = match (find(Column::Description), find(Column::Category)) {
        (Some(t), Some(c)) => (t, c),
        _ => {
            if headers.len() < 2 {
                return Err(MoneyError::MissingColumns(vec!["text".into(), "category".into()]));
            }
            rows.insert(
                0,
                headers
                    .iter()
                    .map(|h| RawCell::Text(h.trim_start_matches('\u{feff}').to_string()))
                    .collect(),
            );
            (0, 1)
        }
    };

    Ok(rows
        .iter()
        .map(|row| LabelRow::new(&cell_text(row.get(text_col)), &cell_text(row.get(category_col))))
        .collect())
}

#[derive(Debug)]
pub struct BulkLabelReport {
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub created_categories: Vec<String>,
    pub retrain: TrainOutcome,
}

/// Load a batch of labels in one transaction, creating unknown categories as
/// global expenses, then refit exactly once.
pub fn bulk_label(
    conn: &Connection,
    classifier: &TextClassifier,
    owner: &str,
    rows: &[LabelRow],
    verified: bool,
) -> Result<BulkLabelReport> {
    let (mut inserted, mut updated, mut unchanged, mut skipped) = (0, 0, 0, 0);
    let mut created_categories = Vec::new();

    let tx = conn.unchecked_transaction()?;
    for row in rows {
        if row.text.is_empty() || row.category.is_empty() {
            skipped += 1;
            continue;
        }
        let (category, created) = ensure_category(&tx, owner, &row.category)?;
        if created {
            created_categories.push(category.name.clone());
        }
        match upsert_example(&tx, &row.text, category.id, None, verified)? {
            Upsert::Inserted => inserted += 1,
            Upsert::Updated => updated += 1,
            Upsert::Unchanged => unchanged += 1,
        }
    }
    tx.commit()?;
    info!(inserted, updated, unchanged, skipped, "loaded label batch");

    let retrain = classifier
        .retrain(conn)
        .map_err(|e| MoneyError::Training(e.to_string()))?;
    Ok(BulkLabelReport {
        inserted,
        updated,
        unchanged,
        skipped,
        created_categories,
        retrain,
    })
}
