use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::categories::{find_by_name, find_visible_by_id};
use crate::classifier::{TextClassifier, TrainOutcome};
use crate::error::{MoneyError, Result};
use crate::importer::is_duplicate_file;
use crate::learning::store_correction;
use crate::models::{match_key, Category, CategoryKind, CategoryRef, DraftEntry, LedgerRecord};

// ---------------------------------------------------------------------------
// Proposals
// ---------------------------------------------------------------------------

/// The file an import proposal came from, so confirming it can be recorded
/// and a second confirm of the same file refused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSource {
    pub filename: String,
    pub checksum: String,
}

/// Drafts handed out for review and accepted back for confirmation. Entries
/// are read back as raw JSON so one malformed entry cannot sink the rest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proposal<E> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import: Option<ImportSource>,
    pub entries: Vec<E>,
}

pub type RawProposal = Proposal<serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    AllSaved,
    Partial,
    NothingSaved,
}

#[derive(Debug, Default)]
pub struct ConfirmReport {
    pub saved: Vec<i64>,
    /// (1-based entry position, reason)
    pub rejected: Vec<(usize, String)>,
    pub duplicate_file: bool,
}

impl ConfirmReport {
    pub fn outcome(&self) -> ConfirmOutcome {
        match (self.saved.is_empty(), self.rejected.is_empty()) {
            (true, _) => ConfirmOutcome::NothingSaved,
            (false, true) => ConfirmOutcome::AllSaved,
            (false, false) => ConfirmOutcome::Partial,
        }
    }
}

/// Validate one entry of a confirm payload into a draft ready to store.
fn validate_entry(conn: &Connection, owner: &str, value: &serde_json::Value) -> std::result::Result<DraftEntry, String> {
    let mut draft: DraftEntry = serde_json::from_value(value.clone()).map_err(|e| e.to_string())?;
    draft.description = draft.description.trim().to_string();
    if draft.description.is_empty() {
        return Err("description is empty".into());
    }

    draft.category = match (&draft.category, &draft.category_hint) {
        (Some(cat), _) => {
            let found = find_visible_by_id(conn, owner, cat.id).map_err(|e| e.to_string())?;
            Some(found.ok_or_else(|| format!("unknown category id {}", cat.id))?.to_ref())
        }
        (None, Some(name)) if !name.trim().is_empty() => {
            let found = find_by_name(conn, owner, name).map_err(|e| e.to_string())?;
            Some(found.ok_or_else(|| format!("unknown category '{}'", name.trim()))?.to_ref())
        }
        (None, _) => None,
    };
    Ok(draft)
}

/// Persist the entries of a proposal for `owner`. Bad entries are skipped
/// one at a time; everything that validates is saved in one transaction.
pub fn confirm_proposal(conn: &Connection, owner: &str, proposal: &RawProposal) -> Result<ConfirmReport> {
    let mut report = ConfirmReport::default();
    if let Some(source) = &proposal.import {
        if is_duplicate_file(conn, owner, &source.checksum)? {
            report.duplicate_file = true;
            return Ok(report);
        }
    }

    let tx = conn.unchecked_transaction()?;
    let mut saved_drafts = Vec::new();
    for (idx, value) in proposal.entries.iter().enumerate() {
        match validate_entry(&tx, owner, value) {
            Ok(draft) => {
                let id = insert_record(&tx, owner, &draft)?;
                report.saved.push(id);
                saved_drafts.push(draft);
            }
            Err(reason) => {
                debug!(entry = idx + 1, %reason, "rejected draft entry");
                report.rejected.push((idx + 1, reason));
            }
        }
    }

    if let (Some(source), false) = (&proposal.import, saved_drafts.is_empty()) {
        let import_id = record_import(&tx, owner, source, &saved_drafts)?;
        for id in &report.saved {
            tx.execute("UPDATE transactions SET import_id = ?1 WHERE id = ?2", [import_id, *id])?;
        }
    }
    tx.commit()?;

    info!(saved = report.saved.len(), rejected = report.rejected.len(), "confirmed entries");
    Ok(report)
}

fn record_import(conn: &Connection, owner: &str, source: &ImportSource, drafts: &[DraftEntry]) -> Result<i64> {
    let min_date = drafts.iter().map(|d| d.date).min().map(|d| d.to_string());
    let max_date = drafts.iter().map(|d| d.date).max().map(|d| d.to_string());
    conn.execute(
        "INSERT INTO imports (owner, filename, checksum, record_count, date_range_start, date_range_end) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            owner,
            source.filename,
            source.checksum,
            drafts.len() as i64,
            min_date,
            max_date,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

pub fn insert_record(conn: &Connection, owner: &str, draft: &DraftEntry) -> Result<i64> {
    conn.execute(
        "INSERT INTO transactions (owner, date, description, description_key, amount, category_id) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            owner,
            draft.date.to_string(),
            draft.description,
            match_key(&draft.description),
            draft.amount.to_string(),
            draft.category.as_ref().map(|c| c.id),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

const RECORD_SELECT: &str = "SELECT t.id, t.owner, t.date, t.description, t.amount, t.category_id, c.name, t.created_at \
     FROM transactions t LEFT JOIN categories c ON c.id = t.category_id";

fn record_from_row(row: &Row) -> rusqlite::Result<LedgerRecord> {
    let date: String = row.get(2)?;
    let amount: String = row.get(4)?;
    let category_id: Option<i64> = row.get(5)?;
    let category_name: Option<String> = row.get(6)?;
    Ok(LedgerRecord {
        id: row.get(0)?,
        owner: row.get(1)?,
        date: NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
        })?,
        description: row.get(3)?,
        amount: Decimal::from_str(&amount).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?,
        category: category_id
            .zip(category_name)
            .map(|(id, name)| CategoryRef { id, name }),
        created_at: row.get(7)?,
    })
}

pub fn get_record(conn: &Connection, owner: &str, id: i64) -> Result<LedgerRecord> {
    conn.query_row(
        &format!("{RECORD_SELECT} WHERE t.id = ?1 AND t.owner = ?2"),
        rusqlite::params![id, owner],
        record_from_row,
    )
    .optional()?
    .ok_or(MoneyError::RecordNotFound(id))
}

#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    /// `YYYY-MM`
    pub month: Option<String>,
    pub uncategorized: bool,
    pub limit: Option<usize>,
}

pub fn list_records(conn: &Connection, owner: &str, filter: &RecordFilter) -> Result<Vec<LedgerRecord>> {
    let mut sql = format!("{RECORD_SELECT} WHERE t.owner = ?1");
    if filter.month.is_some() {
        sql.push_str(" AND substr(t.date, 1, 7) = ?2");
    }
    if filter.uncategorized {
        sql.push_str(" AND t.category_id IS NULL");
    }
    sql.push_str(" ORDER BY t.date DESC, t.id DESC");
    if let Some(limit) = filter.limit {
        sql.push_str(&format!(" LIMIT {limit}"));
    }

    let mut stmt = conn.prepare(&sql)?;
    let rows = match &filter.month {
        Some(month) => stmt.query_map(rusqlite::params![owner, month], record_from_row)?,
        None => stmt.query_map(rusqlite::params![owner], record_from_row)?,
    };
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

/// Category of `owner`'s most recently created record with this description.
/// Records without a category are passed over.
pub fn latest_category_for(conn: &Connection, owner: &str, description: &str) -> Result<Option<Category>> {
    let found = conn
        .query_row(
            "SELECT c.id, c.name, c.kind, c.owner FROM transactions t \
             JOIN categories c ON c.id = t.category_id \
             WHERE t.owner = ?1 AND t.description_key = ?2 \
               AND (c.owner IS NULL OR c.owner = ?1) \
             ORDER BY t.created_at DESC, t.id DESC LIMIT 1",
            rusqlite::params![owner, match_key(description)],
            |row| {
                let kind: String = row.get(2)?;
                Ok(Category {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    kind: CategoryKind::parse(&kind).unwrap_or(CategoryKind::Expense),
                    owner: row.get(3)?,
                })
            },
        )
        .optional()?;
    Ok(found)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryChange {
    Set(i64),
    Clear,
}

#[derive(Debug, Clone, Default)]
pub struct RecordEdit {
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub category: Option<CategoryChange>,
}

#[derive(Debug)]
pub enum Learning {
    Retrained(TrainOutcome),
    /// The edit and its example are saved; the refit failed and the next
    /// retrain picks the example up.
    RetrainFailed(String),
}

#[derive(Debug)]
pub struct UpdateReport {
    pub record: LedgerRecord,
    /// Set when the edit assigned a new category.
    pub learned: Option<Learning>,
}

/// Apply an edit. Assigning a different category teaches the classifier.
pub fn update_record(
    conn: &Connection,
    classifier: &TextClassifier,
    owner: &str,
    id: i64,
    edit: &RecordEdit,
) -> Result<UpdateReport> {
    let current = get_record(conn, owner, id)?;

    let description = match &edit.description {
        Some(d) => {
            let d = d.trim().to_string();
            if d.is_empty() {
                return Err(MoneyError::InvalidInput("Description cannot be empty".into()));
            }
            d
        }
        None => current.description.clone(),
    };
    let date = edit.date.unwrap_or(current.date);
    let amount = edit.amount.unwrap_or(current.amount);
    let old_category = current.category.as_ref().map(|c| c.id);
    let category_id = match edit.category {
        Some(CategoryChange::Set(cat_id)) => {
            find_visible_by_id(conn, owner, cat_id)?
                .ok_or_else(|| MoneyError::UnknownCategory(cat_id.to_string()))?;
            Some(cat_id)
        }
        Some(CategoryChange::Clear) => None,
        None => old_category,
    };

    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "UPDATE transactions SET date = ?1, description = ?2, description_key = ?3, amount = ?4, category_id = ?5 \
         WHERE id = ?6 AND owner = ?7",
        rusqlite::params![
            date.to_string(),
            description,
            match_key(&description),
            amount.to_string(),
            category_id,
            id,
            owner,
        ],
    )?;

    let teaches = match category_id {
        Some(new_id) if category_id != old_category => {
            store_correction(&tx, owner, &description, new_id)?;
            true
        }
        _ => false,
    };
    tx.commit()?;

    let learned = teaches.then(|| match classifier.retrain(conn) {
        Ok(outcome) => Learning::Retrained(outcome),
        Err(e) => {
            warn!(id, error = %e, "record saved but classifier retrain failed");
            Learning::RetrainFailed(e.to_string())
        }
    });

    Ok(UpdateReport {
        record: get_record(conn, owner, id)?,
        learned,
    })
}

pub fn delete_record(conn: &Connection, owner: &str, id: i64) -> Result<()> {
    let deleted = conn.execute(
        "DELETE FROM transactions WHERE id = ?1 AND owner = ?2",
        rusqlite::params![id, owner],
    )?;
    if deleted == 0 {
        return Err(MoneyError::RecordNotFound(id));
    }
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerTotals {
    pub records: usize,
    pub uncategorized: usize,
    pub income: Decimal,
    pub expense: Decimal,
}

pub fn totals(conn: &Connection, owner: &str) -> Result<LedgerTotals> {
    let mut totals = LedgerTotals::default();
    for record in list_records(conn, owner, &RecordFilter::default())? {
        totals.records += 1;
        if record.category.is_none() {
            totals.uncategorized += 1;
        }
        if record.amount.is_sign_negative() {
            totals.expense += record.amount;
        } else {
            totals.income += record.amount;
        }
    }
    Ok(totals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;
    use crate::models::CategorySource;
    use crate::training::examples_for_text;
    use serde_json::json;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn food(conn: &Connection) -> Category {
        find_by_name(conn, "alice", "อาหาร").unwrap().unwrap()
    }

    fn proposal(entries: Vec<serde_json::Value>) -> RawProposal {
        Proposal { import: None, entries }
    }

    #[test]
    fn test_confirm_round_trip_is_exact() {
        let (_dir, conn) = test_db();
        let cat = food(&conn);
        let mut draft = DraftEntry::new(date("2025-12-25"), Decimal::from_str("-1200.50").unwrap(), "BTS  Siam  ->  Asok".into());
        draft.category = Some(cat.to_ref());
        draft.category_source = CategorySource::Classifier;
        let payload = proposal(vec![serde_json::to_value(&draft).unwrap()]);

        let report = confirm_proposal(&conn, "alice", &payload).unwrap();
        assert_eq!(report.outcome(), ConfirmOutcome::AllSaved);
        let record = get_record(&conn, "alice", report.saved[0]).unwrap();
        assert_eq!(record.description, draft.description);
        assert_eq!(record.amount, draft.amount);
        assert_eq!(record.amount.to_string(), "-1200.50");
        assert_eq!(record.date, draft.date);
        assert_eq!(record.category, draft.category);
    }

    #[test]
    fn test_confirm_skips_bad_entries_individually() {
        let (_dir, conn) = test_db();
        let payload = proposal(vec![
            json!({"date": "2025-12-25", "amount": "-50", "description": "coffee"}),
            json!({"date": "25/12/2025", "amount": "-50", "description": "bad date"}),
            json!({"date": "2025-12-25", "amount": "lots", "description": "bad amount"}),
            json!({"date": "2025-12-25", "amount": -20, "description": "   "}),
            json!({"date": "2025-12-26", "amount": 100, "description": "refund"}),
        ]);
        let report = confirm_proposal(&conn, "alice", &payload).unwrap();
        assert_eq!(report.outcome(), ConfirmOutcome::Partial);
        assert_eq!(report.saved.len(), 2);
        let rejected: Vec<usize> = report.rejected.iter().map(|(i, _)| *i).collect();
        assert_eq!(rejected, vec![2, 3, 4]);
    }

    #[test]
    fn test_confirm_nothing_saved_is_distinct() {
        let (_dir, conn) = test_db();
        let report = confirm_proposal(&conn, "alice", &proposal(vec![json!({"oops": true})])).unwrap();
        assert_eq!(report.outcome(), ConfirmOutcome::NothingSaved);
        let empty = confirm_proposal(&conn, "alice", &proposal(vec![])).unwrap();
        assert_eq!(empty.outcome(), ConfirmOutcome::NothingSaved);
    }

    #[test]
    fn test_confirm_resolves_category_by_name_and_rejects_unknown() {
        let (_dir, conn) = test_db();
        let payload = proposal(vec![
            json!({"date": "2025-12-25", "amount": "-50", "description": "rice", "category_hint": "อาหาร"}),
            json!({"date": "2025-12-25", "amount": "-50", "description": "x", "category_hint": "Nope"}),
            json!({"date": "2025-12-25", "amount": "-50", "description": "y", "category": {"id": 9999, "name": "ghost"}}),
        ]);
        let report = confirm_proposal(&conn, "alice", &payload).unwrap();
        assert_eq!(report.saved.len(), 1);
        let record = get_record(&conn, "alice", report.saved[0]).unwrap();
        assert_eq!(record.category.unwrap().id, food(&conn).id);
    }

    #[test]
    fn test_confirm_import_records_batch_and_refuses_repeat() {
        let (_dir, conn) = test_db();
        let mut payload = proposal(vec![
            json!({"date": "2025-12-25", "amount": "25000", "description": "เงินเดือน"}),
            json!({"date": "2025-12-27", "amount": "-500", "description": "ค่าหวย"}),
        ]);
        payload.import = Some(ImportSource { filename: "t.txt".into(), checksum: "abc".into() });
        let first = confirm_proposal(&conn, "alice", &payload).unwrap();
        assert_eq!(first.saved.len(), 2);
        let (count, start, end): (i64, String, String) = conn
            .query_row(
                "SELECT record_count, date_range_start, date_range_end FROM imports",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )
            .unwrap();
        assert_eq!((count, start.as_str(), end.as_str()), (2, "2025-12-25", "2025-12-27"));

        let again = confirm_proposal(&conn, "alice", &payload).unwrap();
        assert!(again.duplicate_file);
        assert_eq!(again.outcome(), ConfirmOutcome::NothingSaved);
        assert!(!confirm_proposal(&conn, "bob", &payload).unwrap().duplicate_file);
    }

    #[test]
    fn test_records_are_owner_scoped() {
        let (_dir, conn) = test_db();
        let id = insert_record(&conn, "alice", &DraftEntry::new(date("2025-01-01"), Decimal::from(-5), "tea".into())).unwrap();
        assert!(matches!(get_record(&conn, "bob", id), Err(MoneyError::RecordNotFound(_))));
        assert!(delete_record(&conn, "bob", id).is_err());
        assert!(list_records(&conn, "bob", &RecordFilter::default()).unwrap().is_empty());
        delete_record(&conn, "alice", id).unwrap();
        assert!(get_record(&conn, "alice", id).is_err());
    }

    #[test]
    fn test_list_filters() {
        let (_dir, conn) = test_db();
        let mut categorized = DraftEntry::new(date("2025-12-01"), Decimal::from(-5), "tea".into());
        categorized.category = Some(food(&conn).to_ref());
        insert_record(&conn, "alice", &categorized).unwrap();
        insert_record(&conn, "alice", &DraftEntry::new(date("2025-11-01"), Decimal::from(-9), "misc".into())).unwrap();
        let december = RecordFilter { month: Some("2025-12".into()), ..Default::default() };
        assert_eq!(list_records(&conn, "alice", &december).unwrap().len(), 1);
        let open = RecordFilter { uncategorized: true, ..Default::default() };
        assert_eq!(list_records(&conn, "alice", &open).unwrap()[0].description, "misc");
    }

    #[test]
    fn test_latest_category_prefers_most_recent_and_skips_uncategorized() {
        let (_dir, conn) = test_db();
        let food = food(&conn);
        let misc = find_by_name(&conn, "alice", "อื่นๆ").unwrap().unwrap();
        let mut older = DraftEntry::new(date("2025-12-01"), Decimal::from(-5), "Lunch".into());
        older.category = Some(food.to_ref());
        insert_record(&conn, "alice", &older).unwrap();
        let mut newer = older.clone();
        newer.category = Some(misc.to_ref());
        insert_record(&conn, "alice", &newer).unwrap();
        insert_record(&conn, "alice", &DraftEntry::new(date("2025-12-03"), Decimal::from(-5), "lunch".into())).unwrap();

        assert_eq!(latest_category_for(&conn, "alice", "LUNCH").unwrap().unwrap().id, misc.id);
        assert!(latest_category_for(&conn, "bob", "lunch").unwrap().is_none());
    }

    #[test]
    fn test_category_edit_learns_once() {
        let (dir, conn) = test_db();
        let clf = TextClassifier::new(dir.path().join("model.json"));
        let id = insert_record(&conn, "alice", &DraftEntry::new(date("2025-01-01"), Decimal::from(-60), "ข้าวเช้า".into())).unwrap();
        let cat = food(&conn);

        let report = update_record(&conn, &clf, "alice", id, &RecordEdit {
            category: Some(CategoryChange::Set(cat.id)),
            ..Default::default()
        })
        .unwrap();
        assert!(matches!(report.learned, Some(Learning::Retrained(_))));
        assert_eq!(report.record.category.unwrap().id, cat.id);
        assert_eq!(examples_for_text(&conn, "ข้าวเช้า").unwrap().len(), 1);
        assert_eq!(clf.retrain_count(), 1);

        // Same category again and non-category edits do not learn.
        update_record(&conn, &clf, "alice", id, &RecordEdit {
            category: Some(CategoryChange::Set(cat.id)),
            amount: Some(Decimal::from(-70)),
            ..Default::default()
        })
        .unwrap();
        update_record(&conn, &clf, "alice", id, &RecordEdit {
            category: Some(CategoryChange::Clear),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(examples_for_text(&conn, "ข้าวเช้า").unwrap().len(), 1);
        assert_eq!(clf.retrain_count(), 1);
    }

    #[test]
    fn test_failed_retrain_keeps_edit_and_example() {
        let (dir, conn) = test_db();
        // The artifact's parent is a regular file, so saving or removing it fails.
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();
        let clf = TextClassifier::new(blocker.join("model.json"));
        let id = insert_record(&conn, "alice", &DraftEntry::new(date("2025-01-01"), Decimal::from(-60), "ข้าวเช้า".into())).unwrap();
        let cat = food(&conn);

        let report = update_record(&conn, &clf, "alice", id, &RecordEdit {
            category: Some(CategoryChange::Set(cat.id)),
            ..Default::default()
        })
        .unwrap();
        assert!(matches!(report.learned, Some(Learning::RetrainFailed(_))));
        assert_eq!(get_record(&conn, "alice", id).unwrap().category.unwrap().id, cat.id);
        assert_eq!(examples_for_text(&conn, "ข้าวเช้า").unwrap().len(), 1);
    }

    #[test]
    fn test_update_keeps_inner_spacing_of_description() {
        let (dir, conn) = test_db();
        let clf = TextClassifier::new(dir.path().join("model.json"));
        let id = insert_record(&conn, "alice", &DraftEntry::new(date("2025-01-01"), Decimal::from(-1), "x".into())).unwrap();
        let report = update_record(&conn, &clf, "alice", id, &RecordEdit {
            description: Some("  BTS  Siam ".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(report.record.description, "BTS  Siam");
        let key: String = conn
            .query_row("SELECT description_key FROM transactions WHERE id = ?1", [id], |r| r.get(0))
            .unwrap();
        assert_eq!(key, "bts siam");
    }

    #[test]
    fn test_update_rejects_invisible_category_and_blank_description() {
        let (dir, conn) = test_db();
        let clf = TextClassifier::new(dir.path().join("model.json"));
        let id = insert_record(&conn, "alice", &DraftEntry::new(date("2025-01-01"), Decimal::from(-1), "x".into())).unwrap();
        let private = crate::categories::add_category(&conn, Some("bob"), "Bob only", CategoryKind::Expense).unwrap();
        assert!(update_record(&conn, &clf, "alice", id, &RecordEdit {
            category: Some(CategoryChange::Set(private.id)),
            ..Default::default()
        })
        .is_err());
        assert!(update_record(&conn, &clf, "alice", id, &RecordEdit {
            description: Some("  ".into()),
            ..Default::default()
        })
        .is_err());
        assert_eq!(clf.retrain_count(), 0);
    }

    #[test]
    fn test_totals() {
        let (_dir, conn) = test_db();
        insert_record(&conn, "alice", &DraftEntry::new(date("2025-01-01"), Decimal::from(25000), "salary".into())).unwrap();
        insert_record(&conn, "alice", &DraftEntry::new(date("2025-01-02"), Decimal::from(-150), "food".into())).unwrap();
        let t = totals(&conn, "alice").unwrap();
        assert_eq!(t.records, 2);
        assert_eq!(t.uncategorized, 2);
        assert_eq!(t.income, Decimal::from(25000));
        assert_eq!(t.expense, Decimal::from(-150));
    }
}
