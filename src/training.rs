use rusqlite::{Connection, OptionalExtension};

use crate::classifier::TrainingCorpus;
use crate::error::Result;
use crate::models::{match_key, Category, CategoryKind, LabeledExample};

/// The full labeled corpus, labels being category names.
impl TrainingCorpus for Connection {
    fn labeled_texts(&self) -> Result<Vec<(String, String)>> {
        let mut stmt = self.prepare(
            "SELECT t.text, c.name FROM training_data t \
             JOIN categories c ON c.id = t.category_id \
             ORDER BY t.id",
        )?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

/// Append one labeled example. Duplicates are allowed.
pub fn add_example(
    conn: &Connection,
    text: &str,
    category_id: i64,
    owner: Option<&str>,
    verified: bool,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO training_data (text, text_key, category_id, owner, is_verified) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![text.trim(), match_key(text), category_id, owner, verified],
    )?;
    Ok(conn.last_insert_rowid())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Updated,
    Unchanged,
}

/// Insert keyed on `(text, category)`. An existing pair is only touched to
/// promote it to verified.
pub fn upsert_example(
    conn: &Connection,
    text: &str,
    category_id: i64,
    owner: Option<&str>,
    verified: bool,
) -> Result<Upsert> {
    let key = match_key(text);
    let existing: Option<(i64, bool)> = conn
        .query_row(
            "SELECT id, is_verified FROM training_data WHERE text_key = ?1 AND category_id = ?2 \
             ORDER BY id LIMIT 1",
            rusqlite::params![key, category_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;
    match existing {
        None => {
            add_example(conn, text, category_id, owner, verified)?;
            Ok(Upsert::Inserted)
        }
        Some((id, false)) if verified => {
            conn.execute("UPDATE training_data SET is_verified = 1 WHERE id = ?1", [id])?;
            Ok(Upsert::Updated)
        }
        Some(_) => Ok(Upsert::Unchanged),
    }
}

/// Category of the verified example whose text equals `text` ignoring case.
/// The owner's own examples win, then the most recent one.
pub fn exact_verified_match(conn: &Connection, owner: &str, text: &str) -> Result<Option<Category>> {
    let found = conn
        .query_row(
            "SELECT c.id, c.name, c.kind, c.owner FROM training_data t \
             JOIN categories c ON c.id = t.category_id \
             WHERE t.text_key = ?1 AND t.is_verified = 1 \
               AND (c.owner IS NULL OR c.owner = ?2) \
             ORDER BY CASE WHEN t.owner = ?2 THEN 0 ELSE 1 END, t.id DESC \
             LIMIT 1",
            rusqlite::params![match_key(text), owner],
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

pub fn examples_for_text(conn: &Connection, text: &str) -> Result<Vec<LabeledExample>> {
    let mut stmt = conn.prepare(
        "SELECT id, text, category_id, owner, is_verified, created_at FROM training_data \
         WHERE text_key = ?1 ORDER BY id",
    )?;
    let rows = stmt
        .query_map([match_key(text)], |row| {
            Ok(LabeledExample {
                id: row.get(0)?,
                text: row.get(1)?,
                category_id: row.get(2)?,
                owner: row.get(3)?,
                is_verified: row.get(4)?,
                created_at: row.get(5)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CorpusStats {
    pub total: usize,
    pub verified: usize,
    pub labels: usize,
}

pub fn corpus_stats(conn: &Connection) -> Result<CorpusStats> {
    let (total, verified, labels): (i64, i64, i64) = conn.query_row(
        "SELECT count(*), COALESCE(SUM(is_verified), 0), count(DISTINCT category_id) FROM training_data",
        [],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
    )?;
    Ok(CorpusStats {
        total: total as usize,
        verified: verified as usize,
        labels: labels as usize,
    })
}
