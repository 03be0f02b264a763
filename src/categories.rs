use rusqlite::{Connection, OptionalExtension, Row};
use tracing::info;

use crate::classifier::{TextClassifier, TrainOutcome};
use crate::error::{MoneyError, Result};
use crate::models::{match_key, Category, CategoryKind};

const CATEGORY_COLUMNS: &str = "id, name, kind, owner";

fn category_from_row(row: &Row) -> rusqlite::Result<Category> {
    let kind: String = row.get(2)?;
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        kind: CategoryKind::parse(&kind).unwrap_or(CategoryKind::Expense),
        owner: row.get(3)?,
    })
}

/// Global categories plus the ones `owner` created, income first.
pub fn list_categories(conn: &Connection, owner: &str) -> Result<Vec<Category>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {CATEGORY_COLUMNS} FROM categories \
         WHERE owner IS NULL OR owner = ?1 \
         ORDER BY CASE kind WHEN 'income' THEN 0 ELSE 1 END, name ASC"
    ))?;
    let categories = stmt
        .query_map([owner], category_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(categories)
}

/// Case-insensitive lookup among the categories visible to `owner`. The
/// owner's own category shadows a global one with the same name.
pub fn find_by_name(conn: &Connection, owner: &str, name: &str) -> Result<Option<Category>> {
    let category = conn
        .query_row(
            &format!(
                "SELECT {CATEGORY_COLUMNS} FROM categories \
                 WHERE name_key = ?1 AND (owner IS NULL OR owner = ?2) \
                 ORDER BY owner IS NULL, id LIMIT 1"
            ),
            rusqlite::params![match_key(name), owner],
            category_from_row,
        )
        .optional()?;
    Ok(category)
}

pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Category>> {
    let category = conn
        .query_row(
            &format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ?1"),
            [id],
            category_from_row,
        )
        .optional()?;
    Ok(category)
}

pub fn find_visible_by_id(conn: &Connection, owner: &str, id: i64) -> Result<Option<Category>> {
    Ok(find_by_id(conn, id)?.filter(|c| c.owner.as_deref().map_or(true, |o| o == owner)))
}

/// Create a category in `owner`'s scope, or globally when `owner` is `None`.
pub fn add_category(conn: &Connection, owner: Option<&str>, name: &str, kind: CategoryKind) -> Result<Category> {
    let name = name.trim();
    if name.is_empty() {
        return Err(MoneyError::InvalidInput("Category name is required".into()));
    }
    let key = match_key(name);
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM categories WHERE name_key = ?1 AND owner IS ?2)",
        rusqlite::params![key, owner],
        |row| row.get(0),
    )?;
    if exists {
        return Err(MoneyError::InvalidInput(format!("Category '{name}' already exists")));
    }
    conn.execute(
        "INSERT INTO categories (name, name_key, kind, owner) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![name, key, kind.as_str(), owner],
    )?;
    Ok(Category {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
        kind,
        owner: owner.map(str::to_string),
    })
}

/// Look up a category by name for `owner`, creating a global expense
/// category when none is visible. Returns whether it was created.
pub fn ensure_category(conn: &Connection, owner: &str, name: &str) -> Result<(Category, bool)> {
    if let Some(existing) = find_by_name(conn, owner, name)? {
        return Ok((existing, false));
    }
    let created = add_category(conn, None, name, CategoryKind::Expense)?;
    info!(name = %created.name, "created global category");
    Ok((created, true))
}

#[derive(Debug)]
pub struct EditReport {
    pub category: Category,
    /// Set when a renamed category had labeled examples.
    pub retrain: Option<TrainOutcome>,
}

/// Rename a category or change its kind. Classifier labels are category
/// names, so a rename refits when the category has labeled examples.
/// Global categories can only be edited with `allow_global`.
pub fn edit_category(
    conn: &Connection,
    classifier: &TextClassifier,
    owner: &str,
    id: i64,
    name: Option<&str>,
    kind: Option<CategoryKind>,
    allow_global: bool,
) -> Result<EditReport> {
    let current = find_visible_by_id(conn, owner, id)?
        .ok_or_else(|| MoneyError::UnknownCategory(id.to_string()))?;
    if current.is_global() && !allow_global {
        return Err(MoneyError::InvalidInput(format!(
            "'{}' is a global category; pass --global to edit it",
            current.name
        )));
    }

    let name = match name.map(str::trim) {
        Some("") => return Err(MoneyError::InvalidInput("Category name is required".into())),
        Some(n) => n.to_string(),
        None => current.name.clone(),
    };
    let kind = kind.unwrap_or(current.kind);
    let key = match_key(&name);
    let taken: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM categories WHERE name_key = ?1 AND owner IS ?2 AND id != ?3)",
        rusqlite::params![key, current.owner, id],
        |row| row.get(0),
    )?;
    if taken {
        return Err(MoneyError::InvalidInput(format!("Category '{name}' already exists")));
    }

    conn.execute(
        "UPDATE categories SET name = ?1, name_key = ?2, kind = ?3 WHERE id = ?4",
        rusqlite::params![name, key, kind.as_str(), id],
    )?;
    info!(id, from = %current.name, to = %name, kind = kind.as_str(), "edited category");

    let examples: i64 = conn.query_row(
        "SELECT count(*) FROM training_data WHERE category_id = ?1",
        [id],
        |row| row.get(0),
    )?;
    let retrain = if name != current.name && examples > 0 {
        Some(classifier.retrain(conn)?)
    } else {
        None
    };
    Ok(EditReport {
        category: Category {
            id,
            name,
            kind,
            owner: current.owner,
        },
        retrain,
    })
}

#[derive(Debug)]
pub struct DeleteReport {
    pub records_cleared: usize,
    pub examples_removed: usize,
    pub retrain: Option<TrainOutcome>,
}

/// Delete a category. Records keep existing with no category; labeled
/// examples for it go with it, and the classifier is refit if any did.
/// Global categories can only be deleted with `allow_global`.
pub fn delete_category(
    conn: &Connection,
    classifier: &TextClassifier,
    owner: &str,
    id: i64,
    allow_global: bool,
) -> Result<DeleteReport> {
    let category = find_visible_by_id(conn, owner, id)?
        .ok_or_else(|| MoneyError::UnknownCategory(id.to_string()))?;
    if category.is_global() && !allow_global {
        return Err(MoneyError::InvalidInput(format!(
            "'{}' is a global category; pass --global to delete it",
            category.name
        )));
    }

    let records_cleared: usize = conn.query_row(
        "SELECT count(*) FROM transactions WHERE category_id = ?1",
        [id],
        |row| row.get::<_, i64>(0),
    )? as usize;
    let examples_removed: usize = conn.query_row(
        "SELECT count(*) FROM training_data WHERE category_id = ?1",
        [id],
        |row| row.get::<_, i64>(0),
    )? as usize;

    conn.execute("DELETE FROM categories WHERE id = ?1", [id])?;
    info!(id, name = %category.name, records_cleared, examples_removed, "deleted category");

    let retrain = if examples_removed > 0 {
        Some(classifier.retrain(conn)?)
    } else {
        None
    };
    Ok(DeleteReport {
        records_cleared,
        examples_removed,
        retrain,
    })
}
