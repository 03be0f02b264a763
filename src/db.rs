use std::path::Path;

use rusqlite::Connection;

use crate::error::Result;
use crate::models::match_key;

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    name_key TEXT NOT NULL,
    kind TEXT NOT NULL CHECK (kind IN ('income', 'expense')),
    owner TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_categories_scope_name
    ON categories (COALESCE(owner, ''), name_key);

CREATE TABLE IF NOT EXISTS imports (
    id INTEGER PRIMARY KEY,
    owner TEXT NOT NULL,
    filename TEXT NOT NULL,
    checksum TEXT NOT NULL,
    record_count INTEGER,
    date_range_start TEXT,
    date_range_end TEXT,
    import_date TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS transactions (
    id INTEGER PRIMARY KEY,
    owner TEXT NOT NULL,
    date TEXT NOT NULL,
    description TEXT NOT NULL,
    description_key TEXT NOT NULL,
    amount TEXT NOT NULL,
    category_id INTEGER,
    import_id INTEGER,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
    FOREIGN KEY (category_id) REFERENCES categories(id) ON DELETE SET NULL,
    FOREIGN KEY (import_id) REFERENCES imports(id) ON DELETE SET NULL
);

CREATE INDEX IF NOT EXISTS idx_transactions_history
    ON transactions (owner, description_key, created_at);

CREATE TABLE IF NOT EXISTS training_data (
    id INTEGER PRIMARY KEY,
    text TEXT NOT NULL,
    text_key TEXT NOT NULL,
    category_id INTEGER NOT NULL,
    owner TEXT,
    is_verified INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
    FOREIGN KEY (category_id) REFERENCES categories(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_training_text ON training_data (text_key);
";

// (name, kind)
const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    // Income
    ("เงินเดือน", "income"),
    ("โบนัส", "income"),
    ("รายได้เสริม", "income"),
    ("ดอกเบี้ย", "income"),
    // Expenses
    ("อาหาร", "expense"),
    ("เดินทาง", "expense"),
    ("ที่พัก", "expense"),
    ("ค่าน้ำค่าไฟ", "expense"),
    ("โทรศัพท์และอินเทอร์เน็ต", "expense"),
    ("ช้อปปิ้ง", "expense"),
    ("สุขภาพ", "expense"),
    ("บันเทิง", "expense"),
    ("การศึกษา", "expense"),
    ("หวย", "expense"),
    ("อื่นๆ", "expense"),
];

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    if let Some(dir) = db_path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;

    let count: i64 = conn.query_row("SELECT count(*) FROM categories", [], |row| row.get(0))?;
    if count == 0 {
        for (name, kind) in DEFAULT_CATEGORIES {
            conn.execute(
                "INSERT INTO categories (name, name_key, kind, owner) VALUES (?1, ?2, ?3, NULL)",
                rusqlite::params![name, match_key(name), kind],
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn test_db() -> (tempfile::TempDir, Connection) {
    let dir = tempfile::tempdir().unwrap();
    let conn = get_connection(&dir.path().join("test.db")).unwrap();
    init_db(&conn).unwrap();
    (dir, conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_db_creates_tables() {
        let (_dir, conn) = test_db();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        for expected in &["categories", "transactions", "training_data", "imports"] {
            assert!(tables.contains(&expected.to_string()), "missing table: {expected}");
        }
    }

    #[test]
    fn test_init_db_is_idempotent() {
        let (_dir, conn) = test_db();
        init_db(&conn).unwrap();
        let count: i64 = conn.query_row("SELECT count(*) FROM categories", [], |r| r.get(0)).unwrap();
        assert_eq!(count as usize, DEFAULT_CATEGORIES.len());
    }

    #[test]
    fn test_seeded_categories_are_global() {
        let (_dir, conn) = test_db();
        let scoped: i64 = conn
            .query_row("SELECT count(*) FROM categories WHERE owner IS NOT NULL", [], |r| r.get(0))
            .unwrap();
        assert_eq!(scoped, 0);
        let income: i64 = conn
            .query_row("SELECT count(*) FROM categories WHERE kind = 'income'", [], |r| r.get(0))
            .unwrap();
        assert!(income >= 1);
    }

    #[test]
    fn test_category_name_unique_per_scope() {
        let (_dir, conn) = test_db();
        let dup = conn.execute(
            "INSERT INTO categories (name, name_key, kind, owner) VALUES ('อาหาร', 'อาหาร', 'expense', NULL)",
            [],
        );
        assert!(dup.is_err());
        conn.execute(
            "INSERT INTO categories (name, name_key, kind, owner) VALUES ('อาหาร', 'อาหาร', 'expense', 'alice')",
            [],
        )
        .unwrap();
    }

    #[test]
    fn test_deleting_category_nulls_transactions_and_drops_examples() {
        let (_dir, conn) = test_db();
        conn.execute(
            "INSERT INTO categories (name, name_key, kind, owner) VALUES ('Pets', 'pets', 'expense', 'alice')",
            [],
        )
        .unwrap();
        let cat = conn.last_insert_rowid();
        conn.execute(
            "INSERT INTO transactions (owner, date, description, description_key, amount, category_id)
             VALUES ('alice', '2025-01-01', 'cat food', 'cat food', '-100', ?1)",
            [cat],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO training_data (text, text_key, category_id) VALUES ('cat food', 'cat food', ?1)",
            [cat],
        )
        .unwrap();
        conn.execute("DELETE FROM categories WHERE id = ?1", [cat]).unwrap();
        let category: Option<i64> = conn
            .query_row("SELECT category_id FROM transactions", [], |r| r.get(0))
            .unwrap();
        assert_eq!(category, None);
        let examples: i64 = conn.query_row("SELECT count(*) FROM training_data", [], |r| r.get(0)).unwrap();
        assert_eq!(examples, 0);
    }
}
