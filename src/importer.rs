use std::path::Path;

use chrono::NaiveDate;
use rusqlite::Connection;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{MoneyError, Result};
use crate::ledger_parser::{parse_table, parse_text, ParseOutcome, RawCell};
use crate::tokenizer::LineOptions;

// ---------------------------------------------------------------------------
// Source kinds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Date-only lines interleaved with amount + description lines.
    Text,
    Csv,
    Spreadsheet,
}

impl SourceKind {
    pub fn for_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "txt" => Ok(Self::Text),
            "csv" => Ok(Self::Csv),
            "xlsx" | "xlsm" | "xls" | "ods" => Ok(Self::Spreadsheet),
            "" => Err(MoneyError::UnknownFormat("file has no extension".into())),
            other => Err(MoneyError::UnknownFormat(format!(
                ".{other} (use .txt, .csv, .xlsx, .xls or .ods)"
            ))),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Csv => "CSV",
            Self::Spreadsheet => "spreadsheet",
        }
    }
}

// ---------------------------------------------------------------------------
// Duplicate-file guard
// ---------------------------------------------------------------------------

pub fn compute_checksum(file_path: &Path) -> Result<String> {
    let data = std::fs::read(file_path)?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize()))
}

pub fn is_duplicate_file(conn: &Connection, owner: &str, checksum: &str) -> Result<bool> {
    let mut stmt = conn.prepare("SELECT 1 FROM imports WHERE checksum = ?1 AND owner = ?2")?;
    Ok(stmt.exists(rusqlite::params![checksum, owner])?)
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Header row plus data rows of a tabular file.
pub type Table = (Vec<String>, Vec<Vec<RawCell>>);

fn read_csv(file_path: &Path) -> Result<Table> {
    let file = std::fs::File::open(file_path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(std::io::BufReader::new(file));
    let mut records = rdr.records();

    let headers: Vec<String> = match records.next() {
        Some(record) => record?.iter().map(|h| h.to_string()).collect(),
        None => return Ok((Vec::new(), Vec::new())),
    };
    let mut rows = Vec::new();
    for result in records {
        let Ok(record) = result else { continue };
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.trim().is_empty() {
                        RawCell::Empty
                    } else {
                        RawCell::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }
    Ok((headers, rows))
}

#[cfg(feature = "spreadsheet")]
fn read_spreadsheet(file_path: &Path) -> Result<Table> {
    use calamine::{Data, Reader};

    use crate::ledger_parser::excel_serial_to_date;

    let mut workbook = calamine::open_workbook_auto(file_path)
        .map_err(|e| MoneyError::Spreadsheet(format!("Failed to open workbook: {e}")))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| MoneyError::Spreadsheet("Workbook has no sheets".into()))?
        .map_err(|e| MoneyError::Spreadsheet(e.to_string()))?;

    let cell = |data: &Data| -> RawCell {
        match data {
            Data::Empty | Data::Error(_) => RawCell::Empty,
            Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => RawCell::Text(s.clone()),
            Data::Float(f) => RawCell::Number(*f),
            Data::Int(i) => RawCell::Number(*i as f64),
            Data::Bool(b) => RawCell::Text(b.to_string()),
            Data::DateTime(dt) => excel_serial_to_date(dt.as_f64()).map_or(RawCell::Empty, RawCell::Date),
        }
    };

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(row) => row.iter().map(|c| c.to_string()).collect(),
        None => return Ok((Vec::new(), Vec::new())),
    };
    Ok((headers, rows.map(|row| row.iter().map(cell).collect()).collect()))
}

#[cfg(not(feature = "spreadsheet"))]
fn read_spreadsheet(file_path: &Path) -> Result<Table> {
    Err(MoneyError::UnknownFormat(format!(
        "{} (spreadsheet support not built in)",
        file_path.display()
    )))
}

/// Read a CSV or spreadsheet into a header row and cells.
pub fn read_table(file_path: &Path) -> Result<Table> {
    match SourceKind::for_path(file_path)? {
        SourceKind::Csv => read_csv(file_path),
        SourceKind::Spreadsheet => read_spreadsheet(file_path),
        SourceKind::Text => Err(MoneyError::UnknownFormat("plain text is not a table".into())),
    }
}

// ---------------------------------------------------------------------------
// parse_file
// ---------------------------------------------------------------------------

pub struct ParsedFile {
    pub filename: String,
    pub checksum: String,
    pub kind: SourceKind,
    pub outcome: ParseOutcome,
}

/// Parse a whole file into drafts. Text files use the line grammar starting
/// at `today`; tabular files read the date per row and fall back to `today`.
pub fn parse_file(file_path: &Path, today: NaiveDate, opts: &LineOptions) -> Result<ParsedFile> {
    let kind = SourceKind::for_path(file_path)?;
    let checksum = compute_checksum(file_path)?;
    let outcome = match kind {
        SourceKind::Text => {
            let bytes = std::fs::read(file_path)?;
            let content = String::from_utf8_lossy(&bytes);
            parse_text(content.trim_start_matches('\u{feff}'), today, opts)
        }
        SourceKind::Csv | SourceKind::Spreadsheet => {
            let (headers, rows) = read_table(file_path)?;
            parse_table(&headers, &rows, today, opts)?
        }
    };
    debug!(
        file = %file_path.display(),
        drafts = outcome.drafts.len(),
        skipped = outcome.skipped(),
        "parsed import file"
    );
    Ok(ParsedFile {
        filename: file_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .to_string(),
        checksum,
        kind,
        outcome,
    })
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

pub const TEXT_TEMPLATE: &str = "25/12/2025\n25000 เงินเดือน\n-150 ค่าอาหาร\n26/12/2025\n-150 ค่าอาหาร\n27/12/2025\n-500 ค่าหวย\n";

const TEMPLATE_HEADERS: [&str; 4] = ["วันที่", "รายการ", "จำนวนเงิน", "หมวดหมู่"];
const TEMPLATE_ROWS: &[[&str; 4]] = &[
    ["25/12/2025", "เงินเดือน", "25000", "เงินเดือน"],
    ["25/12/2025", "ค่าอาหาร", "-150", "อาหาร"],
    ["26/12/2025", "ค่าอาหาร", "-150", "อาหาร"],
    ["27/12/2025", "ค่าหวย", "-500", "หวย"],
];

/// Write a sample import file in the format implied by the extension.
pub fn write_template(file_path: &Path) -> Result<SourceKind> {
    let kind = SourceKind::for_path(file_path)?;
    match kind {
        SourceKind::Text => std::fs::write(file_path, TEXT_TEMPLATE)?,
        SourceKind::Csv => {
            let mut wtr = csv::Writer::from_path(file_path)?;
            wtr.write_record(TEMPLATE_HEADERS)?;
            for row in TEMPLATE_ROWS {
                wtr.write_record(row)?;
            }
            wtr.flush()?;
        }
        SourceKind::Spreadsheet => {
            return Err(MoneyError::UnknownFormat(
                "templates can be written as .txt or .csv".into(),
            ))
        }
    }
    Ok(kind)
}
