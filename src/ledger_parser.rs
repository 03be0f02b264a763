use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::{MoneyError, Result};
use crate::models::DraftEntry;
use crate::tokenizer::{calendar_date, parse_signed_amount, tokenize_line, LineOptions, LineToken};

#[derive(Debug, Clone, PartialEq)]
pub enum ParseIssue {
    /// A date-only line that is not a real calendar date; the cursor kept its value.
    InvalidDate { line: usize, text: String },
    /// A line with no amount on it.
    NoAmount { line: usize, text: String },
    /// A table row without a usable amount or description.
    RowSkipped { row: usize, reason: String },
    /// A table row whose date could not be read; the default date was used.
    RowDateDefaulted { row: usize, raw: String },
    /// A header that maps to none of the known columns.
    IgnoredColumn(String),
    /// Nothing at all could be parsed from the input.
    NothingParsed,
}

impl fmt::Display for ParseIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDate { line, text } => write!(f, "line {line}: '{text}' is not a valid date"),
            Self::NoAmount { line, text } => write!(f, "line {line}: no amount in '{text}'"),
            Self::RowSkipped { row, reason } => write!(f, "row {row}: skipped ({reason})"),
            Self::RowDateDefaulted { row, raw } => {
                write!(f, "row {row}: unreadable date '{raw}', used default date")
            }
            Self::IgnoredColumn(name) => write!(f, "column '{name}' ignored"),
            Self::NothingParsed => write!(f, "no entries could be parsed"),
        }
    }
}

/// Drafts in input order plus everything that was skipped along the way.
#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    pub drafts: Vec<DraftEntry>,
    pub issues: Vec<ParseIssue>,
}

impl ParseOutcome {
    fn finish(mut self) -> Self {
        if self.drafts.is_empty() {
            self.issues.push(ParseIssue::NothingParsed);
        }
        self
    }

    pub fn skipped(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| {
                matches!(
                    i,
                    ParseIssue::InvalidDate { .. } | ParseIssue::NoAmount { .. } | ParseIssue::RowSkipped { .. }
                )
            })
            .count()
    }
}

// ---------------------------------------------------------------------------
// Line-oriented text
// ---------------------------------------------------------------------------

/// Run the line tokenizer over a block of text. Date-only lines move a cursor
/// that stamps every following entry until the next date line, and switch
/// unsigned amounts to the dated-block policy.
pub fn parse_lines<'a, I>(lines: I, start_date: NaiveDate, opts: &LineOptions) -> ParseOutcome
where
    I: IntoIterator<Item = &'a str>,
{
    let mut current_date = start_date;
    let dated_opts = opts.dated();
    let mut active = opts;
    let mut outcome = ParseOutcome::default();

    for (idx, raw) in lines.into_iter().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        match tokenize_line(line, active) {
            LineToken::Date(date) => {
                current_date = date;
                active = &dated_opts;
            }
            LineToken::InvalidDate(text) => {
                debug!(line = line_no, %text, "ignoring invalid date line");
                outcome.issues.push(ParseIssue::InvalidDate { line: line_no, text });
            }
            LineToken::Entry { amount, description } => {
                outcome.drafts.push(DraftEntry::new(current_date, amount, description));
            }
            LineToken::Skip => {
                debug!(line = line_no, text = line, "no amount on line");
                outcome.issues.push(ParseIssue::NoAmount { line: line_no, text: line.to_string() });
            }
        }
    }
    outcome.finish()
}

pub fn parse_text(text: &str, start_date: NaiveDate, opts: &LineOptions) -> ParseOutcome {
    parse_lines(text.lines(), start_date, opts)
}

// ---------------------------------------------------------------------------
// Tabular rows (CSV / spreadsheet)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Date,
    Description,
    Amount,
    Category,
}

impl Column {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Description => "description",
            Self::Amount => "amount",
            Self::Category => "category",
        }
    }
}

// English and Thai header spellings, compared case-insensitively.
const HEADER_ALIASES: &[(&str, Column)] = &[
    ("date", Column::Date),
    ("transaction date", Column::Date),
    ("วันที่", Column::Date),
    ("description", Column::Description),
    ("item", Column::Description),
    ("details", Column::Description),
    ("รายการ", Column::Description),
    ("ชื่อรายการ", Column::Description),
    ("amount", Column::Amount),
    ("price", Column::Amount),
    ("จำนวนเงิน", Column::Amount),
    ("ราคา", Column::Amount),
    ("จำนวน", Column::Amount),
    ("category", Column::Category),
    ("หมวดหมู่", Column::Category),
];

pub fn column_for_header(header: &str) -> Option<Column> {
    let key = header.trim().trim_start_matches('\u{feff}').trim().to_lowercase();
    HEADER_ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, col)| *col)
}

/// One spreadsheet cell, reduced to what the parser cares about.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl RawCell {
    fn text(&self) -> Option<String> {
        match self {
            Self::Empty => None,
            Self::Text(s) => {
                let s = s.trim();
                (!s.is_empty()).then(|| s.to_string())
            }
            Self::Number(n) => Some(n.to_string()),
            Self::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ColumnMap {
    date: usize,
    description: usize,
    amount: usize,
    category: Option<usize>,
}

fn map_columns(headers: &[String], issues: &mut Vec<ParseIssue>) -> Result<ColumnMap> {
    let (mut date, mut description, mut amount, mut category) = (None, None, None, None);
    for (idx, header) in headers.iter().enumerate() {
        let slot = match column_for_header(header) {
            Some(Column::Date) => &mut date,
            Some(Column::Description) => &mut description,
            Some(Column::Amount) => &mut amount,
            Some(Column::Category) => &mut category,
            None => {
                if !header.trim().is_empty() {
                    issues.push(ParseIssue::IgnoredColumn(header.trim().to_string()));
                }
                continue;
            }
        };
        // First matching header wins.
        if slot.is_none() {
            *slot = Some(idx);
        }
    }

    let missing: Vec<String> = [
        (Column::Date, date),
        (Column::Description, description),
        (Column::Amount, amount),
    ]
    .iter()
    .filter(|(_, idx)| idx.is_none())
    .map(|(col, _)| col.name().to_string())
    .collect();
    if !missing.is_empty() {
        return Err(MoneyError::MissingColumns(missing));
    }

    Ok(ColumnMap {
        date: date.unwrap_or_default(),
        description: description.unwrap_or_default(),
        amount: amount.unwrap_or_default(),
        category,
    })
}

/// Day-first textual dates, ISO dates, and spreadsheet serial numbers.
pub fn parse_row_date(cell: &RawCell) -> Option<NaiveDate> {
    match cell {
        RawCell::Date(d) => Some(*d),
        RawCell::Number(serial) => excel_serial_to_date(*serial),
        RawCell::Text(s) => parse_date_text(s),
        RawCell::Empty => None,
    }
}

pub fn parse_date_text(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    // Drop a trailing time component, e.g. "2025-12-25 00:00:00".
    let raw = raw.split_whitespace().next().unwrap_or(raw);
    let parts: Vec<&str> = raw.split(['/', '-', '.']).collect();
    if parts.len() != 3 {
        return None;
    }
    // Year-first only for ISO dates.
    if parts[0].len() == 4 {
        return NaiveDate::from_ymd_opt(parts[0].parse().ok()?, parts[1].parse().ok()?, parts[2].parse().ok()?);
    }
    let d: u32 = parts[0].parse().ok()?;
    let m: u32 = parts[1].parse().ok()?;
    let y: i32 = parts[2].parse().ok()?;
    calendar_date(d, m, y)
}

/// Largest serial Excel can display (9999-12-31).
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || !(0.0..=MAX_EXCEL_SERIAL).contains(&serial) {
        return None;
    }
    // Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug)
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_signed(chrono::Duration::try_days(serial.trunc() as i64)?)
}

fn parse_cell_amount(cell: &RawCell, opts: &LineOptions) -> Option<Decimal> {
    match cell {
        RawCell::Number(n) => Decimal::try_from(*n).ok(),
        RawCell::Text(s) => {
            let cleaned: String = s.trim().chars().filter(|c| !c.is_whitespace()).collect();
            parse_signed_amount(&cleaned, opts.unsigned_policy)
        }
        _ => None,
    }
}

/// Parse rows under a header line. Each row carries its own date; rows
/// without amount or description are dropped. Missing required columns
/// reject the whole table.
pub fn parse_table(
    headers: &[String],
    rows: &[Vec<RawCell>],
    default_date: NaiveDate,
    opts: &LineOptions,
) -> Result<ParseOutcome> {
    let mut outcome = ParseOutcome::default();
    let cols = map_columns(headers, &mut outcome.issues)?;
    let empty = RawCell::Empty;

    for (idx, row) in rows.iter().enumerate() {
        // Header is row 1 in the file.
        let row_no = idx + 2;
        let cell = |i: usize| row.get(i).unwrap_or(&empty);

        if row.iter().all(|c| matches!(c, RawCell::Empty)) {
            continue;
        }

        let Some(description) = cell(cols.description).text() else {
            outcome.issues.push(ParseIssue::RowSkipped { row: row_no, reason: "no description".into() });
            continue;
        };
        let Some(amount) = parse_cell_amount(cell(cols.amount), opts) else {
            outcome.issues.push(ParseIssue::RowSkipped { row: row_no, reason: "no amount".into() });
            continue;
        };

        let date = match parse_row_date(cell(cols.date)) {
            Some(d) => d,
            None => {
                outcome.issues.push(ParseIssue::RowDateDefaulted {
                    row: row_no,
                    raw: cell(cols.date).text().unwrap_or_default(),
                });
                default_date
            }
        };

        let mut draft = DraftEntry::new(date, amount, description);
        draft.category_hint = cols.category.and_then(|i| cell(i).text());
        outcome.drafts.push(draft);
    }

    Ok(outcome.finish())
}
