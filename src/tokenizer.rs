use std::str::FromStr;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;

use crate::models::UnsignedAmountPolicy;

pub const DEFAULT_FALLBACK_DESCRIPTION: &str = "general item";

/// A line longer than this is never treated as a bare date, even if it
/// contains one.
const MAX_DATE_LINE_CHARS: usize = 10;

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})[-/](\d{1,2})[-/](\d{4}|\d{2})\b").unwrap());

// Takes every comma-joined digit run whole; `is_well_grouped` then rejects
// tokens like "1,2345" instead of reading a "1,234" prefix.
static AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[+-]?\d+(?:,\d+)*(?:\.\d+)?").unwrap());

/// Commas, if any, must split the integer part into 1-3 leading digits and
/// then groups of exactly three.
fn is_well_grouped(token: &str) -> bool {
    let digits = token.trim().trim_start_matches(['+', '-']);
    let int_part = digits.split('.').next().unwrap_or(digits);
    if !int_part.contains(',') {
        return true;
    }
    let mut groups = int_part.split(',');
    let leading_ok = groups.next().is_some_and(|g| (1..=3).contains(&g.len()));
    leading_ok && groups.all(|g| g.len() == 3)
}

#[derive(Debug, Clone)]
pub struct LineOptions {
    pub unsigned_policy: UnsignedAmountPolicy,
    /// Applied instead of `unsigned_policy` once a block has produced a
    /// date-only line; dated blocks follow the ledger-file grammar.
    pub dated_policy: UnsignedAmountPolicy,
    pub fallback_description: String,
}

impl LineOptions {
    pub fn new(unsigned_policy: UnsignedAmountPolicy) -> Self {
        Self {
            unsigned_policy,
            dated_policy: unsigned_policy,
            fallback_description: DEFAULT_FALLBACK_DESCRIPTION.to_string(),
        }
    }

    pub fn with_dated_policy(mut self, policy: UnsignedAmountPolicy) -> Self {
        self.dated_policy = policy;
        self
    }

    pub fn with_fallback(mut self, fallback: &str) -> Self {
        if !fallback.trim().is_empty() {
            self.fallback_description = fallback.trim().to_string();
        }
        self
    }

    /// The options in effect after a date-only line.
    pub fn dated(&self) -> Self {
        Self {
            unsigned_policy: self.dated_policy,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LineToken {
    /// The line is only a date; it moves the current-date cursor.
    Date(NaiveDate),
    /// The line is only a date but not a real calendar day (e.g. 32/01/2025).
    InvalidDate(String),
    Entry { amount: Decimal, description: String },
    /// No amount anywhere on the line.
    Skip,
}

/// Classify one line of free text.
pub fn tokenize_line(line: &str, opts: &LineOptions) -> LineToken {
    let line = line.trim();
    if line.is_empty() {
        return LineToken::Skip;
    }

    let date_match = DATE_RE.captures(line);
    if let Some(caps) = &date_match {
        if line.chars().count() <= MAX_DATE_LINE_CHARS {
            let day = caps[1].parse().unwrap_or(0);
            let month = caps[2].parse().unwrap_or(0);
            let year = caps[3].parse().unwrap_or(0);
            return match calendar_date(day, month, year) {
                Some(date) => LineToken::Date(date),
                None => LineToken::InvalidDate(line.to_string()),
            };
        }
    }

    // An inline date is not an amount; search around it.
    let date_span = date_match.as_ref().and_then(|c| c.get(0)).map(|m| m.range());
    let Some(amount_match) = AMOUNT_RE
        .find_iter(line)
        .filter(|m| is_well_grouped(m.as_str()))
        .find(|m| date_span.as_ref().map_or(true, |d| m.end() <= d.start || m.start() >= d.end))
    else {
        return LineToken::Skip;
    };

    let Some(amount) = parse_signed_amount(amount_match.as_str(), opts.unsigned_policy) else {
        return LineToken::Skip;
    };

    let mut rest = String::with_capacity(line.len());
    let mut removed = vec![amount_match.range()];
    if let Some(span) = date_span {
        removed.push(span);
    }
    removed.sort_by_key(|r| r.start);
    let mut cursor = 0;
    for span in removed {
        rest.push_str(&line[cursor..span.start]);
        rest.push(' ');
        cursor = span.end;
    }
    rest.push_str(&line[cursor..]);

    let description = rest.split_whitespace().collect::<Vec<_>>().join(" ");
    let description = if description.is_empty() {
        opts.fallback_description.clone()
    } else {
        description
    };

    LineToken::Entry { amount, description }
}

/// Day/month/year with two-digit years widened into the 2000s.
pub fn calendar_date(day: u32, month: u32, year: i32) -> Option<NaiveDate> {
    let year = if year < 100 { year + 2000 } else { year };
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parse a numeric token: thousands separators stripped, explicit sign kept,
/// missing sign decided by `policy`.
pub fn parse_signed_amount(raw: &str, policy: UnsignedAmountPolicy) -> Option<Decimal> {
    let raw = raw.trim();
    if !is_well_grouped(raw) {
        return None;
    }
    let (sign, digits) = match raw.chars().next() {
        Some('-') => (Some(false), &raw[1..]),
        Some('+') => (Some(true), &raw[1..]),
        _ => (None, raw),
    };
    let magnitude = Decimal::from_str(&digits.replace(',', "")).ok()?;
    Some(match sign {
        Some(true) => magnitude.abs(),
        Some(false) => -magnitude.abs(),
        None => policy.apply(magnitude),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_opts() -> LineOptions {
        LineOptions::new(UnsignedAmountPolicy::EntryDefaultExpense)
    }

    fn import_opts() -> LineOptions {
        LineOptions::new(UnsignedAmountPolicy::ImportDefaultIncome)
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_date_line() {
        assert_eq!(
            tokenize_line("25/12/2025", &entry_opts()),
            LineToken::Date(NaiveDate::from_ymd_opt(2025, 12, 25).unwrap())
        );
        assert_eq!(
            tokenize_line("1-2-2026", &entry_opts()),
            LineToken::Date(NaiveDate::from_ymd_opt(2026, 2, 1).unwrap())
        );
    }

    #[test]
    fn test_two_digit_years_widen_to_2000s() {
        for y in [0, 7, 25, 99] {
            let line = format!("01/01/{y:02}");
            assert_eq!(
                tokenize_line(&line, &entry_opts()),
                LineToken::Date(NaiveDate::from_ymd_opt(2000 + y, 1, 1).unwrap()),
                "year {y}"
            );
        }
    }

    #[test]
    fn test_invalid_calendar_date_is_dropped() {
        assert_eq!(
            tokenize_line("32/01/2025", &entry_opts()),
            LineToken::InvalidDate("32/01/2025".to_string())
        );
        assert_eq!(
            tokenize_line("30/02/2024", &entry_opts()),
            LineToken::InvalidDate("30/02/2024".to_string())
        );
    }

    #[test]
    fn test_unsigned_amount_follows_policy() {
        assert_eq!(
            tokenize_line("ข้าวเช้า 50", &entry_opts()),
            LineToken::Entry { amount: dec("-50"), description: "ข้าวเช้า".to_string() }
        );
        assert_eq!(
            tokenize_line("ข้าวเช้า 50", &import_opts()),
            LineToken::Entry { amount: dec("50"), description: "ข้าวเช้า".to_string() }
        );
    }

    #[test]
    fn test_explicit_sign_wins_over_policy() {
        assert_eq!(
            tokenize_line("25000 เงินเดือน", &import_opts()),
            LineToken::Entry { amount: dec("25000"), description: "เงินเดือน".to_string() }
        );
        assert_eq!(
            tokenize_line("+25000 เงินเดือน", &entry_opts()),
            LineToken::Entry { amount: dec("25000"), description: "เงินเดือน".to_string() }
        );
        assert_eq!(
            tokenize_line("-150 ค่าอาหาร", &import_opts()),
            LineToken::Entry { amount: dec("-150"), description: "ค่าอาหาร".to_string() }
        );
    }

    #[test]
    fn test_thousands_separators() {
        assert_eq!(
            tokenize_line("rent +1,200.50", &entry_opts()),
            LineToken::Entry { amount: dec("1200.50"), description: "rent".to_string() }
        );
        assert_eq!(parse_signed_amount("1,200.50", UnsignedAmountPolicy::ImportDefaultIncome), Some(dec("1200.50")));
        assert_eq!(
            tokenize_line("laptop 32,500", &entry_opts()),
            LineToken::Entry { amount: dec("-32500"), description: "laptop".to_string() }
        );
    }

    #[test]
    fn test_misgrouped_thousands_are_not_amounts() {
        assert_eq!(tokenize_line("coffee 1,2345", &entry_opts()), LineToken::Skip);
        assert_eq!(tokenize_line("coffee 12,34", &entry_opts()), LineToken::Skip);
        assert_eq!(
            tokenize_line("order 1,2345 fee 60", &entry_opts()),
            LineToken::Entry { amount: dec("-60"), description: "order 1,2345 fee".to_string() }
        );
        assert_eq!(parse_signed_amount("1,2345", UnsignedAmountPolicy::ImportDefaultIncome), None);
        assert_eq!(parse_signed_amount("1234,567", UnsignedAmountPolicy::ImportDefaultIncome), None);
    }

    #[test]
    fn test_amount_only_line_gets_fallback_description() {
        assert_eq!(
            tokenize_line("-20", &entry_opts()),
            LineToken::Entry { amount: dec("-20"), description: DEFAULT_FALLBACK_DESCRIPTION.to_string() }
        );
    }

    #[test]
    fn test_inline_date_removed_and_not_read_as_amount() {
        assert_eq!(
            tokenize_line("25/12/2025 coffee 45", &entry_opts()),
            LineToken::Entry { amount: dec("-45"), description: "coffee".to_string() }
        );
    }

    #[test]
    fn test_only_first_amount_is_removed() {
        assert_eq!(
            tokenize_line("bus 20 line 8", &entry_opts()),
            LineToken::Entry { amount: dec("-20"), description: "bus line 8".to_string() }
        );
    }

    #[test]
    fn test_text_without_amount_is_skipped() {
        assert_eq!(tokenize_line("just a note", &entry_opts()), LineToken::Skip);
        assert_eq!(tokenize_line("   ", &entry_opts()), LineToken::Skip);
    }
}
