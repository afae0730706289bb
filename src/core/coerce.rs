//! Raw value projections and parsers shared by every column type

use crate::types::RawCell;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Stored decimals keep at most this many significant digits.
/// Matches what an xlsx cell (an IEEE double) can faithfully round-trip.
pub const MAX_SIGNIFICANT_DIGITS: u32 = 15;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d %B %Y", "%B %d, %Y"];

/// The textual form of a raw value, used for untyped columns and as the
/// fallback whenever coercion fails.
///
/// Numbers keep their decimal text with `.` as separator (`50000.50` stays
/// `50000.50`), booleans become `true`/`false`, null and absent become `""`.
pub fn string_projection(raw: Option<&RawCell>) -> String {
    match raw {
        None | Some(RawCell::Null) => String::new(),
        Some(RawCell::Bool(b)) => b.to_string(),
        Some(RawCell::String(s)) => s.clone(),
        Some(RawCell::Number(n)) => {
            let text = n.to_string();
            match exact_decimal(&text) {
                Some(d) => d.to_string(),
                None => text,
            }
        }
    }
}

/// Decimal parse that only succeeds when no digit is lost; tiny or
/// over-long values (`1e-30`, 30 fractional digits) yield `None`
fn exact_decimal(text: &str) -> Option<Decimal> {
    let text = text.trim();
    let d = Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()?;
    let original = canonical_digits(text)?;
    (canonical_digits(&d.to_string())? == original).then_some(d)
}

/// `(negative, significant digits, exponent)` of plain or scientific
/// number text, with leading and trailing zeros removed
fn canonical_digits(text: &str) -> Option<(bool, String, i64)> {
    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
        Some(at) => (&unsigned[..at], unsigned[at + 1..].parse::<i64>().ok()?),
        None => (unsigned, 0),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if !int_part.chars().chain(frac_part.chars()).all(|c| c.is_ascii_digit()) {
        return None;
    }

    let digits = format!("{}{}", int_part, frac_part);
    let digits = digits.trim_start_matches('0');
    let trimmed = digits.trim_end_matches('0');
    if trimmed.is_empty() {
        return Some((false, String::new(), 0));
    }
    let exponent = exponent - frac_part.len() as i64 + (digits.len() - trimmed.len()) as i64;
    Some((negative, trimmed.to_string(), exponent))
}

/// Parse decimal text with a fixed `.` separator; plain or scientific notation
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
        .or_else(|| {
            // Beyond 28 digits: go through a double, which is all the cell keeps anyway
            let n: f64 = text.parse().ok()?;
            if !n.is_finite() {
                return None;
            }
            Decimal::try_from(n).ok()
        })
}

/// Decimal value of a number or numeric string; other kinds never parse
pub fn decimal_value(raw: &RawCell) -> Option<Decimal> {
    match raw {
        RawCell::Number(n) => parse_decimal(&n.to_string()),
        RawCell::String(s) => parse_decimal(s),
        RawCell::Null | RawCell::Bool(_) => None,
    }
}

/// Decimal value that also accepts `,` thousands separators in string
/// input (`"1,234.56"`); used by the Money, Decimal and Percentage columns
pub fn grouped_decimal_value(raw: &RawCell) -> Option<Decimal> {
    match raw {
        RawCell::String(s) => decimal_value(raw).or_else(|| parse_decimal(&strip_grouping(s)?)),
        _ => decimal_value(raw),
    }
}

/// Remove group separators; they may only appear between digits of the
/// integer part
fn strip_grouping(text: &str) -> Option<String> {
    let text = text.trim();
    let int_end = text.find(['.', 'e', 'E']).unwrap_or(text.len());
    let (int_part, rest) = text.split_at(int_end);
    if !int_part.contains(',') || rest.contains(',') {
        return None;
    }

    let unsigned = int_part.trim_start_matches(['-', '+']);
    let well_placed = unsigned
        .split(',')
        .all(|group| !group.is_empty() && group.chars().all(|c| c.is_ascii_digit()));
    if !well_placed {
        return None;
    }
    Some(format!("{}{}", int_part.replace(',', ""), rest))
}

/// Whole-number value, truncating toward zero (`30.7` -> `30`, `-30.7` -> `-30`)
pub fn integer_value(raw: &RawCell) -> Option<i64> {
    decimal_value(raw)?.trunc().to_i64()
}

/// Truncate (toward zero) to [`MAX_SIGNIFICANT_DIGITS`] significant digits
pub fn clip_significant_digits(value: Decimal) -> Decimal {
    value
        .round_sf_with_strategy(MAX_SIGNIFICANT_DIGITS, RoundingStrategy::ToZero)
        .unwrap_or(value)
}

/// Permissive calendar parse: RFC 3339 / ISO-8601 date-times, ISO dates and
/// the common slash forms. An explicit offset is dropped, the wall-clock
/// time is kept. Dates a worksheet cannot show (before 1900-01-01 or past
/// 9999-12-31) do not parse.
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    parse_any_datetime(text).filter(|dt| (1900..=9999).contains(&dt.year()))
}

fn parse_any_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt);
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(text, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }

    None
}
