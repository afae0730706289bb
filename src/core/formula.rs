//! Row formula templates: `=A{row}+B{row}` rendered per output row

use crate::error::{ExcelError, ExcelResult};
use regex::Regex;

/// The only placeholder a template may contain
pub const ROW_PLACEHOLDER: &str = "{row}";

/// A validated formula template for one column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormulaTemplate {
    /// Template body without the leading `=`
    body: String,
}

impl FormulaTemplate {
    /// Validate the template configured for column `index`.
    ///
    /// Blank templates mean "no formula" and yield `Ok(None)`. Named
    /// placeholders other than `{row}` are rejected; braces inside string
    /// literals and array constants such as `{1,2,3}` or `{TRUE}` are left
    /// alone. `{ row }` is accepted and stored as `{row}`.
    pub fn parse(index: usize, source: &str) -> ExcelResult<Option<Self>> {
        if source.trim().is_empty() {
            return Ok(None);
        }

        let body = source.strip_prefix('=').unwrap_or(source);
        if body.trim().is_empty() {
            return Err(ExcelError::InvalidFormula {
                index,
                formula: source.to_string(),
                reason: "formula is empty".to_string(),
            });
        }

        let regex_error = |e: regex::Error| ExcelError::InvalidFormula {
            index,
            formula: source.to_string(),
            reason: format!("Regex error: {}", e),
        };
        let string_literal = Regex::new(r#""(?:[^"]|"")*""#).map_err(regex_error)?;
        let placeholder = Regex::new(r"\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}").map_err(regex_error)?;

        // Placeholders are only recognized outside string literals
        let mut normalized = String::with_capacity(body.len());
        let mut last = 0;
        let literals = string_literal
            .find_iter(body)
            .map(|m| (m.start(), m.end()))
            .chain(std::iter::once((body.len(), body.len())));
        for (start, end) in literals {
            normalize_placeholders(&body[last..start], &placeholder, &mut normalized).map_err(
                |found| ExcelError::InvalidFormula {
                    index,
                    formula: source.to_string(),
                    reason: format!(
                        "unknown placeholder {}, only {} is supported",
                        found, ROW_PLACEHOLDER
                    ),
                },
            )?;
            normalized.push_str(&body[start..end]);
            last = end;
        }

        Ok(Some(Self { body: normalized }))
    }

    /// Formula text for a 1-based output row, without a leading `=`
    pub fn render(&self, row: u32) -> String {
        self.body.replace(ROW_PLACEHOLDER, &row.to_string())
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

/// Copy `segment` into `out`, writing `{ row }` as `{row}`; single-element
/// boolean array constants (`{TRUE}`) pass through. Returns the first
/// unknown placeholder.
fn normalize_placeholders(
    segment: &str,
    placeholder: &Regex,
    out: &mut String,
) -> Result<(), String> {
    let mut last = 0;
    for captures in placeholder.captures_iter(segment) {
        let (Some(full), Some(name)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        out.push_str(&segment[last..full.start()]);
        match name.as_str() {
            "row" => out.push_str(ROW_PLACEHOLDER),
            literal
                if literal.eq_ignore_ascii_case("TRUE") || literal.eq_ignore_ascii_case("FALSE") =>
            {
                out.push_str(full.as_str())
            }
            _ => return Err(full.as_str().to_string()),
        }
        last = full.end();
    }
    out.push_str(&segment[last..]);
    Ok(())
}

/// Convert a 0-based column index to its Excel letter (0 → A, 26 → AA)
pub fn column_index_to_letter(index: usize) -> String {
    let mut result = String::new();
    let mut idx = index;

    loop {
        let remainder = idx % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        if idx < 26 {
            break;
        }
        idx = idx / 26 - 1;
    }

    result
}

/// A1-style address of a 1-based (row, column) position
pub fn cell_address(row: u32, column: u16) -> String {
    format!(
        "{}{}",
        column_index_to_letter(usize::from(column.saturating_sub(1))),
        row
    )
}
