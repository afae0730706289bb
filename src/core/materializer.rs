//! Cell materializer: one raw value + its column spec → what gets written

use crate::core::coerce::{
    clip_significant_digits, grouped_decimal_value, integer_value, parse_datetime,
    string_projection,
};
use crate::core::schema::{ColumnLookup, ColumnSpec};
use crate::types::{ColumnType, RawCell};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::fmt;

/// A typed literal ready for the worksheet
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    String(String),
    Integer(i64),
    Decimal(Decimal),
    Boolean(bool),
    DateTime(NaiveDateTime),
}

impl TypedValue {
    pub fn kind(&self) -> &'static str {
        match self {
            TypedValue::String(_) => "string",
            TypedValue::Integer(_) => "integer",
            TypedValue::Decimal(_) => "decimal",
            TypedValue::Boolean(_) => "boolean",
            TypedValue::DateTime(_) => "datetime",
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::String(s) => write!(f, "{:?}", s),
            TypedValue::Integer(n) => write!(f, "{}", n),
            TypedValue::Decimal(d) => write!(f, "{}", d),
            TypedValue::Boolean(b) => write!(f, "{}", b),
            TypedValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellContent {
    Value(TypedValue),
    /// Formula text without the leading `=`
    Formula(String),
}

impl CellContent {
    fn empty() -> Self {
        CellContent::Value(TypedValue::String(String::new()))
    }

    /// True for the empty string literal written for null or missing input
    pub fn is_empty(&self) -> bool {
        matches!(self, CellContent::Value(TypedValue::String(s)) if s.is_empty())
    }
}

/// A formula and a literal value were both supplied for one cell
#[derive(Debug, Clone, PartialEq)]
pub struct CellConflict {
    /// Rendered formula that was written
    pub formula: String,
    /// String projection of the raw value that was discarded
    pub discarded: String,
}

impl CellConflict {
    /// Text for the note attached to the conflicting cell
    pub fn note_text(&self) -> String {
        format!(
            "ERR: Both formula ({}) and data ({})",
            self.formula, self.discarded
        )
    }
}

/// Most characters a worksheet cell can hold
pub const MAX_CELL_TEXT_CHARS: usize = 32_767;

/// The decision for one grid position
#[derive(Debug, Clone, PartialEq)]
pub struct MaterializedCell {
    pub content: CellContent,
    pub display_format: Option<&'static str>,
    pub conflict: Option<CellConflict>,
    /// Character count of text cut down to [`MAX_CELL_TEXT_CHARS`]
    pub truncated_from: Option<usize>,
}

impl MaterializedCell {
    fn new(content: CellContent, display_format: Option<&'static str>) -> Self {
        Self {
            content,
            display_format,
            conflict: None,
            truncated_from: None,
        }
    }

    /// Cut text that does not fit a cell, remembering the original length
    fn fit_text(mut self) -> Self {
        if let CellContent::Value(TypedValue::String(text)) = &mut self.content {
            let length = text.chars().count();
            if length > MAX_CELL_TEXT_CHARS {
                *text = text.chars().take(MAX_CELL_TEXT_CHARS).collect();
                self.truncated_from = Some(length);
            }
        }
        self
    }

    /// Fallback: the raw value as text, General format
    fn text(raw: Option<&RawCell>) -> Self {
        Self::new(
            CellContent::Value(TypedValue::String(string_projection(raw))),
            None,
        )
    }

    fn typed(value: TypedValue, column_type: ColumnType) -> Self {
        Self::new(CellContent::Value(value), column_type.number_format())
    }

    pub fn has_conflict_warning(&self) -> bool {
        self.conflict.is_some()
    }

    pub fn is_formula(&self) -> bool {
        matches!(self.content, CellContent::Formula(_))
    }

    /// Text of the note attached to the cell, if it needs one
    pub fn note_text(&self) -> Option<String> {
        if let Some(conflict) = &self.conflict {
            return Some(conflict.note_text());
        }
        self.truncated_from.map(|length| {
            format!(
                "Text truncated to {} of {} characters",
                MAX_CELL_TEXT_CHARS, length
            )
        })
    }
}

/// Decide content and format for one cell.
///
/// `raw` is `None` when the row is shorter than the column index.
/// `output_row` is the 1-based worksheet row, used for formula templates.
pub fn materialize(
    lookup: ColumnLookup<'_>,
    raw: Option<&RawCell>,
    output_row: u32,
) -> MaterializedCell {
    decide(lookup, raw, output_row).fit_text()
}

fn decide(lookup: ColumnLookup<'_>, raw: Option<&RawCell>, output_row: u32) -> MaterializedCell {
    let spec = match lookup {
        ColumnLookup::Configured(spec) => spec,
        ColumnLookup::NotConfigured => return MaterializedCell::text(raw),
    };

    if let Some(template) = &spec.formula {
        let formula = template.render(output_row);
        let conflict = raw.filter(|r| !r.is_null()).map(|r| CellConflict {
            formula: formula.clone(),
            discarded: string_projection(Some(r)),
        });
        return MaterializedCell {
            conflict,
            ..MaterializedCell::new(
                CellContent::Formula(formula),
                spec.column_type.number_format(),
            )
        };
    }

    match raw {
        None => MaterializedCell::new(CellContent::empty(), None),
        Some(RawCell::Null) => {
            MaterializedCell::new(CellContent::empty(), spec.column_type.number_format())
        }
        Some(value) => coerce(spec, value),
    }
}

/// Typed coercion of a present, non-null value
fn coerce(spec: &ColumnSpec, raw: &RawCell) -> MaterializedCell {
    let column_type = spec.column_type;
    let typed = match column_type {
        ColumnType::String => None,
        ColumnType::Integer => integer_value(raw).map(TypedValue::Integer),
        ColumnType::Decimal | ColumnType::Money => grouped_decimal_value(raw)
            .map(clip_significant_digits)
            .map(TypedValue::Decimal),
        ColumnType::Percentage => grouped_decimal_value(raw)
            .and_then(|d| d.checked_div(Decimal::ONE_HUNDRED))
            .map(clip_significant_digits)
            .map(TypedValue::Decimal),
        ColumnType::Boolean => match raw {
            RawCell::Bool(b) => Some(TypedValue::Boolean(*b)),
            _ => None,
        },
        ColumnType::Date => match raw {
            RawCell::String(s) => parse_datetime(s).map(TypedValue::DateTime),
            _ => None,
        },
    };

    match typed {
        Some(value) => MaterializedCell::typed(value, column_type),
        None => MaterializedCell::text(Some(raw)),
    }
}
