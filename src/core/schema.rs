//! Column schema: validated column specs with lookup by position

use crate::core::formula::FormulaTemplate;
use crate::error::{ExcelError, ExcelResult};
use crate::types::{ColumnType, ExcelConfig};

/// Highest column count an xlsx worksheet supports
pub const MAX_COLUMNS: usize = 16_384;

/// A declared column after validation
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub header: String,
    pub column_type: ColumnType,
    pub formula: Option<FormulaTemplate>,
}

impl ColumnSpec {
    pub fn new(header: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            header: header.into(),
            column_type,
            formula: None,
        }
    }

    pub fn with_formula(mut self, formula: FormulaTemplate) -> Self {
        self.formula = Some(formula);
        self
    }
}

/// Outcome of looking up a column position
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnLookup<'a> {
    Configured(&'a ColumnSpec),
    /// The data grid may be wider than the declared columns
    NotConfigured,
}

impl<'a> ColumnLookup<'a> {
    pub fn spec(self) -> Option<&'a ColumnSpec> {
        match self {
            ColumnLookup::Configured(spec) => Some(spec),
            ColumnLookup::NotConfigured => None,
        }
    }
}

/// Validated sheet layout
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub sheet_name: String,
    pub columns: Vec<ColumnSpec>,
    /// Leading columns to freeze; `None` when no freeze was requested
    pub freeze_columns: Option<u16>,
}

impl Schema {
    /// Validate a payload configuration.
    ///
    /// Every configuration error surfaces here, before a single cell is
    /// materialized.
    pub fn from_config(config: &ExcelConfig) -> ExcelResult<Self> {
        validate_sheet_name(&config.sheet_name)?;

        if config.columns.len() > MAX_COLUMNS {
            return Err(ExcelError::InvalidConfig(format!(
                "{} columns configured, a worksheet holds at most {}",
                config.columns.len(),
                MAX_COLUMNS
            )));
        }

        let columns = config
            .columns
            .iter()
            .enumerate()
            .map(|(index, column)| -> ExcelResult<ColumnSpec> {
                let column_type: ColumnType = column
                    .column_type
                    .parse()
                    .map_err(|name| ExcelError::UnknownColumnType { index, name })?;
                let formula = match column.formula.as_deref() {
                    Some(source) => FormulaTemplate::parse(index, source)?,
                    None => None,
                };
                Ok(ColumnSpec {
                    header: column.header.clone(),
                    column_type,
                    formula,
                })
            })
            .collect::<ExcelResult<Vec<_>>>()?;

        let freeze_columns = match config.freeze_columns {
            Some(n) if n > 0 => {
                let n = u16::try_from(n)
                    .ok()
                    .filter(|n| usize::from(*n) < MAX_COLUMNS)
                    .ok_or_else(|| {
                        ExcelError::InvalidConfig(format!(
                            "cannot freeze {} columns, at most {} are allowed",
                            n,
                            MAX_COLUMNS - 1
                        ))
                    })?;
                Some(n)
            }
            _ => None,
        };

        Ok(Self {
            sheet_name: config.sheet_name.clone(),
            columns,
            freeze_columns,
        })
    }

    /// Look up the column at a 0-based position
    pub fn resolve(&self, index: usize) -> ColumnLookup<'_> {
        match self.columns.get(index) {
            Some(spec) => ColumnLookup::Configured(spec),
            None => ColumnLookup::NotConfigured,
        }
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

/// Excel's worksheet naming rules
fn validate_sheet_name(name: &str) -> ExcelResult<()> {
    let invalid = |reason: &str| {
        Err(ExcelError::InvalidConfig(format!(
            "invalid sheet name '{}': {}",
            name, reason
        )))
    };

    if name.trim().is_empty() {
        return invalid("must not be blank");
    }
    if name.chars().count() > 31 {
        return invalid("must be at most 31 characters");
    }
    if name.contains(['[', ']', ':', '*', '?', '/', '\\']) {
        return invalid("must not contain any of [ ] : * ? / \\");
    }
    if name.starts_with('\'') || name.ends_with('\'') {
        return invalid("must not start or end with an apostrophe");
    }
    if name.eq_ignore_ascii_case("history") {
        return invalid("'History' is reserved by Excel");
    }
    Ok(())
}
