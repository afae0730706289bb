use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

//==============================================================================
// Raw input values
//==============================================================================

/// One grid position exactly as it arrived in the payload.
///
/// Built once at the JSON boundary; downstream code matches on the variant
/// instead of poking at `serde_json::Value`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "serde_json::Value")]
pub enum RawCell {
    Null,
    Bool(bool),
    /// Kept as the JSON number so its original text survives until coercion
    Number(serde_json::Number),
    String(String),
}

impl RawCell {
    pub fn is_null(&self) -> bool {
        matches!(self, RawCell::Null)
    }

    /// Variant name, used in logs and the CLI inspector
    pub fn kind(&self) -> &'static str {
        match self {
            RawCell::Null => "null",
            RawCell::Bool(_) => "boolean",
            RawCell::Number(_) => "number",
            RawCell::String(_) => "string",
        }
    }
}

impl From<serde_json::Value> for RawCell {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => RawCell::Null,
            serde_json::Value::Bool(b) => RawCell::Bool(b),
            serde_json::Value::Number(n) => RawCell::Number(n),
            serde_json::Value::String(s) => RawCell::String(s),
            // Not part of the payload contract; keep the JSON text instead of dropping it
            other @ (serde_json::Value::Array(_) | serde_json::Value::Object(_)) => {
                RawCell::String(other.to_string())
            }
        }
    }
}

impl From<&str> for RawCell {
    fn from(value: &str) -> Self {
        RawCell::String(value.to_string())
    }
}

impl From<bool> for RawCell {
    fn from(value: bool) -> Self {
        RawCell::Bool(value)
    }
}

impl From<i64> for RawCell {
    fn from(value: i64) -> Self {
        RawCell::Number(value.into())
    }
}

//==============================================================================
// Column types
//==============================================================================

pub const FORMAT_DATE: &str = "mm/dd/yyyy";
pub const FORMAT_PERCENTAGE: &str = "0.00%";
pub const FORMAT_INTEGER: &str = "#,##0";
pub const FORMAT_MONEY: &str = "€ #,##0.00";
pub const FORMAT_DECIMAL: &str = "#,##0.00";

/// How a column's values are coerced and displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    String,
    /// Displayed as mm/dd/yyyy
    Date,
    /// Input on a 0-100 scale, stored as a fraction, displayed as 0.00%
    Percentage,
    /// Displayed as #,##0
    Integer,
    /// Displayed as € #,##0.00
    Money,
    /// Displayed as #,##0.00
    Decimal,
    Boolean,
}

impl ColumnType {
    pub const ALL: [ColumnType; 7] = [
        ColumnType::String,
        ColumnType::Date,
        ColumnType::Percentage,
        ColumnType::Integer,
        ColumnType::Money,
        ColumnType::Decimal,
        ColumnType::Boolean,
    ];

    /// Excel number format for the column, `""` when the column keeps
    /// the default General format
    pub fn display_format(self) -> &'static str {
        match self {
            ColumnType::String => "",
            ColumnType::Date => FORMAT_DATE,
            ColumnType::Percentage => FORMAT_PERCENTAGE,
            ColumnType::Integer => FORMAT_INTEGER,
            ColumnType::Money => FORMAT_MONEY,
            ColumnType::Decimal => FORMAT_DECIMAL,
            ColumnType::Boolean => "",
        }
    }

    pub fn number_format(self) -> Option<&'static str> {
        Some(self.display_format()).filter(|f| !f.is_empty())
    }

    pub fn name(self) -> &'static str {
        match self {
            ColumnType::String => "String",
            ColumnType::Date => "Date",
            ColumnType::Percentage => "Percentage",
            ColumnType::Integer => "Integer",
            ColumnType::Money => "Money",
            ColumnType::Decimal => "Decimal",
            ColumnType::Boolean => "Boolean",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ColumnType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ColumnType::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| s.to_string())
    }
}

//==============================================================================
// Payload
//==============================================================================

fn default_sheet_name() -> String {
    "Sheet1".to_string()
}

fn default_column_type() -> String {
    ColumnType::String.name().to_string()
}

/// Full request body: the rows plus how to lay them out
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExcelPayload {
    pub data: Vec<Vec<RawCell>>,
    pub config: ExcelConfig,
}

impl ExcelPayload {
    pub fn new(config: ExcelConfig, data: Vec<Vec<RawCell>>) -> Self {
        Self { data, config }
    }
}

impl fmt::Display for ExcelPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rows={}, Config={}", self.data.len(), self.config)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExcelConfig {
    pub file_name: String,
    pub sheet_name: String,
    pub columns: Vec<ColumnConfig>,
    pub freeze_columns: Option<i64>,
}

impl Default for ExcelConfig {
    fn default() -> Self {
        Self {
            file_name: String::new(),
            sheet_name: default_sheet_name(),
            columns: Vec::new(),
            freeze_columns: None,
        }
    }
}

impl ExcelConfig {
    pub fn new(sheet_name: impl Into<String>, columns: Vec<ColumnConfig>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            columns,
            ..Default::default()
        }
    }

    /// Download name; falls back to the sheet name when none was configured
    pub fn download_name(&self) -> String {
        let name = self.file_name.trim();
        if name.is_empty() {
            format!("{}.xlsx", self.sheet_name)
        } else {
            name.to_string()
        }
    }
}

impl fmt::Display for ExcelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: Vec<&str> = self.columns.iter().map(|c| c.header.as_str()).collect();
        write!(f, "{}: {}", self.sheet_name, headers.join(", "))
    }
}

/// One declared column as it appears in the payload; validated into a
/// [`ColumnSpec`](crate::core::ColumnSpec) by the schema
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnConfig {
    #[serde(default)]
    pub header: String,
    #[serde(rename = "type", default = "default_column_type")]
    pub column_type: String,
    /// May start with `=`; `{row}` is replaced by the output row number
    #[serde(default)]
    pub formula: Option<String>,
}

impl ColumnConfig {
    pub fn new(header: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            header: header.into(),
            column_type: column_type.name().to_string(),
            formula: None,
        }
    }

    pub fn with_formula(mut self, formula: impl Into<String>) -> Self {
        self.formula = Some(formula.into());
        self
    }
}
