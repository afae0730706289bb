use thiserror::Error;

pub type ExcelResult<T> = Result<T, ExcelError>;

#[derive(Error, Debug)]
pub enum ExcelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Unknown column type '{name}' for column {index}")]
    UnknownColumnType { index: usize, name: String },

    #[error("Invalid formula '{formula}' for column {index}: {reason}")]
    InvalidFormula {
        index: usize,
        formula: String,
        reason: String,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Grid of {rows} rows x {columns} columns exceeds the worksheet limits")]
    GridTooLarge { rows: usize, columns: usize },

    #[error("Excel export error: {0}")]
    Export(String),
}

impl ExcelError {
    /// True for errors caused by the request's configuration rather than
    /// by the host (disk, serialization backend).
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ExcelError::UnknownColumnType { .. }
                | ExcelError::InvalidFormula { .. }
                | ExcelError::InvalidConfig(_)
                | ExcelError::GridTooLarge { .. }
        )
    }
}
