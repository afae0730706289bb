//! Excel Creator - formatted .xlsx sheets from loosely-typed JSON rows
//!
//! This library turns a payload of raw rows plus a column configuration into
//! a single-sheet Excel workbook.
//!
//! # Features
//!
//! - Typed columns: String, Date, Percentage, Integer, Money, Decimal, Boolean
//! - Lossless fallback: values that do not coerce are written as text
//! - Row formulas with a `{row}` placeholder (`=A{row}+B{row}`)
//! - Formula/data conflicts highlighted with an explanatory note
//! - Header styling, auto-filter, frozen columns, column autosize
//!
//! # Example
//!
//! ```no_run
//! use excel_creator::excel::create_excel;
//! use excel_creator::types::ExcelPayload;
//!
//! let payload: ExcelPayload = serde_json::from_str(
//!     r#"{"data": [["John", 30]],
//!         "config": {"sheetName": "People",
//!                    "columns": [{"header": "Name", "type": "String"},
//!                                {"header": "Age", "type": "Integer"}]}}"#,
//! )?;
//! let bytes = create_excel(&payload)?;
//! std::fs::write("people.xlsx", bytes)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod api;
pub mod cli;
pub mod core;
pub mod error;
pub mod excel;
pub mod types;

// Re-export commonly used types
pub use error::{ExcelError, ExcelResult};
pub use types::{ColumnConfig, ColumnType, ExcelConfig, ExcelPayload, RawCell};
