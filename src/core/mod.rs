//! Cell coercion and formatting engine

pub mod coerce;
pub mod formula;
pub mod materializer;
pub mod schema;

pub use formula::FormulaTemplate;
pub use materializer::{materialize, CellConflict, CellContent, MaterializedCell, TypedValue};
pub use schema::{ColumnLookup, ColumnSpec, Schema};
