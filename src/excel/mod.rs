//! Excel generation: grid assembly and xlsx export
//!
//! - Assembler: payload rows + schema → materialized grid with exact extents
//! - Exporter: materialized grid → `.xlsx` via rust_xlsxwriter

mod assembler;
mod exporter;

pub use assembler::{CellRange, GridAssembler, MaterializedGrid, PlacedCell, MAX_ROWS};
pub use exporter::{ExcelExporter, XLSX_CONTENT_TYPE};

use crate::core::Schema;
use crate::error::ExcelResult;
use crate::types::ExcelPayload;

/// Validate the configuration and materialize every cell of the payload.
///
/// Fails before any output exists when the configuration is invalid.
pub fn build_grid(payload: &ExcelPayload) -> ExcelResult<MaterializedGrid> {
    let schema = Schema::from_config(&payload.config)?;
    GridAssembler::new(&schema).assemble(&payload.data)
}

/// Generate the xlsx document for a payload
pub fn create_excel(payload: &ExcelPayload) -> ExcelResult<Vec<u8>> {
    ExcelExporter::new(build_grid(payload)?).to_bytes()
}
