//! Grid assembler: extents, per-cell loop and sheet-level finishing

use crate::core::formula::cell_address;
use crate::core::schema::MAX_COLUMNS;
use crate::core::{materialize, MaterializedCell, Schema};
use crate::error::{ExcelError, ExcelResult};
use crate::types::RawCell;
use tracing::{debug, warn};

/// Highest row count an xlsx worksheet supports
pub const MAX_ROWS: usize = 1_048_576;

/// First output row holding data; row 1 carries the headers
pub const FIRST_DATA_ROW: u32 = 2;

/// A materialized cell at its 1-based worksheet position
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedCell {
    pub row: u32,
    pub column: u16,
    pub cell: MaterializedCell,
}

impl PlacedCell {
    pub fn address(&self) -> String {
        cell_address(self.row, self.column)
    }
}

/// Inclusive 1-based rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub first_row: u32,
    pub first_column: u16,
    pub last_row: u32,
    pub last_column: u16,
}

impl CellRange {
    /// A1-style reference, e.g. `A1:B2`
    pub fn a1(&self) -> String {
        format!(
            "{}:{}",
            cell_address(self.first_row, self.first_column),
            cell_address(self.last_row, self.last_column)
        )
    }
}

/// Everything the exporter needs to write one worksheet
#[derive(Debug, Clone, PartialEq)]
pub struct MaterializedGrid {
    pub sheet_name: String,
    pub headers: Vec<String>,
    /// Data cells in row-major order
    pub cells: Vec<PlacedCell>,
    /// Last used row, header row included
    pub last_row: u32,
    /// Widest of the configured columns and the longest data row
    pub last_column: u16,
    pub auto_filter: Option<CellRange>,
    pub freeze_columns: Option<u16>,
}

impl MaterializedGrid {
    /// Cell at a 1-based position, if one was materialized there
    pub fn cell(&self, row: u32, column: u16) -> Option<&MaterializedCell> {
        self.cells
            .iter()
            .find(|c| c.row == row && c.column == column)
            .map(|c| &c.cell)
    }

    pub fn data_row_count(&self) -> usize {
        (self.last_row - 1) as usize
    }

    pub fn conflict_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| c.cell.has_conflict_warning())
            .count()
    }
}

/// Drives the materializer over a row-major data grid
pub struct GridAssembler<'a> {
    schema: &'a Schema,
}

impl<'a> GridAssembler<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self { schema }
    }

    pub fn assemble(&self, data: &[Vec<RawCell>]) -> ExcelResult<MaterializedGrid> {
        let configured = self.schema.column_count();
        let widest_row = data.iter().map(Vec::len).max().unwrap_or(0);
        let width = configured.max(widest_row);

        if data.len() + 1 > MAX_ROWS || width > MAX_COLUMNS {
            return Err(ExcelError::GridTooLarge {
                rows: data.len() + 1,
                columns: width,
            });
        }

        let mut cells = Vec::with_capacity(data.len() * width);
        for (row_index, row) in data.iter().enumerate() {
            let output_row = row_index as u32 + FIRST_DATA_ROW;
            // Cover the wider of the declared schema and this row
            for col_index in 0..row.len().max(configured) {
                let cell = materialize(
                    self.schema.resolve(col_index),
                    row.get(col_index),
                    output_row,
                );
                let placed = PlacedCell {
                    row: output_row,
                    column: col_index as u16 + 1,
                    cell,
                };
                if let Some(length) = placed.cell.truncated_from {
                    warn!(
                        cell = %placed.address(),
                        length,
                        "text longer than a cell can hold, truncated"
                    );
                }
                if let Some(conflict) = &placed.cell.conflict {
                    warn!(
                        cell = %placed.address(),
                        formula = %conflict.formula,
                        discarded = %conflict.discarded,
                        "formula and data both supplied, keeping the formula"
                    );
                }
                cells.push(placed);
            }
        }

        let last_row = data.len() as u32 + 1;
        let auto_filter = (configured > 0).then(|| CellRange {
            first_row: 1,
            first_column: 1,
            last_row,
            last_column: configured as u16,
        });

        debug!(
            sheet = %self.schema.sheet_name,
            rows = data.len(),
            columns = width,
            cells = cells.len(),
            "grid assembled"
        );

        Ok(MaterializedGrid {
            sheet_name: self.schema.sheet_name.clone(),
            headers: self.schema.columns.iter().map(|c| c.header.clone()).collect(),
            cells,
            last_row,
            last_column: width as u16,
            auto_filter,
            freeze_columns: self.schema.freeze_columns,
        })
    }
}
