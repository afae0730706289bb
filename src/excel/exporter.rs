//! Excel exporter implementation

use crate::core::{CellContent, MaterializedCell, TypedValue};
use crate::error::{ExcelError, ExcelResult};
use crate::excel::assembler::{MaterializedGrid, PlacedCell};
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Color, Format, Formula, Note, Workbook, Worksheet};
use std::path::Path;
use tracing::debug;

/// MIME type of an .xlsx download
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Light grey header fill
const HEADER_FILL: Color = Color::RGB(0xD3D3D3);
const CONFLICT_FILL: Color = Color::Red;
const NOTE_AUTHOR: &str = "Excel Creator";

/// Writes a materialized grid as a single-sheet workbook
pub struct ExcelExporter {
    grid: MaterializedGrid,
}

impl ExcelExporter {
    pub fn new(grid: MaterializedGrid) -> Self {
        Self { grid }
    }

    pub fn grid(&self) -> &MaterializedGrid {
        &self.grid
    }

    /// Build the in-memory workbook
    pub fn build_workbook(&self) -> ExcelResult<Workbook> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(&self.grid.sheet_name)
            .map_err(|e| ExcelError::Export(format!("Failed to set worksheet name: {}", e)))?;

        self.write_headers(worksheet)?;
        for placed in &self.grid.cells {
            Self::write_cell(worksheet, placed)?;
        }
        self.finish_sheet(worksheet)?;

        debug!(
            sheet = %self.grid.sheet_name,
            cells = self.grid.cells.len(),
            conflicts = self.grid.conflict_count(),
            "worksheet written"
        );
        Ok(workbook)
    }

    /// Serialize the workbook to xlsx bytes
    pub fn to_bytes(&self) -> ExcelResult<Vec<u8>> {
        let mut workbook = self.build_workbook()?;
        workbook
            .save_to_buffer()
            .map_err(|e| ExcelError::Export(format!("Failed to serialize workbook: {}", e)))
    }

    /// Save the workbook to an .xlsx file
    pub fn export(&self, output_path: &Path) -> ExcelResult<()> {
        let mut workbook = self.build_workbook()?;
        workbook
            .save(output_path)
            .map_err(|e| ExcelError::Export(format!("Failed to save Excel file: {}", e)))?;
        Ok(())
    }

    fn write_headers(&self, worksheet: &mut Worksheet) -> ExcelResult<()> {
        let header_format = Format::new().set_bold().set_background_color(HEADER_FILL);
        for (col_idx, header) in self.grid.headers.iter().enumerate() {
            worksheet
                .write_string_with_format(0, col_idx as u16, header, &header_format)
                .map_err(|e| ExcelError::Export(format!("Failed to write header: {}", e)))?;
        }
        Ok(())
    }

    /// Write one cell; positions in the grid are 1-based, the worksheet API is 0-based
    fn write_cell(worksheet: &mut Worksheet, placed: &PlacedCell) -> ExcelResult<()> {
        let row = placed.row - 1;
        let col = placed.column - 1;
        let cell = &placed.cell;
        let format = Self::cell_format(cell);

        match &cell.content {
            CellContent::Formula(text) => {
                worksheet
                    .write_formula_with_format(row, col, Formula::new(text), &format)
                    .map_err(|e| ExcelError::Export(format!("Failed to write formula: {}", e)))?;
            }
            CellContent::Value(TypedValue::String(text)) if text.is_empty() => {
                // Excel has no empty strings; keep only the formatting, if any
                if cell.display_format.is_some() {
                    worksheet
                        .write_blank(row, col, &format)
                        .map_err(|e| ExcelError::Export(format!("Failed to write blank: {}", e)))?;
                }
            }
            CellContent::Value(TypedValue::String(text)) => {
                worksheet
                    .write_string_with_format(row, col, text, &format)
                    .map_err(|e| ExcelError::Export(format!("Failed to write text: {}", e)))?;
            }
            CellContent::Value(TypedValue::Integer(value)) => {
                worksheet
                    .write_number_with_format(row, col, *value as f64, &format)
                    .map_err(|e| ExcelError::Export(format!("Failed to write number: {}", e)))?;
            }
            CellContent::Value(TypedValue::Decimal(value)) => {
                let number = value.to_f64().ok_or_else(|| {
                    ExcelError::Export(format!("Decimal {} does not fit a cell", value))
                })?;
                worksheet
                    .write_number_with_format(row, col, number, &format)
                    .map_err(|e| ExcelError::Export(format!("Failed to write number: {}", e)))?;
            }
            CellContent::Value(TypedValue::Boolean(value)) => {
                worksheet
                    .write_boolean_with_format(row, col, *value, &format)
                    .map_err(|e| ExcelError::Export(format!("Failed to write boolean: {}", e)))?;
            }
            CellContent::Value(TypedValue::DateTime(value)) => {
                worksheet
                    .write_datetime_with_format(row, col, value, &format)
                    .map_err(|e| ExcelError::Export(format!("Failed to write date: {}", e)))?;
            }
        }

        if let Some(text) = cell.note_text() {
            let note = Note::new(text).set_author(NOTE_AUTHOR);
            worksheet
                .insert_note(row, col, &note)
                .map_err(|e| ExcelError::Export(format!("Failed to add note: {}", e)))?;
        }

        Ok(())
    }

    fn cell_format(cell: &MaterializedCell) -> Format {
        let mut format = Format::new();
        if let Some(num_format) = cell.display_format {
            format = format.set_num_format(num_format);
        }
        if cell.has_conflict_warning() {
            format = format.set_background_color(CONFLICT_FILL);
        }
        format
    }

    /// Auto-filter, frozen columns and column autosize
    fn finish_sheet(&self, worksheet: &mut Worksheet) -> ExcelResult<()> {
        if let Some(range) = self.grid.auto_filter {
            worksheet
                .autofilter(
                    range.first_row - 1,
                    range.first_column - 1,
                    range.last_row - 1,
                    range.last_column - 1,
                )
                .map_err(|e| ExcelError::Export(format!("Failed to set auto-filter: {}", e)))?;
        }

        if let Some(columns) = self.grid.freeze_columns {
            worksheet
                .set_freeze_panes(0, columns)
                .map_err(|e| ExcelError::Export(format!("Failed to freeze columns: {}", e)))?;
        }

        worksheet.autofit();
        Ok(())
    }
}
