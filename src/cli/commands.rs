use crate::api::{run_api_server, ApiConfig};
use crate::core::{CellContent, MaterializedCell};
use crate::error::ExcelResult;
use crate::excel::{build_grid, ExcelExporter, MaterializedGrid};
use crate::types::ExcelPayload;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

/// Read a payload file; `.yaml`/`.yml` are parsed as YAML, everything else as JSON
pub fn load_payload(path: &Path) -> ExcelResult<ExcelPayload> {
    let content = fs::read_to_string(path)?;
    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
        .unwrap_or(false);

    if is_yaml {
        Ok(serde_yaml::from_str(&content)?)
    } else {
        Ok(serde_json::from_str(&content)?)
    }
}

/// Where `render` writes when no `-o` is given: the download name, next to the payload
pub fn default_output_path(input: &Path, payload: &ExcelPayload) -> PathBuf {
    let name = payload.config.download_name();
    match input.parent() {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

/// Execute the render command
pub fn render(input: PathBuf, output: Option<PathBuf>, verbose: bool) -> ExcelResult<()> {
    println!("{}", "📊 Excel Creator - Render".bold().green());
    println!("   Input:  {}", input.display());

    if verbose {
        println!("{}", "📖 Reading payload...".cyan());
    }
    let payload = load_payload(&input)?;
    let output = output.unwrap_or_else(|| default_output_path(&input, &payload));
    println!("   Output: {}\n", output.display());

    if verbose {
        println!("   {}", payload);
        println!("{}", "🧮 Materializing cells...".cyan());
    }

    let grid = match build_grid(&payload) {
        Ok(grid) => grid,
        Err(e) => {
            println!("{}", format!("❌ Configuration rejected: {}", e).bold().red());
            return Err(e);
        }
    };

    if verbose {
        println!(
            "   {} data rows, {} columns, {} conflicts\n",
            grid.data_row_count(),
            grid.last_column,
            grid.conflict_count()
        );
        println!("{}", "💾 Writing workbook...".cyan());
    }

    let conflicts = grid.conflict_count();
    ExcelExporter::new(grid).export(&output)?;

    println!("{}", "✅ Render Complete!".bold().green());
    println!("   Excel file: {}", output.display());
    if conflicts > 0 {
        println!(
            "{}",
            format!(
                "⚠️  {} cell(s) had both a formula and data; the formula was kept",
                conflicts
            )
            .yellow()
        );
    }
    println!();
    Ok(())
}

/// Execute the inspect command
pub fn inspect(input: PathBuf) -> ExcelResult<()> {
    println!("{}", "🔍 Excel Creator - Inspect".bold().green());
    println!("   File: {}\n", input.display());

    let payload = load_payload(&input)?;
    let grid = build_grid(&payload)?;

    print_summary(&grid);
    for placed in &grid.cells {
        println!("   {}", describe_cell(&placed.address(), &placed.cell));
    }
    println!();
    Ok(())
}

/// Execute the serve command
pub fn serve(host: String, port: u16, max_body_bytes: usize) -> anyhow::Result<()> {
    let config = ApiConfig {
        host,
        port,
        max_body_bytes,
    };
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run_api_server(config))
}

fn print_summary(grid: &MaterializedGrid) {
    println!("   Sheet:   {}", grid.sheet_name.bright_blue().bold());
    println!("   Headers: {}", grid.headers.join(", "));
    println!(
        "   Extent:  {} rows x {} columns",
        grid.last_row, grid.last_column
    );
    match grid.auto_filter {
        Some(range) => println!("   Filter:  {}", range.a1()),
        None => println!("   Filter:  none"),
    }
    match grid.freeze_columns {
        Some(n) => println!("   Frozen:  {} column(s)", n),
        None => println!("   Frozen:  none"),
    }
    println!();
}

/// One line per cell: address, content kind and value, format, conflict
fn describe_cell(address: &str, cell: &MaterializedCell) -> String {
    let content = match &cell.content {
        CellContent::Formula(text) => format!("formula  ={}", text),
        CellContent::Value(value) if cell.content.is_empty() => {
            format!("{:<8} (empty)", value.kind())
        }
        CellContent::Value(value) => format!("{:<8} {}", value.kind(), value),
    };

    let mut line = format!("{:<8} {}", address, content);
    if let Some(format) = cell.display_format {
        line.push_str(&format!("  [{}]", format));
    }
    if let Some(note) = cell.note_text() {
        line.push_str(&format!("  {}", note.red()));
    }
    line
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
