use clap::{Parser, Subcommand};
use excel_creator::api::server::{init_tracing, DEFAULT_MAX_BODY_BYTES};
use excel_creator::cli;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "excel-creator")]
#[command(about = "Formatted Excel sheets from loosely-typed JSON rows")]
#[command(long_about = "Excel Creator - formatted .xlsx sheets from JSON or YAML payloads

A payload carries raw rows plus a column configuration:

  data:
    - [John, 30, 50000.50]
  config:
    sheetName: People
    freezeColumns: 1
    columns:
      - { header: Name,   type: String }
      - { header: Age,    type: Integer }
      - { header: Salary, type: Money }
      - { header: Double, type: Money, formula: \"=C{row}*2\" }

COLUMN TYPES:
  String, Date, Percentage, Integer, Money, Decimal, Boolean
  Values that do not fit their column type are written as text.

COMMANDS:
  render   - Write the workbook for a payload
  inspect  - Print every materialized cell without writing
  serve    - Run the HTTP API (POST /api/excel)

EXAMPLES:
  excel-creator render payload.json
  excel-creator render payload.yaml -o report.xlsx
  excel-creator inspect payload.json
  excel-creator serve --port 3000")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Render a payload file to an Excel workbook.

The payload is parsed as YAML for .yaml/.yml files and as JSON otherwise.
Without --output the workbook is written next to the payload, named after
config.fileName (or <sheetName>.xlsx).

Cells that carry both a formula and data keep the formula; they are
highlighted red with an explanatory note.")]
    /// Render a payload file to .xlsx
    Render {
        /// Path to the JSON or YAML payload
        input: PathBuf,

        /// Output .xlsx path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Show verbose output and debug logs
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print every materialized cell of a payload without writing a file
    Inspect {
        /// Path to the JSON or YAML payload
        input: PathBuf,
    },

    /// Run the HTTP API server
    Serve {
        /// Host address to bind to (use 0.0.0.0 for all interfaces)
        #[arg(short = 'H', long, default_value = "127.0.0.1", env = "EXCEL_CREATOR_HOST")]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value = "8080", env = "EXCEL_CREATOR_PORT")]
        port: u16,

        /// Maximum request body size in bytes
        #[arg(long, default_value_t = DEFAULT_MAX_BODY_BYTES, env = "EXCEL_CREATOR_MAX_BODY")]
        max_body: usize,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            input,
            output,
            verbose,
        } => {
            if verbose {
                init_tracing("excel_creator=debug");
            }
            cli::render(input, output, verbose)?;
        }

        Commands::Inspect { input } => cli::inspect(input)?,

        Commands::Serve {
            host,
            port,
            max_body,
        } => cli::serve(host, port, max_body)?,
    }

    Ok(())
}
