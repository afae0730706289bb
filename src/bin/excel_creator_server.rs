//! Excel Creator API Server binary
//!
//! HTTP REST API that turns posted payloads into .xlsx downloads.

use clap::Parser;
use excel_creator::api::{run_api_server, server::DEFAULT_MAX_BODY_BYTES, ApiConfig};

#[derive(Parser, Debug)]
#[command(name = "excel-creator-server")]
#[command(version)]
#[command(about = "Excel Creator API Server - formatted .xlsx sheets over HTTP")]
#[command(long_about = r#"
Excel Creator API Server

Endpoints:
  - POST /api/excel  - Create an Excel file from {data, config}
  - GET  /health     - Health check
  - GET  /version    - Server version and supported column types
  - GET  /           - API documentation

Features:
  - CORS enabled for cross-origin requests
  - Graceful shutdown on SIGINT/SIGTERM
  - Request IDs on every response
  - Tracing and structured logging (RUST_LOG)

Example usage:
  excel-creator-server                           # Start on localhost:8080
  excel-creator-server --host 0.0.0.0 --port 3000

  curl -X POST http://localhost:8080/api/excel \
    -H "Content-Type: application/json" \
    -d '{"data": [["John", 30]],
         "config": {"sheetName": "People",
                    "columns": [{"header": "Name", "type": "String"},
                                {"header": "Age", "type": "Integer"}]}}' \
    -o people.xlsx
"#)]
struct Args {
    /// Host address to bind to (use 0.0.0.0 for all interfaces)
    #[arg(short = 'H', long, default_value = "127.0.0.1", env = "EXCEL_CREATOR_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "EXCEL_CREATOR_PORT")]
    port: u16,

    /// Maximum request body size in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_BODY_BYTES, env = "EXCEL_CREATOR_MAX_BODY")]
    max_body: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = ApiConfig {
        host: args.host,
        port: args.port,
        max_body_bytes: args.max_body,
    };

    run_api_server(config).await
}
