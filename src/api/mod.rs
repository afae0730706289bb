//! Excel Creator API Server module
//!
//! Provides the HTTP REST API for workbook generation.
//! Run with `excel-creator serve` or `excel-creator-server`.

pub mod handlers;
pub mod server;

pub use server::{build_router, run_api_server, ApiConfig, AppState};
