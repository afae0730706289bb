//! CLI command handlers

pub mod commands;

pub use commands::{inspect, load_payload, render, serve};
