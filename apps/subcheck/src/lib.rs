//! Subcheck core library.
//!
//! This crate exposes programmatic APIs for validating student web project
//! submissions: ZIP extraction, HTML/CSS/JS linting with per-type scoring,
//! aggregation into a submission summary, and report rendering.
//!
//! High-level modules:
//! - `archive`: In-memory ZIP extraction with allow-lists and upload limits.
//! - `checks`: The per-file-type validators and their rule engines.
//! - `lint`: The orchestrator dispatching files to validators.
//! - `submission`: Archive-to-record pipeline and saved records.
//! - `models`: Issues, results, summaries and rule sets.
//! - `output`: Markdown report plus human/JSON printers.
//! - `config`: Discovery and effective configuration resolution.
//! - `cli`: CLI argument parsing (binary uses this).
//! - `error`: Error taxonomy.
//! - `utils`: Source positions and CLI prefixes.
pub mod archive;
pub mod checks;
pub mod cli;
pub mod config;
pub mod error;
pub mod lint;
pub mod models;
pub mod output;
pub mod submission;
pub mod utils;
