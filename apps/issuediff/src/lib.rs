//! issuediff core library.
//!
//! This crate normalizes static-analysis logs (compiler warnings, a lint
//! tool, a JSON-emitting analyzer) into one `Issue` model and diffs the
//! issue sets of consecutive revisions.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Discovery and effective configuration resolution.
//! - `classify`: Tool taxonomies mapped onto the shared categories.
//! - `parser`: The `Parser` contract, issue store and per-tool parsers.
//! - `models`: `Issue`, analyzer JSON schema, report structs.
//! - `revisions`: Revision range expansion through git.
//! - `report`: Per-tool reports over a revision list.
//! - `output`: Human/JSON printers.
//! - `error`: Error taxonomy.
pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod output;
pub mod parser;
pub mod report;
pub mod revisions;

pub use error::{Error, Result};
pub use models::{Category, Issue};
pub use parser::{AnyParser, Diff, Parser, ParserConfig, Severity, Tool, TreeStrategy};
