//! CLI module for duostore
//!
//! Provides command-line interface for:
//! - fetch: one-shot query execution
//! - get: single-document read
//! - explain: descriptor explanation without execution

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{explain, fetch, get, run, run_command};
pub use errors::{CliError, CliResult};
pub use io::{read_request, write_response, write_text, OrderRequest, QueryRequest, RangeRequest};
