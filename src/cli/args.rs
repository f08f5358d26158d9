//! CLI argument definitions using clap
//!
//! Commands:
//! - duostore fetch --tenant <name> --collection <path>
//! - duostore get --tenant <name> --collection <path> --id <id>
//! - duostore explain --tenant <name> --collection <path>
//!
//! `fetch` and `explain` read an optional JSON query request from stdin.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::tenant::PROJECT_ONE;

/// duostore - query and document access over tenant document stores
#[derive(Parser, Debug)]
#[command(name = "duostore")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (default: projectOne and projectTwo, unseeded)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a query once and print the matching documents
    Fetch {
        /// Tenant to query
        #[arg(long, default_value = PROJECT_ONE)]
        tenant: String,

        /// Collection path
        #[arg(long)]
        collection: String,
    },

    /// Print one document
    Get {
        /// Tenant to read from
        #[arg(long, default_value = PROJECT_ONE)]
        tenant: String,

        /// Collection path
        #[arg(long)]
        collection: String,

        /// Document id
        #[arg(long)]
        id: String,
    },

    /// Describe how a query would run without executing it
    Explain {
        /// Tenant whose rules apply
        #[arg(long, default_value = PROJECT_ONE)]
        tenant: String,

        /// Collection path
        #[arg(long)]
        collection: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
