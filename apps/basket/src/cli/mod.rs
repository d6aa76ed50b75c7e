//! # Basket CLI Module
//!
//! This module implements the CLI interface for basket.
//!
//! ## Available Commands
//!
//! - `load` - Load orders from an NDJSON file
//! - `range` - Query rows of any table by a numeric column range
//! - `orders` - Query orders by creation-time range
//! - `top-users` - Rank users by purchased line items
//! - `status` - Show store row counts

mod commands;

use basket_core::StoreError;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Basket - Order Store
///
/// A small, deterministic order store. Loads order files in one atomic
/// batch and answers range and top-user queries over the result.
#[derive(Parser, Debug)]
#[command(name = "basket")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the order database
    #[arg(short = 'D', long, global = true, default_value = "basket.db")]
    pub database: PathBuf,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load orders from an NDJSON file
    Load {
        /// Path to the input file (one JSON order per line)
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Query rows of a table by an inclusive numeric column range
    Range {
        /// Table to query (users, products, orders, order_lines)
        #[arg(short, long)]
        table: String,

        /// Column to filter on
        #[arg(short, long)]
        column: String,

        /// Inclusive lower bound
        #[arg(short, long)]
        lower: f64,

        /// Inclusive upper bound
        #[arg(short, long)]
        upper: f64,
    },

    /// Query orders created within an inclusive time range
    Orders {
        /// Inclusive start of the creation-time range
        #[arg(short, long)]
        start: i64,

        /// Inclusive end of the creation-time range
        #[arg(short, long)]
        end: i64,
    },

    /// Rank users by total purchased line items
    TopUsers {
        /// Number of users to return
        #[arg(short = 'n', long, default_value = "2")]
        count: usize,
    },

    /// Show store row counts
    Status,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), StoreError> {
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Load { file }) => cmd_load(&cli.database, json_mode, &file),
        Some(Commands::Range {
            table,
            column,
            lower,
            upper,
        }) => cmd_range(&cli.database, json_mode, &table, &column, lower, upper),
        Some(Commands::Orders { start, end }) => {
            cmd_range(&cli.database, json_mode, "orders", "created", start as f64, end as f64)
        }
        Some(Commands::TopUsers { count }) => cmd_top_users(&cli.database, json_mode, count),
        Some(Commands::Status) => cmd_status(&cli.database, json_mode),
        None => {
            // No subcommand - show status by default
            cmd_status(&cli.database, json_mode)
        }
    }
}
