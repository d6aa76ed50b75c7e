//! # Basket - Order Store CLI
//!
//! The main binary for the basket order store.
//!
//! This application provides:
//! - NDJSON order-file ingestion
//! - Generic range queries over stored tables
//! - Top-N purchase aggregation
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────┐
//! │              apps/basket (THE BINARY)          │
//! │                                                │
//! │  ┌─────────────┐         ┌─────────────────┐  │
//! │  │   CLI       │         │  NDJSON Parser  │  │
//! │  │  (clap)     │         │  (serde_json)   │  │
//! │  └──────┬──────┘         └────────┬────────┘  │
//! │         │                         │           │
//! │         └────────────┬────────────┘           │
//! │                      ▼                        │
//! │              ┌───────────────┐                │
//! │              │  basket-core  │                │
//! │              │  (THE LOGIC)  │                │
//! │              └───────────────┘                │
//! └────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! basket load -f orders.ndjson
//! basket range -t orders -c created -l 100 -u 500
//! basket top-users -n 3
//! basket status
//! ```

use basket::cli;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    // Initialize tracing — BASKET_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("BASKET_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "basket=info".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Display startup banner
    if !cli.quiet {
        print_banner();
    }

    // Execute command
    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the basket startup banner.
fn print_banner() {
    println!(
        r"
  ██████╗  █████╗ ███████╗██╗  ██╗███████╗████████╗
  ██╔══██╗██╔══██╗██╔════╝██║ ██╔╝██╔════╝╚══██╔══╝
  ██████╔╝███████║███████╗█████╔╝ █████╗     ██║
  ██╔══██╗██╔══██║╚════██║██╔═██╗ ██╔══╝     ██║
  ██████╔╝██║  ██║███████║██║  ██╗███████╗   ██║
  ╚═════╝ ╚═╝  ╚═╝╚══════╝╚═╝  ╚═╝╚══════╝   ╚═╝

  Order Store v{}
",
        env!("CARGO_PKG_VERSION")
    );
}
