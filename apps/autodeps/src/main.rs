//! # autodeps
//!
//! Command-line front end of the autodeps dependency sorter.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │            apps/autodeps (THE BINARY)        │
//! │                                              │
//! │   ┌─────────────┐      ┌─────────────────┐   │
//! │   │    CLI      │ ───▶ │ model documents │   │
//! │   │   (clap)    │      │  (JSON / TOML)  │   │
//! │   └──────┬──────┘      └─────────────────┘   │
//! │          ▼                                   │
//! │   ┌───────────────┐                          │
//! │   │ autodeps-core │                          │
//! │   │  (THE LOGIC)  │                          │
//! │   └───────────────┘                          │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! autodeps analyze -f model.toml -o annotated.json
//! autodeps order -f model.json --verbose
//! autodeps check -f model.json --json-mode
//! autodeps graph -f model.toml
//! ```

use autodeps::cli;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    // AUTODEPS_LOG_FORMAT=json enables machine-parseable logs.
    let log_format = std::env::var("AUTODEPS_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "autodeps=info".into());

    // Logs go to stderr; stdout carries command output.
    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}
