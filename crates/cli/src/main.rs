//! Cottonlove CLI - Inventory inspection and correction tools.
//!
//! # Usage
//!
//! ```bash
//! # Show the current level for a variant
//! clv-cli inventory level --variant 45678901234
//!
//! # Apply a manual adjustment (e.g., after a cycle count)
//! clv-cli inventory adjust --variant 45678901234 --delta -2 --reason "cycle count"
//! ```
//!
//! # Commands
//!
//! - `inventory level` - Resolve and print a variant's current stock level
//! - `inventory adjust` - Apply one signed adjustment through the sync engine

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "clv-cli")]
#[command(author, version, about = "Cottonlove CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect and correct inventory levels
    Inventory {
        #[command(subcommand)]
        action: InventoryAction,
    },
}

#[derive(Subcommand)]
enum InventoryAction {
    /// Show the current stock level for a variant
    Level {
        /// Variant ID
        #[arg(short, long)]
        variant: i64,
    },
    /// Apply a signed adjustment to a variant's stock level
    Adjust {
        /// Variant ID
        #[arg(short, long)]
        variant: i64,

        /// Signed delta to apply (negative removes stock)
        #[arg(short, long, allow_hyphen_values = true)]
        delta: i64,

        /// Reason recorded in the logs
        #[arg(short, long, default_value = "manual adjustment")]
        reason: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Inventory { action } => match action {
            InventoryAction::Level { variant } => {
                commands::inventory::level(variant).await?;
            }
            InventoryAction::Adjust {
                variant,
                delta,
                reason,
            } => {
                commands::inventory::adjust(variant, delta, &reason).await?;
            }
        },
    }
    Ok(())
}
