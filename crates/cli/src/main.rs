//! StockLink CLI - Operational tools for the inventory stack.
//!
//! # Usage
//!
//! ```bash
//! # Download and normalize lot images for an auction export
//! sl-cli images download --view "Lot Export View"
//!
//! # Hash a password for a new Users record
//! sl-cli auth hash-password --password 'correct horse'
//!
//! # Trigger syncs against a running sync service
//! sl-cli sync full --direction bidirectional
//! sl-cli sync manual --source airtable --ids recAAA,recBBB
//! ```
//!
//! # Commands
//!
//! - `images download` - Export listing images, resized and padded for upload
//! - `auth hash-password` - Produce an Argon2id hash for the Users table
//! - `sync full` / `sync manual` - Drive the sync service's trigger endpoints

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use stocklink_core::Channel;

mod commands;

#[derive(Parser)]
#[command(name = "sl-cli")]
#[command(author, version, about = "StockLink CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Listing image tooling
    Images {
        #[command(subcommand)]
        action: ImagesAction,
    },
    /// Credential tooling
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
    /// Drive a running sync service
    Sync {
        #[command(subcommand)]
        action: SyncAction,
    },
}

#[derive(Subcommand)]
enum ImagesAction {
    /// Download and normalize images from an Airtable view
    Download {
        /// Channel whose item table to export from
        #[arg(long, default_value = "auction")]
        channel: Channel,
        /// Airtable view restricting which records are exported
        #[arg(long, default_value = "Lot Export View")]
        view: String,
        /// Output directory root
        #[arg(long, default_value = "downloaded_images")]
        out: String,
    },
}

#[derive(Subcommand)]
enum AuthAction {
    /// Hash a password for storing in the Users table
    HashPassword {
        /// The plaintext password to hash
        #[arg(long)]
        password: String,
    },
}

#[derive(Subcommand)]
enum SyncAction {
    /// Queue a full sync in the given direction
    Full {
        /// airtable_to_woo, woo_to_airtable, or bidirectional
        #[arg(long, default_value = "bidirectional")]
        direction: String,
        /// Base URL of the sync service
        #[arg(long, default_value = "http://127.0.0.1:5000")]
        url: String,
    },
    /// Queue specific records or products
    Manual {
        /// airtable or woocommerce
        #[arg(long)]
        source: String,
        /// Comma-separated record or product IDs
        #[arg(long)]
        ids: String,
        /// Base URL of the sync service
        #[arg(long, default_value = "http://127.0.0.1:5000")]
        url: String,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stocklink_cli=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Images {
            action: ImagesAction::Download { channel, view, out },
        } => commands::images::download(channel, &view, &out)
            .await
            .map_err(|e| e.to_string()),
        Commands::Auth {
            action: AuthAction::HashPassword { password },
        } => commands::auth::hash_password(&password).map_err(|e| e.to_string()),
        Commands::Sync { action } => match action {
            SyncAction::Full { direction, url } => commands::sync::full(&url, &direction)
                .await
                .map_err(|e| e.to_string()),
            SyncAction::Manual { source, ids, url } => {
                commands::sync::manual(&url, &source, &ids)
                    .await
                    .map_err(|e| e.to_string())
            }
        },
    };

    if let Err(err) = result {
        tracing::error!("{err}");
        std::process::exit(1);
    }
}
