//! Inventory inspection and correction commands.
//!
//! # Usage
//!
//! ```bash
//! # Show the current level for a variant
//! clv-cli inventory level --variant 45678901234
//!
//! # Remove two units after a cycle count
//! clv-cli inventory adjust --variant 45678901234 --delta -2 --reason "cycle count"
//! ```
//!
//! # Environment Variables
//!
//! Uses the same configuration as the sync service (`SHOPIFY_STORE`,
//! `SHOPIFY_ADMIN_TOKEN`, `SHOPIFY_WEBHOOK_SECRET`).

use thiserror::Error;

use cottonlove_core::VariantId;
use cottonlove_sync::config::{ConfigError, SyncConfig};
use cottonlove_sync::inventory::{InventoryStore, StockAdjuster, StoreError};
use cottonlove_sync::shopify::{AdminClient, ShopifyError};

/// Errors that can occur during inventory commands.
#[derive(Debug, Error)]
pub enum InventoryCommandError {
    /// Configuration failed to load.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Shopify client construction failed.
    #[error("Shopify client error: {0}")]
    Client(#[from] ShopifyError),

    /// Inventory store operation failed.
    #[error("Inventory store error: {0}")]
    Store(#[from] StoreError),
}

/// Build the Admin API client from the environment.
fn client() -> Result<AdminClient, InventoryCommandError> {
    let config = SyncConfig::from_env()?;
    Ok(AdminClient::new(&config.shopify)?)
}

/// Resolve and print the current stock level for a variant.
///
/// # Errors
///
/// Returns an error if configuration is incomplete or any upstream call
/// fails (including `NoLocation` when nothing stocks the item).
pub async fn level(variant: i64) -> Result<(), InventoryCommandError> {
    let client = client()?;
    let variant_id = VariantId::new(variant);

    let inventory_item_id = client.resolve_inventory_item(variant_id).await?;
    let level = client.read_level(inventory_item_id).await?;

    tracing::info!(
        variant_id = %variant_id,
        inventory_item_id = %inventory_item_id,
        location_id = %level.location_id,
        available = level.available,
        "Current stock level"
    );
    Ok(())
}

/// Apply one signed adjustment through the same engine the sync service
/// uses (per-variant lock, zero floor).
///
/// # Errors
///
/// Unlike webhook-driven adjustments, manual corrections surface their
/// failures: returns an error if the resolve, read, or write step fails.
pub async fn adjust(variant: i64, delta: i64, reason: &str) -> Result<(), InventoryCommandError> {
    let client = client()?;
    let variant_id = VariantId::new(variant);

    let adjuster = StockAdjuster::new(client);
    let adjusted = adjuster.try_adjust(variant_id, delta).await?;

    tracing::info!(
        variant_id = %variant_id,
        delta,
        reason,
        previous = adjusted.previous,
        available = adjusted.available,
        "Adjustment applied"
    );
    Ok(())
}
