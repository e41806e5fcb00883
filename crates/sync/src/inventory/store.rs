//! Inventory store abstraction.
//!
//! The external platform offers three primitives per variant: resolve its
//! inventory item, read the current level at a location, and overwrite the
//! level at a location. There is no atomic increment and no compare-and-swap,
//! which is why the adjustment engine layers its own serialization on top
//! (see [`adjuster`](super::adjuster)).

use async_trait::async_trait;
use thiserror::Error;

use cottonlove_core::{InventoryItemId, LocationId, OrderId, VariantId};

use crate::shopify::types::Order;

/// Errors surfaced by inventory store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Referenced resource does not exist upstream.
    #[error("{0} not found upstream")]
    NotFound(String),

    /// No inventory location stocks the item; nothing to adjust.
    #[error("no inventory location stocks item {0}")]
    NoLocation(InventoryItemId),

    /// Upstream returned a non-2xx response.
    #[error("upstream error {status}: {body}")]
    Upstream { status: u16, body: String },

    /// Transport-level failure.
    #[error("network error: {0}")]
    Network(String),
}

impl StoreError {
    /// Whether this error means "nothing to adjust" rather than a failure.
    ///
    /// `NotFound` and `NoLocation` describe catalog state (an unstocked or
    /// deleted component), not an operational problem; callers log these at
    /// warn level and move on.
    #[must_use]
    pub const fn is_skippable(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::NoLocation(_))
    }
}

/// Resolved inventory record for an inventory item.
///
/// Never cached locally: the external store is the sole source of truth,
/// so the level is re-read before every adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockLevel {
    /// Location holding the stock.
    pub location_id: LocationId,
    /// Unreserved, sellable quantity at that location.
    pub available: i64,
}

/// The three inventory capabilities the synchronizer needs, plus the
/// order fetch used for refund reconciliation.
///
/// Implemented by [`AdminClient`](crate::shopify::AdminClient) against the
/// Shopify REST API, and by in-memory fakes in tests.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Resolve the inventory item tracking stock for a variant.
    ///
    /// # Errors
    ///
    /// `NotFound` if the variant does not exist upstream.
    async fn resolve_inventory_item(
        &self,
        variant_id: VariantId,
    ) -> Result<InventoryItemId, StoreError>;

    /// Read the current level for an inventory item.
    ///
    /// When multiple locations stock the item, the first location entry
    /// returned by the store wins.
    ///
    /// # Errors
    ///
    /// `NoLocation` if zero location entries are returned.
    async fn read_level(
        &self,
        inventory_item_id: InventoryItemId,
    ) -> Result<StockLevel, StoreError>;

    /// Overwrite the available quantity at a location.
    ///
    /// # Errors
    ///
    /// `Upstream` on any non-2xx response.
    async fn write_level(
        &self,
        inventory_item_id: InventoryItemId,
        location_id: LocationId,
        available: i64,
    ) -> Result<(), StoreError>;

    /// Fetch an order by ID (refund reconciliation only).
    ///
    /// # Errors
    ///
    /// `NotFound` if the order does not exist upstream.
    async fn fetch_order(&self, order_id: OrderId) -> Result<Order, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skippable_errors() {
        assert!(StoreError::NotFound("Variant 1".to_string()).is_skippable());
        assert!(StoreError::NoLocation(InventoryItemId::new(2)).is_skippable());
        assert!(
            !StoreError::Upstream {
                status: 500,
                body: String::new()
            }
            .is_skippable()
        );
        assert!(!StoreError::Network("timeout".to_string()).is_skippable());
    }

    #[test]
    fn test_no_location_display() {
        let err = StoreError::NoLocation(InventoryItemId::new(808));
        assert_eq!(err.to_string(), "no inventory location stocks item 808");
    }
}
