//! Integration tests for Cottonlove bundle sync.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p cottonlove-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `reconciler_lifecycle` - Order lifecycle events against a recording store
//! - `webhook_ingress` - Signature verification and acknowledgment behavior
//!
//! This crate's library provides the shared [`RecordingStore`] (an
//! in-memory `InventoryStore` that records every applied delta) and payload
//! builders for orders and refunds.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use cottonlove_core::{InventoryItemId, LineItemId, LocationId, OrderId, VariantId};
use cottonlove_sync::inventory::{InventoryStore, StockLevel, StoreError};
use cottonlove_sync::shopify::types::{
    LineItem, Order, Property, Refund, RefundLineItem, RestockType,
};

// =============================================================================
// Recording Store
// =============================================================================

/// One recorded write, expressed as the signed delta it applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedDelta {
    /// Variant whose stock changed.
    pub variant_id: VariantId,
    /// Signed change in available quantity (after the zero floor).
    pub delta: i64,
}

#[derive(Default)]
struct RecordingInner {
    variants: HashMap<VariantId, InventoryItemId>,
    items: HashMap<InventoryItemId, VariantId>,
    levels: HashMap<InventoryItemId, Vec<(LocationId, i64)>>,
    orders: HashMap<OrderId, Order>,
    deltas: Vec<AppliedDelta>,
    writes: u64,
}

/// In-memory inventory store that records every applied adjustment.
///
/// Clones share state, so a test can hand one clone to the reconciler and
/// keep another for assertions.
#[derive(Clone, Default)]
pub struct RecordingStore {
    inner: Arc<Mutex<RecordingInner>>,
}

impl RecordingStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RecordingInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a stocked variant.
    #[must_use]
    pub fn with_variant(self, variant: i64, item: i64, location: i64, available: i64) -> Self {
        {
            let mut inner = self.lock();
            inner
                .variants
                .insert(VariantId::new(variant), InventoryItemId::new(item));
            inner
                .items
                .insert(InventoryItemId::new(item), VariantId::new(variant));
            inner.levels.insert(
                InventoryItemId::new(item),
                vec![(LocationId::new(location), available)],
            );
        }
        self
    }

    /// Register a variant whose inventory item is stocked at no location.
    #[must_use]
    pub fn with_unstocked_variant(self, variant: i64, item: i64) -> Self {
        {
            let mut inner = self.lock();
            inner
                .variants
                .insert(VariantId::new(variant), InventoryItemId::new(item));
            inner
                .items
                .insert(InventoryItemId::new(item), VariantId::new(variant));
            inner.levels.insert(InventoryItemId::new(item), Vec::new());
        }
        self
    }

    /// Register an order for `fetch_order`.
    #[must_use]
    pub fn with_order(self, order: Order) -> Self {
        self.lock().orders.insert(order.id, order);
        self
    }

    /// Current available quantity for a variant (0 if unknown/unstocked).
    #[must_use]
    pub fn available(&self, variant: i64) -> i64 {
        let inner = self.lock();
        inner
            .variants
            .get(&VariantId::new(variant))
            .and_then(|item| inner.levels.get(item))
            .and_then(|levels| levels.first())
            .map(|(_, available)| *available)
            .unwrap_or_default()
    }

    /// All recorded adjustments, in application order.
    #[must_use]
    pub fn deltas(&self) -> Vec<AppliedDelta> {
        self.lock().deltas.clone()
    }

    /// Number of write calls issued against the store.
    #[must_use]
    pub fn write_count(&self) -> u64 {
        self.lock().writes
    }
}

#[async_trait]
impl InventoryStore for RecordingStore {
    async fn resolve_inventory_item(
        &self,
        variant_id: VariantId,
    ) -> Result<InventoryItemId, StoreError> {
        self.lock()
            .variants
            .get(&variant_id)
            .copied()
            .ok_or_else(|| StoreError::NotFound(format!("Variant {variant_id}")))
    }

    async fn read_level(
        &self,
        inventory_item_id: InventoryItemId,
    ) -> Result<StockLevel, StoreError> {
        let inner = self.lock();
        let levels = inner
            .levels
            .get(&inventory_item_id)
            .ok_or_else(|| StoreError::NotFound(format!("Item {inventory_item_id}")))?;
        let (location_id, available) = levels
            .first()
            .copied()
            .ok_or(StoreError::NoLocation(inventory_item_id))?;
        Ok(StockLevel {
            location_id,
            available,
        })
    }

    async fn write_level(
        &self,
        inventory_item_id: InventoryItemId,
        location_id: LocationId,
        available: i64,
    ) -> Result<(), StoreError> {
        let mut inner = self.lock();
        inner.writes += 1;

        let previous = inner
            .levels
            .get(&inventory_item_id)
            .and_then(|levels| levels.first())
            .map(|(_, available)| *available)
            .unwrap_or_default();

        if let Some(variant_id) = inner.items.get(&inventory_item_id).copied() {
            inner.deltas.push(AppliedDelta {
                variant_id,
                delta: available - previous,
            });
        }

        inner
            .levels
            .insert(inventory_item_id, vec![(location_id, available)]);
        Ok(())
    }

    async fn fetch_order(&self, order_id: OrderId) -> Result<Order, StoreError> {
        self.lock()
            .orders
            .get(&order_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("Order {order_id}")))
    }
}

// =============================================================================
// Payload Builders
// =============================================================================

/// Build an order payload.
#[must_use]
pub fn order(id: i64, name: &str, line_items: Vec<LineItem>) -> Order {
    Order {
        id: OrderId::new(id),
        name: name.to_string(),
        financial_status: None,
        fulfillment_status: None,
        line_items,
        note_attributes: Vec::new(),
        created_at: None,
    }
}

/// Build a plain (non-bundle) line item.
#[must_use]
pub fn plain_line_item(id: i64, quantity: i64) -> LineItem {
    LineItem {
        id: LineItemId::new(id),
        title: "Gift Card".to_string(),
        quantity,
        properties: Vec::new(),
    }
}

/// Build a bundle line item whose `_clv_components` property holds the
/// given JSON-encoded payload.
#[must_use]
pub fn bundle_line_item(id: i64, quantity: i64, components_json: &str) -> LineItem {
    LineItem {
        id: LineItemId::new(id),
        title: "String Lights 20".to_string(),
        quantity,
        properties: vec![Property {
            name: "_clv_components".to_string(),
            value: serde_json::Value::String(components_json.to_string()),
        }],
    }
}

/// Build a refund payload.
#[must_use]
pub fn refund(id: i64, order_id: i64, lines: Vec<RefundLineItem>) -> Refund {
    Refund {
        id,
        order_id: OrderId::new(order_id),
        refund_line_items: lines,
        created_at: None,
    }
}

/// Build a refund line item.
#[must_use]
pub fn refund_line(line_item_id: i64, quantity: i64, restock_type: RestockType) -> RefundLineItem {
    RefundLineItem {
        line_item_id: LineItemId::new(line_item_id),
        quantity,
        restock_type,
    }
}
