//! Stock adjustment engine.
//!
//! Applies a signed delta to a variant's available quantity through a
//! read-modify-write cycle: resolve the inventory item, read the current
//! level, clamp the new value at zero, overwrite. The external store has
//! no atomic increment, so the cycle runs under a per-variant async mutex
//! to serialize concurrent adjustments to the same variant within this
//! process. Adjustments from other processes can still interleave.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use tokio::sync::Mutex as AsyncMutex;
use tracing::{error, info, instrument, warn};

use cottonlove_core::VariantId;

use super::store::{InventoryStore, StoreError};

/// Per-variant async locks.
///
/// Lock entries are created on first use and never evicted; the variant
/// set is bounded by the catalog size.
#[derive(Clone, Default)]
struct VariantLocks {
    inner: Arc<StdMutex<HashMap<VariantId, Arc<AsyncMutex<()>>>>>,
}

impl VariantLocks {
    fn for_variant(&self, variant_id: VariantId) -> Arc<AsyncMutex<()>> {
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        map.entry(variant_id).or_default().clone()
    }
}

/// Result of a successfully applied adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Adjusted {
    /// Available quantity observed before the write.
    pub previous: i64,
    /// Available quantity written.
    pub available: i64,
}

/// The read-modify-write adjustment engine.
#[derive(Clone)]
pub struct StockAdjuster<S> {
    store: S,
    locks: VariantLocks,
}

impl<S: InventoryStore> StockAdjuster<S> {
    /// Create a new adjuster over an inventory store.
    pub fn new(store: S) -> Self {
        Self {
            store,
            locks: VariantLocks::default(),
        }
    }

    /// Add stock for a variant (best-effort).
    pub async fn add_stock(&self, variant_id: VariantId, quantity: i64, reason: &str) {
        self.adjust(variant_id, quantity, reason).await;
    }

    /// Remove stock for a variant (best-effort).
    pub async fn remove_stock(&self, variant_id: VariantId, quantity: i64, reason: &str) {
        self.adjust(variant_id, -quantity, reason).await;
    }

    /// Apply a signed delta to a variant's available quantity, best-effort.
    ///
    /// Failures are logged and swallowed: an adjustment failure for one
    /// component must not block adjustments for its siblings.
    #[instrument(skip(self), fields(variant_id = %variant_id, delta, reason))]
    pub async fn adjust(&self, variant_id: VariantId, delta: i64, reason: &str) {
        match self.try_adjust(variant_id, delta).await {
            Ok(adjusted) => {
                info!(
                    previous = adjusted.previous,
                    available = adjusted.available,
                    "Inventory adjusted"
                );
            }
            Err(e) if e.is_skippable() => {
                warn!(error = %e, "Skipping inventory adjustment");
            }
            Err(e) => {
                error!(error = %e, "Inventory adjustment failed");
            }
        }
    }

    /// Apply a signed delta and report the outcome.
    ///
    /// The new quantity is clamped at zero: over-restocking (e.g., a
    /// duplicate restock for a level already at zero) silently loses the
    /// excess rather than going negative. Callers must not rely on exact
    /// conservation across repeated deliveries of the same event.
    ///
    /// # Errors
    ///
    /// Returns any `StoreError` from the resolve, read, or write step.
    /// No write is issued when resolution or the level read fails.
    pub async fn try_adjust(
        &self,
        variant_id: VariantId,
        delta: i64,
    ) -> Result<Adjusted, StoreError> {
        let lock = self.locks.for_variant(variant_id);
        let _guard = lock.lock().await;

        let inventory_item_id = self.store.resolve_inventory_item(variant_id).await?;
        let level = self.store.read_level(inventory_item_id).await?;

        let available = (level.available + delta).max(0);
        self.store
            .write_level(inventory_item_id, level.location_id, available)
            .await?;

        Ok(Adjusted {
            previous: level.available,
            available,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use cottonlove_core::{InventoryItemId, LocationId, OrderId};

    use super::super::store::StockLevel;
    use super::*;
    use crate::shopify::types::Order;

    /// In-memory store shared across clones.
    #[derive(Clone, Default)]
    struct FakeStore {
        inner: Arc<Mutex<FakeInner>>,
    }

    #[derive(Default)]
    struct FakeInner {
        variants: HashMap<VariantId, InventoryItemId>,
        levels: HashMap<InventoryItemId, Vec<(LocationId, i64)>>,
        writes: u64,
    }

    impl FakeStore {
        fn with_variant(self, variant: i64, item: i64, location: i64, available: i64) -> Self {
            {
                let mut inner = self.inner.lock().unwrap();
                inner
                    .variants
                    .insert(VariantId::new(variant), InventoryItemId::new(item));
                inner
                    .levels
                    .insert(
                        InventoryItemId::new(item),
                        vec![(LocationId::new(location), available)],
                    );
            }
            self
        }

        fn with_unstocked_variant(self, variant: i64, item: i64) -> Self {
            {
                let mut inner = self.inner.lock().unwrap();
                inner
                    .variants
                    .insert(VariantId::new(variant), InventoryItemId::new(item));
                inner.levels.insert(InventoryItemId::new(item), Vec::new());
            }
            self
        }

        fn available(&self, item: i64) -> i64 {
            let inner = self.inner.lock().unwrap();
            inner
                .levels
                .get(&InventoryItemId::new(item))
                .and_then(|levels| levels.first())
                .map(|(_, available)| *available)
                .unwrap_or_default()
        }

        fn write_count(&self) -> u64 {
            self.inner.lock().unwrap().writes
        }
    }

    #[async_trait]
    impl InventoryStore for FakeStore {
        async fn resolve_inventory_item(
            &self,
            variant_id: VariantId,
        ) -> Result<InventoryItemId, StoreError> {
            let inner = self.inner.lock().unwrap();
            inner
                .variants
                .get(&variant_id)
                .copied()
                .ok_or_else(|| StoreError::NotFound(format!("Variant {variant_id}")))
        }

        async fn read_level(
            &self,
            inventory_item_id: InventoryItemId,
        ) -> Result<StockLevel, StoreError> {
            let inner = self.inner.lock().unwrap();
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
            let mut inner = self.inner.lock().unwrap();
            inner.writes += 1;
            inner
                .levels
                .insert(inventory_item_id, vec![(location_id, available)]);
            Ok(())
        }

        async fn fetch_order(&self, order_id: OrderId) -> Result<Order, StoreError> {
            Err(StoreError::NotFound(format!("Order {order_id}")))
        }
    }

    #[tokio::test]
    async fn test_remove_then_add_is_symmetric() {
        let store = FakeStore::default().with_variant(1, 10, 100, 8);
        let adjuster = StockAdjuster::new(store.clone());

        adjuster.remove_stock(VariantId::new(1), 3, "test").await;
        assert_eq!(store.available(10), 5);

        adjuster.add_stock(VariantId::new(1), 3, "test").await;
        assert_eq!(store.available(10), 8);
    }

    #[tokio::test]
    async fn test_floor_at_zero_loses_excess() {
        // available=5, remove 10 floors at 0; the follow-up add restores 10,
        // not 5. Conservation is intentionally not guaranteed here.
        let store = FakeStore::default().with_variant(1, 10, 100, 5);
        let adjuster = StockAdjuster::new(store.clone());

        adjuster.remove_stock(VariantId::new(1), 10, "test").await;
        assert_eq!(store.available(10), 0);

        adjuster.add_stock(VariantId::new(1), 10, "test").await;
        assert_eq!(store.available(10), 10);
    }

    #[tokio::test]
    async fn test_no_location_performs_zero_writes() {
        let store = FakeStore::default().with_unstocked_variant(1, 10);
        let adjuster = StockAdjuster::new(store.clone());

        adjuster.remove_stock(VariantId::new(1), 2, "test").await;
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_variant_performs_zero_writes() {
        let store = FakeStore::default();
        let adjuster = StockAdjuster::new(store.clone());

        adjuster.add_stock(VariantId::new(404), 2, "test").await;
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_try_adjust_reports_outcome() {
        let store = FakeStore::default().with_variant(1, 10, 100, 4);
        let adjuster = StockAdjuster::new(store.clone());

        let adjusted = adjuster
            .try_adjust(VariantId::new(1), -3)
            .await
            .unwrap();
        assert_eq!(
            adjusted,
            Adjusted {
                previous: 4,
                available: 1
            }
        );
    }

    #[tokio::test]
    async fn test_concurrent_adjustments_serialize_per_variant() {
        let store = FakeStore::default().with_variant(1, 10, 100, 100);
        let adjuster = StockAdjuster::new(store.clone());

        let mut handles = Vec::new();
        for _ in 0..20 {
            let adjuster = adjuster.clone();
            handles.push(tokio::spawn(async move {
                adjuster.remove_stock(VariantId::new(1), 1, "test").await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // Without the per-variant lock, interleaved read-modify-write
        // cycles would lose updates and leave the level above 80.
        assert_eq!(store.available(10), 80);
    }
}
