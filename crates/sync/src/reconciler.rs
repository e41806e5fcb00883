//! Order lifecycle reconciliation.
//!
//! Maps each order lifecycle event to per-component stock adjustments:
//!
//! | Event | Action per bundle line item |
//! |---|---|
//! | created | remove each component × line quantity |
//! | fulfilled | none (stock committed at creation) |
//! | cancelled | restore each component × line quantity |
//! | refund created | restore each component × refunded quantity, per restock type |
//! | edited | none (removals arrive as a later refund) |
//!
//! The reconciler keeps no state between events. Idempotency and ordering
//! of deliveries are assumed, not enforced: a duplicate `created` delivery
//! re-subtracts.

use tracing::{error, info, instrument, warn};

use crate::bundle::{self, BundleComponents};
use crate::inventory::{InventoryStore, StockAdjuster};
use crate::shopify::types::{LineItem, Order, Refund};

/// Stateless mapper from order lifecycle events to stock adjustments.
#[derive(Clone)]
pub struct Reconciler<S> {
    store: S,
    adjuster: StockAdjuster<S>,
}

impl<S: InventoryStore + Clone> Reconciler<S> {
    /// Create a reconciler over an inventory store.
    pub fn new(store: S) -> Self {
        Self {
            adjuster: StockAdjuster::new(store.clone()),
            store,
        }
    }

    /// Access the adjustment engine (manual corrections, CLI).
    pub const fn adjuster(&self) -> &StockAdjuster<S> {
        &self.adjuster
    }

    /// Handle an `orders/create` event: commit component stock.
    #[instrument(skip(self, order), fields(order_id = %order.id, order_name = %order.name))]
    pub async fn order_created(&self, order: &Order) {
        info!("Processing order creation");

        for line_item in &order.line_items {
            let Some(components) = self.components_or_skip(line_item, order) else {
                continue;
            };
            let reason = format!("from order {}", order.name);
            self.remove_components(&components, line_item.quantity, &reason)
                .await;
        }
    }

    /// Handle an `orders/fulfilled` event.
    ///
    /// Stock was already committed at creation; fulfillment changes
    /// nothing for inventory.
    #[instrument(skip(self, order), fields(order_id = %order.id, order_name = %order.name))]
    pub async fn order_fulfilled(&self, order: &Order) {
        info!("Order fulfilled; stock was committed at creation");
    }

    /// Handle an `orders/cancelled` event: release component stock.
    #[instrument(skip(self, order), fields(order_id = %order.id, order_name = %order.name))]
    pub async fn order_cancelled(&self, order: &Order) {
        info!("Processing order cancellation");

        for line_item in &order.line_items {
            let Some(components) = self.components_or_skip(line_item, order) else {
                continue;
            };
            let reason = format!("cancelled from order {}", order.name);
            self.restore_components(&components, line_item.quantity, &reason)
                .await;
        }
    }

    /// Handle an `orders/edited` event.
    ///
    /// Item removal through an order edit surfaces as a subsequent refund
    /// event, which is handled there.
    #[instrument(skip(self, order), fields(order_id = %order.id, order_name = %order.name))]
    pub async fn order_edited(&self, order: &Order) {
        info!("Order edited; awaiting refund events for any removals");
    }

    /// Handle a `refunds/create` event: restore stock for refund lines
    /// whose restock type returns units to inventory.
    ///
    /// Refund webhooks carry only per-line refund data, so the parent
    /// order is fetched to recover line item detail.
    #[instrument(skip(self, refund), fields(refund_id = %refund.id, order_id = %refund.order_id))]
    pub async fn refund_created(&self, refund: &Refund) {
        info!("Processing refund");

        let order = match self.store.fetch_order(refund.order_id).await {
            Ok(order) => order,
            Err(e) => {
                error!(error = %e, "Unable to fetch order for refund; no restock applied");
                return;
            }
        };

        for refund_line in &refund.refund_line_items {
            if !refund_line.restock_type.restocks() {
                info!(
                    line_item_id = %refund_line.line_item_id,
                    "Refund line kept by customer; no restock"
                );
                continue;
            }
            if refund_line.quantity <= 0 {
                continue;
            }

            let Some(line_item) = order
                .line_items
                .iter()
                .find(|li| li.id == refund_line.line_item_id)
            else {
                warn!(
                    line_item_id = %refund_line.line_item_id,
                    "Refund references a line item missing from the order"
                );
                continue;
            };

            let Some(components) = self.components_or_skip(line_item, &order) else {
                continue;
            };
            let reason = format!("refunded from order {}", order.name);
            self.restore_components(&components, refund_line.quantity, &reason)
                .await;
        }
    }

    /// Remove stock for every component, scaled by `multiplier` bundle
    /// units.
    async fn remove_components(
        &self,
        components: &BundleComponents,
        multiplier: i64,
        reason: &str,
    ) {
        if let Some(cable) = components.cable_variant_id {
            self.adjuster.remove_stock(cable, multiplier, reason).await;
        }
        for cotton in &components.cotton {
            let quantity = i64::from(cotton.qty) * multiplier;
            self.adjuster
                .remove_stock(cotton.variant_id, quantity, reason)
                .await;
        }
    }

    /// Restore stock for every component, scaled by `multiplier` bundle
    /// units.
    async fn restore_components(
        &self,
        components: &BundleComponents,
        multiplier: i64,
        reason: &str,
    ) {
        if let Some(cable) = components.cable_variant_id {
            self.adjuster.add_stock(cable, multiplier, reason).await;
        }
        for cotton in &components.cotton {
            let quantity = i64::from(cotton.qty) * multiplier;
            self.adjuster
                .add_stock(cotton.variant_id, quantity, reason)
                .await;
        }
    }

    /// Parse the bundle components for a line item, downgrading malformed
    /// payloads to skip-and-log so siblings still reconcile.
    fn components_or_skip(&self, line_item: &LineItem, order: &Order) -> Option<BundleComponents> {
        match bundle::components_for(line_item, Some(order)) {
            Ok(Some(components)) if !components.is_empty() => Some(components),
            Ok(_) => None,
            Err(e) => {
                warn!(
                    line_item_id = %line_item.id,
                    error = %e,
                    "Ignoring line item with malformed bundle components"
                );
                None
            }
        }
    }
}
