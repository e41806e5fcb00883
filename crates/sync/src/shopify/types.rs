//! Order, refund, and inventory payload types for the Shopify REST API.
//!
//! These models cover the subset of fields the synchronizer consumes from
//! order/refund webhooks and the Admin REST endpoints. Unknown fields are
//! ignored on deserialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cottonlove_core::{InventoryItemId, LineItemId, LocationId, OrderId, VariantId};

// =============================================================================
// Order Status Types
// =============================================================================

/// Order financial status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinancialStatus {
    /// No payment authorized.
    Pending,
    /// Payment has been authorized but not captured.
    Authorized,
    /// Payment has been captured.
    Paid,
    /// Payment has been partially paid.
    PartiallyPaid,
    /// Payment has been refunded.
    Refunded,
    /// Payment has been partially refunded.
    PartiallyRefunded,
    /// Payment has been voided.
    Voided,
    /// Payment has expired.
    Expired,
}

/// Order fulfillment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentStatus {
    /// All items have been fulfilled.
    Fulfilled,
    /// Some items have been fulfilled.
    Partial,
    /// Items were restocked.
    Restocked,
}

// =============================================================================
// Order Types
// =============================================================================

/// A named property attached to a line item or an order.
///
/// Property values are loosely typed upstream; most are strings but the
/// API does not guarantee it, so the raw JSON value is kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    /// Property name (e.g., `_clv_components`).
    pub name: String,
    /// Property value, shape controlled by whoever wrote the property.
    #[serde(default)]
    pub value: serde_json::Value,
}

/// A line item on an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    /// Line item ID.
    pub id: LineItemId,
    /// Product title at time of purchase.
    pub title: String,
    /// Ordered quantity.
    pub quantity: i64,
    /// Custom properties attached at checkout.
    #[serde(default)]
    pub properties: Vec<Property>,
}

/// Order resource as delivered by order webhooks and `GET /orders/{id}.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Order ID.
    pub id: OrderId,
    /// Human-readable order name (e.g., `#1042`).
    pub name: String,
    /// Payment state.
    #[serde(default)]
    pub financial_status: Option<FinancialStatus>,
    /// Fulfillment state (`None` until anything ships).
    #[serde(default)]
    pub fulfillment_status: Option<FulfillmentStatus>,
    /// Purchased line items.
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    /// Order-level note attributes (legacy location for bundle components).
    #[serde(default)]
    pub note_attributes: Vec<Property>,
    /// Order creation timestamp.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Refund Types
// =============================================================================

/// How a refunded unit affects inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestockType {
    /// Item is kept by the customer; no stock change.
    NoRestock,
    /// Item was never shipped; return it to stock.
    Cancel,
    /// Item is being returned; return it to stock.
    Return,
    /// Restock flag from orders predating per-line restock types.
    LegacyRestock,
}

impl RestockType {
    /// Whether this refund line returns units to available stock.
    #[must_use]
    pub const fn restocks(self) -> bool {
        !matches!(self, Self::NoRestock)
    }
}

/// A refunded portion of an order line item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundLineItem {
    /// The order line item being refunded.
    pub line_item_id: LineItemId,
    /// Refunded quantity (may be less than the line item quantity).
    pub quantity: i64,
    /// How the refunded units affect inventory.
    pub restock_type: RestockType,
}

/// Refund resource as delivered by `refunds/create` webhooks.
///
/// Refund webhooks carry only per-line refund data; line item detail
/// (including bundle components) requires fetching the parent order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Refund {
    /// Refund ID.
    pub id: i64,
    /// Parent order ID.
    pub order_id: OrderId,
    /// Refunded line items.
    #[serde(default)]
    pub refund_line_items: Vec<RefundLineItem>,
    /// Refund creation timestamp.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Inventory Types
// =============================================================================

/// Product variant, used to resolve the variant's inventory item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variant {
    /// Variant ID.
    pub id: VariantId,
    /// Inventory item tracking stock for this variant.
    pub inventory_item_id: InventoryItemId,
    /// Stock keeping unit.
    #[serde(default)]
    pub sku: Option<String>,
}

/// Inventory level of an inventory item at a location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryLevel {
    /// Inventory item ID.
    pub inventory_item_id: InventoryItemId,
    /// Location ID.
    pub location_id: LocationId,
    /// Available quantity (`None` when the item is not tracked).
    #[serde(default)]
    pub available: Option<i64>,
}

// =============================================================================
// REST Response Envelopes
// =============================================================================

/// Envelope for `GET /variants/{id}.json`.
#[derive(Debug, Deserialize)]
pub(crate) struct VariantResponse {
    pub variant: Variant,
}

/// Envelope for `GET /inventory_levels.json`.
#[derive(Debug, Deserialize)]
pub(crate) struct InventoryLevelsResponse {
    pub inventory_levels: Vec<InventoryLevel>,
}

/// Envelope for `GET /orders/{id}.json`.
#[derive(Debug, Deserialize)]
pub(crate) struct OrderResponse {
    pub order: Order,
}
