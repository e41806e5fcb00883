//! Bundle component descriptor parsing.
//!
//! Bundles (a light cable plus cotton-ball variants) are sold as a single
//! Shopify line item; the storefront records the composition in a line
//! item property named `_clv_components`, whose value is a JSON-encoded
//! object:
//!
//! ```json
//! {"cable_variant_id": 111, "cotton": [{"variant_id": 222, "qty": 20, "title": "Blush"}]}
//! ```
//!
//! Older checkout flows wrote the same payload to the order's note
//! attributes instead, so parsing falls back there. A line item without
//! the property is simply not a bundle; a property that fails to parse is
//! a typed [`MalformedComponents`] error the caller downgrades to
//! skip-and-log.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use cottonlove_core::VariantId;

use crate::shopify::types::{LineItem, Order, Property};

/// Line item property (and legacy note attribute) holding the bundle
/// composition.
pub const COMPONENTS_PROPERTY: &str = "_clv_components";

/// Errors produced when a components property is present but unusable.
#[derive(Debug, Error)]
pub enum MalformedComponents {
    /// Property value was not valid JSON of the expected shape.
    #[error("invalid {COMPONENTS_PROPERTY} payload: {0}")]
    Json(#[from] serde_json::Error),

    /// Property value was neither a JSON string nor an object.
    #[error("{COMPONENTS_PROPERTY} must be a JSON-encoded object")]
    UnsupportedShape,

    /// A cotton component declared a zero quantity.
    #[error("cotton component {variant_id} has zero quantity")]
    ZeroQuantity { variant_id: VariantId },
}

/// One cotton-ball component of a bundle.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CottonComponent {
    /// Variant tracked for this cotton ball.
    pub variant_id: VariantId,
    /// Units of this cotton ball per one unit of the bundle.
    pub qty: u32,
    /// Display title (e.g., the color name).
    #[serde(default)]
    pub title: String,
}

/// Parsed bundle composition for a line item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BundleComponents {
    /// The light cable variant, one per bundle unit.
    #[serde(default)]
    pub cable_variant_id: Option<VariantId>,
    /// Cotton-ball components with per-bundle-unit quantities.
    #[serde(default)]
    pub cotton: Vec<CottonComponent>,
}

impl BundleComponents {
    /// Whether the descriptor names no components at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cable_variant_id.is_none() && self.cotton.is_empty()
    }
}

/// Extract the bundle composition for a line item, if any.
///
/// Looks at the line item's own properties first, then falls back to the
/// order's note attributes (where older checkout flows stored the
/// payload). Returns `Ok(None)` when neither carries the property: the
/// line item is not a bundle.
///
/// # Errors
///
/// Returns [`MalformedComponents`] when the property is present but its
/// value is not a valid components payload.
pub fn components_for(
    line_item: &LineItem,
    order: Option<&Order>,
) -> Result<Option<BundleComponents>, MalformedComponents> {
    if let Some(value) = property_value(&line_item.properties) {
        return parse_components(value).map(Some);
    }

    if let Some(order) = order
        && let Some(value) = property_value(&order.note_attributes)
    {
        return parse_components(value).map(Some);
    }

    Ok(None)
}

/// Find the components property in a property list.
fn property_value(properties: &[Property]) -> Option<&Value> {
    properties
        .iter()
        .find(|p| p.name == COMPONENTS_PROPERTY)
        .map(|p| &p.value)
}

/// Decode and validate a components property value.
fn parse_components(value: &Value) -> Result<BundleComponents, MalformedComponents> {
    let components: BundleComponents = match value {
        // The storefront writes the payload as a JSON-encoded string.
        Value::String(raw) => serde_json::from_str(raw)?,
        // Some integrations post the object directly.
        Value::Object(_) => serde_json::from_value(value.clone())?,
        _ => return Err(MalformedComponents::UnsupportedShape),
    };

    if let Some(zero) = components.cotton.iter().find(|c| c.qty == 0) {
        return Err(MalformedComponents::ZeroQuantity {
            variant_id: zero.variant_id,
        });
    }

    Ok(components)
}
