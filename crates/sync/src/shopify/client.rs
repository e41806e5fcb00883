//! Shopify Admin REST API client.
//!
//! Wraps the four REST calls the synchronizer needs: fetch variant (to
//! obtain its inventory item), fetch inventory levels, set an inventory
//! level, and fetch an order by ID. The client also implements
//! [`InventoryStore`], which is the seam the reconciliation pipeline is
//! written against.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use tracing::instrument;

use cottonlove_core::{InventoryItemId, LocationId, OrderId, VariantId};

use super::error::ShopifyError;
use super::types::{
    InventoryLevel, InventoryLevelsResponse, Order, OrderResponse, Variant, VariantResponse,
};
use crate::config::ShopifySyncConfig;
use crate::inventory::{InventoryStore, StockLevel, StoreError};

/// Shopify Admin REST API client.
#[derive(Clone)]
pub struct AdminClient {
    client: reqwest::Client,
    base_url: String,
}

impl std::fmt::Debug for AdminClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl AdminClient {
    /// Create a new Admin API client.
    ///
    /// # Errors
    ///
    /// Returns error if the access token is not a valid header value or
    /// the HTTP client fails to build.
    pub fn new(config: &ShopifySyncConfig) -> Result<Self, ShopifyError> {
        let mut headers = HeaderMap::new();

        let mut token = HeaderValue::from_str(config.admin_token.expose_secret())
            .map_err(|e| ShopifyError::Client(format!("Invalid access token format: {e}")))?;
        token.set_sensitive(true);
        headers.insert("X-Shopify-Access-Token", token);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        let base_url = format!(
            "https://{}/admin/api/{}",
            config.store, config.api_version
        );

        Ok(Self { client, base_url })
    }

    /// Fetch a product variant.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the variant does not exist, or an error if
    /// the API request fails.
    #[instrument(skip(self), fields(variant_id = %variant_id))]
    pub async fn get_variant(&self, variant_id: VariantId) -> Result<Variant, ShopifyError> {
        let url = format!("{}/variants/{variant_id}.json", self.base_url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ShopifyError::NotFound(format!("Variant {variant_id}")));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ShopifyError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: VariantResponse = response.json().await?;
        Ok(envelope.variant)
    }

    /// Fetch inventory levels for an inventory item across all locations
    /// stocking it.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(inventory_item_id = %inventory_item_id))]
    pub async fn get_inventory_levels(
        &self,
        inventory_item_id: InventoryItemId,
    ) -> Result<Vec<InventoryLevel>, ShopifyError> {
        let url = format!(
            "{}/inventory_levels.json?inventory_item_ids={inventory_item_id}",
            self.base_url
        );

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ShopifyError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: InventoryLevelsResponse = response.json().await?;
        Ok(envelope.inventory_levels)
    }

    /// Set the available quantity of an inventory item at a location.
    ///
    /// This is a full overwrite (`set`), not a delta adjustment; the
    /// Admin REST API offers no atomic increment.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or returns non-2xx.
    #[instrument(skip(self), fields(inventory_item_id = %inventory_item_id, location_id = %location_id, available = %available))]
    pub async fn set_inventory_level(
        &self,
        location_id: LocationId,
        inventory_item_id: InventoryItemId,
        available: i64,
    ) -> Result<(), ShopifyError> {
        let url = format!("{}/inventory_levels/set.json", self.base_url);

        let body = serde_json::json!({
            "location_id": location_id,
            "inventory_item_id": inventory_item_id,
            "available": available,
        });

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ShopifyError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }

    /// Fetch an order by ID.
    ///
    /// Used during refund reconciliation: refund webhooks carry only
    /// refund line data, so line item detail comes from the parent order.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the order does not exist, or an error if the
    /// API request fails.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_order(&self, order_id: OrderId) -> Result<Order, ShopifyError> {
        let url = format!("{}/orders/{order_id}.json", self.base_url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ShopifyError::NotFound(format!("Order {order_id}")));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ShopifyError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: OrderResponse = response.json().await?;
        Ok(envelope.order)
    }
}

impl From<ShopifyError> for StoreError {
    fn from(err: ShopifyError) -> Self {
        match err {
            ShopifyError::Http(e) => Self::Network(e.to_string()),
            ShopifyError::Api { status, body } => Self::Upstream { status, body },
            ShopifyError::NotFound(what) => Self::NotFound(what),
            ShopifyError::Client(msg) => Self::Network(msg),
        }
    }
}

#[async_trait]
impl InventoryStore for AdminClient {
    async fn resolve_inventory_item(
        &self,
        variant_id: VariantId,
    ) -> Result<InventoryItemId, StoreError> {
        let variant = self.get_variant(variant_id).await?;
        Ok(variant.inventory_item_id)
    }

    async fn read_level(
        &self,
        inventory_item_id: InventoryItemId,
    ) -> Result<StockLevel, StoreError> {
        let levels = self.get_inventory_levels(inventory_item_id).await?;

        // Multi-location stores return one entry per location; the first
        // entry is taken as the adjustment target.
        let level = levels
            .into_iter()
            .next()
            .ok_or(StoreError::NoLocation(inventory_item_id))?;

        Ok(StockLevel {
            location_id: level.location_id,
            available: level.available.unwrap_or(0),
        })
    }

    async fn write_level(
        &self,
        inventory_item_id: InventoryItemId,
        location_id: LocationId,
        available: i64,
    ) -> Result<(), StoreError> {
        self.set_inventory_level(location_id, inventory_item_id, available)
            .await
            .map_err(Into::into)
    }

    async fn fetch_order(&self, order_id: OrderId) -> Result<Order, StoreError> {
        self.get_order(order_id).await.map_err(Into::into)
    }
}
