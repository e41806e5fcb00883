//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::SyncConfig;
use crate::reconciler::Reconciler;
use crate::shopify::{AdminClient, ShopifyError};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration and the reconciliation pipeline.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SyncConfig,
    reconciler: Reconciler<AdminClient>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the Shopify client cannot be constructed from
    /// the configuration.
    pub fn new(config: SyncConfig) -> Result<Self, ShopifyError> {
        let shopify = AdminClient::new(&config.shopify)?;
        let reconciler = Reconciler::new(shopify);

        Ok(Self {
            inner: Arc::new(AppStateInner { config, reconciler }),
        })
    }

    /// Get a reference to the sync configuration.
    #[must_use]
    pub fn config(&self) -> &SyncConfig {
        &self.inner.config
    }

    /// Get a reference to the reconciler.
    #[must_use]
    pub fn reconciler(&self) -> &Reconciler<AdminClient> {
        &self.inner.reconciler
    }
}
