//! Error types for Shopify Admin REST API operations.

use thiserror::Error;

/// Errors that can occur when interacting with the Shopify Admin API.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// HTTP request failed (transport or response decoding).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-2xx response.
    #[error("API error: {status} - {body}")]
    Api { status: u16, body: String },

    /// Requested resource does not exist upstream.
    #[error("{0} not found")]
    NotFound(String),

    /// Client construction failed.
    #[error("Client error: {0}")]
    Client(String),
}
