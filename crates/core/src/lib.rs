//! Cottonlove Core - Shared types library.
//!
//! This crate provides common types used across all Cottonlove bundle-sync
//! components:
//! - `sync` - Webhook-driven inventory synchronizer service
//! - `cli` - Command-line tools for inspecting and correcting stock levels
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe Shopify resource IDs

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
