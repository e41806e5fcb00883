//! Cottonlove sync library.
//!
//! This crate provides the bundle inventory synchronizer as a library,
//! allowing it to be tested and reused by the CLI.
//!
//! # Security
//!
//! This crate holds HIGH PRIVILEGE access: the Shopify Admin API token it
//! is configured with can read and write inventory for the whole store.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod bundle;
pub mod config;
pub mod error;
pub mod inventory;
pub mod reconciler;
pub mod routes;
pub mod shopify;
pub mod state;
