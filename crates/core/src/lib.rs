//! Lubro Core - Shared types library.
//!
//! This crate provides common types used across all Lubro components:
//! - `storefront` - Cart store, remote gateway, and order edit bridge
//! - `admin` - Bulk product/image mutation client
//! - `cli` - Command-line tools for exercising the flows
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, carts, products, orders, and statuses
//! - [`pricing`] - Deterministic price resolution for unpriced products

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod pricing;
pub mod types;

pub use types::*;
