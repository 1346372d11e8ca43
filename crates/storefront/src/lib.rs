//! Lubro Storefront - cart/order reconciliation core.
//!
//! This crate implements the client side of the Lubro storefront: a local
//! cart store that behaves consistently whether the user is anonymous or
//! authenticated, a remote cart/order gateway over the distributor's HTTP
//! API, and an order edit bridge that repurposes the cart to stage edits to
//! previously placed orders.
//!
//! # Architecture
//!
//! - [`api`] - `reqwest`-backed gateway with typed error classification
//! - [`cart`] - persisted cart store with remote-first/local-fallback policy
//! - [`order_edit`] - state machine staging edits to pending orders
//! - [`session`] - authenticated session handle gating remote mirroring
//!
//! The store never blocks the user on backend availability: every remote
//! failure degrades to a local-only mutation with the error recorded.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod config;
pub mod error;
pub mod order_edit;
pub mod session;
