//! Lubro Admin - back-office bulk mutators.
//!
//! A thin authenticated client over the distributor API's admin surface,
//! plus the batch workflows the back office runs against it: attaching
//! product images (with display-order applied after the fact) and bulk
//! price updates.
//!
//! Batch operations never abort on a single failure: each item is attempted
//! independently and the outcome is collected into a [`batch::BatchReport`]
//! so the operator sees exactly what succeeded and what did not.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod batch;
pub mod client;
pub mod config;
pub mod error;
pub mod images;
pub mod pricing;

pub use batch::{BatchFailure, BatchReport};
pub use client::{AdminApi, AdminClient};
pub use config::AdminConfig;
pub use error::{AdminError, AdminResult};
