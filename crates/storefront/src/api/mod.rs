//! Remote HTTP gateway for the distributor's cart, order, and catalog API.
//!
//! # Architecture
//!
//! - The backend is the source of truth for mirrored carts and orders; every
//!   successful mutation returns the authoritative entity.
//! - Gateway operations are stateless and idempotent from the caller's point
//!   of view; inputs are validated defensively before a request is issued.
//! - Catalog reads are cached in-memory via `moka` (5 minute TTL); cart and
//!   order state is never cached.
//!
//! # Example
//!
//! ```rust,ignore
//! use lubro_storefront::api::{ApiClient, CartGateway};
//!
//! let client = ApiClient::new(&config)?;
//! let cart = match client.cart_for_user(&session).await? {
//!     Some(cart) => cart,
//!     None => client.create_cart(&session).await?,
//! };
//! let cart = client.add_product(&session, cart_id, product_id, 2).await?;
//! ```

mod cart;
mod catalog;
mod orders;

pub use cart::CartGateway;
pub use catalog::CatalogClient;
pub use orders::OrderGateway;

use std::sync::Arc;

use reqwest::RequestBuilder;
use url::Url;

use crate::config::StorefrontConfig;
use crate::error::{ApiError, ApiResult};
use crate::session::Session;

/// Client for the distributor's HTTP API.
///
/// Cheaply cloneable; all gateway traits are implemented on it.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: &StorefrontConfig) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                base_url: config.api_base_url.clone(),
            }),
        })
    }

    /// Resolve an endpoint path against the base URL.
    pub(crate) fn endpoint(&self, path: &str) -> ApiResult<Url> {
        let base = self.inner.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Url::parse(&format!("{base}/{path}"))
            .map_err(|e| ApiError::network(format!("invalid endpoint URL: {e}")))
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    /// Attach bearer authentication from a session.
    pub(crate) fn authed(req: RequestBuilder, session: &Session) -> RequestBuilder {
        req.bearer_auth(session.token())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let config = StorefrontConfig::for_base_url("http://localhost:4000/").unwrap();
        let client = ApiClient::new(&config).unwrap();
        let url = client.endpoint("/cart/3").unwrap();
        assert_eq!(url.as_str(), "http://localhost:4000/cart/3");
    }

    #[test]
    fn test_endpoint_preserves_base_path() {
        let config = StorefrontConfig::for_base_url("http://localhost:4000/api/v1").unwrap();
        let client = ApiClient::new(&config).unwrap();
        let url = client.endpoint("product").unwrap();
        assert_eq!(url.as_str(), "http://localhost:4000/api/v1/product");
    }
}
