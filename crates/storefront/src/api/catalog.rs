//! Catalog read client with in-memory caching.
//!
//! Catalog reads are public (no session) and read-mostly, so responses are
//! cached via `moka` with a 5-minute TTL. Cart and order state never goes
//! through this path.

use std::time::Duration;

use lubro_core::Product;
use moka::future::Cache;
use tracing::{debug, instrument};

use super::ApiClient;
use crate::error::{ApiError, ApiResult};

/// Cached catalog response values.
#[derive(Clone)]
enum CacheValue {
    Product(Box<Product>),
    Listing(Vec<Product>),
}

/// Client for catalog reads.
#[derive(Clone)]
pub struct CatalogClient {
    api: ApiClient,
    cache: Cache<String, CacheValue>,
}

impl CatalogClient {
    /// Create a catalog client over an API client.
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self { api, cache }
    }

    /// List the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn products(&self) -> ApiResult<Vec<Product>> {
        let cache_key = "products:all".to_string();

        if let Some(CacheValue::Listing(products)) = self.cache.get(&cache_key).await {
            debug!("Cache hit for product listing");
            return Ok(products);
        }

        let url = self.api.endpoint("product")?;
        let response = self.api.http().get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::from_status(status, "list products"));
        }
        let products = response.json::<Vec<Product>>().await?;

        self.cache
            .insert(cache_key, CacheValue::Listing(products.clone()))
            .await;

        Ok(products)
    }

    /// Fetch a single product by its slug.
    ///
    /// Returns `Ok(None)` when the backend reports no such product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn product_by_slug(&self, slug: &str) -> ApiResult<Option<Product>> {
        if slug.trim().is_empty() {
            return Err(ApiError::validation("slug must not be empty"));
        }

        let cache_key = format!("product:{slug}");

        if let Some(CacheValue::Product(product)) = self.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(Some(*product));
        }

        let mut url = self.api.endpoint("product/filter")?;
        url.query_pairs_mut().append_pair("slug", slug);

        let response = self.api.http().get(url).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ApiError::from_status(status, "fetch product by slug"));
        }
        let product = response.json::<Product>().await?;

        self.cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(Some(product))
    }

    /// Invalidate all cached catalog data.
    pub async fn invalidate_all(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }
}
