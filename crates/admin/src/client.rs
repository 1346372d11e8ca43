//! Authenticated HTTP client for the admin surface.

use std::sync::Arc;

use lubro_core::{ImageId, ProductId};
use reqwest::RequestBuilder;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::instrument;
use url::Url;

use crate::config::AdminConfig;
use crate::error::{AdminError, AdminResult};
use crate::images::{ImageUpload, ProductImage};

/// Single-item admin operations.
///
/// The batch workflows in [`crate::images`] and [`crate::pricing`] are
/// generic over this trait so they can be exercised against a mock.
#[allow(async_fn_in_trait)]
pub trait AdminApi {
    /// Associate an uploaded image with a product. The backend assigns the
    /// image id and an initial display order.
    async fn attach_image(
        &self,
        product_id: ProductId,
        upload: &ImageUpload,
    ) -> AdminResult<ProductImage>;

    /// Replace a product's image display order wholesale.
    async fn reorder_images(&self, product_id: ProductId, order: &[ImageId]) -> AdminResult<()>;

    /// Set a product's price.
    async fn set_price(&self, product_id: ProductId, price: Decimal) -> AdminResult<()>;
}

struct AdminClientInner {
    http: reqwest::Client,
    base_url: Url,
    token: SecretString,
}

/// `reqwest`-backed admin client. Cheap to clone.
#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<AdminClientInner>,
}

impl AdminClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Transport`] if the underlying HTTP client
    /// cannot be constructed.
    pub fn new(config: &AdminConfig) -> AdminResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            inner: Arc::new(AdminClientInner {
                http,
                base_url: config.api_base_url.clone(),
                token: config.admin_token.clone(),
            }),
        })
    }

    fn endpoint(&self, path: &str) -> AdminResult<Url> {
        let base = self.inner.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Url::parse(&format!("{base}/{path}"))
            .map_err(|e| AdminError::validation(format!("invalid endpoint path '{path}': {e}")))
    }

    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        req.bearer_auth(self.inner.token.expose_secret())
    }
}

impl AdminApi for AdminClient {
    #[instrument(skip(self, upload), fields(product_id = %product_id, url = %upload.url))]
    async fn attach_image(
        &self,
        product_id: ProductId,
        upload: &ImageUpload,
    ) -> AdminResult<ProductImage> {
        let url = self.endpoint(&format!("product/{product_id}/image"))?;
        let response = self
            .authed(self.inner.http.post(url))
            .json(upload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdminError::status(
                status,
                format!("attach image to product {product_id}"),
            ));
        }
        Ok(response.json::<ProductImage>().await?)
    }

    #[instrument(skip(self), fields(product_id = %product_id, images = order.len()))]
    async fn reorder_images(&self, product_id: ProductId, order: &[ImageId]) -> AdminResult<()> {
        if order.is_empty() {
            return Err(AdminError::validation("image order must not be empty"));
        }

        let url = self.endpoint(&format!("product/{product_id}/image/order"))?;
        let response = self
            .authed(self.inner.http.put(url))
            .json(&json!({ "image_ids": order }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdminError::status(
                status,
                format!("reorder images of product {product_id}"),
            ));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(product_id = %product_id, price = %price))]
    async fn set_price(&self, product_id: ProductId, price: Decimal) -> AdminResult<()> {
        if price <= Decimal::ZERO {
            return Err(AdminError::validation(format!(
                "price for product {product_id} must be positive"
            )));
        }

        let url = self.endpoint(&format!("product/{product_id}/price"))?;
        let response = self
            .authed(self.inner.http.patch(url))
            .json(&json!({ "price": price }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdminError::status(
                status,
                format!("set price of product {product_id}"),
            ));
        }
        Ok(())
    }
}
