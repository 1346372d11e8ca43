//! Remote cart gateway.
//!
//! Thin, stateless operations mapping 1:1 to the backend's cart endpoints.
//! Every mutation returns the authoritative cart on success - never a
//! partial one - and inputs are validated before a request goes out.

use lubro_core::{Cart, CartId, ProductId};
use tracing::instrument;

use super::ApiClient;
use crate::error::{ApiError, ApiResult};
use crate::session::Session;

/// Boundary to the remote cart service.
///
/// Implemented by [`ApiClient`] in production and by in-memory fakes in
/// tests; the cart store is generic over this trait.
#[allow(async_fn_in_trait)]
pub trait CartGateway {
    /// Fetch the user's existing cart.
    ///
    /// Returns `Ok(None)` only when the backend positively reports that no
    /// cart exists; transient failures are errors so callers can keep local
    /// state untouched.
    async fn cart_for_user(&self, session: &Session) -> ApiResult<Option<Cart>>;

    /// Create a fresh cart for the user.
    async fn create_cart(&self, session: &Session) -> ApiResult<Cart>;

    /// Add `quantity` units of a product to a cart.
    async fn add_product(
        &self,
        session: &Session,
        cart_id: CartId,
        product_id: ProductId,
        quantity: u32,
    ) -> ApiResult<Cart>;

    /// Remove a product's line from a cart entirely.
    async fn remove_product(
        &self,
        session: &Session,
        cart_id: CartId,
        product_id: ProductId,
    ) -> ApiResult<Cart>;

    /// Empty a cart, preserving its identity.
    async fn empty_cart(&self, session: &Session, cart_id: CartId) -> ApiResult<Cart>;
}

/// Reject ids the backend would never accept, before any network call.
fn require_positive_id(value: i32, what: &str) -> ApiResult<()> {
    if value <= 0 {
        return Err(ApiError::validation(format!(
            "{what} must be positive (got {value})"
        )));
    }
    Ok(())
}

impl CartGateway for ApiClient {
    #[instrument(skip(self, session), fields(user_id = %session.user_id()))]
    async fn cart_for_user(&self, session: &Session) -> ApiResult<Option<Cart>> {
        require_positive_id(session.user_id().as_i32(), "user id")?;

        let url = self.endpoint(&format!("cart/{}", session.user_id()))?;
        let response = Self::authed(self.http().get(url), session).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ApiError::from_status(status, "fetch cart"));
        }

        let cart = response.json::<Cart>().await?;
        Ok(Some(cart))
    }

    #[instrument(skip(self, session), fields(user_id = %session.user_id()))]
    async fn create_cart(&self, session: &Session) -> ApiResult<Cart> {
        require_positive_id(session.user_id().as_i32(), "user id")?;

        let url = self.endpoint("cart/create")?;
        let body = serde_json::json!({ "user_id": session.user_id() });
        let response = Self::authed(self.http().post(url), session)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::from_status(status, "create cart"));
        }
        Ok(response.json::<Cart>().await?)
    }

    #[instrument(skip(self, session), fields(cart_id = %cart_id, product_id = %product_id))]
    async fn add_product(
        &self,
        session: &Session,
        cart_id: CartId,
        product_id: ProductId,
        quantity: u32,
    ) -> ApiResult<Cart> {
        require_positive_id(cart_id.as_i32(), "cart id")?;
        require_positive_id(product_id.as_i32(), "product id")?;
        if quantity == 0 {
            return Err(ApiError::validation("quantity must be positive"));
        }

        let mut url = self.endpoint(&format!("cart/{cart_id}/add/product/{product_id}"))?;
        url.query_pairs_mut()
            .append_pair("quantity", &quantity.to_string());

        let response = Self::authed(self.http().put(url), session).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::from_status(status, "add product to cart"));
        }
        Ok(response.json::<Cart>().await?)
    }

    #[instrument(skip(self, session), fields(cart_id = %cart_id, product_id = %product_id))]
    async fn remove_product(
        &self,
        session: &Session,
        cart_id: CartId,
        product_id: ProductId,
    ) -> ApiResult<Cart> {
        require_positive_id(cart_id.as_i32(), "cart id")?;
        require_positive_id(product_id.as_i32(), "product id")?;

        let url = self.endpoint(&format!("cart/{cart_id}/delete/product/{product_id}"))?;
        let response = Self::authed(self.http().patch(url), session).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::from_status(status, "remove product from cart"));
        }
        Ok(response.json::<Cart>().await?)
    }

    #[instrument(skip(self, session), fields(cart_id = %cart_id))]
    async fn empty_cart(&self, session: &Session, cart_id: CartId) -> ApiResult<Cart> {
        require_positive_id(cart_id.as_i32(), "cart id")?;

        let url = self.endpoint(&format!("cart/{cart_id}/empty"))?;
        let response = Self::authed(self.http().patch(url), session).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::from_status(status, "empty cart"));
        }
        Ok(response.json::<Cart>().await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::StorefrontConfig;
    use crate::error::ErrorKind;
    use lubro_core::UserId;
    use secrecy::SecretString;

    fn client() -> ApiClient {
        let config = StorefrontConfig::for_base_url("http://localhost:4000").unwrap();
        ApiClient::new(&config).unwrap()
    }

    fn session(user_id: i32) -> Session {
        Session::new(UserId::new(user_id), SecretString::from("token"))
    }

    #[tokio::test]
    async fn test_zero_quantity_rejected_before_network() {
        // localhost:4000 is not listening; a Validation error proves no
        // request was attempted.
        let err = client()
            .add_product(&session(1), CartId::new(1), ProductId::new(1), 0)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_non_positive_ids_rejected_before_network() {
        let err = client()
            .add_product(&session(1), CartId::new(0), ProductId::new(1), 1)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let err = client()
            .remove_product(&session(1), CartId::new(1), ProductId::new(-2))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let err = client().cart_for_user(&session(0)).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }
}
