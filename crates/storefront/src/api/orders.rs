//! Remote order gateway.
//!
//! Orders are fetched for re-validation before edits and updated with a
//! full-replacement payload. Unlike cart reads, a missing order is an error
//! here - the edit bridge needs to distinguish "gone" from "unreachable".

use lubro_core::{Order, OrderId, OrderUpdate};
use tracing::instrument;

use super::ApiClient;
use crate::error::{ApiError, ApiResult};
use crate::session::Session;

/// Boundary to the remote order service.
#[allow(async_fn_in_trait)]
pub trait OrderGateway {
    /// Fetch an order by id.
    async fn order(&self, session: &Session, order_id: OrderId) -> ApiResult<Order>;

    /// Replace a pending order's contact info, business info, items, and
    /// notes wholesale.
    async fn update_order(
        &self,
        session: &Session,
        order_id: OrderId,
        update: &OrderUpdate,
    ) -> ApiResult<Order>;
}

impl OrderGateway for ApiClient {
    #[instrument(skip(self, session), fields(order_id = %order_id))]
    async fn order(&self, session: &Session, order_id: OrderId) -> ApiResult<Order> {
        if order_id.as_i32() <= 0 {
            return Err(ApiError::validation("order id must be positive"));
        }

        let url = self.endpoint(&format!("order/{order_id}"))?;
        let response = Self::authed(self.http().get(url), session).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::from_status(
                status,
                &format!("fetch order {order_id}"),
            ));
        }
        Ok(response.json::<Order>().await?)
    }

    #[instrument(skip(self, session, update), fields(order_id = %order_id, items = update.items.len()))]
    async fn update_order(
        &self,
        session: &Session,
        order_id: OrderId,
        update: &OrderUpdate,
    ) -> ApiResult<Order> {
        if order_id.as_i32() <= 0 {
            return Err(ApiError::validation("order id must be positive"));
        }
        if update.items.is_empty() {
            return Err(ApiError::validation("an order must contain at least one item"));
        }

        let url = self.endpoint(&format!("order/{order_id}"))?;
        let response = Self::authed(self.http().put(url), session)
            .json(update)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::from_status(
                status,
                &format!("update order {order_id}"),
            ));
        }
        Ok(response.json::<Order>().await?)
    }
}
