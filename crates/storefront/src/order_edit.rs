//! Order edit bridge.
//!
//! Repurposes the cart store to stage edits to a previously placed order:
//! the order's lines are loaded into the cart, the user browses and mutates
//! them like a normal cart, and on confirmation the full item list is sent
//! to the order-update endpoint as a wholesale replacement.
//!
//! The bridge never trusts an in-memory or persisted order snapshot: the
//! order's status is re-validated against the backend on every entry (both
//! [`OrderEditBridge::begin`] and [`OrderEditBridge::resume`]), because only
//! pending orders may be edited and the order can change state underneath us
//! at any time.

use chrono::{DateTime, Duration, Utc};
use lubro_core::{
    BusinessInfo, CartItem, ContactInfo, CustomerType, Order, OrderId, OrderStatus, OrderUpdate,
    OrderValidationError, ProductId,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::api::{CartGateway, OrderGateway};
use crate::cart::{CartStore, EDIT_SESSION_KEY, StorageAdapter};
use crate::error::{ApiError, ErrorKind};
use crate::session::Session;

/// How long a persisted edit session stays resumable.
const EDIT_SESSION_TTL_MINUTES: i64 = 30;

/// Everything needed to finish an edit after the cart has been restaged.
///
/// Persisted under [`EDIT_SESSION_KEY`] so an edit survives a restart, but
/// treated as untrusted on every read: resuming re-validates the order
/// against the backend before anything else happens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditSession {
    pub order_id: OrderId,
    pub customer_type: CustomerType,
    pub contact: ContactInfo,
    #[serde(default)]
    pub business: Option<BusinessInfo>,
    #[serde(default)]
    pub notes: Option<String>,
    pub started_at: DateTime<Utc>,
}

impl EditSession {
    fn from_order(order: &Order) -> Self {
        Self {
            order_id: order.id,
            customer_type: order.customer_type,
            contact: order.contact.clone(),
            business: order.business.clone(),
            notes: order.notes.clone(),
            started_at: Utc::now(),
        }
    }

    fn is_expired(&self) -> bool {
        Utc::now() - self.started_at > Duration::minutes(EDIT_SESSION_TTL_MINUTES)
    }
}

/// Where the bridge currently is.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EditState {
    /// No order is being edited.
    #[default]
    Idle,
    /// An order's items are staged in the cart.
    Staged(EditSession),
    /// The update is in flight.
    Submitting(EditSession),
}

/// Failures of the edit workflow.
#[derive(Debug, Error)]
pub enum EditError {
    /// The order no longer exists on the backend.
    #[error("order {0} no longer exists")]
    OrderGone(OrderId),

    /// The order left the pending state and is now read-only.
    #[error("order {id} is {status} and can no longer be edited")]
    NotEditable { id: OrderId, status: OrderStatus },

    /// The order changed underneath a submission in flight.
    #[error("order {0} changed while it was being edited")]
    StaleOrder(OrderId),

    /// The persisted edit session outlived its validity window.
    #[error("the edit session has expired; start the edit again")]
    Expired,

    /// An edit operation was attempted with no edit in progress.
    #[error("no order edit is in progress")]
    NotStaged,

    /// The last remaining line cannot be removed.
    #[error("an order must keep at least one item")]
    LastItem,

    /// The current user may not edit this order.
    #[error("you are not allowed to edit order {0}")]
    Forbidden(OrderId),

    /// The staged payload failed local validation.
    #[error(transparent)]
    Invalid(#[from] OrderValidationError),

    /// The backend was unreachable or answered unexpectedly.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl EditError {
    /// Whether the edit is unrecoverable and the caller must leave the edit
    /// flow (as opposed to re-prompting the user to retry).
    #[must_use]
    pub const fn forces_exit(&self) -> bool {
        matches!(
            self,
            Self::OrderGone(_) | Self::NotEditable { .. } | Self::StaleOrder(_) | Self::Expired
        )
    }
}

/// Drives the Idle / Staged / Submitting edit workflow over a cart store.
///
/// The bridge owns the workflow state; the staged line items themselves
/// live in the [`CartStore`] it is pointed at, so product pages mutate the
/// staged order through the exact same calls they use for a normal cart.
#[derive(Debug, Default)]
pub struct OrderEditBridge {
    state: EditState,
}

impl OrderEditBridge {
    /// Create an idle bridge.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current workflow state.
    #[must_use]
    pub const fn state(&self) -> &EditState {
        &self.state
    }

    /// The order being edited, if any.
    #[must_use]
    pub const fn editing_order(&self) -> Option<OrderId> {
        match &self.state {
            EditState::Idle => None,
            EditState::Staged(s) | EditState::Submitting(s) => Some(s.order_id),
        }
    }

    /// Start editing an order.
    ///
    /// Re-fetches the order and verifies it is still pending, then stages
    /// its lines into the cart and persists the edit session. Any previous
    /// staging is discarded first.
    ///
    /// # Errors
    ///
    /// [`EditError::OrderGone`] when the order no longer exists,
    /// [`EditError::NotEditable`] when it left the pending state,
    /// [`EditError::Forbidden`] when it belongs to someone else, or
    /// [`EditError::Api`] on transport failure. On every error the bridge
    /// returns to idle with no staging data left behind.
    pub async fn begin<O, G, S>(
        &mut self,
        orders: &O,
        store: &mut CartStore<G, S>,
        session: &Session,
        order_id: OrderId,
    ) -> Result<(), EditError>
    where
        O: OrderGateway,
        G: CartGateway,
        S: StorageAdapter,
    {
        let order = match self.validate_order(orders, store, session, order_id).await {
            Ok(order) => order,
            Err(e) => {
                warn!(order_id = %order_id, error = %e, "Refusing to enter edit mode");
                return Err(e);
            }
        };

        let edit = EditSession::from_order(&order);
        store.stage_items(order.items.iter().map(CartItem::from).collect());
        Self::persist(store, &edit);
        info!(order_id = %order_id, items = order.items.len(), "Order staged for editing");
        self.state = EditState::Staged(edit);
        Ok(())
    }

    /// Resume a persisted edit session, e.g. after a restart.
    ///
    /// Returns `Ok(None)` when nothing was persisted. A found session is
    /// treated as untrusted: it is dropped if expired and the order is
    /// re-validated exactly as in [`Self::begin`] (without restaging the
    /// cart, whose lines were persisted alongside).
    ///
    /// # Errors
    ///
    /// [`EditError::Expired`] for an outlived session; otherwise the same
    /// failures as [`Self::begin`], each clearing all staging data.
    pub async fn resume<O, G, S>(
        &mut self,
        orders: &O,
        store: &mut CartStore<G, S>,
        session: &Session,
    ) -> Result<Option<OrderId>, EditError>
    where
        O: OrderGateway,
        G: CartGateway,
        S: StorageAdapter,
    {
        let Some(raw) = store.storage().load(EDIT_SESSION_KEY) else {
            return Ok(None);
        };
        let edit = match serde_json::from_str::<EditSession>(&raw) {
            Ok(edit) => edit,
            Err(e) => {
                warn!(error = %e, "Discarding unreadable persisted edit session");
                store.storage().remove(EDIT_SESSION_KEY);
                return Ok(None);
            }
        };

        if edit.is_expired() {
            self.clear_staging(store);
            return Err(EditError::Expired);
        }

        let order_id = edit.order_id;
        self.validate_order(orders, store, session, order_id).await?;
        self.state = EditState::Staged(edit);
        info!(order_id = %order_id, "Edit session resumed");
        Ok(Some(order_id))
    }

    /// Remove a staged line, refusing to remove the last one.
    ///
    /// # Errors
    ///
    /// [`EditError::NotStaged`] outside an edit, [`EditError::LastItem`]
    /// when the line is the only one left.
    pub async fn remove_item<G, S>(
        &mut self,
        store: &mut CartStore<G, S>,
        product_id: ProductId,
    ) -> Result<(), EditError>
    where
        G: CartGateway,
        S: StorageAdapter,
    {
        if !matches!(self.state, EditState::Staged(_)) {
            return Err(EditError::NotStaged);
        }
        if let Some(cart) = store.cart()
            && cart.items.len() == 1
            && cart.item(product_id).is_some()
        {
            return Err(EditError::LastItem);
        }
        store.remove_item(product_id).await;
        Ok(())
    }

    /// Submit the staged lines as a full replacement of the order.
    ///
    /// Validates locally first (non-empty, positive quantities, fiscal
    /// fields for wholesale) so an invalid payload never reaches the wire.
    /// Success clears all staging and returns the updated order.
    ///
    /// # Errors
    ///
    /// [`EditError::Invalid`] before any network call;
    /// [`EditError::StaleOrder`] when the order was consumed or left the
    /// pending state mid-edit (staging is force-cleared);
    /// [`EditError::Forbidden`] or [`EditError::Api`] otherwise, with the
    /// staging kept so the user can retry.
    pub async fn submit<O, G, S>(
        &mut self,
        orders: &O,
        store: &mut CartStore<G, S>,
        session: &Session,
    ) -> Result<Order, EditError>
    where
        O: OrderGateway,
        G: CartGateway,
        S: StorageAdapter,
    {
        let edit = match &self.state {
            EditState::Staged(edit) => edit.clone(),
            EditState::Idle | EditState::Submitting(_) => return Err(EditError::NotStaged),
        };

        let items = store
            .cart()
            .map(|cart| cart.items.iter().map(Into::into).collect())
            .unwrap_or_default();
        let update = OrderUpdate {
            contact: edit.contact.clone(),
            business: edit.business.clone(),
            items,
            notes: edit.notes.clone(),
        };
        update.validate(edit.customer_type)?;

        let order_id = edit.order_id;
        self.state = EditState::Submitting(edit.clone());
        match orders.update_order(session, order_id, &update).await {
            Ok(order) => {
                info!(order_id = %order_id, "Order updated; leaving edit mode");
                self.clear_staging(store);
                Ok(order)
            }
            Err(err) => match err.kind {
                ErrorKind::NotFound | ErrorKind::InvalidState => {
                    warn!(order_id = %order_id, error = %err, "Order went stale mid-edit");
                    self.clear_staging(store);
                    Err(EditError::StaleOrder(order_id))
                }
                ErrorKind::Forbidden => {
                    self.state = EditState::Staged(edit);
                    Err(EditError::Forbidden(order_id))
                }
                ErrorKind::Network | ErrorKind::Validation => {
                    self.state = EditState::Staged(edit);
                    Err(EditError::Api(err))
                }
            },
        }
    }

    /// Abandon the edit and drop all staging data.
    pub fn cancel<G, S>(&mut self, store: &mut CartStore<G, S>)
    where
        G: CartGateway,
        S: StorageAdapter,
    {
        self.clear_staging(store);
    }

    /// Re-fetch the order and verify it may be edited. Any failure drops all
    /// staging so no stale keys outlive an aborted entry.
    async fn validate_order<O, G, S>(
        &mut self,
        orders: &O,
        store: &mut CartStore<G, S>,
        session: &Session,
        order_id: OrderId,
    ) -> Result<Order, EditError>
    where
        O: OrderGateway,
        G: CartGateway,
        S: StorageAdapter,
    {
        let order = match orders.order(session, order_id).await {
            Ok(order) => order,
            Err(err) => {
                self.clear_staging(store);
                return Err(match err.kind {
                    ErrorKind::NotFound => EditError::OrderGone(order_id),
                    ErrorKind::Forbidden => EditError::Forbidden(order_id),
                    _ => EditError::Api(err),
                });
            }
        };
        if !order.is_editable() {
            self.clear_staging(store);
            return Err(EditError::NotEditable {
                id: order_id,
                status: order.status,
            });
        }
        Ok(order)
    }

    fn clear_staging<G, S>(&mut self, store: &mut CartStore<G, S>)
    where
        G: CartGateway,
        S: StorageAdapter,
    {
        self.state = EditState::Idle;
        store.storage().remove(EDIT_SESSION_KEY);
        // A refused entry must not touch the live shopping cart: only a
        // store that actually holds staged order lines gets reset.
        if store.is_staged() {
            store.reset();
        }
    }

    fn persist<G, S>(store: &CartStore<G, S>, edit: &EditSession)
    where
        G: CartGateway,
        S: StorageAdapter,
    {
        match serde_json::to_string(edit) {
            Ok(raw) => store.storage().store(EDIT_SESSION_KEY, &raw),
            Err(e) => warn!(error = %e, "Failed to persist edit session"),
        }
    }
}
