//! The local cart store.
//!
//! Holds the current cart snapshot plus UI flags, persists the cart across
//! sessions through an injected [`StorageAdapter`], and mirrors mutations to
//! the backend when a session is attached. Mutations never return errors to
//! the caller - failures degrade to local-only behavior with the failure
//! recorded in the `error` field, because cart usability must never depend
//! on backend availability.
//!
//! Mutating methods take `&mut self`, so overlapping operations on one store
//! are structurally impossible; the request-generation counter additionally
//! guards against an authoritative response from a superseded request being
//! applied out of band.

use std::sync::Arc;

use lubro_core::{Cart, CartId, CartItem, Product, ProductId};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::policy::{Reconciliation, SyncOutcome, reconcile_mutation, reconcile_sync};
use super::storage::{CART_KEY, EDIT_SESSION_KEY, StorageAdapter};
use crate::api::CartGateway;
use crate::error::{ApiError, ApiResult};
use crate::session::Session;

/// The document written to persistent storage.
///
/// Deliberately excludes every transient field (error, drawer flag): only
/// the cart itself survives a reload.
#[derive(Debug, Serialize, Deserialize, Default)]
struct PersistedState {
    cart: Option<Cart>,
}

/// Client-side cart state container.
pub struct CartStore<G, S> {
    gateway: Arc<G>,
    storage: S,
    session: Option<Session>,
    cart: Option<Cart>,
    error: Option<String>,
    drawer_open: bool,
    staged: bool,
    generation: u64,
}

impl<G, S> CartStore<G, S>
where
    G: CartGateway,
    S: StorageAdapter,
{
    /// Create a store, restoring any persisted cart.
    ///
    /// A persisted edit session marks the restored cart as a staged order
    /// snapshot, so mirroring stays suspended across restarts.
    pub fn new(gateway: Arc<G>, storage: S) -> Self {
        let cart = storage
            .load(CART_KEY)
            .and_then(|raw| match serde_json::from_str::<PersistedState>(&raw) {
                Ok(state) => state.cart,
                Err(e) => {
                    warn!(error = %e, "Discarding unreadable persisted cart");
                    None
                }
            });
        let staged = cart.is_some() && storage.load(EDIT_SESSION_KEY).is_some();

        Self {
            gateway,
            storage,
            session: None,
            cart,
            error: None,
            drawer_open: false,
            staged,
            generation: 0,
        }
    }

    // =========================================================================
    // State access
    // =========================================================================

    /// The current cart snapshot, if any.
    #[must_use]
    pub const fn cart(&self) -> Option<&Cart> {
        self.cart.as_ref()
    }

    /// The last recorded failure, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The attached session, if any.
    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// The persistence adapter (also used for the order-edit handoff).
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Whether the cart drawer is open.
    #[must_use]
    pub const fn is_drawer_open(&self) -> bool {
        self.drawer_open
    }

    /// Open the cart drawer.
    pub const fn open_drawer(&mut self) {
        self.drawer_open = true;
    }

    /// Close the cart drawer.
    pub const fn close_drawer(&mut self) {
        self.drawer_open = false;
    }

    /// Toggle the cart drawer.
    pub const fn toggle_drawer(&mut self) {
        self.drawer_open = !self.drawer_open;
    }

    // =========================================================================
    // Session lifecycle
    // =========================================================================

    /// Attach an authenticated session.
    ///
    /// From this point mutations are mirrored remotely. Callers should
    /// follow up with [`Self::sync_with_server`] once auth is hydrated.
    pub fn attach_session(&mut self, session: Session) {
        self.session = Some(session);
    }

    /// Tear down on logout: drop the session and reset to the empty default
    /// state, removing persisted keys.
    pub fn clear_session(&mut self) {
        self.session = None;
        self.drawer_open = false;
        self.reset();
        self.storage.remove(EDIT_SESSION_KEY);
    }

    // =========================================================================
    // Cart operations
    // =========================================================================

    /// Add `quantity` units of a product.
    ///
    /// Remote-first when a session is attached; on remote failure or without
    /// a session the mutation is applied locally (merging quantities if the
    /// product already has a line). Never returns an error to the caller.
    pub async fn add_item(
        &mut self,
        product: &Product,
        quantity: u32,
        presentation: Option<String>,
    ) {
        if quantity == 0 {
            self.error = Some("quantity must be positive".to_string());
            return;
        }

        let generation = self.bump_generation();
        let remote = match self.remote_session() {
            Some(session) => Some(self.remote_add(&session, product.id, quantity).await),
            None => None,
        };

        match reconcile_mutation(remote) {
            Reconciliation::Authoritative(cart) => {
                self.apply_authoritative(cart, generation);
            }
            Reconciliation::LocalFallback(err) => {
                self.apply_local(|cart| {
                    cart.add(CartItem::from_product(product, quantity, presentation));
                });
                self.error = Some(err.to_string());
            }
            Reconciliation::LocalOnly => {
                self.apply_local(|cart| {
                    cart.add(CartItem::from_product(product, quantity, presentation));
                });
            }
        }
    }

    /// Remove a product's line entirely, regardless of quantity.
    ///
    /// A no-op when the product has no line in the cart.
    pub async fn remove_item(&mut self, product_id: ProductId) {
        if self
            .cart
            .as_ref()
            .is_none_or(|c| c.item(product_id).is_none())
        {
            return;
        }

        let generation = self.bump_generation();
        let remote = match (self.remote_session(), self.remote_id()) {
            (Some(session), Some(cart_id)) => Some(
                self.gateway
                    .remove_product(&session, cart_id, product_id)
                    .await,
            ),
            _ => None,
        };

        match reconcile_mutation(remote) {
            Reconciliation::Authoritative(cart) => {
                self.apply_authoritative(cart, generation);
            }
            Reconciliation::LocalFallback(err) => {
                self.apply_local(|cart| {
                    cart.remove(product_id);
                });
                self.error = Some(err.to_string());
            }
            Reconciliation::LocalOnly => {
                self.apply_local(|cart| {
                    cart.remove(product_id);
                });
            }
        }
    }

    /// Set the quantity of an existing line.
    ///
    /// A quantity of zero delegates to [`Self::remove_item`]. The backend
    /// has no set-quantity endpoint, so the remote path is remove-then-add;
    /// the remove must complete before the add is issued. If the add fails
    /// after a successful remove, local state adopts the emptied cart and
    /// records the error - it never fabricates the old quantity.
    pub async fn update_quantity(&mut self, product_id: ProductId, quantity: u32) {
        if quantity == 0 {
            return self.remove_item(product_id).await;
        }
        if self
            .cart
            .as_ref()
            .is_none_or(|c| c.item(product_id).is_none())
        {
            return;
        }

        let generation = self.bump_generation();
        match (self.remote_session(), self.remote_id()) {
            (Some(session), Some(cart_id)) => {
                match self
                    .gateway
                    .remove_product(&session, cart_id, product_id)
                    .await
                {
                    Ok(removed) => {
                        match self
                            .gateway
                            .add_product(&session, cart_id, product_id, quantity)
                            .await
                        {
                            Ok(cart) => {
                                self.apply_authoritative(cart, generation);
                            }
                            Err(err) => {
                                // The line is gone server-side; reflect that
                                // rather than pretending the update worked.
                                self.apply_authoritative(removed, generation);
                                self.error = Some(err.to_string());
                            }
                        }
                    }
                    Err(err) => {
                        self.apply_local(|cart| cart.set_quantity(product_id, quantity));
                        self.error = Some(err.to_string());
                    }
                }
            }
            _ => self.apply_local(|cart| cart.set_quantity(product_id, quantity)),
        }
    }

    /// Empty the cart, preserving its identifier and owner.
    pub async fn clear(&mut self) {
        if self.cart.is_none() {
            return;
        }

        let generation = self.bump_generation();
        let remote = match (self.remote_session(), self.remote_id()) {
            (Some(session), Some(cart_id)) => {
                Some(self.gateway.empty_cart(&session, cart_id).await)
            }
            _ => None,
        };

        match reconcile_mutation(remote) {
            Reconciliation::Authoritative(cart) => {
                self.apply_authoritative(cart, generation);
            }
            Reconciliation::LocalFallback(err) => {
                self.apply_local(Cart::clear_items);
                self.error = Some(err.to_string());
            }
            Reconciliation::LocalOnly => {
                self.apply_local(Cart::clear_items);
            }
        }
    }

    /// Fetch-or-create the user's remote cart and adopt it wholesale.
    ///
    /// Safe to call repeatedly. On fetch/create failure the local cart is
    /// kept untouched and the error recorded - a transient failure must
    /// never downgrade a populated cart to empty. A no-op without a session.
    pub async fn sync_with_server(&mut self) {
        let Some(session) = self.remote_session() else {
            return;
        };

        let generation = self.bump_generation();
        let result = match self.gateway.cart_for_user(&session).await {
            Ok(Some(cart)) => Ok(cart),
            Ok(None) => self.gateway.create_cart(&session).await,
            Err(err) => Err(err),
        };

        match reconcile_sync(result) {
            SyncOutcome::Replaced(cart) => {
                self.apply_authoritative(cart, generation);
            }
            SyncOutcome::KeptLocal(err) => {
                debug!(error = %err, "Sync failed; keeping local cart");
                self.error = Some(err.to_string());
            }
        }
    }

    // =========================================================================
    // Order-edit staging hooks
    // =========================================================================

    /// Replace the cart with a staged set of lines (order editing).
    ///
    /// While staged, mutations stay purely local even with a session
    /// attached: staged edits are only ever written back through the order
    /// update endpoint, never mirrored to the cart service, and sync is
    /// suspended so the server cart cannot clobber the staged snapshot.
    pub fn stage_items(&mut self, items: Vec<CartItem>) {
        let user_id = self.session.as_ref().map(Session::user_id);
        let mut cart = Cart::new_local(user_id);
        for item in items {
            cart.add(item);
        }
        self.cart = Some(cart);
        self.error = None;
        self.staged = true;
        self.persist();
    }

    /// Whether the cart currently holds a staged order snapshot.
    #[must_use]
    pub const fn is_staged(&self) -> bool {
        self.staged
    }

    /// Drop the cart and its persisted copy, leaving staged mode.
    pub fn reset(&mut self) {
        self.cart = None;
        self.error = None;
        self.staged = false;
        self.storage.remove(CART_KEY);
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn remote_id(&self) -> Option<CartId> {
        self.cart.as_ref().and_then(|c| c.id)
    }

    /// The session to mirror through, if mirroring applies right now.
    fn remote_session(&self) -> Option<Session> {
        if self.staged {
            return None;
        }
        self.session.clone()
    }

    /// The remote cart id for mutations, fetching or creating the backend
    /// cart if this client has never seen one.
    async fn ensure_remote_cart_id(&self, session: &Session) -> ApiResult<CartId> {
        if let Some(id) = self.remote_id() {
            return Ok(id);
        }
        let cart = match self.gateway.cart_for_user(session).await? {
            Some(cart) => cart,
            None => self.gateway.create_cart(session).await?,
        };
        cart.id
            .ok_or_else(|| ApiError::network("backend returned a cart without an id"))
    }

    async fn remote_add(
        &self,
        session: &Session,
        product_id: ProductId,
        quantity: u32,
    ) -> ApiResult<Cart> {
        let cart_id = self.ensure_remote_cart_id(session).await?;
        self.gateway
            .add_product(session, cart_id, product_id, quantity)
            .await
    }

    fn apply_local<F: FnOnce(&mut Cart)>(&mut self, mutate: F) {
        let user_id = self.session.as_ref().map(Session::user_id);
        let cart = self.cart.get_or_insert_with(|| Cart::new_local(user_id));
        mutate(cart);
        self.persist();
    }

    /// Adopt an authoritative cart from the backend.
    ///
    /// Returns `false` when `generation` is stale, i.e. another operation
    /// started after the one that produced this response; stale responses
    /// are discarded instead of clobbering newer state.
    fn apply_authoritative(&mut self, cart: Cart, generation: u64) -> bool {
        if generation != self.generation {
            debug!(
                stale = generation,
                current = self.generation,
                "Discarding authoritative cart from superseded request"
            );
            return false;
        }
        self.cart = Some(cart);
        self.error = None;
        self.persist();
        true
    }

    fn bump_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    fn persist(&self) {
        let state = PersistedState {
            cart: self.cart.clone(),
        };
        match serde_json::to_string(&state) {
            Ok(raw) => self.storage.store(CART_KEY, &raw),
            Err(e) => warn!(error = %e, "Failed to serialize cart for persistence"),
        }
    }
}
