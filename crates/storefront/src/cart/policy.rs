//! Reconciliation policy between local and remote cart state.
//!
//! The rules are deliberately small and closed:
//! - A successful remote mutation is authoritative and overwrites local
//!   state (and clears any recorded error).
//! - A failed remote mutation falls back to an equivalent local mutation
//!   with the error recorded; the user is never blocked.
//! - Without a session there is nothing to reconcile - mutations are
//!   local-only.
//! - A failed sync keeps the local cart untouched: a transient network
//!   failure must never downgrade a populated cart to empty.

use lubro_core::Cart;

use crate::error::{ApiError, ApiResult};

/// Outcome of reconciling a remote mutation attempt.
#[derive(Debug)]
pub enum Reconciliation {
    /// The backend answered; its cart replaces local state.
    Authoritative(Cart),
    /// The backend failed; apply the equivalent local mutation and record
    /// the error.
    LocalFallback(ApiError),
    /// No remote attempt was made (no session); mutate locally.
    LocalOnly,
}

/// Decide what a mutation does to local state.
///
/// `remote` is `None` when no remote call was attempted.
#[must_use]
pub fn reconcile_mutation(remote: Option<ApiResult<Cart>>) -> Reconciliation {
    match remote {
        Some(Ok(cart)) => Reconciliation::Authoritative(cart),
        Some(Err(err)) => Reconciliation::LocalFallback(err),
        None => Reconciliation::LocalOnly,
    }
}

/// Outcome of reconciling a sync (fetch-or-create) attempt.
#[derive(Debug)]
pub enum SyncOutcome {
    /// The backend's cart replaces local state wholesale.
    Replaced(Cart),
    /// The fetch/create failed; the local cart stays untouched.
    KeptLocal(ApiError),
}

/// Decide what a sync result does to local state.
#[must_use]
pub fn reconcile_sync(remote: ApiResult<Cart>) -> SyncOutcome {
    match remote {
        Ok(cart) => SyncOutcome::Replaced(cart),
        Err(err) => SyncOutcome::KeptLocal(err),
    }
}
