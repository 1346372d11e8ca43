//! Local cart store and reconciliation policy.
//!
//! The cart must stay usable whether the user is anonymous or authenticated
//! and whether the backend is reachable or not. The store applies the
//! remote-first/local-fallback pattern: with a session attached it asks the
//! backend first and adopts the authoritative response; on failure or
//! without a session it mutates local state directly and records the error.

mod policy;
mod storage;
mod store;

pub use policy::{Reconciliation, SyncOutcome, reconcile_mutation, reconcile_sync};
pub use storage::{
    CART_KEY, EDIT_SESSION_KEY, FileStorage, MemoryStorage, NoStorage, StorageAdapter,
};
pub use store::CartStore;
