//! Command implementations and shared plumbing.

pub mod admin;
pub mod cart;
pub mod order;

use std::path::PathBuf;
use std::sync::Arc;

use lubro_core::UserId;
use lubro_storefront::api::{ApiClient, CatalogClient};
use lubro_storefront::cart::{CartStore, FileStorage};
use lubro_storefront::config::StorefrontConfig;
use lubro_storefront::error::ApiError;
use lubro_storefront::order_edit::EditError;
use lubro_storefront::session::Session;
use secrecy::SecretString;
use thiserror::Error;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] lubro_storefront::config::ConfigError),

    #[error(transparent)]
    AdminConfig(#[from] lubro_admin::config::ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Admin(#[from] lubro_admin::AdminError),

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error("no product found for slug '{0}'")]
    UnknownProduct(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("this command needs LUBRO_USER_ID and LUBRO_USER_TOKEN set")]
    NotAuthenticated,
}

/// Shared per-invocation context: config, API client, cart store.
pub struct Context {
    pub api: ApiClient,
    pub catalog: CatalogClient,
    pub store: CartStore<ApiClient, FileStorage>,
    session: Option<Session>,
}

impl Context {
    /// Load configuration and wire up the client and the persisted store.
    ///
    /// Cart state goes to `LUBRO_CART_STORAGE` or `.lubro/` by default so
    /// carts survive between invocations.
    pub fn load() -> Result<Self, CliError> {
        let config = StorefrontConfig::from_env()?;
        let api = ApiClient::new(&config)?;

        let dir = config
            .storage_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(".lubro"));
        let mut store = CartStore::new(Arc::new(api.clone()), FileStorage::new(dir));

        let session = session_from_env();
        if let Some(session) = session.clone() {
            store.attach_session(session);
        }

        Ok(Self {
            api: api.clone(),
            catalog: CatalogClient::new(api),
            store,
            session,
        })
    }

    /// The session, erroring for commands that cannot run anonymously.
    pub fn require_session(&self) -> Result<Session, CliError> {
        self.session.clone().ok_or(CliError::NotAuthenticated)
    }
}

/// Build a session from `LUBRO_USER_ID` / `LUBRO_USER_TOKEN`, if both are set.
fn session_from_env() -> Option<Session> {
    let user_id = std::env::var("LUBRO_USER_ID").ok()?.parse::<i32>().ok()?;
    let token = std::env::var("LUBRO_USER_TOKEN").ok()?;
    Some(Session::new(UserId::new(user_id), SecretString::from(token)))
}
