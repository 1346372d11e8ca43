//! Catalog product as served by the remote API.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ProductId;

/// A catalog product.
///
/// Products are read-mostly from the storefront's point of view; the backend
/// owns them. `price` is nullable because newly imported products have no
/// server-assigned price yet - display code must go through
/// [`crate::pricing::resolve_price`] instead of reading `price` directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub sku: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub description: String,
    /// Comma-separated variant options (e.g. "1L,5L,20L drum").
    #[serde(default)]
    pub presentation: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub stock: u32,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

const fn default_visible() -> bool {
    true
}

impl Product {
    /// Split the presentation string into individual variant options.
    ///
    /// Empty segments are dropped, so `"1L,,5L"` yields two options.
    #[must_use]
    pub fn presentations(&self) -> Vec<&str> {
        self.presentation
            .as_deref()
            .map(|p| {
                p.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}
