//! Cart and cart line types with invariant-preserving mutations.
//!
//! Invariants enforced here:
//! - At most one [`CartItem`] per distinct product id (adds merge quantities).
//! - Quantities are always >= 1; setting a quantity to zero removes the line.
//! - Clearing a cart preserves its identity and owner.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{CartId, Product, ProductId, UserId};
use crate::pricing::resolve_price;

/// A single line in a cart.
///
/// Carries a denormalized snapshot of the product at add-time so the cart can
/// render without re-fetching the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    pub sku: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub presentation: Option<String>,
}

impl CartItem {
    /// Build a line from a catalog product.
    ///
    /// The unit price is resolved through the price resolver, so products
    /// without a server-assigned price still get a stable display price.
    #[must_use]
    pub fn from_product(product: &Product, quantity: u32, presentation: Option<String>) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            image: None,
            sku: product.sku.clone(),
            unit_price: resolve_price(product),
            quantity,
            presentation,
        }
    }

    /// Line total (unit price x quantity).
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// The client-visible, mutable collection of not-yet-ordered line items.
///
/// `id` is `None` for a purely local (anonymous or not-yet-synced) cart and
/// assigned by the backend once the cart is mirrored remotely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    #[serde(default)]
    pub id: Option<CartId>,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub items: Vec<CartItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// Create an empty local cart, not yet known to the backend.
    #[must_use]
    pub fn new_local(user_id: Option<UserId>) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            user_id,
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Look up the line for a product, if any.
    #[must_use]
    pub fn item(&self, product_id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|i| i.product_id == product_id)
    }

    /// Add a line, merging quantities if the product is already present.
    ///
    /// A zero-quantity add is ignored outright.
    pub fn add(&mut self, item: CartItem) {
        if item.quantity == 0 {
            return;
        }
        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|i| i.product_id == item.product_id)
        {
            existing.quantity = existing.quantity.saturating_add(item.quantity);
        } else {
            self.items.push(item);
        }
        self.touch();
    }

    /// Remove the line for a product entirely, regardless of quantity.
    ///
    /// Returns `true` if a line was removed.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id);
        let removed = self.items.len() != before;
        if removed {
            self.touch();
        }
        removed
    }

    /// Set the quantity of an existing line.
    ///
    /// A quantity of zero removes the line; a valid cart never holds a
    /// zero-quantity item. Unknown products are a no-op.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: u32) {
        if quantity == 0 {
            self.remove(product_id);
            return;
        }
        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product_id) {
            item.quantity = quantity;
            self.touch();
        }
    }

    /// Empty the cart, preserving its identifier and owner.
    pub fn clear_items(&mut self) {
        self.items.clear();
        self.touch();
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Total unit count across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(product_id: i32, quantity: u32) -> CartItem {
        CartItem {
            product_id: ProductId::new(product_id),
            name: format!("Product {product_id}"),
            image: None,
            sku: format!("SKU-{product_id}"),
            unit_price: Decimal::new(1250, 2),
            quantity,
            presentation: None,
        }
    }

    #[test]
    fn test_add_merges_same_product() {
        let mut cart = Cart::new_local(None);
        cart.add(item(1, 2));
        cart.add(item(2, 1));
        cart.add(item(1, 3));

        assert_eq!(cart.items.len(), 2);
        assert_eq!(cart.item(ProductId::new(1)).unwrap().quantity, 5);
        assert_eq!(cart.item(ProductId::new(2)).unwrap().quantity, 1);
    }

    #[test]
    fn test_add_zero_quantity_is_ignored() {
        let mut cart = Cart::new_local(None);
        cart.add(item(1, 0));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_zero_removes_line() {
        let mut cart = Cart::new_local(None);
        cart.add(item(1, 2));
        cart.set_quantity(ProductId::new(1), 0);
        assert!(cart.item(ProductId::new(1)).is_none());
        assert!(!cart.items.iter().any(|i| i.quantity == 0));
    }

    #[test]
    fn test_remove_unknown_product_is_noop() {
        let mut cart = Cart::new_local(None);
        cart.add(item(1, 1));
        assert!(!cart.remove(ProductId::new(99)));
        assert_eq!(cart.items.len(), 1);
    }

    #[test]
    fn test_clear_preserves_identity() {
        let mut cart = Cart::new_local(Some(UserId::new(8)));
        cart.id = Some(CartId::new(3));
        cart.add(item(1, 2));
        cart.add(item(2, 1));

        cart.clear_items();

        assert!(cart.is_empty());
        assert_eq!(cart.id, Some(CartId::new(3)));
        assert_eq!(cart.user_id, Some(UserId::new(8)));
    }

    #[test]
    fn test_totals() {
        let mut cart = Cart::new_local(None);
        cart.add(item(1, 2));
        cart.add(item(2, 1));
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.total(), Decimal::new(3750, 2));
    }
}
