//! Orders and the full-replacement order update payload.
//!
//! Orders are created by the checkout flow (out of scope here) and are
//! mutable only while [`OrderStatus::Pending`]. Order lines are frozen
//! snapshots - they carry no live product linkage beyond the product id
//! needed to round-trip an edit through the catalog.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{CartItem, CustomerType, OrderId, OrderStatus, ProductId, UserId};

/// Contact information block on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ContactInfo {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub postal_code: String,
}

/// Fiscal/business information, required for wholesale orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BusinessInfo {
    pub legal_name: String,
    pub tax_id: String,
    #[serde(default)]
    pub fiscal_address: String,
}

/// A frozen order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: String,
    pub sku: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub presentation: Option<String>,
}

impl OrderItem {
    /// Line total (unit price x quantity).
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

impl From<&CartItem> for OrderItem {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id,
            name: item.name.clone(),
            sku: item.sku.clone(),
            unit_price: item.unit_price,
            quantity: item.quantity,
            presentation: item.presentation.clone(),
        }
    }
}

impl From<&OrderItem> for CartItem {
    fn from(item: &OrderItem) -> Self {
        Self {
            product_id: item.product_id,
            name: item.name.clone(),
            image: None,
            sku: item.sku.clone(),
            unit_price: item.unit_price,
            quantity: item.quantity,
            presentation: item.presentation.clone(),
        }
    }
}

/// An order as served by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub status: OrderStatus,
    #[serde(default)]
    pub customer_type: CustomerType,
    pub contact: ContactInfo,
    #[serde(default)]
    pub business: Option<BusinessInfo>,
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Whether this order may still be edited.
    #[must_use]
    pub const fn is_editable(&self) -> bool {
        self.status.is_editable()
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().map(OrderItem::line_total).sum()
    }
}

/// Full-replacement update payload for a pending order.
///
/// The item list replaces the order's lines wholesale - the backend never
/// receives a diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderUpdate {
    pub contact: ContactInfo,
    #[serde(default)]
    pub business: Option<BusinessInfo>,
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Local validation failures for an [`OrderUpdate`].
///
/// These are always caught before any network call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderValidationError {
    /// An order can never be updated to hold zero items.
    #[error("an order must contain at least one item")]
    EmptyItems,

    /// Wholesale orders require the fiscal/business block.
    #[error("wholesale orders require business information")]
    MissingBusinessInfo,

    /// A required fiscal field is blank.
    #[error("business field '{0}' must not be empty")]
    BlankBusinessField(&'static str),

    /// A line carries an invalid quantity.
    #[error("invalid quantity for product {0}")]
    InvalidQuantity(ProductId),
}

impl OrderUpdate {
    /// Validate the payload against the order's customer type.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule: empty item list, a zero quantity, or
    /// missing/blank fiscal fields on a wholesale order.
    pub fn validate(&self, customer_type: CustomerType) -> Result<(), OrderValidationError> {
        if self.items.is_empty() {
            return Err(OrderValidationError::EmptyItems);
        }
        if let Some(bad) = self.items.iter().find(|i| i.quantity == 0) {
            return Err(OrderValidationError::InvalidQuantity(bad.product_id));
        }
        if customer_type.requires_business_info() {
            let business = self
                .business
                .as_ref()
                .ok_or(OrderValidationError::MissingBusinessInfo)?;
            if business.legal_name.trim().is_empty() {
                return Err(OrderValidationError::BlankBusinessField("legal_name"));
            }
            if business.tax_id.trim().is_empty() {
                return Err(OrderValidationError::BlankBusinessField("tax_id"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn order_item(product_id: i32, quantity: u32) -> OrderItem {
        OrderItem {
            product_id: ProductId::new(product_id),
            name: format!("Product {product_id}"),
            sku: format!("SKU-{product_id}"),
            unit_price: Decimal::new(990, 2),
            quantity,
            presentation: None,
        }
    }

    fn update(items: Vec<OrderItem>, business: Option<BusinessInfo>) -> OrderUpdate {
        OrderUpdate {
            contact: ContactInfo {
                name: "Jo Garage".to_string(),
                email: "jo@garage.example".to_string(),
                address: "1 Workshop Way".to_string(),
                ..ContactInfo::default()
            },
            business,
            items,
            notes: None,
        }
    }

    #[test]
    fn test_empty_items_rejected() {
        let err = update(vec![], None)
            .validate(CustomerType::Retail)
            .unwrap_err();
        assert_eq!(err, OrderValidationError::EmptyItems);
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let err = update(vec![order_item(1, 0)], None)
            .validate(CustomerType::Retail)
            .unwrap_err();
        assert_eq!(err, OrderValidationError::InvalidQuantity(ProductId::new(1)));
    }

    #[test]
    fn test_wholesale_requires_business_block() {
        let err = update(vec![order_item(1, 1)], None)
            .validate(CustomerType::Wholesale)
            .unwrap_err();
        assert_eq!(err, OrderValidationError::MissingBusinessInfo);
    }

    #[test]
    fn test_wholesale_blank_tax_id_rejected() {
        let business = BusinessInfo {
            legal_name: "Garage SA".to_string(),
            tax_id: "  ".to_string(),
            fiscal_address: String::new(),
        };
        let err = update(vec![order_item(1, 1)], Some(business))
            .validate(CustomerType::Wholesale)
            .unwrap_err();
        assert_eq!(err, OrderValidationError::BlankBusinessField("tax_id"));
    }

    #[test]
    fn test_retail_ignores_business_block() {
        assert!(update(vec![order_item(1, 1)], None)
            .validate(CustomerType::Retail)
            .is_ok());
    }

    #[test]
    fn test_item_roundtrip_through_cart() {
        let order_line = order_item(4, 3);
        let cart_line = CartItem::from(&order_line);
        assert_eq!(OrderItem::from(&cart_line), order_line);
    }
}
