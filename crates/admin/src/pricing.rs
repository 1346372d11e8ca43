//! Bulk price updates.

use lubro_core::ProductId;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::batch::BatchReport;
use crate::client::AdminApi;

/// A single price change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceUpdate {
    pub product_id: ProductId,
    pub price: Decimal,
}

/// Apply a batch of price changes, continuing past individual failures.
///
/// Returns a report listing which products were repriced and which were
/// not; a server-side rejection of one product never blocks the rest.
pub async fn bulk_reprice<A: AdminApi>(
    api: &A,
    updates: Vec<PriceUpdate>,
) -> BatchReport<ProductId> {
    let mut report = BatchReport::new();

    for update in updates {
        match api.set_price(update.product_id, update.price).await {
            Ok(()) => report.record_success(update.product_id),
            Err(err) => {
                warn!(product_id = %update.product_id, error = %err, "Price update failed");
                report.record_failure(format!("product {}", update.product_id), err);
            }
        }
    }

    info!(outcome = %report.summary(), "Reprice batch finished");
    report
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::{AdminError, AdminResult};
    use crate::images::{ImageUpload, ProductImage};
    use lubro_core::ImageId;

    struct MockApi {
        reject: ProductId,
    }

    impl AdminApi for MockApi {
        async fn attach_image(
            &self,
            _product_id: ProductId,
            _upload: &ImageUpload,
        ) -> AdminResult<ProductImage> {
            unreachable!("not used by pricing")
        }

        async fn reorder_images(
            &self,
            _product_id: ProductId,
            _order: &[ImageId],
        ) -> AdminResult<()> {
            unreachable!("not used by pricing")
        }

        async fn set_price(&self, product_id: ProductId, _price: Decimal) -> AdminResult<()> {
            if product_id == self.reject {
                return Err(AdminError::validation("rejected"));
            }
            Ok(())
        }
    }

    fn update(id: i32) -> PriceUpdate {
        PriceUpdate {
            product_id: ProductId::new(id),
            price: Decimal::new(1990, 2),
        }
    }

    #[tokio::test]
    async fn test_one_server_failure_out_of_five() {
        let api = MockApi {
            reject: ProductId::new(3),
        };
        let updates = (1..=5).map(update).collect();

        let report = bulk_reprice(&api, updates).await;

        assert_eq!(report.succeeded.len(), 4);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.summary(), "4 succeeded, 1 failed");
        assert!(!report.succeeded.contains(&ProductId::new(3)));
    }

    #[tokio::test]
    async fn test_all_success() {
        let api = MockApi {
            reject: ProductId::new(99),
        };
        let report = bulk_reprice(&api, vec![update(1), update(2)]).await;
        assert!(report.is_complete_success());
        assert_eq!(report.succeeded, vec![ProductId::new(1), ProductId::new(2)]);
    }
}
