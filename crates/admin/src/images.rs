//! Product image batch workflow.
//!
//! Images are attached one at a time; the display order is applied only
//! after every association has resolved, using the backend-assigned image
//! ids. The pre-upload list is never used for ordering, because a partial
//! failure would otherwise reorder against ids that do not exist.

use lubro_core::{ImageId, ProductId};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::batch::BatchReport;
use crate::client::AdminApi;

/// An image to associate with a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageUpload {
    pub url: String,
    #[serde(default)]
    pub alt_text: Option<String>,
}

/// An image as the backend knows it after association.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    pub id: ImageId,
    pub url: String,
    pub display_order: u32,
}

/// Attach a batch of images to a product, then apply display order.
///
/// Each association is attempted independently; a failure is recorded and
/// the rest of the batch continues. Once all associations have resolved, the
/// successfully attached images are reordered to match the upload sequence.
/// A reorder failure is recorded in the report like any other item failure.
pub async fn attach_and_order<A: AdminApi>(
    api: &A,
    product_id: ProductId,
    uploads: Vec<ImageUpload>,
) -> BatchReport<ProductImage> {
    let mut report = BatchReport::new();

    for upload in uploads {
        match api.attach_image(product_id, &upload).await {
            Ok(image) => report.record_success(image),
            Err(err) => {
                warn!(product_id = %product_id, url = %upload.url, error = %err, "Image association failed");
                report.record_failure(upload.url, err);
            }
        }
    }

    // Ordering uses the ids the backend actually assigned, never the
    // pre-upload list.
    if !report.succeeded.is_empty() {
        let resolved: Vec<ImageId> = report.succeeded.iter().map(|i| i.id).collect();
        if let Err(err) = api.reorder_images(product_id, &resolved).await {
            warn!(product_id = %product_id, error = %err, "Display order update failed");
            report.record_failure("display order", err);
        }
    }

    info!(product_id = %product_id, outcome = %report.summary(), "Image batch finished");
    report
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::{AdminError, AdminResult};
    use rust_decimal::Decimal;
    use std::sync::Mutex;

    #[derive(Debug, PartialEq, Eq)]
    enum Call {
        Attach(String),
        Reorder(Vec<ImageId>),
    }

    #[derive(Default)]
    struct MockApi {
        calls: Mutex<Vec<Call>>,
        fail_attach_urls: Vec<String>,
        fail_reorder: bool,
        next_id: Mutex<i32>,
    }

    impl AdminApi for MockApi {
        async fn attach_image(
            &self,
            _product_id: ProductId,
            upload: &ImageUpload,
        ) -> AdminResult<ProductImage> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Attach(upload.url.clone()));
            if self.fail_attach_urls.contains(&upload.url) {
                return Err(AdminError::validation("rejected by backend"));
            }
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            Ok(ProductImage {
                id: ImageId::new(*next * 100),
                url: upload.url.clone(),
                display_order: 0,
            })
        }

        async fn reorder_images(
            &self,
            _product_id: ProductId,
            order: &[ImageId],
        ) -> AdminResult<()> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Reorder(order.to_vec()));
            if self.fail_reorder {
                return Err(AdminError::validation("reorder rejected"));
            }
            Ok(())
        }

        async fn set_price(&self, _product_id: ProductId, _price: Decimal) -> AdminResult<()> {
            Ok(())
        }
    }

    fn upload(url: &str) -> ImageUpload {
        ImageUpload {
            url: url.to_string(),
            alt_text: None,
        }
    }

    #[tokio::test]
    async fn test_reorder_uses_resolved_ids_after_all_attachments() {
        let api = MockApi::default();
        let report = attach_and_order(
            &api,
            ProductId::new(1),
            vec![upload("a.jpg"), upload("b.jpg"), upload("c.jpg")],
        )
        .await;

        assert!(report.is_complete_success());
        let calls = api.calls.lock().unwrap();
        // All attachments strictly precede the single reorder call.
        assert_eq!(calls.len(), 4);
        assert_eq!(
            calls[3],
            Call::Reorder(vec![ImageId::new(100), ImageId::new(200), ImageId::new(300)])
        );
    }

    #[tokio::test]
    async fn test_one_failure_does_not_abort_the_batch() {
        let api = MockApi {
            fail_attach_urls: vec!["b.jpg".to_string()],
            ..MockApi::default()
        };
        let report = attach_and_order(
            &api,
            ProductId::new(1),
            vec![upload("a.jpg"), upload("b.jpg"), upload("c.jpg")],
        )
        .await;

        assert_eq!(report.succeeded.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].label, "b.jpg");

        // The reorder covers only the images that actually attached.
        let calls = api.calls.lock().unwrap();
        assert_eq!(
            calls.last().unwrap(),
            &Call::Reorder(vec![ImageId::new(100), ImageId::new(200)])
        );
    }

    #[tokio::test]
    async fn test_reorder_failure_is_reported_not_thrown() {
        let api = MockApi {
            fail_reorder: true,
            ..MockApi::default()
        };
        let report = attach_and_order(&api, ProductId::new(1), vec![upload("a.jpg")]).await;

        assert_eq!(report.succeeded.len(), 1);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].label, "display order");
    }

    #[tokio::test]
    async fn test_total_attach_failure_skips_reorder() {
        let api = MockApi {
            fail_attach_urls: vec!["a.jpg".to_string()],
            ..MockApi::default()
        };
        let report = attach_and_order(&api, ProductId::new(1), vec![upload("a.jpg")]).await;

        assert!(report.is_complete_failure());
        let calls = api.calls.lock().unwrap();
        assert!(!calls.iter().any(|c| matches!(c, Call::Reorder(_))));
    }
}
