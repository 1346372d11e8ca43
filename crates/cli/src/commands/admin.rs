//! Admin batch commands.

use lubro_admin::BatchReport;
use lubro_admin::client::AdminClient;
use lubro_admin::config::AdminConfig;
use lubro_admin::images::{ImageUpload, attach_and_order};
use lubro_admin::pricing::{PriceUpdate, bulk_reprice};
use lubro_core::ProductId;
use rust_decimal::Decimal;

use super::CliError;

pub async fn reprice(raw_updates: &[String]) -> Result<(), CliError> {
    let updates = raw_updates
        .iter()
        .map(|raw| parse_update(raw))
        .collect::<Result<Vec<_>, _>>()?;

    let client = AdminClient::new(&AdminConfig::from_env()?)?;
    let report = bulk_reprice(&client, updates).await;
    print_report(&report, |id| format!("product {id}"));
    Ok(())
}

pub async fn images(product_id: i32, urls: Vec<String>) -> Result<(), CliError> {
    let uploads = urls
        .into_iter()
        .map(|url| ImageUpload {
            url,
            alt_text: None,
        })
        .collect();

    let client = AdminClient::new(&AdminConfig::from_env()?)?;
    let report = attach_and_order(&client, ProductId::new(product_id), uploads).await;
    print_report(&report, |image| {
        format!("image {} ({})", image.id, image.url)
    });
    Ok(())
}

/// Parse an `id=price` argument.
fn parse_update(raw: &str) -> Result<PriceUpdate, CliError> {
    let (id, price) = raw
        .split_once('=')
        .ok_or_else(|| CliError::InvalidArgument(format!("expected id=price, got '{raw}'")))?;
    let product_id = id
        .parse::<i32>()
        .map_err(|_| CliError::InvalidArgument(format!("invalid product id '{id}'")))?;
    let price = price
        .parse::<Decimal>()
        .map_err(|_| CliError::InvalidArgument(format!("invalid price '{price}'")))?;
    Ok(PriceUpdate {
        product_id: ProductId::new(product_id),
        price,
    })
}

#[allow(clippy::print_stdout)]
fn print_report<T>(report: &BatchReport<T>, describe: impl Fn(&T) -> String) {
    for item in &report.succeeded {
        println!("ok      {}", describe(item));
    }
    for failure in &report.failed {
        println!("FAILED  {}: {}", failure.label, failure.error);
    }
    println!("{}", report.summary());
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_update() {
        let update = parse_update("14=24.90").unwrap();
        assert_eq!(update.product_id, ProductId::new(14));
        assert_eq!(update.price, Decimal::new(2490, 2));
    }

    #[test]
    fn test_parse_update_rejects_garbage() {
        assert!(parse_update("14").is_err());
        assert!(parse_update("x=1.0").is_err());
        assert!(parse_update("14=cheap").is_err());
    }
}
