//! Cart commands.
//!
//! Every mutation degrades to local-only when the backend is unreachable;
//! the recorded error is echoed so the operator knows the mutation was not
//! mirrored.

use lubro_core::ProductId;

use super::{CliError, Context};

pub async fn add(slug: &str, quantity: u32, presentation: Option<String>) -> Result<(), CliError> {
    let mut ctx = Context::load()?;
    let product = ctx
        .catalog
        .product_by_slug(slug)
        .await?
        .ok_or_else(|| CliError::UnknownProduct(slug.to_string()))?;

    ctx.store.add_item(&product, quantity, presentation).await;
    report(&ctx);
    Ok(())
}

pub async fn remove(product_id: i32) -> Result<(), CliError> {
    let mut ctx = Context::load()?;
    ctx.store.remove_item(ProductId::new(product_id)).await;
    report(&ctx);
    Ok(())
}

pub async fn set_qty(product_id: i32, quantity: u32) -> Result<(), CliError> {
    let mut ctx = Context::load()?;
    ctx.store
        .update_quantity(ProductId::new(product_id), quantity)
        .await;
    report(&ctx);
    Ok(())
}

pub async fn clear() -> Result<(), CliError> {
    let mut ctx = Context::load()?;
    ctx.store.clear().await;
    report(&ctx);
    Ok(())
}

pub async fn sync() -> Result<(), CliError> {
    let mut ctx = Context::load()?;
    ctx.require_session()?;
    ctx.store.sync_with_server().await;
    report(&ctx);
    Ok(())
}

pub async fn show() -> Result<(), CliError> {
    let ctx = Context::load()?;
    print_cart(&ctx);
    Ok(())
}

fn report(ctx: &Context) {
    if let Some(error) = ctx.store.error() {
        tracing::warn!("Mutation applied locally only: {error}");
    }
    print_cart(ctx);
}

#[allow(clippy::print_stdout)]
fn print_cart(ctx: &Context) {
    let Some(cart) = ctx.store.cart() else {
        println!("Cart is empty.");
        return;
    };
    if cart.is_empty() {
        println!("Cart is empty.");
        return;
    }

    for item in &cart.items {
        let presentation = item.presentation.as_deref().unwrap_or("-");
        println!(
            "{:>5}  {:<40} {:>4} x {:>8}  = {:>9}  [{presentation}]",
            item.product_id,
            item.name,
            item.quantity,
            item.unit_price,
            item.line_total(),
        );
    }
    println!("Total: {} ({} items)", cart.total(), cart.item_count());
}
