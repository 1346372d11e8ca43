//! Order editing commands.
//!
//! The bridge's workflow state does not outlive a process, so every command
//! except `edit` first resumes the persisted edit session (re-validating the
//! order against the backend) before acting.

use lubro_core::{OrderId, ProductId};
use lubro_storefront::order_edit::{EditError, OrderEditBridge};
use lubro_storefront::session::Session;

use super::{CliError, Context};

pub async fn edit(order_id: i32) -> Result<(), CliError> {
    let mut ctx = Context::load()?;
    let session = ctx.require_session()?;
    let mut bridge = OrderEditBridge::new();

    let api = ctx.api.clone();
    bridge
        .begin(&api, &mut ctx.store, &session, OrderId::new(order_id))
        .await?;

    tracing::info!("Order {order_id} staged for editing; use `lubro cart` to adjust items");
    Ok(())
}

pub async fn remove_item(product_id: i32) -> Result<(), CliError> {
    let (mut ctx, mut bridge, _session) = resume().await?;
    bridge
        .remove_item(&mut ctx.store, ProductId::new(product_id))
        .await?;
    tracing::info!("Removed product {product_id} from the staged order");
    Ok(())
}

pub async fn submit() -> Result<(), CliError> {
    let (mut ctx, mut bridge, session) = resume().await?;
    let api = ctx.api.clone();
    let order = bridge.submit(&api, &mut ctx.store, &session).await?;
    tracing::info!(
        "Order {} updated: {} lines, total {}",
        order.id,
        order.items.len(),
        order.total()
    );
    Ok(())
}

pub async fn cancel() -> Result<(), CliError> {
    let (mut ctx, mut bridge, _session) = resume().await?;
    bridge.cancel(&mut ctx.store);
    tracing::info!("Edit abandoned");
    Ok(())
}

async fn resume() -> Result<(Context, OrderEditBridge, Session), CliError> {
    let mut ctx = Context::load()?;
    let session = ctx.require_session()?;
    let mut bridge = OrderEditBridge::new();

    let api = ctx.api.clone();
    match bridge.resume(&api, &mut ctx.store, &session).await? {
        Some(order_id) => {
            tracing::debug!("Resumed edit of order {order_id}");
            Ok((ctx, bridge, session))
        }
        None => Err(CliError::Edit(EditError::NotStaged)),
    }
}
