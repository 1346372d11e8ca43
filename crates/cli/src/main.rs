//! Lubro CLI - cart, order editing, and admin batch tools.
//!
//! # Usage
//!
//! ```bash
//! # Cart operations (anonymous, or authenticated via LUBRO_USER_ID/LUBRO_USER_TOKEN)
//! lubro cart add castrol-edge-5w30 --quantity 2
//! lubro cart set-qty 14 3
//! lubro cart show
//! lubro cart sync
//!
//! # Order editing
//! lubro order edit 42
//! lubro order remove-item 14
//! lubro order submit
//!
//! # Admin batches (requires LUBRO_ADMIN_TOKEN)
//! lubro admin reprice 14=24.90 15=19.50
//! lubro admin images 14 https://cdn.lubro.example/a.jpg https://cdn.lubro.example/b.jpg
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "lubro")]
#[command(author, version, about = "Lubro storefront and back-office CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Work with the local cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Edit a previously placed order
    Order {
        #[command(subcommand)]
        action: OrderAction,
    },
    /// Back-office batch operations
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Add a product to the cart by catalog slug
    Add {
        /// Product slug
        slug: String,

        /// Units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,

        /// Variant label, e.g. "1L" or "5L"
        #[arg(short, long)]
        presentation: Option<String>,
    },
    /// Remove a product's line from the cart
    Remove {
        /// Product id
        product_id: i32,
    },
    /// Set the quantity of an existing line (0 removes it)
    SetQty {
        /// Product id
        product_id: i32,

        /// New quantity
        quantity: u32,
    },
    /// Print the current cart
    Show,
    /// Empty the cart
    Clear,
    /// Adopt the authenticated user's server-side cart
    Sync,
}

#[derive(Subcommand)]
enum OrderAction {
    /// Stage a pending order's items for editing
    Edit {
        /// Order id
        order_id: i32,
    },
    /// Remove a line from the staged order
    RemoveItem {
        /// Product id
        product_id: i32,
    },
    /// Submit the staged items as a full order replacement
    Submit,
    /// Abandon the staged edit
    Cancel,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Bulk price update; each argument is `<product-id>=<price>`
    Reprice {
        /// Price changes as `id=price` pairs
        #[arg(required = true)]
        updates: Vec<String>,
    },
    /// Attach images to a product and apply display order
    Images {
        /// Product id
        product_id: i32,

        /// Image URLs in display order
        #[arg(required = true)]
        urls: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Cart { action } => match action {
            CartAction::Add {
                slug,
                quantity,
                presentation,
            } => commands::cart::add(&slug, quantity, presentation).await,
            CartAction::Remove { product_id } => commands::cart::remove(product_id).await,
            CartAction::SetQty {
                product_id,
                quantity,
            } => commands::cart::set_qty(product_id, quantity).await,
            CartAction::Show => commands::cart::show().await,
            CartAction::Clear => commands::cart::clear().await,
            CartAction::Sync => commands::cart::sync().await,
        },
        Commands::Order { action } => match action {
            OrderAction::Edit { order_id } => commands::order::edit(order_id).await,
            OrderAction::RemoveItem { product_id } => {
                commands::order::remove_item(product_id).await
            }
            OrderAction::Submit => commands::order::submit().await,
            OrderAction::Cancel => commands::order::cancel().await,
        },
        Commands::Admin { action } => match action {
            AdminAction::Reprice { updates } => commands::admin::reprice(&updates).await,
            AdminAction::Images { product_id, urls } => {
                commands::admin::images(product_id, urls).await
            }
        },
    }
}
