//! In-process mock of the distributor's HTTP API.
//!
//! Spins up a real axum server on an ephemeral port so the end-to-end tests
//! exercise the actual `reqwest` gateways, the cart store, the edit bridge,
//! and the admin client over the wire. State is held in memory behind a
//! mutex and is fully scriptable: tests seed products and orders and can
//! inject failures per endpoint group.

#![cfg_attr(not(test), forbid(unsafe_code))]
// Handlers are only exercised from the tests/ directory.
#![allow(clippy::unwrap_used)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, patch, post, put};
use lubro_admin::images::{ImageUpload, ProductImage};
use lubro_core::{Cart, CartItem, Order, OrderStatus, OrderUpdate, Product};
use rust_decimal::Decimal;
use serde::Deserialize;

type SharedState = Arc<Mutex<BackendState>>;

/// Everything the mock backend knows.
#[derive(Default)]
pub struct BackendState {
    pub products: Vec<Product>,
    pub carts: HashMap<i32, Cart>,
    pub carts_by_user: HashMap<i32, i32>,
    pub orders: HashMap<i32, Order>,
    pub images: HashMap<i32, Vec<ProductImage>>,
    pub image_order: HashMap<i32, Vec<i32>>,
    next_cart_id: i32,
    next_image_id: i32,
    pub fail_cart_mutations: bool,
    pub rejected_image_urls: HashSet<String>,
    pub rejected_price_products: HashSet<i32>,
}

/// A running mock backend bound to an ephemeral local port.
pub struct MockBackend {
    pub base_url: String,
    state: SharedState,
}

impl MockBackend {
    /// Start the server and return a handle to it.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn spawn() -> Self {
        let state: SharedState = Arc::new(Mutex::new(BackendState::default()));

        let app = Router::new()
            .route("/product", get(list_products))
            .route("/product/filter", get(product_by_slug))
            .route("/cart/{user_id}", get(cart_for_user))
            .route("/cart/create", post(create_cart))
            .route("/cart/{cart_id}/add/product/{product_id}", put(add_product))
            .route(
                "/cart/{cart_id}/delete/product/{product_id}",
                patch(remove_product),
            )
            .route("/cart/{cart_id}/empty", patch(empty_cart))
            .route("/order/{order_id}", get(get_order).put(update_order))
            .route("/product/{product_id}/image", post(attach_image))
            .route("/product/{product_id}/image/order", put(reorder_images))
            .route("/product/{product_id}/price", patch(set_price))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve mock backend");
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    /// Run a closure against the backend state.
    pub fn with_state<R>(&self, f: impl FnOnce(&mut BackendState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    pub fn seed_product(&self, product: Product) {
        self.with_state(|s| s.products.push(product));
    }

    pub fn seed_order(&self, order: Order) {
        self.with_state(|s| {
            s.orders.insert(order.id.as_i32(), order);
        });
    }

    /// Make every cart mutation answer 500 until turned off again.
    pub fn fail_cart_mutations(&self, fail: bool) {
        self.with_state(|s| s.fail_cart_mutations = fail);
    }

    pub fn set_order_status(&self, order_id: i32, status: OrderStatus) {
        self.with_state(|s| {
            if let Some(order) = s.orders.get_mut(&order_id) {
                order.status = status;
            }
        });
    }
}

// =============================================================================
// Catalog
// =============================================================================

async fn list_products(State(state): State<SharedState>) -> Json<Vec<Product>> {
    Json(state.lock().unwrap().products.clone())
}

#[derive(Deserialize)]
struct SlugQuery {
    slug: String,
}

async fn product_by_slug(
    State(state): State<SharedState>,
    Query(query): Query<SlugQuery>,
) -> Result<Json<Product>, StatusCode> {
    state
        .lock()
        .unwrap()
        .products
        .iter()
        .find(|p| p.slug == query.slug)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

// =============================================================================
// Cart
// =============================================================================

async fn cart_for_user(
    State(state): State<SharedState>,
    Path(user_id): Path<i32>,
) -> Result<Json<Cart>, StatusCode> {
    let state = state.lock().unwrap();
    let cart_id = state.carts_by_user.get(&user_id).ok_or(StatusCode::NOT_FOUND)?;
    state
        .carts
        .get(cart_id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

#[derive(Deserialize)]
struct CreateCartBody {
    user_id: i32,
}

async fn create_cart(
    State(state): State<SharedState>,
    Json(body): Json<CreateCartBody>,
) -> Result<Json<Cart>, StatusCode> {
    let mut state = state.lock().unwrap();
    if state.fail_cart_mutations {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    state.next_cart_id += 1;
    let cart_id = state.next_cart_id;

    let mut cart = Cart::new_local(Some(lubro_core::UserId::new(body.user_id)));
    cart.id = Some(lubro_core::CartId::new(cart_id));
    state.carts.insert(cart_id, cart.clone());
    state.carts_by_user.insert(body.user_id, cart_id);
    Ok(Json(cart))
}

#[derive(Deserialize)]
struct QuantityQuery {
    quantity: u32,
}

async fn add_product(
    State(state): State<SharedState>,
    Path((cart_id, product_id)): Path<(i32, i32)>,
    Query(query): Query<QuantityQuery>,
) -> Result<Json<Cart>, StatusCode> {
    let mut state = state.lock().unwrap();
    if state.fail_cart_mutations {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    let product = state
        .products
        .iter()
        .find(|p| p.id.as_i32() == product_id)
        .cloned()
        .ok_or(StatusCode::NOT_FOUND)?;
    let cart = state.carts.get_mut(&cart_id).ok_or(StatusCode::NOT_FOUND)?;
    cart.add(CartItem::from_product(&product, query.quantity, None));
    Ok(Json(cart.clone()))
}

async fn remove_product(
    State(state): State<SharedState>,
    Path((cart_id, product_id)): Path<(i32, i32)>,
) -> Result<Json<Cart>, StatusCode> {
    let mut state = state.lock().unwrap();
    if state.fail_cart_mutations {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    let cart = state.carts.get_mut(&cart_id).ok_or(StatusCode::NOT_FOUND)?;
    cart.remove(lubro_core::ProductId::new(product_id));
    Ok(Json(cart.clone()))
}

async fn empty_cart(
    State(state): State<SharedState>,
    Path(cart_id): Path<i32>,
) -> Result<Json<Cart>, StatusCode> {
    let mut state = state.lock().unwrap();
    if state.fail_cart_mutations {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    let cart = state.carts.get_mut(&cart_id).ok_or(StatusCode::NOT_FOUND)?;
    cart.clear_items();
    Ok(Json(cart.clone()))
}

// =============================================================================
// Orders
// =============================================================================

async fn get_order(
    State(state): State<SharedState>,
    Path(order_id): Path<i32>,
) -> Result<Json<Order>, StatusCode> {
    state
        .lock()
        .unwrap()
        .orders
        .get(&order_id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn update_order(
    State(state): State<SharedState>,
    Path(order_id): Path<i32>,
    Json(update): Json<OrderUpdate>,
) -> Result<Json<Order>, StatusCode> {
    let mut state = state.lock().unwrap();
    let order = state.orders.get_mut(&order_id).ok_or(StatusCode::NOT_FOUND)?;
    if order.status != OrderStatus::Pending {
        return Err(StatusCode::CONFLICT);
    }
    if update.items.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    order.contact = update.contact;
    order.business = update.business;
    order.items = update.items;
    order.notes = update.notes;
    order.updated_at = chrono::Utc::now();
    Ok(Json(order.clone()))
}

// =============================================================================
// Admin
// =============================================================================

async fn attach_image(
    State(state): State<SharedState>,
    Path(product_id): Path<i32>,
    Json(upload): Json<ImageUpload>,
) -> Result<Json<ProductImage>, StatusCode> {
    let mut state = state.lock().unwrap();
    if state.rejected_image_urls.contains(&upload.url) {
        return Err(StatusCode::BAD_REQUEST);
    }
    state.next_image_id += 1;
    let image = ProductImage {
        id: lubro_core::ImageId::new(state.next_image_id),
        url: upload.url,
        display_order: 0,
    };
    state.images.entry(product_id).or_default().push(image.clone());
    Ok(Json(image))
}

#[derive(Deserialize)]
struct ReorderBody {
    image_ids: Vec<i32>,
}

async fn reorder_images(
    State(state): State<SharedState>,
    Path(product_id): Path<i32>,
    Json(body): Json<ReorderBody>,
) -> Result<StatusCode, StatusCode> {
    let mut state = state.lock().unwrap();
    let known: HashSet<i32> = state
        .images
        .get(&product_id)
        .map(|images| images.iter().map(|i| i.id.as_i32()).collect())
        .unwrap_or_default();
    if body.image_ids.iter().any(|id| !known.contains(id)) {
        return Err(StatusCode::BAD_REQUEST);
    }
    state.image_order.insert(product_id, body.image_ids);
    Ok(StatusCode::OK)
}

#[derive(Deserialize)]
struct PriceBody {
    price: Decimal,
}

async fn set_price(
    State(state): State<SharedState>,
    Path(product_id): Path<i32>,
    Json(body): Json<PriceBody>,
) -> Result<StatusCode, StatusCode> {
    let mut state = state.lock().unwrap();
    if state.rejected_price_products.contains(&product_id) || body.price <= Decimal::ZERO {
        return Err(StatusCode::BAD_REQUEST);
    }
    let product = state
        .products
        .iter_mut()
        .find(|p| p.id.as_i32() == product_id)
        .ok_or(StatusCode::NOT_FOUND)?;
    product.price = Some(body.price);
    Ok(StatusCode::OK)
}
