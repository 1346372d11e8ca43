//! End-to-end order editing: stage, mutate, submit over HTTP.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use chrono::Utc;
use lubro_core::{
    ContactInfo, CustomerType, Order, OrderId, OrderItem, OrderStatus, Product, ProductId, UserId,
};
use lubro_integration_tests::MockBackend;
use lubro_storefront::api::ApiClient;
use lubro_storefront::cart::{CartStore, EDIT_SESSION_KEY, MemoryStorage, StorageAdapter};
use lubro_storefront::config::StorefrontConfig;
use lubro_storefront::order_edit::{EditError, OrderEditBridge};
use lubro_storefront::session::Session;
use rust_decimal::Decimal;
use secrecy::SecretString;

fn product(id: i32, slug: &str) -> Product {
    Product {
        id: ProductId::new(id),
        name: format!("Product {id}"),
        slug: slug.to_string(),
        sku: format!("LUB-{id}"),
        categories: vec![],
        description: String::new(),
        presentation: None,
        price: Some(Decimal::new(2490, 2)),
        stock: 100,
        visible: true,
    }
}

fn order_item(product_id: i32, quantity: u32) -> OrderItem {
    OrderItem {
        product_id: ProductId::new(product_id),
        name: format!("Product {product_id}"),
        sku: format!("LUB-{product_id}"),
        unit_price: Decimal::new(2490, 2),
        quantity,
        presentation: None,
    }
}

fn pending_order(id: i32, items: Vec<OrderItem>) -> Order {
    let now = Utc::now();
    Order {
        id: OrderId::new(id),
        user_id: Some(UserId::new(7)),
        status: OrderStatus::Pending,
        customer_type: CustomerType::Retail,
        contact: ContactInfo {
            name: "Jo Garage".to_string(),
            email: "jo@garage.example".to_string(),
            address: "1 Workshop Way".to_string(),
            ..ContactInfo::default()
        },
        business: None,
        items,
        notes: None,
        created_at: now,
        updated_at: now,
    }
}

fn session() -> Session {
    Session::new(UserId::new(7), SecretString::from("test-token"))
}

fn client(backend: &MockBackend) -> ApiClient {
    let config = StorefrontConfig::for_base_url(&backend.base_url).unwrap();
    ApiClient::new(&config).unwrap()
}

#[tokio::test]
async fn test_full_edit_roundtrip() {
    let backend = MockBackend::spawn().await;
    backend.seed_product(product(1, "synth-5w30"));
    backend.seed_product(product(2, "gear-80w90"));
    backend.seed_order(pending_order(42, vec![order_item(1, 2)]));

    let api = client(&backend);
    let storage = Arc::new(MemoryStorage::new());
    let mut store = CartStore::new(Arc::new(api.clone()), Arc::clone(&storage));
    store.attach_session(session());
    let mut bridge = OrderEditBridge::new();

    bridge
        .begin(&api, &mut store, &session(), OrderId::new(42))
        .await
        .unwrap();
    assert!(store.is_staged());

    // Browse the catalog and add one more product; remove nothing.
    store.add_item(&product(2, "gear-80w90"), 1, None).await;
    assert_eq!(store.cart().unwrap().items.len(), 2);

    let updated = bridge.submit(&api, &mut store, &session()).await.unwrap();

    assert_eq!(updated.items.len(), 2);
    assert!(store.cart().is_none());
    assert!(storage.load(EDIT_SESSION_KEY).is_none());

    // The backend order now carries both lines.
    backend.with_state(|s| {
        let order = s.orders.get(&42).unwrap();
        assert_eq!(order.items.len(), 2);
        assert!(order.items.iter().any(|i| i.product_id == ProductId::new(2)));
    });
}

#[tokio::test]
async fn test_staged_edit_never_touches_cart_service() {
    let backend = MockBackend::spawn().await;
    backend.seed_product(product(2, "gear-80w90"));
    backend.seed_order(pending_order(42, vec![order_item(1, 2)]));

    let api = client(&backend);
    let mut store = CartStore::new(Arc::new(api.clone()), MemoryStorage::new());
    store.attach_session(session());
    let mut bridge = OrderEditBridge::new();
    bridge
        .begin(&api, &mut store, &session(), OrderId::new(42))
        .await
        .unwrap();

    store.add_item(&product(2, "gear-80w90"), 1, None).await;

    backend.with_state(|s| assert!(s.carts.is_empty()));
}

#[tokio::test]
async fn test_editing_shipped_order_is_refused() {
    let backend = MockBackend::spawn().await;
    let mut order = pending_order(42, vec![order_item(1, 2)]);
    order.status = OrderStatus::Shipped;
    backend.seed_order(order);

    let api = client(&backend);
    let storage = Arc::new(MemoryStorage::new());
    let mut store = CartStore::new(Arc::new(api.clone()), Arc::clone(&storage));
    let mut bridge = OrderEditBridge::new();

    let err = bridge
        .begin(&api, &mut store, &session(), OrderId::new(42))
        .await
        .unwrap_err();

    assert!(matches!(err, EditError::NotEditable { .. }));
    assert!(store.cart().is_none());
    assert!(storage.load(EDIT_SESSION_KEY).is_none());
}

#[tokio::test]
async fn test_order_canceled_mid_edit_forces_exit() {
    let backend = MockBackend::spawn().await;
    backend.seed_order(pending_order(42, vec![order_item(1, 2)]));

    let api = client(&backend);
    let storage = Arc::new(MemoryStorage::new());
    let mut store = CartStore::new(Arc::new(api.clone()), Arc::clone(&storage));
    let mut bridge = OrderEditBridge::new();
    bridge
        .begin(&api, &mut store, &session(), OrderId::new(42))
        .await
        .unwrap();

    // The order is consumed by the back office while the user is editing.
    backend.set_order_status(42, OrderStatus::Processing);

    let err = bridge.submit(&api, &mut store, &session()).await.unwrap_err();

    assert!(matches!(err, EditError::StaleOrder(_)));
    assert!(err.forces_exit());
    assert!(storage.load(EDIT_SESSION_KEY).is_none());
    assert!(store.cart().is_none());
}

#[tokio::test]
async fn test_resume_after_restart() {
    let backend = MockBackend::spawn().await;
    backend.seed_order(pending_order(42, vec![order_item(1, 2)]));

    let api = client(&backend);
    let storage = Arc::new(MemoryStorage::new());
    {
        let mut store = CartStore::new(Arc::new(api.clone()), Arc::clone(&storage));
        let mut bridge = OrderEditBridge::new();
        bridge
            .begin(&api, &mut store, &session(), OrderId::new(42))
            .await
            .unwrap();
    }

    // A fresh process sees the persisted cart and edit session.
    let mut store = CartStore::new(Arc::new(api.clone()), Arc::clone(&storage));
    assert!(store.is_staged());

    let mut bridge = OrderEditBridge::new();
    let resumed = bridge.resume(&api, &mut store, &session()).await.unwrap();
    assert_eq!(resumed, Some(OrderId::new(42)));

    let updated = bridge.submit(&api, &mut store, &session()).await.unwrap();
    assert_eq!(updated.items.len(), 1);
}
