//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p order-store --test postgres_integration -- --test-threads=1
//! ```

use std::sync::Arc;

use domain::{CustomerId, Money, Order, OrderStatus, ProductId};
use order_store::{
    OrderId, OrderQuery, OrderStore, OrderStoreExt, PostgresOrderStore, StoreError,
};
use sqlx::PgPool;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            // Create a temporary pool just for migrations
            let temp_pool = PgPool::connect(&connection_string).await.unwrap();

            sqlx::raw_sql(include_str!(
                "../../../migrations/001_create_orders_tables.sql"
            ))
            .execute(&temp_pool)
            .await
            .unwrap();

            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and cleared tables
async fn get_test_store() -> PostgresOrderStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE order_items, orders RESTART IDENTITY")
        .execute(&pool)
        .await
        .unwrap();

    PostgresOrderStore::new(pool)
}

fn order_with_items(customer: u32) -> Order {
    let mut order = Order::new(CustomerId::new(customer)).unwrap();
    order
        .add_item(
            ProductId::new(20),
            "SKU-20",
            "Keyboard",
            2,
            Money::from_cents(4999),
        )
        .unwrap();
    order
        .add_item(ProductId::new(5), "SKU-5", "Mouse", 1, Money::from_cents(1999))
        .unwrap();
    order
}

#[tokio::test]
async fn create_and_get_round_trip() {
    let store = get_test_store().await;

    let created = store.create(order_with_items(11)).await.unwrap();
    let id = created.id().unwrap();
    assert_eq!(created.version(), 1);

    let loaded = store.get(id).await.unwrap().unwrap();
    assert_eq!(loaded, created);
    assert_eq!(loaded.customer_id(), CustomerId::new(11));
    assert_eq!(loaded.status(), OrderStatus::Pending);
    assert_eq!(loaded.total_amount(), Money::from_cents(2 * 4999 + 1999));

    // Item order survives storage
    let products: Vec<u32> = loaded
        .items()
        .iter()
        .map(|item| item.product_id().as_u32())
        .collect();
    assert_eq!(products, vec![20, 5]);
    assert_eq!(loaded.items()[0].product_sku(), "SKU-20");
    assert_eq!(loaded.items()[1].product_name(), "Mouse");
}

#[tokio::test]
async fn get_missing_order_returns_none() {
    let store = get_test_store().await;
    assert!(store.get(OrderId::new(999)).await.unwrap().is_none());
}

#[tokio::test]
async fn update_replaces_items_and_status() {
    let store = get_test_store().await;
    let mut order = store.create(order_with_items(1)).await.unwrap();

    order.remove_item(ProductId::new(20)).unwrap();
    order.update_item_quantity(ProductId::new(5), 4).unwrap();
    order
        .add_item(ProductId::new(8), "SKU-8", "Cable", 3, Money::from_cents(500))
        .unwrap();
    order.confirm().unwrap();

    let updated = store.update(&order).await.unwrap();
    assert_eq!(updated.version(), 2);

    let loaded = store.get(order.id().unwrap()).await.unwrap().unwrap();
    assert_eq!(loaded, updated);
    assert_eq!(loaded.status(), OrderStatus::Confirmed);
    assert_eq!(loaded.item_count(), 2);
    assert_eq!(loaded.get_item(ProductId::new(5)).unwrap().quantity(), 4);
    assert_eq!(loaded.total_amount(), Money::from_cents(4 * 1999 + 3 * 500));
}

#[tokio::test]
async fn stale_update_is_a_conflict() {
    let store = get_test_store().await;
    let created = store.create(order_with_items(1)).await.unwrap();

    let mut first = created.clone();
    first.confirm().unwrap();
    store.update(&first).await.unwrap();

    let mut stale = created;
    stale.cancel().unwrap();
    let result = store.update(&stale).await;

    assert!(matches!(
        result,
        Err(StoreError::ConcurrencyConflict {
            expected: 1,
            actual: 2,
            ..
        })
    ));

    let loaded = store.get(stale.id().unwrap()).await.unwrap().unwrap();
    assert_eq!(loaded.status(), OrderStatus::Confirmed);
}

#[tokio::test]
async fn update_without_id_fails() {
    let store = get_test_store().await;
    let result = store.update(&order_with_items(1)).await;
    assert!(matches!(result, Err(StoreError::MissingId)));
}

#[tokio::test]
async fn soft_delete_hides_order() {
    let store = get_test_store().await;
    let deleted = store.create(order_with_items(3)).await.unwrap();
    store.create(order_with_items(3)).await.unwrap();

    let id = deleted.id().unwrap();
    store.delete(id).await.unwrap();

    assert!(store.get(id).await.unwrap().is_none());
    assert!(!store.exists(id).await.unwrap());
    assert_eq!(store.count_by_customer(CustomerId::new(3)).await.unwrap(), 1);
    assert!(matches!(
        store.update(&deleted).await,
        Err(StoreError::NotFound(_))
    ));
    assert!(matches!(store.delete(id).await, Err(StoreError::NotFound(_))));

    // Row is still present
    let raw: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(raw, 2);
}

#[tokio::test]
async fn list_is_newest_first_with_paging() {
    let store = get_test_store().await;
    let mut ids = Vec::new();
    for _ in 0..5 {
        ids.push(store.create(order_with_items(1)).await.unwrap().id().unwrap());
    }
    ids.reverse();

    let all = store.list(OrderQuery::new()).await.unwrap();
    let listed: Vec<OrderId> = all.iter().map(|o| o.id().unwrap()).collect();
    assert_eq!(listed, ids);
    assert!(all.iter().all(|o| o.item_count() == 2));

    let page = store
        .list(OrderQuery::new().limit(2).offset(2))
        .await
        .unwrap();
    let listed: Vec<OrderId> = page.iter().map(|o| o.id().unwrap()).collect();
    assert_eq!(listed, ids[2..4].to_vec());

    assert_eq!(
        store.count(&OrderQuery::new().limit(1)).await.unwrap(),
        5
    );
}

#[tokio::test]
async fn filters_by_customer_and_status() {
    let store = get_test_store().await;
    store.create(order_with_items(1)).await.unwrap();
    let mut shipped = store.create(order_with_items(2)).await.unwrap();
    store.create(order_with_items(2)).await.unwrap();

    for target in [
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Shipped,
    ] {
        shipped.transition_to(target).unwrap();
        shipped = store.update(&shipped).await.unwrap();
    }
    assert_eq!(shipped.version(), 4);

    let customer_two = store
        .list_by_customer(CustomerId::new(2), 10, 0)
        .await
        .unwrap();
    assert_eq!(customer_two.len(), 2);

    let by_status = store
        .list_by_status(OrderStatus::Shipped, 10, 0)
        .await
        .unwrap();
    assert_eq!(by_status.len(), 1);
    assert_eq!(by_status[0].id(), shipped.id());

    assert_eq!(store.count_by_status(OrderStatus::Pending).await.unwrap(), 2);
    assert_eq!(
        store
            .count(
                &OrderQuery::for_customer(CustomerId::new(2)).status(OrderStatus::Pending)
            )
            .await
            .unwrap(),
        1
    );
}

#[tokio::test]
async fn empty_list_returns_no_orders() {
    let store = get_test_store().await;
    assert!(store.list(OrderQuery::new()).await.unwrap().is_empty());
    assert_eq!(store.count(&OrderQuery::new()).await.unwrap(), 0);
}
