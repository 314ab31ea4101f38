use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use domain::Order;
use tokio::sync::RwLock;

use crate::{OrderId, OrderQuery, Result, StoreError, store::OrderStore};

struct StoredOrder {
    order: Order,
    deleted: bool,
}

struct State {
    orders: HashMap<OrderId, StoredOrder>,
    next_id: OrderId,
}

impl Default for State {
    fn default() -> Self {
        Self {
            orders: HashMap::new(),
            next_id: OrderId::new(1),
        }
    }
}

/// In-memory order store implementation for testing and local runs.
///
/// Provides the same interface and semantics as the PostgreSQL
/// implementation, soft delete included.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryOrderStore {
    /// Creates a new empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored orders, deleted ones included.
    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }

    /// Clears all orders and restarts id assignment.
    pub async fn clear(&self) {
        *self.state.write().await = State::default();
    }
}

fn window(orders: Vec<Order>, query: &OrderQuery) -> Vec<Order> {
    let offset = query
        .offset
        .map_or(0, |offset| usize::try_from(offset).unwrap_or(0));
    let orders = orders.into_iter().skip(offset);

    match query.limit {
        Some(limit) => orders
            .take(usize::try_from(limit).unwrap_or(0))
            .collect(),
        None => orders.collect(),
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create(&self, mut order: Order) -> Result<Order> {
        let mut state = self.state.write().await;

        let id = state.next_id;
        state.next_id = id.next();

        order.assign_id(id);
        order.set_version(1);
        state.orders.insert(
            id,
            StoredOrder {
                order: order.clone(),
                deleted: false,
            },
        );

        Ok(order)
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>> {
        let state = self.state.read().await;
        Ok(state
            .orders
            .get(&id)
            .filter(|stored| !stored.deleted)
            .map(|stored| stored.order.clone()))
    }

    async fn update(&self, order: &Order) -> Result<Order> {
        let id = order.id().ok_or(StoreError::MissingId)?;

        let mut state = self.state.write().await;
        let stored = state
            .orders
            .get_mut(&id)
            .filter(|stored| !stored.deleted)
            .ok_or(StoreError::NotFound(id))?;

        let actual = stored.order.version();
        if actual != order.version() {
            return Err(StoreError::ConcurrencyConflict {
                order_id: id,
                expected: order.version(),
                actual,
            });
        }

        let mut updated = order.clone();
        updated.set_version(actual + 1);
        stored.order = updated.clone();

        Ok(updated)
    }

    async fn delete(&self, id: OrderId) -> Result<()> {
        let mut state = self.state.write().await;
        match state.orders.get_mut(&id) {
            Some(stored) if !stored.deleted => {
                stored.deleted = true;
                Ok(())
            }
            _ => Err(StoreError::NotFound(id)),
        }
    }

    async fn list(&self, query: OrderQuery) -> Result<Vec<Order>> {
        let state = self.state.read().await;
        let mut orders: Vec<_> = state
            .orders
            .values()
            .filter(|stored| !stored.deleted && query.matches(&stored.order))
            .map(|stored| stored.order.clone())
            .collect();

        // Newest first, id breaks ties
        orders.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then(b.id().cmp(&a.id()))
        });

        Ok(window(orders, &query))
    }

    async fn count(&self, query: &OrderQuery) -> Result<u64> {
        let state = self.state.read().await;
        let count = state
            .orders
            .values()
            .filter(|stored| !stored.deleted && query.matches(&stored.order))
            .count();
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::OrderStoreExt;
    use domain::{CustomerId, Money, OrderStatus, ProductId};

    fn order_for(customer: u32) -> Order {
        let mut order = Order::new(CustomerId::new(customer)).unwrap();
        order
            .add_item(
                ProductId::new(1),
                "SKU-1",
                "Widget",
                2,
                Money::from_cents(250),
            )
            .unwrap();
        order
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids_and_first_version() {
        let store = InMemoryOrderStore::new();

        let first = store.create(order_for(1)).await.unwrap();
        let second = store.create(order_for(1)).await.unwrap();

        assert_eq!(first.id(), Some(OrderId::new(1)));
        assert_eq!(second.id(), Some(OrderId::new(2)));
        assert_eq!(first.version(), 1);
        assert_eq!(store.order_count().await, 2);
    }

    #[tokio::test]
    async fn get_returns_stored_order() {
        let store = InMemoryOrderStore::new();
        let created = store.create(order_for(5)).await.unwrap();

        let loaded = store.get(OrderId::new(1)).await.unwrap().unwrap();
        assert_eq!(loaded, created);
        assert_eq!(loaded.total_amount(), Money::from_cents(500));
    }

    #[tokio::test]
    async fn get_missing_order_returns_none() {
        let store = InMemoryOrderStore::new();
        assert!(store.get(OrderId::new(42)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_increments_version() {
        let store = InMemoryOrderStore::new();
        let mut order = store.create(order_for(1)).await.unwrap();

        order.confirm().unwrap();
        let updated = store.update(&order).await.unwrap();

        assert_eq!(updated.version(), 2);
        assert_eq!(updated.status(), OrderStatus::Confirmed);

        let loaded = store.get(OrderId::new(1)).await.unwrap().unwrap();
        assert_eq!(loaded, updated);
    }

    #[tokio::test]
    async fn stale_update_is_a_conflict() {
        let store = InMemoryOrderStore::new();
        let created = store.create(order_for(1)).await.unwrap();

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
        let loaded = store.get(OrderId::new(1)).await.unwrap().unwrap();
        assert_eq!(loaded.status(), OrderStatus::Confirmed);
    }

    #[tokio::test]
    async fn update_without_id_fails() {
        let store = InMemoryOrderStore::new();
        let result = store.update(&order_for(1)).await;
        assert!(matches!(result, Err(StoreError::MissingId)));
    }

    #[tokio::test]
    async fn update_missing_order_fails() {
        let store = InMemoryOrderStore::new();
        let mut order = order_for(1);
        order.assign_id(OrderId::new(9));

        let result = store.update(&order).await;
        assert!(matches!(result, Err(StoreError::NotFound(id)) if id == OrderId::new(9)));
    }

    #[tokio::test]
    async fn deleted_orders_are_invisible() {
        let store = InMemoryOrderStore::new();
        let order = store.create(order_for(1)).await.unwrap();
        store.create(order_for(1)).await.unwrap();

        store.delete(OrderId::new(1)).await.unwrap();

        assert!(store.get(OrderId::new(1)).await.unwrap().is_none());
        assert!(!store.exists(OrderId::new(1)).await.unwrap());
        assert_eq!(store.count(&OrderQuery::new()).await.unwrap(), 1);
        assert_eq!(store.list(OrderQuery::new()).await.unwrap().len(), 1);
        assert!(matches!(
            store.update(&order).await,
            Err(StoreError::NotFound(_))
        ));
        // Still held, only hidden
        assert_eq!(store.order_count().await, 2);
    }

    #[tokio::test]
    async fn deleting_twice_fails() {
        let store = InMemoryOrderStore::new();
        store.create(order_for(1)).await.unwrap();

        store.delete(OrderId::new(1)).await.unwrap();
        let result = store.delete(OrderId::new(1)).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn list_is_newest_first_and_paged() {
        let store = InMemoryOrderStore::new();
        for _ in 0..5 {
            store.create(order_for(1)).await.unwrap();
        }

        let all = store.list(OrderQuery::new()).await.unwrap();
        let ids: Vec<i64> = all.iter().map(|o| o.id().unwrap().as_i64()).collect();
        assert_eq!(ids, vec![5, 4, 3, 2, 1]);

        let page = store
            .list(OrderQuery::new().limit(2).offset(2))
            .await
            .unwrap();
        let ids: Vec<i64> = page.iter().map(|o| o.id().unwrap().as_i64()).collect();
        assert_eq!(ids, vec![3, 2]);

        let beyond = store
            .list(OrderQuery::new().limit(2).offset(10))
            .await
            .unwrap();
        assert!(beyond.is_empty());
    }

    #[tokio::test]
    async fn filters_by_customer_and_status() {
        let store = InMemoryOrderStore::new();
        store.create(order_for(1)).await.unwrap();
        let mut confirmed = store.create(order_for(2)).await.unwrap();
        store.create(order_for(2)).await.unwrap();

        confirmed.confirm().unwrap();
        store.update(&confirmed).await.unwrap();

        assert_eq!(
            store.count_by_customer(CustomerId::new(2)).await.unwrap(),
            2
        );
        assert_eq!(
            store
                .list_by_customer(CustomerId::new(1), 10, 0)
                .await
                .unwrap()
                .len(),
            1
        );
        assert_eq!(
            store.count_by_status(OrderStatus::Pending).await.unwrap(),
            2
        );

        let confirmed_orders = store
            .list_by_status(OrderStatus::Confirmed, 10, 0)
            .await
            .unwrap();
        assert_eq!(confirmed_orders.len(), 1);
        assert_eq!(confirmed_orders[0].id(), Some(OrderId::new(2)));
    }

    #[tokio::test]
    async fn count_ignores_paging() {
        let store = InMemoryOrderStore::new();
        for _ in 0..3 {
            store.create(order_for(1)).await.unwrap();
        }

        let query = OrderQuery::new().limit(1).offset(1);
        assert_eq!(store.count(&query).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn clear_resets_ids() {
        let store = InMemoryOrderStore::new();
        store.create(order_for(1)).await.unwrap();
        store.clear().await;

        assert_eq!(store.order_count().await, 0);
        let order = store.create(order_for(1)).await.unwrap();
        assert_eq!(order.id(), Some(OrderId::new(1)));
    }
}
