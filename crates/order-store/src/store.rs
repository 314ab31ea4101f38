use async_trait::async_trait;
use domain::{CustomerId, Order, OrderStatus};

use crate::{OrderId, OrderQuery, Result};

/// Core trait for order store implementations.
///
/// A store persists whole orders, items included. Deleted orders are kept
/// but are invisible to every read. All implementations must be thread-safe
/// (Send + Sync).
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists a new order.
    ///
    /// Assigns a fresh identifier and version 1, ignoring whatever the
    /// order carried. Returns the order as stored.
    async fn create(&self, order: Order) -> Result<Order>;

    /// Retrieves a live order by id.
    ///
    /// Returns None if the order doesn't exist or has been deleted.
    async fn get(&self, id: OrderId) -> Result<Option<Order>>;

    /// Replaces a stored order with the given state.
    ///
    /// The stored version must equal `order.version()`, otherwise the call
    /// fails with `ConcurrencyConflict`. Returns the order with its version
    /// incremented.
    async fn update(&self, order: &Order) -> Result<Order>;

    /// Soft-deletes an order.
    ///
    /// Fails with `NotFound` if the order is absent or already deleted.
    async fn delete(&self, id: OrderId) -> Result<()>;

    /// Lists live orders matching a query, newest first.
    ///
    /// Orders are sorted by creation time, then by id, both descending.
    async fn list(&self, query: OrderQuery) -> Result<Vec<Order>>;

    /// Counts live orders matching a query's filters.
    ///
    /// Limit and offset are ignored.
    async fn count(&self, query: &OrderQuery) -> Result<u64>;
}

/// Extension trait providing convenience methods for order stores.
#[async_trait]
pub trait OrderStoreExt: OrderStore {
    /// Lists one customer's orders.
    async fn list_by_customer(
        &self,
        customer_id: CustomerId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Order>> {
        self.list(
            OrderQuery::for_customer(customer_id)
                .limit(limit)
                .offset(offset),
        )
        .await
    }

    /// Lists the orders currently in a status.
    async fn list_by_status(
        &self,
        status: OrderStatus,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Order>> {
        self.list(OrderQuery::for_status(status).limit(limit).offset(offset))
            .await
    }

    /// Counts one customer's orders.
    async fn count_by_customer(&self, customer_id: CustomerId) -> Result<u64> {
        self.count(&OrderQuery::for_customer(customer_id)).await
    }

    /// Counts the orders currently in a status.
    async fn count_by_status(&self, status: OrderStatus) -> Result<u64> {
        self.count(&OrderQuery::for_status(status)).await
    }

    /// Checks if a live order exists.
    async fn exists(&self, id: OrderId) -> Result<bool> {
        Ok(self.get(id).await?.is_some())
    }
}

// Blanket implementation for all OrderStore implementations
impl<T: OrderStore + ?Sized> OrderStoreExt for T {}
