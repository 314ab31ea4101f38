//! Order service providing the use cases behind the HTTP API.

use std::future::Future;
use std::time::Instant;

use common::{OrderId, PageRequest};
use domain::{CustomerId, Order, OrderError, OrderStatus};
use order_store::{OrderQuery, OrderStore};

use crate::commands::{
    AddItem, CreateOrder, NewItem, RemoveItem, TransitionStatus, UpdateItemQuantity,
};
use crate::error::{Result, ServiceError, StoreOperation};
use crate::page::OrderPage;

/// Service for managing orders.
///
/// Each mutating use case loads the order, applies one aggregate operation
/// and saves it back. The save is checked against the version that was
/// loaded, so two concurrent changes to one order cannot both succeed.
pub struct OrderService<S: OrderStore> {
    store: S,
}

impl<S: OrderStore> OrderService<S> {
    /// Creates a new order service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Creates a new order, adding any initial items.
    #[tracing::instrument(skip(self, cmd), fields(customer_id = %cmd.customer_id, items = cmd.items.len()))]
    pub async fn create_order(&self, cmd: CreateOrder) -> Result<Order> {
        let order = observe("create", async {
            let mut order = Order::new(cmd.customer_id)?;
            for item in &cmd.items {
                add_new_item(&mut order, item)?;
            }

            self.store
                .create(order)
                .await
                .map_err(|e| ServiceError::store(StoreOperation::Create, e))
        })
        .await?;

        metrics::counter!("orders_created_total").increment(1);
        tracing::info!(order_id = ?order.id(), total_cents = order.total_amount().cents(), "order created");
        Ok(order)
    }

    /// Loads an order by ID.
    #[tracing::instrument(skip(self))]
    pub async fn get_order(&self, order_id: OrderId) -> Result<Order> {
        observe("get", self.load(order_id)).await
    }

    /// Soft-deletes an order.
    #[tracing::instrument(skip(self))]
    pub async fn delete_order(&self, order_id: OrderId) -> Result<()> {
        observe("delete", async {
            self.load(order_id).await?;
            self.store
                .delete(order_id)
                .await
                .map_err(|e| ServiceError::store(StoreOperation::Delete, e))
        })
        .await?;

        metrics::counter!("orders_deleted_total").increment(1);
        tracing::info!(%order_id, "order deleted");
        Ok(())
    }

    /// Adds an item to an order, merging with an existing line for the same product.
    #[tracing::instrument(skip(self))]
    pub async fn add_item(&self, cmd: AddItem) -> Result<Order> {
        let item = cmd.item;
        let order = observe(
            "add_item",
            self.mutate(cmd.order_id, |order| add_new_item(order, &item)),
        )
        .await?;

        record_item_mutation("add");
        Ok(order)
    }

    /// Removes an item from an order.
    #[tracing::instrument(skip(self))]
    pub async fn remove_item(&self, cmd: RemoveItem) -> Result<Order> {
        let product_id = cmd.product_id;
        let order = observe(
            "remove_item",
            self.mutate(cmd.order_id, |order| order.remove_item(product_id)),
        )
        .await?;

        record_item_mutation("remove");
        Ok(order)
    }

    /// Sets the quantity of an item in an order.
    #[tracing::instrument(skip(self))]
    pub async fn update_item_quantity(&self, cmd: UpdateItemQuantity) -> Result<Order> {
        let (product_id, quantity) = (cmd.product_id, cmd.quantity);
        let order = observe(
            "update_item_quantity",
            self.mutate(cmd.order_id, |order| {
                order.update_item_quantity(product_id, quantity)
            }),
        )
        .await?;

        record_item_mutation("update_quantity");
        Ok(order)
    }

    /// Confirms a pending order.
    #[tracing::instrument(skip(self))]
    pub async fn confirm_order(&self, order_id: OrderId) -> Result<Order> {
        let order = observe("confirm", self.mutate(order_id, Order::confirm)).await?;
        record_transition(&order);
        Ok(order)
    }

    /// Cancels an order that has not shipped yet.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_order(&self, order_id: OrderId) -> Result<Order> {
        let order = observe("cancel", self.mutate(order_id, Order::cancel)).await?;
        record_transition(&order);
        Ok(order)
    }

    /// Moves an order to the named status, if the lifecycle allows it.
    #[tracing::instrument(skip(self))]
    pub async fn transition_status(&self, cmd: TransitionStatus) -> Result<Order> {
        let status = cmd.status;
        let order = observe(
            "transition_status",
            self.mutate(cmd.order_id, |order| order.transition_status(&status)),
        )
        .await?;

        record_transition(&order);
        Ok(order)
    }

    /// Lists all orders, newest first.
    #[tracing::instrument(skip(self))]
    pub async fn list_orders(&self, page: PageRequest) -> Result<OrderPage> {
        observe("list", self.page_of(OrderQuery::new(), page)).await
    }

    /// Lists one customer's orders, newest first.
    #[tracing::instrument(skip(self))]
    pub async fn customer_orders(
        &self,
        customer_id: CustomerId,
        page: PageRequest,
    ) -> Result<OrderPage> {
        observe(
            "customer_orders",
            self.page_of(OrderQuery::for_customer(customer_id), page),
        )
        .await
    }

    /// Lists the orders in a status, newest first.
    ///
    /// The status must be one of the lowercase status names.
    #[tracing::instrument(skip(self))]
    pub async fn orders_by_status(&self, status: &str, page: PageRequest) -> Result<OrderPage> {
        observe("orders_by_status", async {
            let status: OrderStatus = status.parse()?;
            self.page_of(OrderQuery::for_status(status), page).await
        })
        .await
    }

    async fn load(&self, order_id: OrderId) -> Result<Order> {
        self.store
            .get(order_id)
            .await
            .map_err(|e| ServiceError::store(StoreOperation::Fetch, e))?
            .ok_or(ServiceError::OrderNotFound(order_id))
    }

    async fn mutate<F>(&self, order_id: OrderId, change: F) -> Result<Order>
    where
        F: FnOnce(&mut Order) -> std::result::Result<(), OrderError> + Send,
    {
        let mut order = self.load(order_id).await?;
        change(&mut order)?;

        self.store
            .update(&order)
            .await
            .map_err(|e| ServiceError::store(StoreOperation::Update, e))
    }

    async fn page_of(&self, query: OrderQuery, page: PageRequest) -> Result<OrderPage> {
        let orders = self
            .store
            .list(query.clone().page(page))
            .await
            .map_err(|e| ServiceError::store(StoreOperation::List, e))?;

        let total = match self.store.count(&query).await {
            Ok(total) => total,
            Err(err) => {
                tracing::warn!(error = %err, "failed to count orders, using page length as total");
                orders.len() as u64
            }
        };

        Ok(OrderPage::new(orders, total, page))
    }
}

fn add_new_item(order: &mut Order, item: &NewItem) -> std::result::Result<(), OrderError> {
    order.add_item(
        item.product_id,
        &item.product_sku,
        &item.product_name,
        item.quantity,
        item.unit_price,
    )
}

/// Times a use case and records its failure, if any.
async fn observe<T>(operation: &'static str, work: impl Future<Output = Result<T>>) -> Result<T> {
    let start = Instant::now();
    let result = work.await;

    metrics::histogram!("order_operation_duration_seconds", "operation" => operation)
        .record(start.elapsed().as_secs_f64());

    if let Err(err) = &result {
        metrics::counter!("order_operation_failures_total", "operation" => operation).increment(1);
        if err.is_internal() {
            tracing::error!(operation, code = err.code(), error = %err, "order operation failed");
        } else {
            tracing::warn!(operation, code = err.code(), error = %err, "order operation rejected");
        }
    }

    result
}

fn record_item_mutation(operation: &'static str) {
    metrics::counter!("order_items_mutations_total", "operation" => operation).increment(1);
}

fn record_transition(order: &Order) {
    let to = order.status().as_str();
    metrics::counter!("order_status_transitions_total", "to" => to).increment(1);
    tracing::info!(order_id = ?order.id(), status = to, "order status changed");
}
