//! Order use case inputs.

use common::OrderId;
use domain::{CustomerId, Money, ProductId};

/// An item to place on an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub product_id: ProductId,
    pub product_sku: String,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Money,
}

impl NewItem {
    /// Creates a new item from its fields.
    pub fn new(
        product_id: impl Into<ProductId>,
        product_sku: impl Into<String>,
        product_name: impl Into<String>,
        quantity: i32,
        unit_price: Money,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            product_sku: product_sku.into(),
            product_name: product_name.into(),
            quantity,
            unit_price,
        }
    }
}

/// Command to create a new order, optionally with initial items.
#[derive(Debug, Clone)]
pub struct CreateOrder {
    /// The customer placing the order.
    pub customer_id: CustomerId,

    /// Items added in order; repeated products merge.
    pub items: Vec<NewItem>,
}

impl CreateOrder {
    /// Creates a new CreateOrder command with no items.
    pub fn for_customer(customer_id: impl Into<CustomerId>) -> Self {
        Self {
            customer_id: customer_id.into(),
            items: Vec::new(),
        }
    }

    /// Adds an initial item.
    pub fn with_item(mut self, item: NewItem) -> Self {
        self.items.push(item);
        self
    }
}

/// Command to add an item to an order.
#[derive(Debug, Clone)]
pub struct AddItem {
    pub order_id: OrderId,
    pub item: NewItem,
}

impl AddItem {
    /// Creates a new AddItem command.
    pub fn new(order_id: OrderId, item: NewItem) -> Self {
        Self { order_id, item }
    }
}

/// Command to remove an item from an order.
#[derive(Debug, Clone)]
pub struct RemoveItem {
    pub order_id: OrderId,
    pub product_id: ProductId,
}

impl RemoveItem {
    /// Creates a new RemoveItem command.
    pub fn new(order_id: OrderId, product_id: impl Into<ProductId>) -> Self {
        Self {
            order_id,
            product_id: product_id.into(),
        }
    }
}

/// Command to set the quantity of an item.
#[derive(Debug, Clone)]
pub struct UpdateItemQuantity {
    pub order_id: OrderId,
    pub product_id: ProductId,

    /// The new absolute quantity.
    pub quantity: i32,
}

impl UpdateItemQuantity {
    /// Creates a new UpdateItemQuantity command.
    pub fn new(order_id: OrderId, product_id: impl Into<ProductId>, quantity: i32) -> Self {
        Self {
            order_id,
            product_id: product_id.into(),
            quantity,
        }
    }
}

/// Command to move an order to a status named by string.
#[derive(Debug, Clone)]
pub struct TransitionStatus {
    pub order_id: OrderId,

    /// Lowercase status name, parsed by the aggregate.
    pub status: String,
}

impl TransitionStatus {
    /// Creates a new TransitionStatus command.
    pub fn new(order_id: OrderId, status: impl Into<String>) -> Self {
        Self {
            order_id,
            status: status.into(),
        }
    }
}
