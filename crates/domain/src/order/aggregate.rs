//! Order aggregate implementation.

use chrono::{DateTime, Utc};
use common::OrderId;
use serde::{Deserialize, Serialize};

use super::{
    CustomerId, Money, OrderError, OrderItem, OrderStatus, ProductId,
    value_objects::validate_item,
};

/// Order aggregate root.
///
/// Owns its items and keeps `total_amount` equal to the sum of the item
/// totals. Every operation checks all of its preconditions before touching
/// any field, so a failed call leaves the order exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Assigned by the store on first persistence.
    id: Option<OrderId>,

    /// Optimistic concurrency token, maintained by the store.
    #[serde(default)]
    version: u64,

    customer_id: CustomerId,

    /// At most one entry per product, in insertion order.
    items: Vec<OrderItem>,

    total_amount: Money,

    status: OrderStatus,

    created_at: DateTime<Utc>,

    updated_at: DateTime<Utc>,
}

/// Persisted fields of an order, as read back by a store.
#[derive(Debug, Clone)]
pub struct OrderRecord {
    pub id: OrderId,
    pub version: u64,
    pub customer_id: CustomerId,
    pub items: Vec<OrderItem>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Construction
impl Order {
    /// Creates a new pending order for a customer.
    pub fn new(customer_id: CustomerId) -> Result<Self, OrderError> {
        if customer_id.is_zero() {
            return Err(OrderError::InvalidCustomerId);
        }

        let now = Utc::now();
        Ok(Self {
            id: None,
            version: 0,
            customer_id,
            items: Vec::new(),
            total_amount: Money::zero(),
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rebuilds an order from its persisted fields.
    ///
    /// The total is derived from the items rather than trusted from storage,
    /// and fails with [`OrderError::AmountOverflow`] if it does not fit.
    pub fn restore(record: OrderRecord) -> Result<Self, OrderError> {
        let mut order = Self {
            id: Some(record.id),
            version: record.version,
            customer_id: record.customer_id,
            items: record.items,
            total_amount: Money::zero(),
            status: record.status,
            created_at: record.created_at,
            updated_at: record.updated_at,
        };
        order.calculate_total()?;
        Ok(order)
    }

    /// Stamps the identity assigned by the store.
    pub fn assign_id(&mut self, id: OrderId) {
        self.id = Some(id);
    }

    /// Sets the concurrency token. Called by the store after a write.
    pub fn set_version(&mut self, version: u64) {
        self.version = version;
    }
}

// Query methods
impl Order {
    pub fn id(&self) -> Option<OrderId> {
        self.id
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Returns the items in insertion order.
    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the item for a product.
    pub fn get_item(&self, product_id: ProductId) -> Result<&OrderItem, OrderError> {
        self.position_of(product_id)
            .map(|index| &self.items[index])
            .ok_or(OrderError::ItemNotFound { product_id })
    }

    /// Returns the number of distinct products.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns the total quantity of all items.
    pub fn total_quantity(&self) -> i64 {
        self.items
            .iter()
            .map(|item| i64::from(item.quantity()))
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn can_be_cancelled(&self) -> bool {
        self.status.can_cancel()
    }

    /// Returns true if items may still be added, removed or changed.
    pub fn is_modifiable(&self) -> bool {
        self.status.can_modify_items()
    }

    pub fn is_pending(&self) -> bool {
        self.status == OrderStatus::Pending
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == OrderStatus::Confirmed
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == OrderStatus::Cancelled
    }

    pub fn is_delivered(&self) -> bool {
        self.status == OrderStatus::Delivered
    }
}

// Item operations
impl Order {
    /// Adds an item to the order.
    ///
    /// If the product is already present its quantity is increased by
    /// `quantity`; the stored SKU, name and unit price are kept.
    pub fn add_item(
        &mut self,
        product_id: ProductId,
        product_sku: &str,
        product_name: &str,
        quantity: i32,
        unit_price: Money,
    ) -> Result<(), OrderError> {
        self.ensure_modifiable()?;
        validate_item(product_id, product_sku, product_name, quantity, unit_price)?;

        let index = self.position_of(product_id);
        let item = match index {
            Some(index) => {
                let current = &self.items[index];
                let merged = current
                    .quantity()
                    .checked_add(quantity)
                    .ok_or(OrderError::InvalidQuantity { quantity })?;
                current.with_quantity(merged)?
            }
            None => OrderItem::new(product_id, product_sku, product_name, quantity, unit_price)?,
        };
        let total = self.total_with(index, Some(&item))?;

        match index {
            Some(index) => self.items[index] = item,
            None => self.items.push(item),
        }
        self.total_amount = total;
        self.touch();
        Ok(())
    }

    /// Removes the item for a product.
    pub fn remove_item(&mut self, product_id: ProductId) -> Result<(), OrderError> {
        self.ensure_modifiable()?;

        let index = self
            .position_of(product_id)
            .ok_or(OrderError::ItemNotFound { product_id })?;
        let total = self.total_with(Some(index), None)?;

        self.items.remove(index);
        self.total_amount = total;
        self.touch();
        Ok(())
    }

    /// Replaces the quantity of an existing item.
    pub fn update_item_quantity(
        &mut self,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<(), OrderError> {
        self.ensure_modifiable()?;

        if quantity <= 0 {
            return Err(OrderError::InvalidQuantity { quantity });
        }

        let index = self
            .position_of(product_id)
            .ok_or(OrderError::ItemNotFound { product_id })?;
        let item = self.items[index].with_quantity(quantity)?;
        let total = self.total_with(Some(index), Some(&item))?;

        self.items[index] = item;
        self.total_amount = total;
        self.touch();
        Ok(())
    }

    /// Recomputes every line total and the order total from the items.
    ///
    /// Idempotent. Useful after deserializing an order from an external source.
    /// On overflow the order is left unchanged.
    pub fn calculate_total(&mut self) -> Result<Money, OrderError> {
        let items = self
            .items
            .iter()
            .map(|item| item.with_quantity(item.quantity()))
            .collect::<Result<Vec<_>, _>>()?;
        let total = Money::checked_sum(items.iter().map(OrderItem::total_price))
            .ok_or(OrderError::AmountOverflow)?;

        self.items = items;
        self.total_amount = total;
        Ok(total)
    }
}

// Status transitions
impl Order {
    /// Confirms a pending order that has at least one item.
    pub fn confirm(&mut self) -> Result<(), OrderError> {
        if self.status != OrderStatus::Pending {
            return Err(OrderError::OnlyPendingCanBeConfirmed {
                status: self.status,
            });
        }

        if self.items.is_empty() {
            return Err(OrderError::EmptyOrder);
        }

        self.set_status(OrderStatus::Confirmed);
        Ok(())
    }

    /// Cancels the order if it has not shipped yet.
    pub fn cancel(&mut self) -> Result<(), OrderError> {
        if !self.can_be_cancelled() {
            return Err(OrderError::OrderCannotBeCancelled {
                status: self.status,
            });
        }

        self.set_status(OrderStatus::Cancelled);
        Ok(())
    }

    /// Moves a confirmed order to processing.
    pub fn start_processing(&mut self) -> Result<(), OrderError> {
        if self.status != OrderStatus::Confirmed {
            return Err(OrderError::OnlyConfirmedCanProcess {
                status: self.status,
            });
        }

        self.set_status(OrderStatus::Processing);
        Ok(())
    }

    /// Moves a processing order to shipped.
    pub fn ship(&mut self) -> Result<(), OrderError> {
        if self.status != OrderStatus::Processing {
            return Err(OrderError::OnlyProcessingCanShip {
                status: self.status,
            });
        }

        self.set_status(OrderStatus::Shipped);
        Ok(())
    }

    /// Moves a shipped order to delivered.
    pub fn deliver(&mut self) -> Result<(), OrderError> {
        if self.status != OrderStatus::Shipped {
            return Err(OrderError::OnlyShippedCanDeliver {
                status: self.status,
            });
        }

        self.set_status(OrderStatus::Delivered);
        Ok(())
    }

    /// Moves a delivered order to refunded.
    pub fn refund(&mut self) -> Result<(), OrderError> {
        if self.status != OrderStatus::Delivered {
            return Err(OrderError::OnlyDeliveredCanRefund {
                status: self.status,
            });
        }

        self.set_status(OrderStatus::Refunded);
        Ok(())
    }

    /// Routes to the transition that leads to `target`.
    ///
    /// `Pending` is the initial status only and can never be a target.
    pub fn transition_to(&mut self, target: OrderStatus) -> Result<(), OrderError> {
        match target {
            OrderStatus::Confirmed => self.confirm(),
            OrderStatus::Processing => self.start_processing(),
            OrderStatus::Shipped => self.ship(),
            OrderStatus::Delivered => self.deliver(),
            OrderStatus::Cancelled => self.cancel(),
            OrderStatus::Refunded => self.refund(),
            OrderStatus::Pending => Err(OrderError::UnsupportedTransition { target }),
        }
    }

    /// Parses `target` as a status and transitions to it.
    pub fn transition_status(&mut self, target: &str) -> Result<(), OrderError> {
        let target: OrderStatus = target.parse()?;
        self.transition_to(target)
    }
}

// Internal helpers
impl Order {
    fn position_of(&self, product_id: ProductId) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.product_id() == product_id)
    }

    /// Order total with the line at `replacing` swapped for `line`
    /// (dropped when `line` is `None`, appended when `replacing` is `None`).
    fn total_with(
        &self,
        replacing: Option<usize>,
        line: Option<&OrderItem>,
    ) -> Result<Money, OrderError> {
        let kept = self
            .items
            .iter()
            .enumerate()
            .filter(|(index, _)| Some(*index) != replacing)
            .map(|(_, item)| item.total_price());
        let added = line.map(OrderItem::total_price);

        Money::checked_sum(kept.chain(added)).ok_or(OrderError::AmountOverflow)
    }

    fn ensure_modifiable(&self) -> Result<(), OrderError> {
        if self.is_modifiable() {
            Ok(())
        } else {
            Err(OrderError::OrderNotModifiable {
                status: self.status,
            })
        }
    }

    fn set_status(&mut self, status: OrderStatus) {
        self.status = status;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
