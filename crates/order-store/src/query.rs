use common::PageRequest;
use domain::{CustomerId, Order, OrderStatus};

/// Builder for constructing order list queries.
///
/// Filters are combined with AND. Limit and offset only apply to listing;
/// counting ignores them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderQuery {
    /// Filter by owning customer.
    pub customer_id: Option<CustomerId>,

    /// Filter by current status.
    pub status: Option<OrderStatus>,

    /// Maximum number of orders to return.
    pub limit: Option<i64>,

    /// Number of orders to skip.
    pub offset: Option<i64>,
}

impl OrderQuery {
    /// Creates a new query matching every live order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a query for a single customer's orders.
    pub fn for_customer(customer_id: CustomerId) -> Self {
        Self {
            customer_id: Some(customer_id),
            ..Default::default()
        }
    }

    /// Creates a query for orders in one status.
    pub fn for_status(status: OrderStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Filters by customer.
    pub fn customer_id(mut self, customer_id: CustomerId) -> Self {
        self.customer_id = Some(customer_id);
        self
    }

    /// Filters by status.
    pub fn status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Limits the number of orders returned.
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skips this many orders before returning results.
    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Applies the limit and offset of a page request.
    pub fn page(self, page: PageRequest) -> Self {
        self.limit(page.limit()).offset(page.offset())
    }

    /// Returns true if the order passes every filter of this query.
    pub fn matches(&self, order: &Order) -> bool {
        if let Some(customer_id) = self.customer_id
            && order.customer_id() != customer_id
        {
            return false;
        }
        if let Some(status) = self.status
            && order.status() != status
        {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{Money, ProductId};

    #[test]
    fn query_for_customer() {
        let query = OrderQuery::for_customer(CustomerId::new(7));

        assert_eq!(query.customer_id, Some(CustomerId::new(7)));
        assert!(query.status.is_none());
        assert!(query.limit.is_none());
    }

    #[test]
    fn query_builder_chain() {
        let query = OrderQuery::new()
            .customer_id(CustomerId::new(3))
            .status(OrderStatus::Shipped)
            .limit(25)
            .offset(50);

        assert_eq!(query.customer_id, Some(CustomerId::new(3)));
        assert_eq!(query.status, Some(OrderStatus::Shipped));
        assert_eq!(query.limit, Some(25));
        assert_eq!(query.offset, Some(50));
    }

    #[test]
    fn page_sets_limit_and_offset() {
        let query = OrderQuery::new().page(PageRequest::new(3, 20));

        assert_eq!(query.limit, Some(20));
        assert_eq!(query.offset, Some(60));
    }

    #[test]
    fn matches_applies_all_filters() {
        let mut order = Order::new(CustomerId::new(3)).unwrap();
        order
            .add_item(ProductId::new(1), "SKU", "Name", 1, Money::from_cents(10))
            .unwrap();
        order.confirm().unwrap();

        assert!(OrderQuery::new().matches(&order));
        assert!(OrderQuery::for_customer(CustomerId::new(3)).matches(&order));
        assert!(!OrderQuery::for_customer(CustomerId::new(4)).matches(&order));
        assert!(
            OrderQuery::for_status(OrderStatus::Confirmed)
                .customer_id(CustomerId::new(3))
                .matches(&order)
        );
        assert!(!OrderQuery::for_status(OrderStatus::Pending).matches(&order));
    }
}
