use common::PageRequest;
use domain::Order;
use serde::Serialize;

/// One page of orders plus the total number matching the query.
#[derive(Debug, Clone, Serialize)]
pub struct OrderPage {
    pub orders: Vec<Order>,
    pub total: u64,
    pub page: i64,
    pub page_size: i64,
}

impl OrderPage {
    /// Builds a page from the orders found for a request.
    pub fn new(orders: Vec<Order>, total: u64, request: PageRequest) -> Self {
        Self {
            orders,
            total,
            page: request.page(),
            page_size: request.page_size(),
        }
    }
}
