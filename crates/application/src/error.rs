//! Service error types.

use common::OrderId;
use domain::OrderError;
use order_store::StoreError;
use thiserror::Error;

/// The store call a use case was making when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOperation {
    Create,
    Fetch,
    Update,
    Delete,
    List,
}

impl StoreOperation {
    /// Returns the stable machine-readable failure code.
    pub fn code(&self) -> &'static str {
        match self {
            StoreOperation::Create => "FAILED_TO_CREATE_ORDER",
            StoreOperation::Fetch => "FAILED_TO_FETCH_ORDER",
            StoreOperation::Update => "FAILED_TO_UPDATE_ORDER",
            StoreOperation::Delete => "FAILED_TO_DELETE_ORDER",
            StoreOperation::List => "FAILED_TO_LIST_ORDERS",
        }
    }
}

impl std::fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let verb = match self {
            StoreOperation::Create => "create order",
            StoreOperation::Fetch => "fetch order",
            StoreOperation::Update => "update order",
            StoreOperation::Delete => "delete order",
            StoreOperation::List => "list orders",
        };
        f.write_str(verb)
    }
}

/// Errors that can occur while running an order use case.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The aggregate rejected the operation.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// The order does not exist or has been deleted.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// The order changed between load and save.
    #[error("Order {0} was modified concurrently, reload and retry")]
    Conflict(OrderId),

    /// The store failed for a reason unrelated to the request.
    #[error("Failed to {operation}: {source}")]
    Store {
        operation: StoreOperation,
        #[source]
        source: StoreError,
    },
}

impl ServiceError {
    /// Wraps a store error, lifting the cases callers can act on.
    pub fn store(operation: StoreOperation, source: StoreError) -> Self {
        match source {
            StoreError::NotFound(id) => ServiceError::OrderNotFound(id),
            StoreError::ConcurrencyConflict { order_id, .. } => ServiceError::Conflict(order_id),
            source => ServiceError::Store { operation, source },
        }
    }

    /// Returns the stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Order(err) => err.code(),
            ServiceError::OrderNotFound(_) => "ORDER_NOT_FOUND",
            ServiceError::Conflict(_) => "ORDER_CONFLICT",
            ServiceError::Store { operation, .. } => operation.code(),
        }
    }

    /// Returns true if the failure is on the service side rather than the request.
    pub fn is_internal(&self) -> bool {
        matches!(self, ServiceError::Store { .. })
    }
}

/// Convenience type alias for service results.
pub type Result<T> = std::result::Result<T, ServiceError>;
