//! Order aggregate and related types.

mod aggregate;
mod state;
mod value_objects;

pub use aggregate::{Order, OrderRecord};
pub use state::OrderStatus;
pub use value_objects::{CustomerId, Money, OrderItem, ProductId, validate_item};

use thiserror::Error;

/// Broad category of an [`OrderError`], for callers that dispatch on it
/// (for example when choosing an HTTP status).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Construction or input was malformed.
    Validation,
    /// The operation is not allowed in the order's current status.
    State,
    /// A referenced item does not exist.
    Lookup,
    /// A status value was unknown or not a valid transition target.
    InvalidEnum,
}

/// Errors that can occur during order operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("Customer ID is required")]
    InvalidCustomerId,

    #[error("Product ID is required")]
    InvalidProductId,

    #[error("Product SKU is required")]
    InvalidProductSku,

    #[error("Product name is required")]
    InvalidProductName,

    #[error("Quantity must be positive (got {quantity})")]
    InvalidQuantity { quantity: i32 },

    #[error("Unit price must be positive (got {price} cents)")]
    InvalidUnitPrice { price: i64 },

    #[error("Amount exceeds the largest representable total")]
    AmountOverflow,

    /// Items cannot change once the order is cancelled, delivered or refunded.
    #[error("Order cannot be modified in {status} status")]
    OrderNotModifiable { status: OrderStatus },

    #[error("Only pending orders can be confirmed (order is {status})")]
    OnlyPendingCanBeConfirmed { status: OrderStatus },

    #[error("Order must have at least one item")]
    EmptyOrder,

    #[error("Order cannot be cancelled in {status} status")]
    OrderCannotBeCancelled { status: OrderStatus },

    #[error("Only confirmed orders can be moved to processing (order is {status})")]
    OnlyConfirmedCanProcess { status: OrderStatus },

    #[error("Only processing orders can be shipped (order is {status})")]
    OnlyProcessingCanShip { status: OrderStatus },

    #[error("Only shipped orders can be delivered (order is {status})")]
    OnlyShippedCanDeliver { status: OrderStatus },

    #[error("Only delivered orders can be refunded (order is {status})")]
    OnlyDeliveredCanRefund { status: OrderStatus },

    #[error("Order item not found: product {product_id}")]
    ItemNotFound { product_id: ProductId },

    #[error("Invalid order status: {value:?}")]
    InvalidOrderStatus { value: String },

    #[error("Unsupported status transition to {target}")]
    UnsupportedTransition { target: OrderStatus },
}

impl OrderError {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            OrderError::InvalidCustomerId
            | OrderError::InvalidProductId
            | OrderError::InvalidProductSku
            | OrderError::InvalidProductName
            | OrderError::InvalidQuantity { .. }
            | OrderError::InvalidUnitPrice { .. }
            | OrderError::AmountOverflow => ErrorKind::Validation,
            OrderError::OrderNotModifiable { .. }
            | OrderError::OnlyPendingCanBeConfirmed { .. }
            | OrderError::EmptyOrder
            | OrderError::OrderCannotBeCancelled { .. }
            | OrderError::OnlyConfirmedCanProcess { .. }
            | OrderError::OnlyProcessingCanShip { .. }
            | OrderError::OnlyShippedCanDeliver { .. }
            | OrderError::OnlyDeliveredCanRefund { .. } => ErrorKind::State,
            OrderError::ItemNotFound { .. } => ErrorKind::Lookup,
            OrderError::InvalidOrderStatus { .. } | OrderError::UnsupportedTransition { .. } => {
                ErrorKind::InvalidEnum
            }
        }
    }

    /// Returns the stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            OrderError::InvalidCustomerId => "INVALID_CUSTOMER_ID",
            OrderError::InvalidProductId => "INVALID_PRODUCT_ID",
            OrderError::InvalidProductSku => "INVALID_PRODUCT_SKU",
            OrderError::InvalidProductName => "INVALID_PRODUCT_NAME",
            OrderError::InvalidQuantity { .. } => "INVALID_QUANTITY",
            OrderError::InvalidUnitPrice { .. } => "INVALID_UNIT_PRICE",
            OrderError::AmountOverflow => "AMOUNT_OVERFLOW",
            OrderError::OrderNotModifiable { .. } => "ORDER_NOT_MODIFIABLE",
            OrderError::OnlyPendingCanBeConfirmed { .. } => "ONLY_PENDING_CAN_BE_CONFIRMED",
            OrderError::EmptyOrder => "EMPTY_ORDER",
            OrderError::OrderCannotBeCancelled { .. } => "ORDER_CANNOT_BE_CANCELLED",
            OrderError::OnlyConfirmedCanProcess { .. } => "ONLY_CONFIRMED_CAN_PROCESS",
            OrderError::OnlyProcessingCanShip { .. } => "ONLY_PROCESSING_CAN_SHIP",
            OrderError::OnlyShippedCanDeliver { .. } => "ONLY_SHIPPED_CAN_DELIVER",
            OrderError::OnlyDeliveredCanRefund { .. } => "ONLY_DELIVERED_CAN_REFUND",
            OrderError::ItemNotFound { .. } => "ORDER_ITEM_NOT_FOUND",
            OrderError::InvalidOrderStatus { .. } => "INVALID_ORDER_STATUS",
            OrderError::UnsupportedTransition { .. } => "UNSUPPORTED_TRANSITION",
        }
    }

    /// Returns the name of the offending input field, if there is one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            OrderError::InvalidCustomerId => Some("customer_id"),
            OrderError::InvalidProductId | OrderError::ItemNotFound { .. } => Some("product_id"),
            OrderError::InvalidProductSku => Some("product_sku"),
            OrderError::InvalidProductName => Some("product_name"),
            OrderError::InvalidQuantity { .. } => Some("quantity"),
            OrderError::InvalidUnitPrice { .. } => Some("unit_price"),
            OrderError::InvalidOrderStatus { .. } | OrderError::UnsupportedTransition { .. } => {
                Some("status")
            }
            _ => None,
        }
    }
}
