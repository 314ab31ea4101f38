//! Domain layer for the order service.
//!
//! This crate provides the Order aggregate:
//! - item rules (validation, merge on re-add, removal, quantity changes)
//! - totals that always equal the sum of the item lines
//! - the status state machine and its transition dispatcher
//!
//! Everything here is synchronous and free of I/O.

pub mod order;

pub use common::OrderId;
pub use order::{
    CustomerId, ErrorKind, Money, Order, OrderError, OrderItem, OrderRecord, OrderStatus,
    ProductId, validate_item,
};
