//! Order use cases.
//!
//! [`OrderService`] loads an order from an [`OrderStore`], applies one
//! aggregate operation and persists the result. Every use case is traced
//! and timed.
//!
//! [`OrderStore`]: order_store::OrderStore

pub mod commands;
pub mod error;
pub mod page;
pub mod service;

pub use commands::{AddItem, CreateOrder, NewItem, RemoveItem, TransitionStatus, UpdateItemQuantity};
pub use error::{Result, ServiceError, StoreOperation};
pub use page::OrderPage;
pub use service::OrderService;
