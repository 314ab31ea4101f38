pub mod error;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod store;

pub use common::OrderId;
pub use error::{Result, StoreError};
pub use memory::InMemoryOrderStore;
pub use postgres::PostgresOrderStore;
pub use query::OrderQuery;
pub use store::{OrderStore, OrderStoreExt};
