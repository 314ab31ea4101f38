//! Shared types used across the order service crates.

pub mod pagination;
pub mod types;

pub use pagination::PageRequest;
pub use types::OrderId;
