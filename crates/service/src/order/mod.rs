//! Order records: key-value mapping and the place/update workflow.

pub mod repository;
pub mod service;

pub use repository::{KvOrderRepository, OrderRepository};
pub use service::OrderService;
