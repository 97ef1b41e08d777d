//! Record persistence for customers and orders on top of a key-value store.
//! - `storage` hides the store behind the `KvStore` trait (Redis or in-memory).
//! - Repositories map entities to hashes; services validate forms first.
//! - All failures surface as `ServiceError`.

pub mod errors;
pub mod storage;
pub mod id_generator;
pub mod customer;
pub mod order;

pub use customer::{CustomerRepository, CustomerService, KvCustomerRepository};
pub use errors::ServiceError;
pub use order::{KvOrderRepository, OrderRepository, OrderService};
