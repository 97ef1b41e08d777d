//! Customer records: key-value mapping and the registration/update workflow.

pub mod repository;
pub mod service;

pub use repository::{CustomerRepository, KvCustomerRepository};
pub use service::CustomerService;
