//! Customer and order records plus the field rules they must satisfy
//! before being handed to a repository.

pub mod errors;
pub mod customer;
pub mod order;
pub mod validation;

pub use customer::{Customer, CustomerInput};
pub use order::{parse_items, Order, OrderInput, OrderStatus, ValidOrderInput};
