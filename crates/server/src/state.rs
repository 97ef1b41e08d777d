use std::sync::Arc;

use service::storage::KvStore;
use service::{CustomerService, KvCustomerRepository, KvOrderRepository, OrderService};

pub type Customers = CustomerService<KvCustomerRepository>;
pub type Orders = OrderService<KvOrderRepository>;

/// Shared handler state. Both services sit on the one store handle opened at startup.
#[derive(Clone)]
pub struct ServerState {
    pub store: Arc<dyn KvStore>,
    pub customers: Arc<Customers>,
    pub orders: Arc<Orders>,
}

impl ServerState {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        let customers = CustomerService::new(Arc::new(KvCustomerRepository::new(Arc::clone(&store))));
        let orders = OrderService::new(Arc::new(KvOrderRepository::new(Arc::clone(&store))));
        Self { store, customers: Arc::new(customers), orders: Arc::new(orders) }
    }
}
