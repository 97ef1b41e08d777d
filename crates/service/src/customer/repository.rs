use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use models::Customer;
use tracing::{debug, info};

use crate::errors::ServiceError;
use crate::id_generator::IdGenerator;
use crate::storage::{KeyType, KvStore};

pub const CUSTOMER_KEY: &str = "customer";
pub const CUSTOMER_ID_COUNTER_KEY: &str = "customer:id:counter";

fn customer_key(id: &str) -> String { format!("{CUSTOMER_KEY}:{id}") }

fn purchases_key(id: &str) -> String { format!("{CUSTOMER_KEY}:{id}:purchases") }

#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Persist a new customer, minting an id when none is set. Returns the stored record.
    async fn create(&self, customer: Customer) -> Result<Customer, ServiceError>;
    async fn get(&self, id: &str) -> Result<Option<Customer>, ServiceError>;
    async fn list_all(&self) -> Result<Vec<Customer>, ServiceError>;
    async fn update(&self, customer: &Customer) -> Result<(), ServiceError>;
    async fn delete(&self, id: &str) -> Result<(), ServiceError>;
    async fn exists(&self, id: &str) -> Result<bool, ServiceError>;
    async fn add_purchase(&self, id: &str, purchase: &str) -> Result<(), ServiceError>;
}

/// Maps customers onto `customer:{id}` hashes plus a `customer:{id}:purchases` list.
pub struct KvCustomerRepository {
    store: Arc<dyn KvStore>,
    ids: IdGenerator,
}

impl KvCustomerRepository {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        let ids = IdGenerator::new(Arc::clone(&store));
        Self { store, ids }
    }

    async fn write_fields(&self, customer: &Customer) -> Result<(), ServiceError> {
        let fields = [
            ("name", customer.name.clone()),
            ("email", customer.email.clone()),
            ("phoneNumber", customer.phone_number.clone()),
            ("address", customer.address.clone()),
        ];
        self.store.hset_multiple(&customer_key(&customer.id), &fields).await
    }

    async fn assemble(&self, id: &str, mut data: HashMap<String, String>) -> Result<Customer, ServiceError> {
        let purchases = self.store.lrange_all(&purchases_key(id)).await?;
        let mut take = |field: &str| data.remove(field).unwrap_or_default();
        Ok(Customer {
            id: id.to_string(),
            name: take("name"),
            email: take("email"),
            phone_number: take("phoneNumber"),
            address: take("address"),
            purchases,
        })
    }
}

#[async_trait]
impl CustomerRepository for KvCustomerRepository {
    async fn create(&self, mut customer: Customer) -> Result<Customer, ServiceError> {
        if !customer.has_id() {
            // supplied ids may already occupy counter values
            loop {
                let id = self.ids.next_id(CUSTOMER_ID_COUNTER_KEY).await?.to_string();
                if !self.exists(&id).await? {
                    customer.id = id;
                    break;
                }
                debug!(%id, "counter value already taken, skipping");
            }
        }
        self.write_fields(&customer).await?;
        debug!(id = %customer.id, "customer hash written");
        Ok(customer)
    }

    async fn get(&self, id: &str) -> Result<Option<Customer>, ServiceError> {
        if !self.exists(id).await? {
            return Ok(None);
        }
        let data = self.store.hgetall(&customer_key(id)).await?;
        Ok(Some(self.assemble(id, data).await?))
    }

    async fn list_all(&self) -> Result<Vec<Customer>, ServiceError> {
        let keys = self.store.keys(&format!("{CUSTOMER_KEY}:*")).await?;
        let mut customers = Vec::new();
        for key in keys {
            // purchases lists and the id counter share the prefix
            if self.store.key_type(&key).await? != KeyType::Hash {
                continue;
            }
            let Some(id) = key.strip_prefix(&format!("{CUSTOMER_KEY}:")) else { continue };
            let data = self.store.hgetall(&key).await?;
            customers.push(self.assemble(id, data).await?);
        }
        customers.sort_by(|a, b| record_order(&a.id, &b.id));
        debug!(count = customers.len(), "customers listed");
        Ok(customers)
    }

    async fn update(&self, customer: &Customer) -> Result<(), ServiceError> {
        if !self.exists(&customer.id).await? {
            return Err(ServiceError::does_not_exist("Customer", "ID", &customer.id));
        }
        self.write_fields(customer).await
    }

    async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        if !self.exists(id).await? {
            return Err(ServiceError::does_not_exist("Customer", "ID", id));
        }
        info!(%id, "deleting customer");
        self.store.del(&[customer_key(id), purchases_key(id)]).await
    }

    async fn exists(&self, id: &str) -> Result<bool, ServiceError> {
        Ok(self.store.key_type(&customer_key(id)).await? == KeyType::Hash)
    }

    async fn add_purchase(&self, id: &str, purchase: &str) -> Result<(), ServiceError> {
        if !self.exists(id).await? {
            return Err(ServiceError::does_not_exist("Customer", "ID", id));
        }
        self.store.rpush(&purchases_key(id), purchase).await
    }
}

/// Numeric ids sort numerically; anything else falls back to string order after them.
pub(crate) fn record_order(a: &str, b: &str) -> std::cmp::Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => std::cmp::Ordering::Less,
        (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}
