use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use models::errors::ModelError;
use models::{Order, OrderStatus};
use tracing::{debug, info};

use crate::customer::repository::record_order;
use crate::errors::ServiceError;
use crate::id_generator::IdGenerator;
use crate::storage::{KeyType, KvStore};

pub const ORDER_KEY_PREFIX: &str = "order:";
pub const ORDER_ID_COUNTER_KEY: &str = "order:id:counter";
/// Items are flattened into one hash field; an item containing this exact
/// sequence will come back split.
pub const ITEMS_SEPARATOR: &str = ", ";

fn order_key(order_number: &str) -> String { format!("{ORDER_KEY_PREFIX}{order_number}") }

fn legacy_items_key(order_number: &str) -> String { format!("{ORDER_KEY_PREFIX}{order_number}:items") }

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn next_order_number(&self) -> Result<String, ServiceError>;
    async fn save(&self, order: &Order) -> Result<(), ServiceError>;
    async fn update(&self, order: &Order) -> Result<(), ServiceError>;
    async fn delete(&self, order_number: &str) -> Result<(), ServiceError>;
    async fn get(&self, order_number: &str) -> Result<Option<Order>, ServiceError>;
    async fn list_by_customer(&self, customer_id: &str) -> Result<Vec<Order>, ServiceError>;
    async fn list_all(&self) -> Result<Vec<Order>, ServiceError>;
}

/// Maps orders onto `order:{orderNumber}` hashes.
pub struct KvOrderRepository {
    store: Arc<dyn KvStore>,
    ids: IdGenerator,
}

fn encode(order: &Order) -> [(&'static str, String); 6] {
    [
        ("customerId", order.customer_id.clone()),
        ("address", order.address.clone()),
        ("orderDate", order.order_date.to_string()),
        ("orderStatus", order.order_status.to_string()),
        ("items", order.items().join(ITEMS_SEPARATOR)),
        ("itemCount", order.items().len().to_string()),
    ]
}

/// Rebuild an order from its hash. The stored `itemCount` is not trusted;
/// the count is derived again from the split items.
fn decode(order_number: &str, mut data: HashMap<String, String>) -> Result<Order, ServiceError> {
    let raw_date = data.remove("orderDate").unwrap_or_default();
    let order_date = raw_date.parse::<NaiveDate>().map_err(|e| {
        ModelError::Decode(format!("order {order_number}: bad orderDate `{raw_date}`: {e}"))
    })?;
    let order_status = match data.remove("orderStatus") {
        None => OrderStatus::default(),
        Some(s) => s.parse::<OrderStatus>().map_err(|_| {
            ModelError::Decode(format!("order {order_number}: bad orderStatus `{s}`"))
        })?,
    };
    let items = match data.remove("items") {
        Some(s) if !s.is_empty() => s.split(ITEMS_SEPARATOR).map(str::to_string).collect(),
        _ => Vec::new(),
    };
    Ok(Order::new(
        order_number,
        data.remove("customerId").unwrap_or_default(),
        data.remove("address").unwrap_or_default(),
        items,
        order_date,
        order_status,
    ))
}

impl KvOrderRepository {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        let ids = IdGenerator::new(Arc::clone(&store));
        Self { store, ids }
    }

    async fn is_order(&self, order_number: &str) -> Result<bool, ServiceError> {
        Ok(self.store.key_type(&order_key(order_number)).await? == KeyType::Hash)
    }

    /// Hash keys under `order:` with their order numbers; counters and legacy lists are skipped.
    async fn order_keys(&self) -> Result<Vec<(String, String)>, ServiceError> {
        let keys = self.store.keys(&format!("{ORDER_KEY_PREFIX}*")).await?;
        let mut out = Vec::new();
        for key in keys {
            if self.store.key_type(&key).await? != KeyType::Hash {
                continue;
            }
            if let Some(number) = key.strip_prefix(ORDER_KEY_PREFIX) {
                out.push((key.clone(), number.to_string()));
            }
        }
        Ok(out)
    }
}

#[async_trait]
impl OrderRepository for KvOrderRepository {
    async fn next_order_number(&self) -> Result<String, ServiceError> {
        Ok(self.ids.next_id(ORDER_ID_COUNTER_KEY).await?.to_string())
    }

    async fn save(&self, order: &Order) -> Result<(), ServiceError> {
        self.store.hset_multiple(&order_key(&order.order_number), &encode(order)).await?;
        debug!(order_number = %order.order_number, item_count = order.item_count(), "order hash written");
        Ok(())
    }

    async fn update(&self, order: &Order) -> Result<(), ServiceError> {
        if !self.is_order(&order.order_number).await? {
            return Err(ServiceError::does_not_exist("Order", "number", &order.order_number));
        }
        self.store.hset_multiple(&order_key(&order.order_number), &encode(order)).await
    }

    async fn delete(&self, order_number: &str) -> Result<(), ServiceError> {
        if !self.is_order(order_number).await? {
            return Err(ServiceError::does_not_exist("Order", "number", order_number));
        }
        info!(%order_number, "deleting order");
        self.store.del(&[order_key(order_number), legacy_items_key(order_number)]).await
    }

    async fn get(&self, order_number: &str) -> Result<Option<Order>, ServiceError> {
        if !self.is_order(order_number).await? {
            return Ok(None);
        }
        let data = self.store.hgetall(&order_key(order_number)).await?;
        Ok(Some(decode(order_number, data)?))
    }

    async fn list_by_customer(&self, customer_id: &str) -> Result<Vec<Order>, ServiceError> {
        let mut orders = Vec::new();
        for (key, number) in self.order_keys().await? {
            let stored = self.store.hget(&key, "customerId").await?;
            if stored.as_deref() != Some(customer_id) {
                continue;
            }
            let data = self.store.hgetall(&key).await?;
            orders.push(decode(&number, data)?);
        }
        orders.sort_by(|a, b| record_order(&a.order_number, &b.order_number));
        debug!(%customer_id, count = orders.len(), "orders listed for customer");
        Ok(orders)
    }

    async fn list_all(&self) -> Result<Vec<Order>, ServiceError> {
        let mut orders = Vec::new();
        for (key, number) in self.order_keys().await? {
            let data = self.store.hgetall(&key).await?;
            orders.push(decode(&number, data)?);
        }
        orders.sort_by(|a, b| record_order(&a.order_number, &b.order_number));
        Ok(orders)
    }
}
