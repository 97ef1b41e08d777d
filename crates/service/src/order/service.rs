use std::sync::Arc;

use models::{Order, OrderInput};
use tracing::{info, instrument};

use crate::errors::ServiceError;
use crate::order::repository::OrderRepository;

/// Placing, editing and removing orders.
///
/// The customer reference is stored as given; no check is made that the
/// customer exists.
pub struct OrderService<R: OrderRepository> {
    repo: Arc<R>,
}

impl<R: OrderRepository> OrderService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    #[instrument(skip(self, input))]
    pub async fn place(&self, customer_id: &str, input: OrderInput) -> Result<Order, ServiceError> {
        let valid = input.validate()?;
        let order_number = self.repo.next_order_number().await?;
        let order = Order::new(
            order_number,
            customer_id,
            valid.address,
            valid.items,
            valid.order_date,
            valid.order_status,
        );
        self.repo.save(&order).await?;
        info!(order_number = %order.order_number, item_count = order.item_count(), "order placed");
        Ok(order)
    }

    /// Replace address, items, date and status; the customer reference stays.
    #[instrument(skip(self, input))]
    pub async fn update(&self, order_number: &str, input: OrderInput) -> Result<Order, ServiceError> {
        let valid = input.validate_update()?;
        let mut order = self
            .repo
            .get(order_number)
            .await?
            .ok_or_else(|| ServiceError::does_not_exist("Order", "number", order_number))?;
        order.address = valid.address;
        order.order_date = valid.order_date;
        order.order_status = valid.order_status;
        order.set_items(valid.items);
        self.repo.update(&order).await?;
        info!(%order_number, status = %order.order_status, "order updated");
        Ok(order)
    }

    pub async fn get(&self, order_number: &str) -> Result<Option<Order>, ServiceError> {
        self.repo.get(order_number).await
    }

    pub async fn list_for_customer(&self, customer_id: &str) -> Result<Vec<Order>, ServiceError> {
        self.repo.list_by_customer(customer_id).await
    }

    /// A customer's orders filtered by number, customer id or address.
    pub async fn search_for_customer(&self, customer_id: &str, term: &str) -> Result<Vec<Order>, ServiceError> {
        let mut orders = self.repo.list_by_customer(customer_id).await?;
        orders.retain(|o| o.matches_search(term.trim()));
        Ok(orders)
    }

    pub async fn list_all(&self) -> Result<Vec<Order>, ServiceError> { self.repo.list_all().await }

    #[instrument(skip(self))]
    pub async fn delete(&self, order_number: &str) -> Result<(), ServiceError> {
        self.repo.delete(order_number).await?;
        info!(%order_number, "order deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::KvOrderRepository;
    use crate::storage::MemoryStore;
    use chrono::NaiveDate;
    use models::errors::ModelError;
    use models::OrderStatus;

    fn service() -> OrderService<KvOrderRepository> {
        OrderService::new(Arc::new(KvOrderRepository::new(Arc::new(MemoryStore::new()))))
    }

    fn form(items: &str, status: Option<&str>) -> OrderInput {
        OrderInput {
            address: "1 Main St".into(),
            items: items.into(),
            order_date: NaiveDate::from_ymd_opt(2024, 1, 2),
            order_status: status.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn place_splits_items_and_defaults_status() -> anyhow::Result<()> {
        let svc = service();
        let order = svc.place("1", form("Widget\n\nGadget\n", None)).await?;
        assert_eq!(order.items(), ["Widget", "Gadget"]);
        assert_eq!(order.item_count(), 2);
        assert_eq!(order.order_status, OrderStatus::Pending);
        assert_eq!(svc.list_for_customer("1").await?, vec![order]);
        Ok(())
    }

    #[tokio::test]
    async fn orders_may_reference_unknown_customers() -> anyhow::Result<()> {
        let svc = service();
        let order = svc.place("404", form("Widget", None)).await?;
        assert_eq!(order.customer_id, "404");
        Ok(())
    }

    #[tokio::test]
    async fn rejected_form_does_not_mint_a_number() -> anyhow::Result<()> {
        let svc = service();
        assert!(svc.place("1", form("  \n", None)).await.unwrap_err().is_rejection());
        assert_eq!(svc.place("1", form("Widget", None)).await?.order_number, "1");
        Ok(())
    }

    #[tokio::test]
    async fn any_status_can_follow_any_other() -> anyhow::Result<()> {
        let svc = service();
        let order = svc.place("1", form("Widget", Some("Delivered"))).await?;
        let back = svc.update(&order.order_number, form("Widget\nBolt\nBolt", Some("Pending"))).await?;
        assert_eq!(back.order_status, OrderStatus::Pending);
        assert_eq!(back.item_count(), 3);
        assert_eq!(back.customer_id, "1");
        Ok(())
    }

    #[tokio::test]
    async fn update_without_status_keeps_stored_status() -> anyhow::Result<()> {
        let svc = service();
        let order = svc.place("1", form("Widget", Some("Shipped"))).await?;
        let err = svc.update(&order.order_number, form("Widget", None)).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Model(ModelError::Validation(ref msg)) if msg == "Order status must be selected."
        ));
        let err = svc.update(&order.order_number, form("Widget", Some(""))).await.unwrap_err();
        assert!(err.is_rejection());
        let stored = svc.get(&order.order_number).await?.expect("order");
        assert_eq!(stored.order_status, OrderStatus::Shipped);
        Ok(())
    }

    #[tokio::test]
    async fn search_narrows_a_customers_orders() -> anyhow::Result<()> {
        let svc = service();
        svc.place("1", form("Widget", None)).await?;
        let mut elm = form("Gadget", None);
        elm.address = "9 Elm Street".into();
        svc.place("1", elm).await?;
        svc.place("2", form("Bolt", None)).await?;

        let found = svc.search_for_customer("1", "elm").await?;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].order_number, "2");
        assert_eq!(svc.search_for_customer("1", "").await?.len(), 2);
        // another customer's order never shows up, even when it matches
        assert!(svc.search_for_customer("1", "3").await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn update_and_delete_unknown_order() {
        let svc = service();
        let err = svc.update("5", form("Widget", Some("Pending"))).await.unwrap_err();
        assert!(matches!(err, ServiceError::DoesNotExist(_)));
        let err = svc.delete("5").await.unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
