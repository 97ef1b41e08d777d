use std::sync::Arc;

use models::{validation, Customer, CustomerInput};
use tracing::{info, instrument};

use crate::customer::repository::CustomerRepository;
use crate::errors::ServiceError;

/// Registration, update and removal of customers.
/// Every form is validated here before the repository sees it.
pub struct CustomerService<R: CustomerRepository> {
    repo: Arc<R>,
}

impl<R: CustomerRepository> CustomerService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    #[instrument(skip(self, input), fields(supplied_id = ?input.id))]
    pub async fn register(&self, input: CustomerInput) -> Result<Customer, ServiceError> {
        input.validate()?;
        if let Some(id) = input.id.as_deref().filter(|id| !id.is_empty()) {
            if self.repo.exists(id).await? {
                return Err(ServiceError::Validation(
                    "This ID is already in use. Please enter a different ID.".into(),
                ));
            }
        }
        let customer = self.repo.create(input.into_customer()).await?;
        info!(id = %customer.id, "customer registered");
        Ok(customer)
    }

    pub async fn get(&self, id: &str) -> Result<Option<Customer>, ServiceError> { self.repo.get(id).await }

    pub async fn list(&self) -> Result<Vec<Customer>, ServiceError> { self.repo.list_all().await }

    /// Full scan filtered by id or name.
    pub async fn search(&self, term: &str) -> Result<Vec<Customer>, ServiceError> {
        let mut customers = self.repo.list_all().await?;
        customers.retain(|c| c.matches_search(term.trim()));
        Ok(customers)
    }

    /// Overwrite the four editable fields; `id` in the form is ignored.
    #[instrument(skip(self, input))]
    pub async fn update(&self, id: &str, input: CustomerInput) -> Result<Customer, ServiceError> {
        input.validate()?;
        let mut customer = self
            .repo
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::does_not_exist("Customer", "ID", id))?;
        input.apply_to(&mut customer);
        self.repo.update(&customer).await?;
        info!(%id, "customer updated");
        Ok(customer)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        self.repo.delete(id).await?;
        info!(%id, "customer deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn add_purchase(&self, id: &str, purchase: &str) -> Result<Customer, ServiceError> {
        validation::validate_purchase(purchase)?;
        self.repo.add_purchase(id, purchase.trim()).await?;
        self.repo
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::does_not_exist("Customer", "ID", id))
    }
}
