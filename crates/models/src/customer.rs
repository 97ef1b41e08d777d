use serde::{Deserialize, Serialize};

use crate::{errors::ModelError, validation};

/// A customer record as stored under `customer:{id}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    /// Only ever written by the purchase-entry flow; create/update leave it alone.
    #[serde(default)]
    pub purchases: Vec<String>,
}

impl Customer {
    /// Customer without an id yet; the repository mints one on create.
    pub fn unsaved(name: &str, email: &str, phone_number: &str, address: &str) -> Self {
        Self {
            id: String::new(),
            name: name.to_string(),
            email: email.to_string(),
            phone_number: phone_number.to_string(),
            address: address.to_string(),
            purchases: Vec::new(),
        }
    }

    pub fn has_id(&self) -> bool { !self.id.is_empty() }

    /// Case-insensitive substring match on id or name. An empty term matches everything.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        term.is_empty() || self.id.to_lowercase().contains(&term) || self.name.to_lowercase().contains(&term)
    }
}

/// Registration / update form for a customer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInput {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
}

impl CustomerInput {
    /// Checks every field in form order and reports the first failure.
    pub fn validate(&self) -> Result<(), ModelError> {
        if let Some(id) = self.id.as_deref().filter(|id| !id.is_empty()) {
            validation::validate_customer_id(id)?;
        }
        validation::validate_name(&self.name)?;
        validation::validate_email(&self.email)?;
        validation::validate_phone_number(&self.phone_number)?;
        validation::validate_address(&self.address)?;
        Ok(())
    }

    /// Apply the form onto a customer, leaving id and purchases untouched.
    pub fn apply_to(&self, customer: &mut Customer) {
        customer.name = self.name.clone();
        customer.email = self.email.clone();
        customer.phone_number = self.phone_number.clone();
        customer.address = self.address.clone();
    }

    pub fn into_customer(self) -> Customer {
        Customer {
            id: self.id.unwrap_or_default(),
            name: self.name,
            email: self.email,
            phone_number: self.phone_number,
            address: self.address,
            purchases: Vec::new(),
        }
    }
}
