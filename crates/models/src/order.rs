use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{errors::ModelError, validation};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Canceled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Canceled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Canceled => "Canceled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for OrderStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ModelError::invalid(format!("Unknown order status `{s}`.")))
    }
}

/// An order stored under `order:{orderNumber}`.
///
/// `items` is private so that `item_count` can only move together with it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_number: String,
    pub customer_id: String,
    pub address: String,
    items: Vec<String>,
    pub order_date: NaiveDate,
    pub order_status: OrderStatus,
    item_count: usize,
}

impl Order {
    pub fn new(
        order_number: impl Into<String>,
        customer_id: impl Into<String>,
        address: impl Into<String>,
        items: Vec<String>,
        order_date: NaiveDate,
        order_status: OrderStatus,
    ) -> Self {
        let item_count = items.len();
        Self {
            order_number: order_number.into(),
            customer_id: customer_id.into(),
            address: address.into(),
            items,
            order_date,
            order_status,
            item_count,
        }
    }

    pub fn items(&self) -> &[String] { &self.items }

    pub fn item_count(&self) -> usize { self.item_count }

    pub fn set_items(&mut self, items: Vec<String>) {
        self.item_count = items.len();
        self.items = items;
    }

    /// Case-insensitive substring match on order number, customer id or address.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        term.is_empty()
            || [&self.order_number, &self.customer_id, &self.address]
                .iter()
                .any(|field| field.to_lowercase().contains(&term))
    }
}

/// Split free text into order items: one per line, trimmed, blank lines dropped.
pub fn parse_items(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Add / update order form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderInput {
    pub address: String,
    /// Multi-line text, one item per line.
    pub items: String,
    #[serde(default)]
    pub order_date: Option<NaiveDate>,
    #[serde(default)]
    pub order_status: Option<String>,
}

/// An `OrderInput` that passed validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidOrderInput {
    pub address: String,
    pub items: Vec<String>,
    pub order_date: NaiveDate,
    pub order_status: OrderStatus,
}

impl OrderInput {
    /// Validate a new order. A missing status means `Pending`.
    pub fn validate(&self) -> Result<ValidOrderInput, ModelError> {
        self.validate_with(Some(OrderStatus::default()))
    }

    /// Validate an edit of an existing order. The status must be given.
    pub fn validate_update(&self) -> Result<ValidOrderInput, ModelError> {
        self.validate_with(None)
    }

    fn validate_with(&self, default_status: Option<OrderStatus>) -> Result<ValidOrderInput, ModelError> {
        validation::validate_address(&self.address)?;
        validation::require_text(&self.items, "Items cannot be empty.")?;
        let order_date = self
            .order_date
            .ok_or_else(|| ModelError::invalid("Order date must be selected."))?;
        let order_status = match self.order_status.as_deref().map(str::trim) {
            None | Some("") => {
                default_status.ok_or_else(|| ModelError::invalid("Order status must be selected."))?
            }
            Some(s) => s.parse()?,
        };
        Ok(ValidOrderInput {
            address: self.address.clone(),
            items: parse_items(&self.items),
            order_date,
            order_status,
        })
    }
}
