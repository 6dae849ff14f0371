use serde::{Deserialize, Serialize};

use super::CustomerId;

/// A bookstore customer as seen by the carpool.
///
/// Customers are managed elsewhere in the bookstore; only the identity and a
/// display name are stored here so ownership and passenger links can point at
/// something.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCustomerInput {
    pub name: String,
}
