//! Products

use std::fmt;

use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};

/// Catalog identifier for a product (e.g. `"p1"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Create a product id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ProductId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Product snapshot, as embedded into a cart line when it is added.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    /// Catalog id
    pub id: ProductId,

    /// Product name
    pub name: String,

    /// Stock keeping unit
    pub sku: String,

    /// Category name
    pub category: String,

    /// Short description
    pub description: String,

    /// Image URLs
    pub images: Vec<String>,

    /// Unit price
    pub price: Money<'static, Currency>,
}

impl Product {
    /// Create a product with only the fields pricing needs.
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        price: Money<'static, Currency>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            sku: String::new(),
            category: String::new(),
            description: String::new(),
            images: Vec::new(),
            price,
        }
    }
}
