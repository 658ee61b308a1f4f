//! Product catalog

use std::{fs, path::Path};

use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use serde::Deserialize;
use slotmap::{SlotMap, new_key_type};
use thiserror::Error;

use crate::{
    money::{PriceError, parse_price},
    products::{Product, ProductId},
};

new_key_type! {
    /// Product Key
    pub struct ProductKey;
}

/// Catalog loading errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// IO error reading the catalog file
    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Price could not be parsed
    #[error(transparent)]
    Price(#[from] PriceError),

    /// Products priced in different currencies
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),
}

/// Resolves product ids to product snapshots.
pub trait CatalogLookup {
    /// Look a product up by id.
    fn product(&self, id: &ProductId) -> Option<Product>;
}

/// In-memory product catalog.
#[derive(Debug, Default)]
pub struct Catalog {
    products: SlotMap<ProductKey, Product>,
    keys: FxHashMap<ProductId, ProductKey>,
    currency: Option<&'static Currency>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a catalog from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if products
    /// are priced in more than one currency.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml(&contents)
    }

    /// Load a catalog from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML cannot be parsed, or if products are
    /// priced in more than one currency.
    pub fn from_yaml(yaml: &str) -> Result<Self, CatalogError> {
        let fixture: CatalogFixture = serde_norway::from_str(yaml)?;
        let mut catalog = Self::new();

        for (id, product) in fixture.products {
            let product = Product {
                id: ProductId::new(id),
                name: product.name,
                sku: product.sku,
                category: product.category,
                description: product.description,
                images: product.images,
                price: parse_price(&product.price)?,
            };

            catalog.insert(product)?;
        }

        Ok(catalog)
    }

    /// Add or replace a product.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::CurrencyMismatch`] if the product is priced in
    /// a different currency from the products already in the catalog.
    pub fn insert(&mut self, product: Product) -> Result<ProductKey, CatalogError> {
        let currency = product.price.currency();

        if let Some(existing) = self.currency {
            if existing != currency {
                return Err(CatalogError::CurrencyMismatch(
                    existing.iso_alpha_code.to_string(),
                    currency.iso_alpha_code.to_string(),
                ));
            }
        } else {
            self.currency = Some(currency);
        }

        if let Some(key) = self.keys.get(&product.id).copied() {
            if let Some(slot) = self.products.get_mut(key) {
                *slot = product;
            }

            return Ok(key);
        }

        let id = product.id.clone();
        let key = self.products.insert(product);

        self.keys.insert(id, key);

        Ok(key)
    }

    /// Look a product up by its slot key.
    pub fn get(&self, key: ProductKey) -> Option<&Product> {
        self.products.get(key)
    }

    /// Iterate over all products.
    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    /// Currency shared by every product, if any product is loaded
    pub fn currency(&self) -> Option<&'static Currency> {
        self.currency
    }

    /// Number of products
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Check if the catalog has no products.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl CatalogLookup for Catalog {
    fn product(&self, id: &ProductId) -> Option<Product> {
        self.keys
            .get(id)
            .and_then(|key| self.products.get(*key))
            .cloned()
    }
}

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
struct CatalogFixture {
    products: FxHashMap<String, ProductFixture>,
}

#[derive(Debug, Deserialize)]
struct ProductFixture {
    name: String,

    #[serde(default)]
    sku: String,

    #[serde(default)]
    category: String,

    #[serde(default)]
    description: String,

    #[serde(default)]
    images: Vec<String>,

    /// e.g. `"199.99 USD"`
    price: String,
}
