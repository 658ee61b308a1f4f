//! Persisted cart snapshot
//!
//! The durable form of the cart is a JSON object `{ "cart": ..., "timestamp": ... }`
//! where `timestamp` is the session activity clock in Unix milliseconds at the
//! time of writing. Money is stored in minor units of the cart currency.

use jiff::Timestamp;
use rusty_money::Money;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::{
    cart::{Cart, CartId, CartItem, LineId},
    money::{PriceError, currency_from_code},
    pricing::PricingRules,
    products::{Product, ProductId},
};

/// Snapshot encoding and decoding errors
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Snapshot is not valid JSON for the expected shape.
    #[error("malformed cart snapshot: {0}")]
    Json(#[from] serde_json::Error),

    /// Snapshot names an unknown currency.
    #[error(transparent)]
    Price(#[from] PriceError),

    /// Snapshot timestamp is outside the representable range.
    #[error("invalid snapshot timestamp: {0}")]
    InvalidTimestamp(i64),

    /// A line is priced below zero.
    #[error("negative price {price} for product {product}")]
    NegativePrice {
        /// Offending product
        product: ProductId,
        /// Stored price, minor units
        price: i64,
    },
}

/// The `{ cart, timestamp }` pair written to storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedCart {
    /// Cart contents
    pub cart: CartRecord,

    /// Session activity clock, Unix milliseconds
    pub timestamp: i64,
}

/// Serialized cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartRecord {
    /// Cart id
    pub id: CartId,

    /// ISO 4217 code shared by every price in the cart
    pub currency: String,

    /// Lines in insertion order
    pub items: Vec<CartItemRecord>,

    /// Subtotal, minor units
    pub subtotal: i64,

    /// Tax, minor units
    pub tax: i64,

    /// Shipping, minor units
    pub shipping: i64,

    /// Total, minor units
    pub total: i64,

    /// Creation time
    pub created_at: Timestamp,

    /// Last line change
    pub updated_at: Timestamp,
}

/// Serialized cart line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemRecord {
    /// Line id
    pub id: LineId,

    /// Catalog product id
    pub product_id: ProductId,

    /// Product snapshot
    pub product: ProductRecord,

    /// Quantity
    pub quantity: u32,
}

/// Serialized product snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Catalog id
    pub id: ProductId,

    /// Name
    pub name: String,

    /// SKU
    #[serde(default)]
    pub sku: String,

    /// Category
    #[serde(default)]
    pub category: String,

    /// Description
    #[serde(default)]
    pub description: String,

    /// Image URLs
    #[serde(default)]
    pub images: Vec<String>,

    /// Unit price, minor units
    pub price: i64,
}

impl PersistedCart {
    /// Capture a cart and the activity time it should be stamped with.
    pub fn capture(cart: &Cart, activity: Timestamp) -> Self {
        let totals = cart.totals();

        Self {
            cart: CartRecord {
                id: cart.id(),
                currency: cart.currency().iso_alpha_code.to_string(),
                items: cart.iter().map(CartItemRecord::from).collect(),
                subtotal: totals.subtotal.to_minor_units(),
                tax: totals.tax.to_minor_units(),
                shipping: totals.shipping.to_minor_units(),
                total: totals.total.to_minor_units(),
                created_at: cart.created_at(),
                updated_at: cart.updated_at(),
            },
            timestamp: activity.as_millisecond(),
        }
    }

    /// Serialize to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn encode(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe a snapshot.
    pub fn decode(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The activity time the snapshot was stamped with.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored milliseconds are out of range.
    pub fn activity(&self) -> Result<Timestamp, SnapshotError> {
        Timestamp::from_millisecond(self.timestamp)
            .map_err(|_err| SnapshotError::InvalidTimestamp(self.timestamp))
    }

    /// Rebuild the live cart. Totals are recomputed from the lines rather
    /// than trusted, lines with a zero quantity are dropped, and lines for the
    /// same product are merged into the first of them.
    ///
    /// # Errors
    ///
    /// Returns an error if the currency code is unknown or a price is negative.
    pub fn into_cart(self, rules: &PricingRules) -> Result<Cart, SnapshotError> {
        let record = self.cart;
        let currency = currency_from_code(&record.currency)?;

        let mut items: Vec<CartItem> = Vec::with_capacity(record.items.len());

        for item in record.items {
            if item.product.price < 0 {
                return Err(SnapshotError::NegativePrice {
                    product: item.product_id,
                    price: item.product.price,
                });
            }

            if item.quantity == 0 {
                continue;
            }

            if let Some(line) = items
                .iter_mut()
                .find(|line| line.product_id == item.product_id)
            {
                warn!(product_id = %item.product_id, "merging duplicate cart snapshot lines");

                line.quantity = line.quantity.saturating_add(item.quantity);

                continue;
            }

            items.push(CartItem {
                id: item.id,
                product_id: item.product_id,
                product: Product {
                    id: item.product.id,
                    name: item.product.name,
                    sku: item.product.sku,
                    category: item.product.category,
                    description: item.product.description,
                    images: item.product.images,
                    price: Money::from_minor(item.product.price, currency),
                },
                quantity: item.quantity,
            });
        }

        let cart = Cart::from_parts(
            record.id,
            currency,
            items,
            record.created_at,
            record.updated_at,
            rules,
        );

        if cart.total().to_minor_units() != record.total {
            warn!(
                cart_id = %cart.id(),
                stored_total = record.total,
                computed_total = cart.total().to_minor_units(),
                "stored cart total disagrees with recomputed total"
            );
        }

        Ok(cart)
    }
}

impl From<&CartItem> for CartItemRecord {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.id,
            product_id: item.product_id.clone(),
            product: ProductRecord {
                id: item.product.id.clone(),
                name: item.product.name.clone(),
                sku: item.product.sku.clone(),
                category: item.product.category.clone(),
                description: item.product.description.clone(),
                images: item.product.images.clone(),
                price: item.product.price.to_minor_units(),
            },
            quantity: item.quantity,
        }
    }
}
