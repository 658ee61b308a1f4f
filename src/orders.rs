//! Orders

use jiff::Timestamp;
use rusty_money::{Money, iso::Currency};

use crate::{
    cart::{Cart, CartItem},
    ids::TypedUuid,
};

/// Order Id
pub type OrderId = TypedUuid<Order>;

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    /// Placed, not yet processed
    Pending,
    /// Being prepared
    Processing,
    /// Handed to the carrier
    Shipped,
    /// Received by the customer
    Delivered,
    /// Cancelled
    Cancelled,
}

/// Payment status of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    /// Awaiting payment
    Pending,
    /// Paid
    Paid,
    /// Payment failed
    Failed,
}

/// An order placed from a cart at checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    /// Order id
    pub id: OrderId,

    /// Lines copied from the cart
    pub items: Vec<CartItem>,

    /// Cart subtotal at checkout
    pub subtotal: Money<'static, Currency>,

    /// Cart tax at checkout
    pub tax: Money<'static, Currency>,

    /// Cart shipping at checkout
    pub shipping: Money<'static, Currency>,

    /// Cart total at checkout
    pub total: Money<'static, Currency>,

    /// Fulfilment status
    pub status: OrderStatus,

    /// Payment status
    pub payment_status: PaymentStatus,

    /// When the order was placed
    pub created_at: Timestamp,
}

impl Order {
    /// Build a pending order from a cart's current lines and totals.
    pub fn from_cart(cart: &Cart, now: Timestamp) -> Self {
        Self {
            id: OrderId::new(),
            items: cart.items().to_vec(),
            subtotal: cart.subtotal(),
            tax: cart.tax(),
            shipping: cart.shipping(),
            total: cart.total(),
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            created_at: now,
        }
    }

    /// Number of units ordered.
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|line| u64::from(line.quantity)).sum()
    }
}
