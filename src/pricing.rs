//! Pricing
//!
//! Cart totals are always derived from the lines in one pass: subtotal, tax,
//! shipping and total are never adjusted incrementally.

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, iso::Currency};

use crate::cart::CartItem;

/// Business rules applied when totalling a cart.
#[derive(Debug, Clone, Copy)]
pub struct PricingRules {
    /// Tax charged on the subtotal.
    pub tax_rate: Percentage,

    /// Shipping is free when the subtotal is strictly greater than this amount,
    /// in major units of the cart currency.
    pub free_shipping_threshold: Decimal,

    /// Flat shipping fee charged at or below the threshold, in major units.
    pub shipping_fee: Decimal,
}

impl Default for PricingRules {
    /// 8% tax, free shipping over 100.00, otherwise 10.00.
    fn default() -> Self {
        Self {
            tax_rate: Percentage::from(Decimal::new(8, 2)),
            free_shipping_threshold: Decimal::new(100, 0),
            shipping_fee: Decimal::new(10, 0),
        }
    }
}

/// Derived monetary values of a cart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartTotals<'a> {
    /// Sum of unit price × quantity over all lines
    pub subtotal: Money<'a, Currency>,

    /// Tax on the subtotal
    pub tax: Money<'a, Currency>,

    /// Shipping charge
    pub shipping: Money<'a, Currency>,

    /// Subtotal + tax + shipping
    pub total: Money<'a, Currency>,
}

impl<'a> CartTotals<'a> {
    /// All-zero totals in the given currency.
    pub fn zero(currency: &'a Currency) -> Self {
        let zero = Money::from_minor(0, currency);

        Self {
            subtotal: zero,
            tax: zero,
            shipping: zero,
            total: zero,
        }
    }
}

/// Compute the totals for a set of cart lines.
///
/// An empty cart has all-zero totals, including shipping: there is nothing to
/// ship. Arithmetic saturates rather than failing, so this never errors.
pub fn compute_totals<'a>(
    items: &[CartItem],
    rules: &PricingRules,
    currency: &'a Currency,
) -> CartTotals<'a> {
    if items.is_empty() {
        return CartTotals::zero(currency);
    }

    let subtotal = items.iter().fold(0_i64, |acc, item| {
        let line = item
            .product
            .price
            .to_minor_units()
            .saturating_mul(i64::from(item.quantity));

        acc.saturating_add(line)
    });

    let tax = percent_of_minor(&rules.tax_rate, subtotal);

    let shipping = if subtotal > major_to_minor(rules.free_shipping_threshold, currency) {
        0
    } else {
        major_to_minor(rules.shipping_fee, currency)
    };

    let total = subtotal.saturating_add(tax).saturating_add(shipping);

    CartTotals {
        subtotal: Money::from_minor(subtotal, currency),
        tax: Money::from_minor(tax, currency),
        shipping: Money::from_minor(shipping, currency),
        total: Money::from_minor(total, currency),
    }
}

/// Scale a major unit amount by the currency exponent, rounding half away from zero.
fn major_to_minor(amount: Decimal, currency: &Currency) -> i64 {
    10_i64
        .checked_pow(currency.exponent)
        .and_then(|scale| amount.checked_mul(Decimal::from(scale)))
        .and_then(|minor| {
            minor
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                .to_i64()
        })
        .unwrap_or(i64::MAX)
}

/// Apply a percentage to a minor unit amount, rounding half away from zero.
fn percent_of_minor(percent: &Percentage, minor: i64) -> i64 {
    // decimal_percentage doesn't expose the underlying Decimal
    ((*percent) * Decimal::ONE)
        .checked_mul(Decimal::from(minor))
        .map_or(i64::MAX, |applied| {
            applied
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                .to_i64()
                .unwrap_or(i64::MAX)
        })
}
