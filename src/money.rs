//! Money parsing helpers

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{Findable, Money, iso::Currency};
use thiserror::Error;

/// Errors raised while parsing human-written prices and rates.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PriceError {
    /// Price string was not `AMOUNT CURRENCY`, or the amount was not a number.
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Currency code is not an ISO 4217 code.
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Percentage string could not be parsed.
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),
}

/// Look up an ISO currency by its alpha code (e.g. `"USD"`).
///
/// # Errors
///
/// Returns [`PriceError::UnknownCurrency`] if the code is not recognised.
pub fn currency_from_code(code: &str) -> Result<&'static Currency, PriceError> {
    Currency::find(code).ok_or_else(|| PriceError::UnknownCurrency(code.to_string()))
}

/// Parse a price string (e.g. `"30.00 USD"`) into money.
///
/// # Errors
///
/// Returns an error if the string is not in the format `AMOUNT CURRENCY`,
/// if the amount is not a decimal number, or if the currency code is not
/// recognised.
pub fn parse_price(s: &str) -> Result<Money<'static, Currency>, PriceError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(PriceError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| PriceError::InvalidPrice(s.to_string()))?;

    let currency = currency_from_code(code)?;

    let minor_units = amount
        .checked_mul(Decimal::from(10_i64.pow(currency.exponent)))
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| PriceError::InvalidPrice(s.to_string()))?;

    Ok(Money::from_minor(minor_units, currency))
}

/// Parse a percentage string (e.g. `"8%"` or `"0.08"`).
///
/// # Errors
///
/// Returns [`PriceError::InvalidPercentage`] if the value cannot be parsed.
pub fn parse_percentage(s: &str) -> Result<Percentage, PriceError> {
    let trimmed = s.trim();

    let value = if let Some(percent_str) = trimmed.strip_suffix('%') {
        percent_str
            .trim()
            .parse::<Decimal>()
            .map(|value| value / Decimal::ONE_HUNDRED)
    } else {
        trimmed.parse::<Decimal>()
    };

    value
        .map(Percentage::from)
        .map_err(|_err| PriceError::InvalidPercentage(s.to_string()))
}
