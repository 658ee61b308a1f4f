//! Cart configuration

use std::{fs, path::Path};

use jiff::SignedDuration;
use rust_decimal::Decimal;
use rusty_money::iso::{Currency, USD};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    expiry::{ExpiryPolicy, ExpiryPolicyError},
    money::{PriceError, currency_from_code, parse_percentage, parse_price},
    pricing::PricingRules,
};

/// Default storage key for the persisted cart.
pub const DEFAULT_STORAGE_KEY: &str = "cart";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading the config file
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Price, currency or percentage could not be parsed
    #[error(transparent)]
    Price(#[from] PriceError),

    /// Duration could not be parsed
    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    /// Timeout and warning lead are inconsistent
    #[error(transparent)]
    Expiry(#[from] ExpiryPolicyError),

    /// A pricing amount is in a different currency from the cart
    #[error("Currency mismatch: cart uses {0}, {1} is priced in {2}")]
    CurrencyMismatch(&'static str, &'static str, &'static str),
}

/// Cart configuration
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Currency of the cart; products in other currencies are refused.
    pub currency: &'static Currency,

    /// Storage key the snapshot is written under.
    pub storage_key: String,

    /// Tax and shipping rules.
    pub pricing: PricingRules,

    /// Session timeout and warning lead.
    pub expiry: ExpiryPolicy,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            currency: USD,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            pricing: PricingRules::default(),
            expiry: ExpiryPolicy::default(),
        }
    }
}

impl CartConfig {
    /// Load configuration from a YAML file. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or any value is invalid.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml(&contents)
    }

    /// Load configuration from YAML text. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML cannot be parsed or any value is invalid.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = serde_norway::from_str(yaml)?;
        let mut config = Self::default();

        if let Some(code) = file.currency {
            config.currency = currency_from_code(&code)?;
        }

        if let Some(key) = file.storage_key {
            config.storage_key = key;
        }

        if let Some(rate) = file.tax_rate {
            config.pricing.tax_rate = parse_percentage(&rate)?;
        }

        if let Some(threshold) = file.free_shipping_threshold {
            config.pricing.free_shipping_threshold =
                config.amount("free_shipping_threshold", &threshold)?;
        }

        if let Some(fee) = file.shipping_fee {
            config.pricing.shipping_fee = config.amount("shipping_fee", &fee)?;
        }

        let timeout = file
            .session_timeout
            .as_deref()
            .map(parse_duration)
            .transpose()?
            .unwrap_or(config.expiry.session_timeout());

        let lead = file
            .warning_lead
            .as_deref()
            .map(parse_duration)
            .transpose()?
            .unwrap_or(config.expiry.warning_lead());

        config.expiry = ExpiryPolicy::new(timeout, lead)?;

        Ok(config)
    }

    fn amount(&self, field: &'static str, price: &str) -> Result<Decimal, ConfigError> {
        let money = parse_price(price)?;

        if money.currency() != self.currency {
            return Err(ConfigError::CurrencyMismatch(
                self.currency.iso_alpha_code,
                field,
                money.currency().iso_alpha_code,
            ));
        }

        Ok(*money.amount())
    }
}

fn parse_duration(s: &str) -> Result<SignedDuration, ConfigError> {
    s.trim()
        .parse::<SignedDuration>()
        .map_err(|_err| ConfigError::InvalidDuration(s.to_string()))
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    currency: Option<String>,
    storage_key: Option<String>,
    tax_rate: Option<String>,
    free_shipping_threshold: Option<String>,
    shipping_fee: Option<String>,
    session_timeout: Option<String>,
    warning_lead: Option<String>,
}
