//! Storefront configuration
//!
//! Currency, tax rate, shipping rates, coupon table and storage keys, loaded
//! from YAML:
//!
//! ```yaml
//! currency: USD
//! tax_rate: "8%"
//! shipping:
//!   standard: "4.99"
//!   express: "9.99"
//!   overnight: "19.99"
//! coupons:
//!   SAVE20:
//!     discount: "20%"
//!     min_order: "50.00"
//! storage:
//!   items: cart
//!   flash_discounts: activeFlashDiscounts
//! ```
//!
//! Every section is optional and falls back to the built-in defaults.

use std::{fs, path::Path};

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::iso::{Currency, EUR, GBP, USD};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    checkout::{Checkout, CouponRule, CouponTable, ShippingRates},
    storage::StorageKeys,
};

/// Configuration parsing errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading the configuration file
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),
}

/// Resolved storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Currency for all amounts
    pub currency: &'static Currency,

    /// Flat tax rate applied to the subtotal
    pub tax_rate: Percentage,

    /// Paid shipping method prices
    pub shipping: ShippingRates,

    /// Coupon eligibility table
    pub coupons: CouponTable,

    /// Keys for persisted cart state
    pub storage: StorageKeys,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            currency: USD,
            tax_rate: Percentage::from(0.08),
            shipping: ShippingRates::default(),
            coupons: CouponTable::default(),
            storage: StorageKeys::default(),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or any value is invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml(&contents)
    }

    /// Parse configuration from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or any value is invalid.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = serde_norway::from_str(contents)?;

        Self::try_from(file)
    }

    /// A checkout using this configuration's rates, tax and coupons.
    pub fn checkout(&self) -> Checkout {
        Checkout::new(self.shipping, self.tax_rate, self.coupons.clone())
    }
}

/// Configuration file as written in YAML.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    currency: Option<String>,
    tax_rate: Option<String>,
    shipping: Option<ShippingFile>,
    coupons: Option<FxHashMap<String, CouponFile>>,
    storage: Option<StorageKeys>,
}

#[derive(Debug, Deserialize)]
struct ShippingFile {
    standard: String,
    express: String,
    overnight: String,
}

#[derive(Debug, Deserialize)]
struct CouponFile {
    discount: String,
    #[serde(default)]
    min_order: Option<String>,
    #[serde(default)]
    free_shipping: bool,
}

impl TryFrom<ConfigFile> for StorefrontConfig {
    type Error = ConfigError;

    fn try_from(file: ConfigFile) -> Result<Self, Self::Error> {
        let defaults = Self::default();

        let currency = file
            .currency
            .as_deref()
            .map_or(Ok(defaults.currency), parse_currency)?;

        let tax_rate = file
            .tax_rate
            .as_deref()
            .map_or(Ok(defaults.tax_rate), parse_percentage)?;

        let shipping = match file.shipping {
            Some(shipping) => ShippingRates {
                standard: parse_amount(&shipping.standard)?,
                express: parse_amount(&shipping.express)?,
                overnight: parse_amount(&shipping.overnight)?,
            },
            None => defaults.shipping,
        };

        let coupons = match file.coupons {
            Some(coupons) => {
                let mut table = CouponTable::empty();

                for (code, coupon) in coupons {
                    table.insert(&code, CouponRule::try_from(coupon)?);
                }

                table
            }
            None => defaults.coupons,
        };

        Ok(Self {
            currency,
            tax_rate,
            shipping,
            coupons,
            storage: file.storage.unwrap_or(defaults.storage),
        })
    }
}

impl TryFrom<CouponFile> for CouponRule {
    type Error = ConfigError;

    fn try_from(coupon: CouponFile) -> Result<Self, Self::Error> {
        Ok(CouponRule {
            discount: parse_percentage(&coupon.discount)?,
            min_order: coupon
                .min_order
                .as_deref()
                .map_or(Ok(Decimal::ZERO), parse_amount)?,
            free_shipping: coupon.free_shipping,
        })
    }
}

/// Parse an ISO currency code supported by the storefront.
///
/// # Errors
///
/// Returns [`ConfigError::UnknownCurrency`] for anything other than GBP, USD or EUR.
pub fn parse_currency(code: &str) -> Result<&'static Currency, ConfigError> {
    match code.trim().to_uppercase().as_str() {
        "GBP" => Ok(GBP),
        "USD" => Ok(USD),
        "EUR" => Ok(EUR),
        other => Err(ConfigError::UnknownCurrency(other.to_string())),
    }
}

/// Parse a non-negative decimal amount (e.g. "4.99").
///
/// # Errors
///
/// Returns [`ConfigError::InvalidPrice`] if the string is not a non-negative decimal.
pub fn parse_amount(s: &str) -> Result<Decimal, ConfigError> {
    let amount = s
        .trim()
        .parse::<Decimal>()
        .map_err(|_err| ConfigError::InvalidPrice(s.to_string()))?;

    if amount.is_sign_negative() {
        return Err(ConfigError::InvalidPrice(s.to_string()));
    }

    Ok(amount)
}

/// Parse percentage string (e.g., "15%" or "0.15") into a `Percentage`
///
/// Accepts two formats:
/// - Percentage format: "15%" for 15%
/// - Decimal format: "0.15" for 15%
///
/// # Errors
///
/// Returns an error if the string cannot be parsed or is outside 0-100%.
pub fn parse_percentage(s: &str) -> Result<Percentage, ConfigError> {
    let trimmed = s.trim();

    let fraction = if let Some(percent_str) = trimmed.strip_suffix('%') {
        percent_str
            .trim()
            .parse::<f64>()
            .map_err(|_err| ConfigError::InvalidPercentage(s.to_string()))?
            / 100.0
    } else {
        trimmed
            .parse::<f64>()
            .map_err(|_err| ConfigError::InvalidPercentage(s.to_string()))?
    };

    if !(0.0..=1.0).contains(&fraction) {
        return Err(ConfigError::InvalidPercentage(s.to_string()));
    }

    Ok(Percentage::from(fraction))
}
