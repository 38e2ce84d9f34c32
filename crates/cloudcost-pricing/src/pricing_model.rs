//! Per-unit price table
//!
//! Prices are keyed by unit name. Read and write units are priced per
//! million request units, storage per binary gigabyte-month. A model is
//! validated when it is built: negative or non-finite prices are a
//! configuration error and never reach the estimator.

use cloudcost_core::error::{CloudcostError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Read request units, priced per million
pub const READ_UNIT: &str = "read-unit";
/// Write request units, priced per million
pub const WRITE_UNIT: &str = "write-unit";
/// Stored gigabytes (1024^3 bytes) per month
pub const STORAGE_UNIT: &str = "storage-GB-month";

/// On-demand table pricing used when nothing else is configured
pub const DEFAULT_READ_PRICE: f64 = 0.25;
pub const DEFAULT_WRITE_PRICE: f64 = 1.25;
pub const DEFAULT_STORAGE_PRICE: f64 = 0.25;

/// Immutable, validated unit price table
///
/// # Examples
/// ```
/// use cloudcost_pricing::pricing_model::{PricingModel, STORAGE_UNIT};
///
/// let pricing = PricingModel::on_demand(0.25, 1.25, 0.25).unwrap();
/// assert_eq!(pricing.price(STORAGE_UNIT), Some(0.25));
///
/// assert!(PricingModel::on_demand(-1.0, 1.25, 0.25).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct PricingModel {
    prices: BTreeMap<String, f64>,
}

impl PricingModel {
    /// Build a model from `(unit, price)` pairs
    ///
    /// # Errors
    ///
    /// Returns [`CloudcostError::ContractViolation`] for a negative, NaN or
    /// infinite price.
    pub fn new<I, K>(prices: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        let mut validated = BTreeMap::new();
        for (unit, price) in prices {
            let unit = unit.into();
            if !price.is_finite() || price < 0.0 {
                return Err(CloudcostError::ContractViolation(format!(
                    "price for '{unit}' must be a finite non-negative number, got {price}"
                )));
            }
            validated.insert(unit, price);
        }
        Ok(Self { prices: validated })
    }

    /// Table pricing with read, write and storage prices
    pub fn on_demand(
        read_per_million: f64,
        write_per_million: f64,
        storage_per_gb_month: f64,
    ) -> Result<Self> {
        Self::new([
            (READ_UNIT, read_per_million),
            (WRITE_UNIT, write_per_million),
            (STORAGE_UNIT, storage_per_gb_month),
        ])
    }

    /// Price for `unit`, if configured
    pub fn price(&self, unit: &str) -> Option<f64> {
        self.prices.get(unit).copied()
    }

    /// Configured units in name order
    pub fn units(&self) -> impl Iterator<Item = (&str, f64)> {
        self.prices.iter().map(|(unit, price)| (unit.as_str(), *price))
    }
}

impl Default for PricingModel {
    fn default() -> Self {
        let prices = [
            (READ_UNIT, DEFAULT_READ_PRICE),
            (WRITE_UNIT, DEFAULT_WRITE_PRICE),
            (STORAGE_UNIT, DEFAULT_STORAGE_PRICE),
        ];
        Self {
            prices: prices
                .into_iter()
                .map(|(unit, price)| (unit.to_string(), price))
                .collect(),
        }
    }
}

impl TryFrom<BTreeMap<String, f64>> for PricingModel {
    type Error = CloudcostError;

    fn try_from(prices: BTreeMap<String, f64>) -> Result<Self> {
        Self::new(prices)
    }
}

impl From<PricingModel> for BTreeMap<String, f64> {
    fn from(model: PricingModel) -> Self {
        model.prices
    }
}
