//! Pricing model and cost estimator for cloudcost
//!
//! This crate holds the per-unit price table and turns windowed usage
//! aggregates into 30-day monthly cost estimates.

pub mod cost_estimator;
pub mod pricing_model;

pub use cost_estimator::{CostBreakdown, CostEstimator};
pub use pricing_model::PricingModel;
