//! Error types for cloudcost
//!
//! This module defines the error types used throughout the cloudcost crates.
//! All errors are derived from `thiserror` for convenient error handling
//! and automatic `From` implementations.
//!
//! Only [`CloudcostError::ContractViolation`] is fatal for a report run.
//! Every other variant raised while building a report section is caught at
//! the section boundary and turned into a placeholder section.
//!
//! # Example
//!
//! ```
//! use cloudcost_core::error::{CloudcostError, Result};
//!
//! fn lookback(days: u32) -> Result<u32> {
//!     if days == 0 {
//!         return Err(CloudcostError::ContractViolation(
//!             "lookback must be at least one day".to_string(),
//!         ));
//!     }
//!     Ok(days)
//! }
//!
//! assert!(lookback(0).is_err());
//! ```

use thiserror::Error;

/// Main error type for cloudcost operations
#[derive(Error, Debug)]
pub enum CloudcostError {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Network error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid pricing or lookback configuration; aborts the run
    #[error("Contract violation: {0}")]
    ContractViolation(String),

    /// An external collaborator (inventory, metrics, billing) failed
    #[error("{source_name} failed: {message}")]
    Collaborator {
        /// Which collaborator call failed
        source_name: String,
        /// Failure description
        message: String,
    },

    /// Chat notification could not be delivered
    #[error("Notification failed: {0}")]
    Notify(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl CloudcostError {
    /// Shorthand for a collaborator failure
    pub fn collaborator(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Collaborator {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Whether this error must abort the whole run
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ContractViolation(_))
    }
}

/// Convenience type alias for Results in cloudcost
pub type Result<T> = std::result::Result<T, CloudcostError>;
