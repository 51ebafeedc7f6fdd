//! Error types for Pricehub

use thiserror::Error;

/// Result type alias for Pricehub operations
pub type Result<T> = std::result::Result<T, PricehubError>;

/// Main error type for Pricehub
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PricehubError {
    #[error("Invalid price '{value}': {reason}")]
    InvalidPrice { value: String, reason: String },

    #[error("Invalid date '{value}': expected YYYY-MM-DD")]
    InvalidDate { value: String },
}
