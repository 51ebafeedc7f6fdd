//! Pricehub Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, utilities, and error handling for the Pricehub project.
//!
//! # Overview
//!
//! - **Types**: [`types::PriceRecord`] and the derived [`types::IngestionSummary`]
//! - **Error Handling**: field-level parse errors shared by the ingest pipeline
//! - **Logging**: centralized `tracing` subscriber setup
//!
//! # Example
//!
//! ```no_run
//! use pricehub_common::types::{parse_date, parse_price};
//!
//! fn main() -> pricehub_common::Result<()> {
//!     let price = parse_price("9.99")?;
//!     let date = parse_date("2024-01-01")?;
//!     println!("{price} on {date}");
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{PricehubError, Result};
pub use types::{IngestionSummary, PriceRecord};
