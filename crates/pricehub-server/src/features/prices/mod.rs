//! Price ingestion and export
//!
//! - `POST /` ingests a multipart-uploaded zip archive of CSV files
//! - `GET /` exports every stored price as a zip archive holding `data.csv`

pub mod commands;
pub mod queries;
pub mod routes;

pub use commands::{BatchOutcome, IngestPricesCommand, IngestPricesError};

pub use queries::{ExportPricesError, ExportPricesQuery, ExportPricesResponse};

pub use routes::prices_routes;
