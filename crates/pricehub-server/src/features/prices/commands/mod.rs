pub mod ingest;

pub use ingest::{BatchOutcome, IngestPricesCommand, IngestPricesError};
