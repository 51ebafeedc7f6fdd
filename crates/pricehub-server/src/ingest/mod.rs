//! Upload ingestion pipeline
//!
//! Turns an uploaded archive into validated [`PriceRecord`]s:
//!
//! ```text
//! archive bytes ──> ArchiveSource ──> (per .csv entry) RowSource ──> parser fold
//!                                                                      │
//!                         Extraction { records, entries } <────────────┘
//! ```
//!
//! - [`archive`]: the [`ArchiveSource`] capability and its zip implementation
//! - [`rows`]: the [`RowSource`] capability and its csv implementation
//! - [`parser`]: the per-entry fold producing accepted records and rejections
//! - [`extractor`]: drives the parser over every tabular entry of an archive
//!
//! Everything here is synchronous; callers on the async runtime run it inside
//! `tokio::task::spawn_blocking`.
//!
//! [`PriceRecord`]: pricehub_common::PriceRecord

pub mod archive;
pub mod extractor;
pub mod parser;
pub mod rows;

pub use archive::{ArchiveEntry, ArchiveError, ArchiveSource, ZipArchiveSource};
pub use extractor::{extract_archive, extract_records, EntryOutcome, EntryReport, Extraction};
pub use parser::{parse_rows, ParsedEntry, RejectReason, RowRejection, TabularError};
pub use rows::{CsvRowSource, RawRow, RowReadError, RowSource};
