//! Archive extractor
//!
//! Walks an [`ArchiveSource`] in listing order, parses every entry whose name
//! ends in `.csv` (any case) and concatenates the accepted records. Entries with
//! other suffixes are skipped silently. An entry that cannot be opened, or whose
//! header cannot be read, contributes nothing and does not affect its siblings.

use pricehub_common::PriceRecord;
use tracing::{debug, warn};

use super::archive::{ArchiveError, ArchiveSource, ZipArchiveSource};
use super::parser::{parse_rows, RowRejection};
use super::rows::CsvRowSource;

/// Records and per-entry diagnostics for one archive
#[derive(Debug, Default)]
pub struct Extraction {
    /// Accepted records, archive-listing order then in-file row order
    pub records: Vec<PriceRecord>,
    /// One report per tabular entry, in the same order
    pub entries: Vec<EntryReport>,
}

impl Extraction {
    /// Rows dropped across every entry
    pub fn rejected_rows(&self) -> usize {
        self.entries
            .iter()
            .map(|entry| match &entry.outcome {
                EntryOutcome::Parsed { rejected, .. } => rejected.len(),
                EntryOutcome::Unreadable { .. } => 0,
            })
            .sum()
    }

    /// Tabular entries that contributed nothing because they were unreadable
    pub fn unreadable_entries(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| matches!(entry.outcome, EntryOutcome::Unreadable { .. }))
            .count()
    }
}

#[derive(Debug)]
pub struct EntryReport {
    pub name: String,
    pub outcome: EntryOutcome,
}

#[derive(Debug)]
pub enum EntryOutcome {
    Parsed {
        rows_examined: usize,
        accepted: usize,
        rejected: Vec<RowRejection>,
    },
    Unreadable {
        reason: String,
    },
}

/// Whether an entry name designates tabular text
pub fn is_tabular_entry(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".csv")
}

/// Open `bytes` as a zip archive and extract every tabular entry.
///
/// Only a corrupt container is an error; entry and row failures are reported in
/// the returned [`Extraction`].
pub fn extract_archive(bytes: Vec<u8>) -> Result<Extraction, ArchiveError> {
    let mut source = ZipArchiveSource::from_bytes(bytes)?;
    Ok(extract_records(&mut source))
}

/// Extract every tabular entry of an already opened archive
pub fn extract_records<A: ArchiveSource + ?Sized>(archive: &mut A) -> Extraction {
    let mut extraction = Extraction::default();

    let tabular: Vec<_> = archive
        .entries()
        .iter()
        .filter(|entry| {
            let keep = !entry.is_dir && is_tabular_entry(&entry.name);
            if !keep {
                debug!(entry = %entry.name, "Skipping non-tabular archive entry");
            }
            keep
        })
        .cloned()
        .collect();

    for entry in tabular {
        let parsed = archive
            .open(&entry)
            .map_err(|e| e.to_string())
            .and_then(|reader| {
                parse_rows(&mut CsvRowSource::new(reader)).map_err(|e| e.to_string())
            });

        let outcome = match parsed {
            Ok(parsed) => {
                for rejection in &parsed.rejected {
                    warn!(
                        entry = %entry.name,
                        line = rejection.line,
                        reason = %rejection.reason,
                        "Skipping malformed row"
                    );
                }
                debug!(
                    entry = %entry.name,
                    rows = parsed.rows_examined,
                    accepted = parsed.records.len(),
                    rejected = parsed.rejected.len(),
                    "Parsed archive entry"
                );

                let accepted = parsed.records.len();
                extraction.records.extend(parsed.records);
                EntryOutcome::Parsed {
                    rows_examined: parsed.rows_examined,
                    accepted,
                    rejected: parsed.rejected,
                }
            },
            Err(reason) => {
                warn!(entry = %entry.name, %reason, "Skipping unreadable archive entry");
                EntryOutcome::Unreadable { reason }
            },
        };

        extraction.entries.push(EntryReport {
            name: entry.name,
            outcome,
        });
    }

    extraction
}
