//! Archive access behind a narrow capability trait
//!
//! The extractor only needs to list entries and open one of them as a byte
//! stream, so that is all [`ArchiveSource`] exposes. [`ZipArchiveSource`] is the
//! production implementation on top of the `zip` crate.

use std::io::{Cursor, Read, Seek};
use thiserror::Error;
use zip::ZipArchive;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while reading an archive
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The container itself could not be read; fatal for the whole upload
    #[error("Invalid archive: {0}")]
    InvalidArchive(#[source] BoxError),

    /// One entry could not be opened; only that entry is affected
    #[error("Failed to open archive entry '{name}': {source}")]
    Entry {
        name: String,
        #[source]
        source: BoxError,
    },
}

/// One named entry as listed by the archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Position in the archive listing
    pub index: usize,
    /// Full entry path inside the archive
    pub name: String,
    pub is_dir: bool,
}

/// Read access to a container of named byte streams
pub trait ArchiveSource {
    /// Entries in archive-listing order
    fn entries(&self) -> &[ArchiveEntry];

    /// Open one listed entry as a byte stream
    fn open(&mut self, entry: &ArchiveEntry) -> Result<Box<dyn Read + '_>, ArchiveError>;
}

/// [`ArchiveSource`] over a zip container
pub struct ZipArchiveSource<R: Read + Seek> {
    archive: ZipArchive<R>,
    entries: Vec<ArchiveEntry>,
}

impl ZipArchiveSource<Cursor<Vec<u8>>> {
    /// Open an in-memory zip archive
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, ArchiveError> {
        Self::new(Cursor::new(bytes))
    }
}

impl<R: Read + Seek> ZipArchiveSource<R> {
    /// Read the central directory and list every entry.
    ///
    /// Listing uses raw access so an entry with an unsupported compression
    /// method still shows up here and only fails when opened.
    pub fn new(reader: R) -> Result<Self, ArchiveError> {
        let mut archive =
            ZipArchive::new(reader).map_err(|e| ArchiveError::InvalidArchive(Box::new(e)))?;

        let mut entries = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let file = archive
                .by_index_raw(index)
                .map_err(|e| ArchiveError::InvalidArchive(Box::new(e)))?;
            entries.push(ArchiveEntry {
                index,
                name: file.name().to_string(),
                is_dir: file.is_dir(),
            });
        }

        Ok(Self { archive, entries })
    }
}

impl<R: Read + Seek> ArchiveSource for ZipArchiveSource<R> {
    fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    fn open(&mut self, entry: &ArchiveEntry) -> Result<Box<dyn Read + '_>, ArchiveError> {
        let file = self
            .archive
            .by_index(entry.index)
            .map_err(|e| ArchiveError::Entry {
                name: entry.name.clone(),
                source: Box::new(e),
            })?;
        Ok(Box::new(file))
    }
}
