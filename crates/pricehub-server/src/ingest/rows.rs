//! Row access behind a narrow capability trait

use std::io::Read;
use thiserror::Error;

/// One raw row as split by the tabular reader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based line number of the row start, 0 when unknown
    pub line: u64,
    pub fields: Vec<String>,
}

/// A row that could not be read at all
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct RowReadError {
    pub line: u64,
    pub message: String,
}

/// Sequential producer of rows from one tabular stream
pub trait RowSource {
    /// Next row, or `None` at end of input
    fn next_row(&mut self) -> Option<Result<RawRow, RowReadError>>;
}

/// [`RowSource`] over comma-delimited text using the `csv` crate.
///
/// Rows may have any number of fields; the header is not treated specially
/// here. After an I/O error the source reports end of input, since the
/// underlying stream cannot be resumed.
pub struct CsvRowSource<R: Read> {
    reader: csv::Reader<R>,
    record: csv::StringRecord,
    exhausted: bool,
}

impl<R: Read> CsvRowSource<R> {
    pub fn new(input: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(input);

        Self {
            reader,
            record: csv::StringRecord::new(),
            exhausted: false,
        }
    }
}

impl<R: Read> RowSource for CsvRowSource<R> {
    fn next_row(&mut self) -> Option<Result<RawRow, RowReadError>> {
        if self.exhausted {
            return None;
        }

        match self.reader.read_record(&mut self.record) {
            Ok(true) => Some(Ok(RawRow {
                line: self.record.position().map_or(0, |p| p.line()),
                fields: self.record.iter().map(str::to_owned).collect(),
            })),
            Ok(false) => {
                self.exhausted = true;
                None
            },
            Err(e) => {
                if e.is_io_error() {
                    self.exhausted = true;
                }
                Some(Err(RowReadError {
                    line: e
                        .position()
                        .map_or_else(|| self.reader.position().line(), |p| p.line()),
                    message: e.to_string(),
                }))
            },
        }
    }
}
