//! Tabular price parser
//!
//! Folds one [`RowSource`] into accepted [`PriceRecord`]s and an ordered list of
//! [`RowRejection`]s. Rows are expected as
//! `externalId,name,category,price,createdAt`; the first row is always dropped
//! as a header whatever it contains, and columns past the fifth are ignored.
//!
//! The parser never logs. Diagnostics are returned to the caller so the
//! behaviour can be asserted on directly.

use pricehub_common::types::{parse_date, parse_price};
use pricehub_common::{PriceRecord, PricehubError};
use thiserror::Error;

use super::rows::{RawRow, RowReadError, RowSource};

/// The stream could not be parsed at all
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TabularError {
    #[error("Stream has no header row")]
    MissingHeader,

    #[error("Failed to read header row: {0}")]
    Header(#[source] RowReadError),
}

/// Why a single row was dropped
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RejectReason {
    #[error("expected at least 5 columns, found {found}")]
    TooFewColumns { found: usize },

    #[error(transparent)]
    InvalidField(#[from] PricehubError),

    #[error("unreadable row: {0}")]
    Unreadable(String),
}

/// Diagnostic for one dropped row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRejection {
    pub line: u64,
    pub reason: RejectReason,
}

/// Result of folding one tabular stream
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParsedEntry {
    pub records: Vec<PriceRecord>,
    pub rejected: Vec<RowRejection>,
    /// Data rows seen after the header, accepted or not
    pub rows_examined: usize,
}

impl ParsedEntry {
    fn absorb(mut self, row: Result<RawRow, RowReadError>) -> Self {
        self.rows_examined += 1;
        match row {
            Ok(row) => match validate_row(&row) {
                Ok(record) => self.records.push(record),
                Err(reason) => self.rejected.push(RowRejection {
                    line: row.line,
                    reason,
                }),
            },
            Err(e) => self.rejected.push(RowRejection {
                line: e.line,
                reason: RejectReason::Unreadable(e.message),
            }),
        }
        self
    }
}

/// Parse every data row of `source`.
///
/// Fails only when the header row itself is missing or unreadable; malformed
/// data rows are recorded in [`ParsedEntry::rejected`] and parsing carries on
/// to the end of input.
pub fn parse_rows<S: RowSource + ?Sized>(source: &mut S) -> Result<ParsedEntry, TabularError> {
    match source.next_row() {
        None => return Err(TabularError::MissingHeader),
        Some(Err(e)) => return Err(TabularError::Header(e)),
        Some(Ok(_header)) => {},
    }

    Ok(std::iter::from_fn(|| source.next_row()).fold(ParsedEntry::default(), ParsedEntry::absorb))
}

/// Validate one data row; price is checked before the date.
pub fn validate_row(row: &RawRow) -> Result<PriceRecord, RejectReason> {
    let [external_id, name, category, price, created_at, ..] = row.fields.as_slice() else {
        return Err(RejectReason::TooFewColumns {
            found: row.fields.len(),
        });
    };

    let price = parse_price(price)?;
    let created_at = parse_date(created_at)?;

    Ok(PriceRecord {
        external_id: external_id.clone(),
        created_at,
        name: name.clone(),
        category: category.clone(),
        price,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::rows::CsvRowSource;
    use chrono::NaiveDate;

    fn parse(input: &str) -> Result<ParsedEntry, TabularError> {
        parse_rows(&mut CsvRowSource::new(input.as_bytes()))
    }

    #[test]
    fn test_parses_valid_rows() {
        let parsed = parse(
            "id,name,category,price,create_date\n\
             1,Widget,Tools,9.99,2024-01-01\n\
             2,Gadget,Toys,5.005,2024-02-29\n",
        )
        .unwrap();

        assert_eq!(parsed.rows_examined, 2);
        assert!(parsed.rejected.is_empty());
        assert_eq!(parsed.records.len(), 2);

        let first = &parsed.records[0];
        assert_eq!(first.external_id, "1");
        assert_eq!(first.name, "Widget");
        assert_eq!(first.category, "Tools");
        assert_eq!(first.price.to_string(), "9.99");
        assert_eq!(first.created_at, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }

    #[test]
    fn test_header_dropped_even_when_it_is_data() {
        let parsed = parse(
            "1,Widget,Tools,9.99,2024-01-01\n\
             2,Gadget,Toys,1.00,2024-01-02\n",
        )
        .unwrap();

        assert_eq!(parsed.rows_examined, 1);
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].external_id, "2");
    }

    #[test]
    fn test_malformed_rows_are_rejected_and_siblings_kept() {
        let parsed = parse(
            "id,name,category,price,create_date\n\
             1,Widget,Tools,9.99\n\
             2,Gadget,Toys,cheap,2024-01-01\n\
             3,Doohickey,Toys,1.50,01/02/2024\n\
             4,Gizmo,Tools,2.50,2024-01-03\n",
        )
        .unwrap();

        assert_eq!(parsed.rows_examined, 4);
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].external_id, "4");

        let lines: Vec<u64> = parsed.rejected.iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![2, 3, 4]);
        assert_eq!(parsed.rejected[0].reason, RejectReason::TooFewColumns { found: 4 });
        assert!(matches!(
            parsed.rejected[1].reason,
            RejectReason::InvalidField(PricehubError::InvalidPrice { .. })
        ));
        assert!(matches!(
            parsed.rejected[2].reason,
            RejectReason::InvalidField(PricehubError::InvalidDate { .. })
        ));
    }

    #[test]
    fn test_price_checked_before_date() {
        let parsed = parse("header\n1,Widget,Tools,oops,not-a-date\n").unwrap();
        assert!(matches!(
            parsed.rejected[0].reason,
            RejectReason::InvalidField(PricehubError::InvalidPrice { .. })
        ));
    }

    #[test]
    fn test_extra_columns_ignored() {
        let parsed = parse("header\n7,Widget,Tools,-3.25,2024-05-05,extra,columns\n").unwrap();
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].price.to_string(), "-3.25");
    }

    #[test]
    fn test_header_only_stream_yields_nothing() {
        let parsed = parse("id,name,category,price,create_date\n").unwrap();
        assert_eq!(parsed, ParsedEntry::default());
    }

    #[test]
    fn test_empty_stream_has_no_header() {
        assert_eq!(parse("").unwrap_err(), TabularError::MissingHeader);
    }

    #[test]
    fn test_unreadable_header_aborts_stream() {
        let mut input = b"\xff\xfe,header\n".to_vec();
        input.extend_from_slice(b"1,Widget,Tools,9.99,2024-01-01\n");

        let result = parse_rows(&mut CsvRowSource::new(input.as_slice()));
        assert!(matches!(result, Err(TabularError::Header(_))));
    }

    #[test]
    fn test_unreadable_data_row_is_rejected() {
        let mut input = b"header\n".to_vec();
        input.extend_from_slice(b"1,Widget,Tools,9.99,2024-01-01\n");
        input.extend_from_slice(b"2,\xff,Tools,9.99,2024-01-01\n");

        let parsed = parse_rows(&mut CsvRowSource::new(input.as_slice())).unwrap();
        assert_eq!(parsed.rows_examined, 2);
        assert_eq!(parsed.records.len(), 1);
        assert!(matches!(parsed.rejected[0].reason, RejectReason::Unreadable(_)));
    }
}
