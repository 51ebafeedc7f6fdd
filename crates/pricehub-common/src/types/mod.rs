//! Common types used across Pricehub

use bigdecimal::{BigDecimal, RoundingMode, ToPrimitive};
use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::str::FromStr;

use crate::error::{PricehubError, Result};

/// Calendar date format used on the wire, in both directions.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Number of fractional digits prices are stored and reported with.
pub const PRICE_SCALE: i64 = 2;

/// Largest decimal exponent accepted when parsing a price.
///
/// Keeps inputs such as `1e999999999` from expanding into huge digit strings
/// before they ever reach the store. This is not the storable range: prices are
/// stored as `NUMERIC(12,2)`, so any accepted price of `1e10` or more makes the
/// insert fail and rolls back the whole batch.
pub const MAX_PRICE_EXPONENT: i64 = 64;

/// One validated price row.
///
/// `external_id` is the natural key supplied by the client: ingesting a record
/// whose `external_id` is already stored leaves the stored row untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceRecord {
    pub external_id: String,
    pub created_at: NaiveDate,
    pub name: String,
    pub category: String,
    pub price: BigDecimal,
}

/// Aggregate returned after an ingestion request.
///
/// `total_items` counts every record whose upsert ran without an unexpected
/// store error in this request. That includes records that were no-ops because
/// their `external_id` already existed, so it reads as "records accepted for
/// processing", not "rows newly inserted".
///
/// `total_categories` and `total_price` are computed over the whole stored
/// dataset, not only the current batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestionSummary {
    pub total_items: u64,
    pub total_categories: u64,
    #[serde(serialize_with = "serialize_currency")]
    pub total_price: BigDecimal,
}

impl IngestionSummary {
    /// Builds a summary, rounding the raw price sum to [`PRICE_SCALE`] digits.
    pub fn new(total_items: u64, total_categories: u64, raw_total_price: &BigDecimal) -> Self {
        Self {
            total_items,
            total_categories,
            total_price: round_currency(raw_total_price),
        }
    }
}

/// Parse a decimal price as supplied in an uploaded row.
///
/// No range check is applied; negative values are accepted. Digit separators
/// (`1_000`) are rejected.
pub fn parse_price(value: &str) -> Result<BigDecimal> {
    if value.contains('_') {
        return Err(PricehubError::InvalidPrice {
            value: value.to_string(),
            reason: "digit separators are not allowed".to_string(),
        });
    }

    let price = BigDecimal::from_str(value).map_err(|e| PricehubError::InvalidPrice {
        value: value.to_string(),
        reason: e.to_string(),
    })?;

    let (_, exponent) = price.as_bigint_and_exponent();
    if exponent.abs() > MAX_PRICE_EXPONENT {
        return Err(PricehubError::InvalidPrice {
            value: value.to_string(),
            reason: format!("exponent exceeds {}", MAX_PRICE_EXPONENT),
        });
    }

    Ok(price)
}

/// Parse a `YYYY-MM-DD` calendar date.
///
/// The layout is fixed: four-digit year, two-digit month and day, no sign and
/// no surrounding whitespace.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    let invalid = || PricehubError::InvalidDate {
        value: value.to_string(),
    };

    if !has_date_layout(value) {
        return Err(invalid());
    }

    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| invalid())
}

fn has_date_layout(value: &str) -> bool {
    value.len() == 10
        && value.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Round to two fractional digits, half away from zero (`14.995` -> `15.00`).
pub fn round_currency(value: &BigDecimal) -> BigDecimal {
    value.with_scale_round(PRICE_SCALE, RoundingMode::HalfUp)
}

/// Render a price with exactly two fractional digits.
pub fn format_price(value: &BigDecimal) -> String {
    round_currency(value).to_string()
}

/// Render a date as `YYYY-MM-DD`.
pub fn format_date(value: &NaiveDate) -> String {
    value.format(DATE_FORMAT).to_string()
}

fn serialize_currency<S>(value: &BigDecimal, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let amount = value
        .to_f64()
        .ok_or_else(|| serde::ser::Error::custom("total price is not representable as f64"))?;
    serializer.serialize_f64(amount)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn dec(value: &str) -> BigDecimal {
        BigDecimal::from_str(value).unwrap()
    }

    #[test]
    fn test_round_currency_half_away_from_zero() {
        assert_eq!(round_currency(&dec("14.995")), dec("15.00"));
        assert_eq!(round_currency(&dec("-14.995")), dec("-15.00"));
        assert_eq!(round_currency(&dec("14.994")), dec("14.99"));
        assert_eq!(round_currency(&dec("0")), dec("0.00"));
    }

    #[test]
    fn test_round_currency_sum_of_prices() {
        let total = dec("9.99") + dec("5.005");
        assert_eq!(round_currency(&total), dec("15.00"));
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("9.99").unwrap(), dec("9.99"));
        assert_eq!(parse_price("-3.5").unwrap(), dec("-3.5"));
        assert_eq!(parse_price("12").unwrap(), dec("12"));
        assert!(parse_price("abc").is_err());
        assert!(parse_price("").is_err());
        assert!(parse_price("1e999999").is_err());
    }

    #[test]
    fn test_parse_price_rejects_digit_separators() {
        assert!(parse_price("1_0").is_err());
        assert!(parse_price("1_000.50").is_err());
    }

    #[test]
    fn test_parse_price_accepts_values_beyond_storable_range() {
        // Rejected later by the NUMERIC(12,2) column, failing the whole batch
        assert_eq!(parse_price("1e64").unwrap(), dec("1e64"));
        assert_eq!(parse_price("99999999999.00").unwrap(), dec("99999999999"));
    }

    #[test]
    fn test_parse_price_error_keeps_value() {
        match parse_price("ten") {
            Err(PricehubError::InvalidPrice { value, .. }) => assert_eq!(value, "ten"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_parse_date() {
        let date = parse_date("2024-01-01").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert!(parse_date("01/01/2024").is_err());
        assert!(parse_date("2024-13-01").is_err());
        assert!(parse_date("2024-01-01T00:00:00").is_err());
        assert!(parse_date("2024-1-1").is_err());
        assert!(parse_date("2024-01-1").is_err());
        assert!(parse_date(" 2024-01-01").is_err());
        assert!(parse_date("2024-01-01 ").is_err());
        assert!(parse_date("+2024-01-01").is_err());
        assert!(parse_date("02024-01-01").is_err());
        assert!(parse_date("2024-02-30").is_err());
    }

    #[test]
    fn test_format_helpers() {
        assert_eq!(format_price(&dec("9.99")), "9.99");
        assert_eq!(format_price(&dec("5")), "5.00");
        assert_eq!(format_price(&dec("-0.5")), "-0.50");
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(format_date(&date), "2024-03-09");
    }

    #[test]
    fn test_summary_serialization() {
        let summary = IngestionSummary::new(3, 2, &dec("14.995"));
        assert_eq!(summary.total_price, dec("15.00"));

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["total_items"], 3);
        assert_eq!(json["total_categories"], 2);
        assert_eq!(json["total_price"].as_f64().unwrap(), 15.0);
        assert_eq!(json.as_object().unwrap().len(), 3);
    }
}
