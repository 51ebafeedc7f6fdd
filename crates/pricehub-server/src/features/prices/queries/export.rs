use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use pricehub_common::types::{format_date, format_price};
use pricehub_common::PriceRecord;
use sqlx::PgPool;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Name of the single entry inside an exported archive
pub const EXPORT_ENTRY_NAME: &str = "data.csv";

/// Header row of the exported CSV
pub const EXPORT_HEADER: [&str; 5] = ["id", "name", "category", "price", "create_date"];

/// Export every stored price as a zip archive
#[derive(Debug, Clone, Default)]
pub struct ExportPricesQuery;

#[derive(Debug, Clone)]
pub struct ExportPricesResponse {
    /// Zip archive holding `data.csv`
    pub archive: Vec<u8>,
    pub records: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportPricesError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to build archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, sqlx::FromRow)]
struct PriceRow {
    external_id: String,
    name: String,
    category: String,
    price: BigDecimal,
    created_at: NaiveDate,
}

impl From<PriceRow> for PriceRecord {
    fn from(row: PriceRow) -> Self {
        Self {
            external_id: row.external_id,
            created_at: row.created_at,
            name: row.name,
            category: row.category,
            price: row.price,
        }
    }
}

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: PgPool,
    _query: ExportPricesQuery,
) -> Result<ExportPricesResponse, ExportPricesError> {
    let records = fetch_all(&pool).await?;
    let archive = build_archive(&write_csv(&records)?)?;

    tracing::debug!(
        records = records.len(),
        archive_bytes = archive.len(),
        "Prices export built"
    );

    Ok(ExportPricesResponse {
        archive,
        records: records.len(),
    })
}

/// Every stored record in insertion order
pub async fn fetch_all(pool: &PgPool) -> Result<Vec<PriceRecord>, sqlx::Error> {
    let rows: Vec<PriceRow> = sqlx::query_as(
        r#"
        SELECT external_id, name, category, price, created_at
        FROM prices
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(PriceRecord::from).collect())
}

/// Serialize records as CSV with a header row.
///
/// The `id` column carries the client's `external_id`; prices always have two
/// fractional digits.
pub fn write_csv(records: &[PriceRecord]) -> Result<Vec<u8>, ExportPricesError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(EXPORT_HEADER)?;

    for record in records {
        writer.write_record([
            record.external_id.as_str(),
            record.name.as_str(),
            record.category.as_str(),
            format_price(&record.price).as_str(),
            format_date(&record.created_at).as_str(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| ExportPricesError::Io(e.into_error()))
}

/// Package `csv` as the single `data.csv` entry of a new zip archive
pub fn build_archive(csv: &[u8]) -> Result<Vec<u8>, ExportPricesError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    writer.start_file(EXPORT_ENTRY_NAME, options)?;
    writer.write_all(csv)?;

    Ok(writer.finish()?.into_inner())
}
