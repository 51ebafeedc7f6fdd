use bigdecimal::BigDecimal;
use pricehub_common::{IngestionSummary, PriceRecord};
use sqlx::PgPool;

use crate::ingest::{extract_archive, ArchiveError};

/// Transaction-scoped advisory lock key held while a batch is persisted
pub const INGEST_LOCK_KEY: i64 = 0x7072_6963_6573;

/// Ingest every tabular entry of an uploaded zip archive
#[derive(Debug, Clone)]
pub struct IngestPricesCommand {
    pub archive: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum IngestPricesError {
    #[error("Archive is required and cannot be empty")]
    ArchiveRequired,

    #[error("{0}")]
    InvalidArchive(#[from] ArchiveError),

    #[error("Archive extraction task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IngestPricesCommand {
    pub fn validate(&self) -> Result<(), IngestPricesError> {
        if self.archive.is_empty() {
            return Err(IngestPricesError::ArchiveRequired);
        }
        Ok(())
    }
}

/// Result of persisting one batch of records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    pub summary: IngestionSummary,
    /// Rows that did not exist before this batch
    pub inserted_items: u64,
}

/// Extract, validate and persist the records of one archive.
///
/// Extraction runs on the blocking pool. Malformed rows and unreadable entries
/// are dropped and logged; only an unreadable container fails the request
/// before anything touches the database.
#[tracing::instrument(skip(pool, command), fields(archive_bytes = command.archive.len()))]
pub async fn handle(
    pool: PgPool,
    command: IngestPricesCommand,
) -> Result<IngestionSummary, IngestPricesError> {
    command.validate()?;

    let archive = command.archive;
    let extraction = tokio::task::spawn_blocking(move || extract_archive(archive)).await??;

    let outcome = persist_batch(&pool, &extraction.records).await?;

    tracing::info!(
        total_items = outcome.summary.total_items,
        inserted_items = outcome.inserted_items,
        rejected_rows = extraction.rejected_rows(),
        skipped_entries = extraction.unreadable_entries(),
        total_categories = outcome.summary.total_categories,
        total_price = %outcome.summary.total_price,
        "Prices ingested"
    );

    Ok(outcome.summary)
}

/// Upsert `records` in order and aggregate the whole table, in one transaction.
///
/// A record whose `external_id` already exists is a no-op but still counts
/// towards `total_items`. Any other failure rolls back the entire batch.
///
/// Concurrent batches are serialized on [`INGEST_LOCK_KEY`] so overlapping
/// `external_id`s inserted in different orders cannot deadlock.
#[tracing::instrument(skip(pool, records), fields(records = records.len()))]
pub async fn persist_batch(
    pool: &PgPool,
    records: &[PriceRecord],
) -> Result<BatchOutcome, sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(INGEST_LOCK_KEY)
        .execute(&mut *tx)
        .await?;

    let mut total_items = 0u64;
    let mut inserted_items = 0u64;

    for record in records {
        let result = sqlx::query(
            r#"
            INSERT INTO prices (external_id, created_at, name, category, price)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (external_id) DO NOTHING
            "#,
        )
        .bind(&record.external_id)
        .bind(record.created_at)
        .bind(&record.name)
        .bind(&record.category)
        .bind(&record.price)
        .execute(&mut *tx)
        .await?;

        total_items += 1;
        inserted_items += result.rows_affected();
    }

    let (total_categories, raw_total_price): (i64, BigDecimal) = sqlx::query_as(
        r#"
        SELECT COUNT(DISTINCT category), COALESCE(SUM(price), 0)
        FROM prices
        "#,
    )
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(BatchOutcome {
        summary: IngestionSummary::new(
            total_items,
            u64::try_from(total_categories).unwrap_or_default(),
            &raw_total_price,
        ),
        inserted_items,
    })
}
