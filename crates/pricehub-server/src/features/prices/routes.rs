use crate::api::response::ErrorResponse;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use sqlx::PgPool;

use super::{
    commands::{IngestPricesCommand, IngestPricesError},
    queries::{ExportPricesError, ExportPricesQuery},
};

/// Multipart field carrying the uploaded archive
pub const UPLOAD_FIELD: &str = "file";

pub fn prices_routes() -> Router<PgPool> {
    Router::new().route("/", post(ingest_prices).get(export_prices))
}

#[tracing::instrument(skip(pool, multipart))]
async fn ingest_prices(
    State(pool): State<PgPool>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, PricesApiError> {
    let mut multipart = multipart.map_err(|e| PricesApiError::Multipart {
        status: e.status(),
        message: e.body_text(),
    })?;

    let mut archive: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await.map_err(PricesApiError::from)? {
        if field.name() == Some(UPLOAD_FIELD) {
            let data = field.bytes().await.map_err(PricesApiError::from)?;
            archive = Some(data.to_vec());
        }
    }

    let archive = archive.ok_or(PricesApiError::MissingFile)?;
    let summary = super::commands::ingest::handle(pool, IngestPricesCommand { archive }).await?;

    Ok((StatusCode::OK, Json(summary)).into_response())
}

#[tracing::instrument(skip(pool))]
async fn export_prices(State(pool): State<PgPool>) -> Result<Response, PricesApiError> {
    let response = super::queries::export::handle(pool, ExportPricesQuery).await?;

    tracing::info!(
        records = response.records,
        archive_bytes = response.archive.len(),
        "Prices exported via API"
    );

    let headers = [
        (header::CONTENT_TYPE, "application/zip"),
        (header::CONTENT_DISPOSITION, "attachment; filename=\"data.zip\""),
    ];
    Ok((StatusCode::OK, headers, response.archive).into_response())
}

#[derive(Debug, thiserror::Error)]
enum PricesApiError {
    #[error("No 'file' field found in multipart data")]
    MissingFile,

    #[error("Malformed multipart body: {message}")]
    Multipart { status: StatusCode, message: String },

    #[error(transparent)]
    Ingest(#[from] IngestPricesError),

    #[error(transparent)]
    Export(#[from] ExportPricesError),
}

impl From<axum::extract::multipart::MultipartError> for PricesApiError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        Self::Multipart {
            status: err.status(),
            message: err.body_text(),
        }
    }
}

impl IntoResponse for PricesApiError {
    fn into_response(self) -> Response {
        match self {
            PricesApiError::MissingFile => {
                let error = ErrorResponse::new("VALIDATION_ERROR", self.to_string());
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            PricesApiError::Multipart { status, .. } => {
                let error = ErrorResponse::new("INVALID_MULTIPART", self.to_string());
                (status, Json(error)).into_response()
            },
            PricesApiError::Ingest(IngestPricesError::ArchiveRequired)
            | PricesApiError::Ingest(IngestPricesError::InvalidArchive(_)) => {
                let error = ErrorResponse::new("INVALID_ARCHIVE", self.to_string());
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            PricesApiError::Ingest(IngestPricesError::Task(_)) => {
                tracing::error!("Archive extraction failed: {}", self);
                let error = ErrorResponse::new("INTERNAL_ERROR", "Failed to process archive");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
            PricesApiError::Ingest(IngestPricesError::Database(_))
            | PricesApiError::Export(ExportPricesError::Database(_)) => {
                tracing::error!("Database error: {}", self);
                let error = ErrorResponse::new("DATABASE_ERROR", "A database error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
            PricesApiError::Export(_) => {
                tracing::error!("Export error: {}", self);
                let error = ErrorResponse::new("EXPORT_ERROR", "Failed to build export archive");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
        }
    }
}
