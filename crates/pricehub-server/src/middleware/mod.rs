//! Middleware for the Pricehub server
//!
//! - CORS (Cross-Origin Resource Sharing)
//! - Request logging with tracing

use axum::http::{header, Method};
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::CorsConfig;

/// Create CORS layer from configuration.
///
/// Credentials are only enabled together with an explicit origin list; a
/// wildcard origin never carries credentials.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::ACCEPT,
            header::ACCEPT_LANGUAGE,
            header::CONTENT_LANGUAGE,
            header::CONTENT_TYPE,
        ])
        .expose_headers([header::CONTENT_DISPOSITION])
        .max_age(Duration::from_secs(3600));

    if is_wildcard(config) {
        if config.allow_credentials {
            tracing::warn!("CORS credentials ignored for wildcard origin");
        }
        return cors.allow_origin(Any);
    }

    let origins: Vec<_> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    cors.allow_origin(origins)
        .allow_credentials(config.allow_credentials)
}

fn is_wildcard(config: &CorsConfig) -> bool {
    config.allowed_origins.is_empty() || config.allowed_origins.iter().any(|o| o == "*")
}

/// Create tracing/logging layer
pub fn tracing_layer(
) -> TraceLayer<tower_http::classify::SharedClassifier<tower_http::classify::ServerErrorsAsFailures>>
{
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(tower_http::LatencyUnit::Micros),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cors(origins: &[&str], allow_credentials: bool) -> CorsConfig {
        CorsConfig {
            allowed_origins: origins.iter().map(|o| o.to_string()).collect(),
            allow_credentials,
        }
    }

    #[test]
    fn test_is_wildcard() {
        assert!(is_wildcard(&cors(&[], false)));
        assert!(is_wildcard(&cors(&["*"], false)));
        assert!(is_wildcard(&cors(&["http://localhost:3000", "*"], false)));
        assert!(!is_wildcard(&cors(&["http://localhost:3000"], false)));
    }

    #[test]
    fn test_cors_layer_with_specific_origins_and_credentials() {
        let _layer = cors_layer(&cors(&["http://localhost:3000", "https://example.com"], true));
    }

    #[test]
    fn test_cors_layer_wildcard_drops_credentials() {
        // Any + credentials would panic when the layer is applied
        let layer = cors_layer(&cors(&["*"], true));
        let _service = tower::ServiceBuilder::new()
            .layer(layer)
            .service(tower::service_fn(|_: axum::http::Request<axum::body::Body>| async {
                Ok::<_, std::convert::Infallible>(axum::http::Response::new(axum::body::Body::empty()))
            }));
    }
}
