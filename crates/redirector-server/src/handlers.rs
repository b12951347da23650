//! HTTP request handlers.

use axum::{
    extract::{Path, RawQuery, State},
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use redirector_core::{Redirect, ResolutionRequest};
use serde::Serialize;
use tracing::warn;

use crate::{error::ApiError, extractors::ClientIp, state::AppState};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: &'static str,
    /// Version
    pub version: &'static str,
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Metrics endpoint (Prometheus format)
pub async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let body = state.metrics.as_ref().map(redirector_telemetry::Metrics::gather).unwrap_or_default();
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
}

/// Redirect endpoint: `GET /redirect/:pool_id/*path`
pub async fn redirect(
    State(state): State<AppState>,
    Path((pool_id, path)): Path<(String, String)>,
    RawQuery(query): RawQuery,
    ClientIp(client_ip): ClientIp,
) -> Result<Response, ApiError> {
    resolve_redirect(&state, &pool_id, &path, query.as_deref(), &client_ip)
}

/// Redirect endpoint with an empty path: `GET /redirect/:pool_id/`
pub async fn redirect_root(
    State(state): State<AppState>,
    Path(pool_id): Path<String>,
    RawQuery(query): RawQuery,
    ClientIp(client_ip): ClientIp,
) -> Result<Response, ApiError> {
    resolve_redirect(&state, &pool_id, "", query.as_deref(), &client_ip)
}

fn resolve_redirect(
    state: &AppState,
    pool_id: &str,
    path: &str,
    query: Option<&str>,
    client_ip: &str,
) -> Result<Response, ApiError> {
    let request = ResolutionRequest {
        pool_id,
        path,
        query: query.unwrap_or_default(),
        client_ip,
    };

    let redirect = state.resolver.resolve(&request)?;
    Ok(redirect_response(&redirect))
}

/// Percent-encode bytes that may not appear in a `Location` header.
///
/// Visible ASCII passes through untouched, so an already well-formed URL and
/// its query string are sent verbatim.
#[must_use]
pub fn encode_location(url: &str) -> String {
    let mut encoded = String::with_capacity(url.len());
    for byte in url.bytes() {
        if byte.is_ascii_graphic() {
            encoded.push(char::from(byte));
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    encoded
}

/// Render a resolved redirect as `302 Found` with the pool's headers.
pub fn redirect_response(redirect: &Redirect) -> Response {
    let location = match HeaderValue::from_str(&encode_location(&redirect.url)) {
        Ok(location) => location,
        Err(_) => {
            warn!(url = %redirect.url, "Target URL is not a valid header value");
            return ApiError::internal("Invalid redirect target").into_response();
        }
    };

    let mut response = (StatusCode::FOUND, [(header::LOCATION, location)]).into_response();

    for (name, value) in &redirect.headers {
        match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
            (Ok(name), Ok(value)) => {
                response.headers_mut().insert(name, value);
            }
            _ => warn!(header = %name, "Skipping invalid custom header"),
        }
    }

    response
}
