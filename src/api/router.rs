//! HTTP Routing
//!
//! Maps requests on each listener to handlers and turns handler results
//! into responses. `dispatch*` functions are synchronous and take an
//! already-read body so they can be exercised without a socket.

use std::time::Instant;

use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Incoming};
use hyper::header::{
    HeaderMap, HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_LENGTH, CONTENT_TYPE,
};
use hyper::{Method, Request, Response, StatusCode, Uri};
use serde::Serialize;
use tracing::{debug, error, info_span, warn};
use uuid::Uuid;

use super::handlers::{self, SUBMIT_ACK};
use super::AppState;
use crate::error::{Error, Result};

const APPLICATION_JSON: &str = "application/json";
const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Largest request body the API accepts; one reading is well under 1 KiB
pub const MAX_BODY_BYTES: usize = 64 * 1024;

// =============================================================================
// Routes
// =============================================================================

/// API routes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// POST /api/telemetry
    Submit,
    /// GET /api/telemetry/{id}
    FetchAll(String),
    /// GET /api/telemetry/{id}/latest
    FetchLatest(String),
    /// GET /api/telemetry/{id}/recent
    FetchRecent(String),
    /// GET /api/analytics/{id}
    Analytics(String),
    /// GET /api/equipment
    Equipment,
    /// OPTIONS /api/...
    Preflight,
}

impl Route {
    /// Resolve a method and path to a route
    pub fn parse(method: &Method, path: &str) -> Result<Route> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let get = *method == Method::GET;

        match segments.as_slice() {
            ["api", ..] if *method == Method::OPTIONS => Ok(Route::Preflight),
            ["api", "telemetry"] if *method == Method::POST => Ok(Route::Submit),
            ["api", "telemetry", id] if get => Ok(Route::FetchAll(decode_id(id)?)),
            ["api", "telemetry", id, "latest"] if get => Ok(Route::FetchLatest(decode_id(id)?)),
            ["api", "telemetry", id, "recent"] if get => Ok(Route::FetchRecent(decode_id(id)?)),
            ["api", "analytics", id] if get => Ok(Route::Analytics(decode_id(id)?)),
            ["api", "equipment"] if get => Ok(Route::Equipment),
            ["api", "telemetry"]
            | ["api", "telemetry", _]
            | ["api", "telemetry", _, "latest" | "recent"]
            | ["api", "analytics", _]
            | ["api", "equipment"] => Err(Error::MethodNotAllowed {
                method: method.to_string(),
                path: path.to_string(),
            }),
            _ => Err(Error::NotFound(format!("No route for {}", path))),
        }
    }

    /// Metric label for this route
    pub fn name(&self) -> &'static str {
        match self {
            Route::Submit => "submit",
            Route::FetchAll(_) => "fetch_all",
            Route::FetchLatest(_) => "fetch_latest",
            Route::FetchRecent(_) => "fetch_recent",
            Route::Analytics(_) => "analytics",
            Route::Equipment => "equipment",
            Route::Preflight => "preflight",
        }
    }
}

fn decode_id(raw: &str) -> Result<String> {
    urlencoding::decode(raw)
        .map(|id| id.into_owned())
        .map_err(|_| Error::Validation(format!("Invalid equipment id encoding: {}", raw)))
}

// =============================================================================
// API Listener
// =============================================================================

/// Serve one API request
pub async fn handle_api(state: AppState, req: Request<Incoming>) -> Response<Full<Bytes>> {
    let (parts, body) = req.into_parts();
    let started = Instant::now();
    let body = match read_body(&parts.headers, body).await {
        Ok(body) => body,
        Err(e) => {
            warn!(method = %parts.method, path = parts.uri.path(), "Rejected request body: {}", e);
            let response = error_response(&e);
            state
                .metrics
                .record_request("body_rejected", response.status(), started.elapsed());
            return response;
        }
    };

    dispatch(&state, &parts.method, &parts.uri, body)
}

/// Read a request body of at most [`MAX_BODY_BYTES`].
///
/// A declared `Content-Length` over the limit is refused before any of the
/// body is read; otherwise reading stops as soon as the limit is crossed.
pub async fn read_body<B>(headers: &HeaderMap, body: B) -> Result<Bytes>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let declared = headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    if declared.is_some_and(|len| len > MAX_BODY_BYTES as u64) {
        return Err(Error::PayloadTooLarge {
            limit: MAX_BODY_BYTES,
        });
    }

    match Limited::new(body, MAX_BODY_BYTES).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.is::<LengthLimitError>() => Err(Error::PayloadTooLarge {
            limit: MAX_BODY_BYTES,
        }),
        Err(e) => Err(Error::Validation(format!(
            "Failed to read request body: {}",
            e
        ))),
    }
}

/// Route and execute an API request
pub fn dispatch(state: &AppState, method: &Method, uri: &Uri, body: Bytes) -> Response<Full<Bytes>> {
    let started = Instant::now();
    let span = info_span!(
        "request",
        request_id = %Uuid::new_v4(),
        method = %method,
        path = uri.path()
    );
    let _enter = span.enter();

    let (route_name, result) = match Route::parse(method, uri.path()) {
        Ok(route) => (route.name(), execute(state, route, uri.query(), &body)),
        Err(e) => ("unmatched", Err(e)),
    };

    let response = result.unwrap_or_else(|e| error_response(&e));
    state
        .metrics
        .record_request(route_name, response.status(), started.elapsed());
    response
}

fn execute(
    state: &AppState,
    route: Route,
    query: Option<&str>,
    body: &[u8],
) -> Result<Response<Full<Bytes>>> {
    let repo = state.repo.as_ref();

    match route {
        Route::Submit => {
            handlers::submit(repo, body)?;
            state.metrics.record_ingest();
            Ok(text_response(StatusCode::CREATED, SUBMIT_ACK))
        }
        Route::FetchAll(id) => json_response(StatusCode::OK, &handlers::fetch_all(repo, &id)?),
        Route::FetchLatest(id) => {
            json_response(StatusCode::OK, &handlers::fetch_latest(repo, &id)?)
        }
        Route::FetchRecent(id) => {
            let limit = handlers::parse_limit(query)?;
            json_response(StatusCode::OK, &handlers::fetch_recent(repo, &id, limit))
        }
        Route::Analytics(id) => {
            json_response(StatusCode::OK, &handlers::fetch_analytics(repo, &id)?)
        }
        Route::Equipment => json_response(StatusCode::OK, &handlers::list_equipment(repo)),
        Route::Preflight => {
            let mut response = build(StatusCode::NO_CONTENT, None, Bytes::new());
            let headers = response.headers_mut();
            headers.insert(
                ACCESS_CONTROL_ALLOW_METHODS,
                HeaderValue::from_static("GET, POST, OPTIONS"),
            );
            headers.insert(
                ACCESS_CONTROL_ALLOW_HEADERS,
                HeaderValue::from_static("content-type"),
            );
            Ok(response)
        }
    }
}

// =============================================================================
// Health and Metrics Listeners
// =============================================================================

/// Serve one health probe
pub async fn handle_health(state: AppState, req: Request<Incoming>) -> Response<Full<Bytes>> {
    dispatch_health(&state, req.uri().path())
}

/// Liveness and readiness probes
pub fn dispatch_health(state: &AppState, path: &str) -> Response<Full<Bytes>> {
    let report = match path {
        "/healthz" | "/livez" => state.health.liveness(),
        "/readyz" => state.health.readiness(&state.repo.stats()),
        _ => return error_response(&Error::NotFound(format!("No route for {}", path))),
    };

    let status = if report.status.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    json_response(status, &report).unwrap_or_else(|e| error_response(&e))
}

/// Serve one metrics scrape
pub async fn handle_metrics(state: AppState, req: Request<Incoming>) -> Response<Full<Bytes>> {
    dispatch_metrics(&state, req.uri().path())
}

/// Prometheus scrape endpoint
pub fn dispatch_metrics(state: &AppState, path: &str) -> Response<Full<Bytes>> {
    if path != "/metrics" {
        return error_response(&Error::NotFound(format!("No route for {}", path)));
    }

    state.metrics.observe_store(&state.repo.stats());
    match state.metrics.render() {
        Ok(scrape) => build(
            StatusCode::OK,
            HeaderValue::from_str(&scrape.content_type).ok(),
            Bytes::from(scrape.body),
        ),
        Err(e) => error_response(&e),
    }
}

// =============================================================================
// Response Helpers
// =============================================================================

fn build(
    status: StatusCode,
    content_type: Option<HeaderValue>,
    body: Bytes,
) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    if let Some(content_type) = content_type {
        headers.insert(CONTENT_TYPE, content_type);
    }
    response
}

fn text_response(status: StatusCode, body: &'static str) -> Response<Full<Bytes>> {
    build(
        status,
        Some(HeaderValue::from_static(TEXT_PLAIN)),
        Bytes::from_static(body.as_bytes()),
    )
}

fn json_response<T: Serialize>(status: StatusCode, value: &T) -> Result<Response<Full<Bytes>>> {
    let body = serde_json::to_vec(value)?;
    Ok(build(
        status,
        Some(HeaderValue::from_static(APPLICATION_JSON)),
        Bytes::from(body),
    ))
}

fn error_response(err: &Error) -> Response<Full<Bytes>> {
    let status = err.status_code();
    if status.is_server_error() {
        error!("Request failed: {}", err);
    } else {
        debug!("Request rejected: {}", err);
    }

    let body = serde_json::json!({ "error": err.to_string() }).to_string();
    build(
        status,
        Some(HeaderValue::from_static(APPLICATION_JSON)),
        Bytes::from(body),
    )
}

// =============================================================================
// Tests
// =============================================================================
