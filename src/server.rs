//! HTTP front end for the search proxy.
//!
//! A thin layer over the aggregation pipeline: one search route that
//! either proxies a single upstream page (with the total count recovered
//! from a parallel HTML fetch) or drains every page and groups the
//! records by content hash.
//!
//! # Endpoints
//!
//! | Method | Path      | Description |
//! |--------|-----------|-------------|
//! | `GET`  | `/`       | Search; `hashGrouping` selects the grouped pipeline |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! Error responses carry a machine-readable code and a message:
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "missing required query parameter: q" } }
//! ```
//!
//! Error codes: `bad_request` (400), `upstream` (502).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so the browser UI can
//! query the proxy from anywhere it is hosted.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};

use crate::catalog::DescriptionCatalog;
use crate::config::Config;
use crate::count::extract_total;
use crate::group::{group_records, sort_groups, SortKey};
use crate::models::{NormalizedRecord, ResultKind, SearchEnvelope};
use crate::normalize::normalize_record;
use crate::upstream::{collect_pages, UpstreamClient, GROUP_PAGE_LIMIT};

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    /// Hash descriptions, loaded once at startup and read-only after.
    catalog: Arc<DescriptionCatalog>,
    upstream: UpstreamClient,
}

/// Starts the proxy HTTP server.
///
/// Binds to the address configured in `[server].bind` and runs until the
/// process is terminated.
pub async fn run_server(config: &Config, catalog: DescriptionCatalog) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let upstream = UpstreamClient::new(&config.upstream)?;

    let state = AppState {
        config: Arc::new(config.clone()),
        catalog: Arc::new(catalog),
        upstream,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(handle_search))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state);

    println!("Search proxy listening on http://{}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
#[derive(Debug)]
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

/// Constructs a 400 Bad Request error.
fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

/// Constructs a 502 for upstream fetch or parse failures.
fn upstream_error(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_GATEWAY,
        code: "upstream".to_string(),
        message: message.into(),
    }
}

// ============ GET /health ============

/// JSON response body for `GET /health`.
#[derive(Serialize)]
struct HealthResponse {
    /// Always `"ok"` when the server is running.
    status: String,
    /// The crate version from `Cargo.toml`.
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET / ============

/// What the inbound query string asked for, after consuming the
/// parameters the proxy itself interprets.
#[derive(Debug)]
struct SearchRequest {
    /// The search term, kept for request logging.
    query: String,
    grouped: bool,
    sort: Option<SortKey>,
    /// Parameters forwarded upstream, in arrival order, with the
    /// grouping flag stripped out.
    forwarded: Vec<(String, String)>,
}

/// Walk the raw query pairs once.
///
/// `hashGrouping` is consumed here (any non-empty value turns grouping
/// on) and never forwarded. `sortBy` is the sort parameter; `sortType`
/// is accepted as an alias for older callers, with `sortBy` winning when
/// both appear. Both still pass through upstream, which applies its own
/// result ordering. Everything else is passthrough, and `q` must be
/// present and non-empty.
fn parse_search_params(params: &[(String, String)]) -> Result<SearchRequest, AppError> {
    let mut query = String::new();
    let mut grouped = false;
    let mut sort_by: Option<SortKey> = None;
    let mut sort_type: Option<SortKey> = None;
    let mut forwarded: Vec<(String, String)> = Vec::new();

    for (key, value) in params {
        match key.as_str() {
            "hashGrouping" => {
                if !value.is_empty() {
                    grouped = true;
                }
            }
            "sortBy" => {
                sort_by = SortKey::parse(value);
                forwarded.push((key.clone(), value.clone()));
            }
            "sortType" => {
                sort_type = SortKey::parse(value);
                forwarded.push((key.clone(), value.clone()));
            }
            "q" => {
                if !value.is_empty() {
                    query = value.clone();
                }
                forwarded.push((key.clone(), value.clone()));
            }
            _ => forwarded.push((key.clone(), value.clone())),
        }
    }

    if query.is_empty() {
        return Err(bad_request("missing required query parameter: q"));
    }

    Ok(SearchRequest {
        query,
        grouped,
        sort: sort_by.or(sort_type),
        forwarded,
    })
}

/// Handler for `GET /`.
///
/// Dispatches to the grouped or regular pipeline based on the
/// `hashGrouping` flag.
async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let request = parse_search_params(&params)?;

    if request.grouped {
        run_grouped(&state, &request).await
    } else {
        run_single(&state, &request).await
    }
}

/// Grouped pipeline: drain every result page sequentially, then collapse
/// by hash. `count` is exact (the number of distinct hashes).
async fn run_grouped(state: &AppState, request: &SearchRequest) -> Result<Response, AppError> {
    let started = Instant::now();

    let source = state.upstream.pages(&request.forwarded, GROUP_PAGE_LIMIT);
    let paged = collect_pages(&source)
        .await
        .map_err(|e| upstream_error(e.to_string()))?;

    let mut groups = group_records(&paged.records, &state.catalog, &state.config.upstream.origin);
    if let Some(key) = request.sort {
        sort_groups(&mut groups, key);
    }

    tracing::info!(
        query = %request.query,
        pages = paged.pages_fetched,
        records = paged.records.len(),
        groups = groups.len(),
        truncated = paged.truncated,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "grouped query complete"
    );

    let count = groups.len() as u64;
    let envelope = SearchEnvelope {
        data: groups,
        count: Some(count),
        kind: ResultKind::Grouped,
    };
    Ok(Json(envelope).into_response())
}

/// Regular pipeline: one JSON page plus the HTML rendering of the same
/// query, fetched concurrently. The HTML is only consulted for the total
/// match count; `count` is null when that extraction fails.
async fn run_single(state: &AppState, request: &SearchRequest) -> Result<Response, AppError> {
    let started = Instant::now();

    let (records, html) = tokio::try_join!(
        state.upstream.fetch_results(&request.forwarded),
        state.upstream.fetch_html(&request.forwarded),
    )
    .map_err(|e| upstream_error(e.to_string()))?;

    let total = extract_total(&html);
    let data: Vec<NormalizedRecord> = records
        .iter()
        .map(|record| normalize_record(record, &state.catalog, &state.config.upstream.origin))
        .collect();

    tracing::info!(
        query = %request.query,
        records = data.len(),
        total = ?total,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "regular query complete"
    );

    let envelope = SearchEnvelope {
        data,
        count: total,
        kind: ResultKind::Single,
    };
    Ok(Json(envelope).into_response())
}
