use anyhow::Result;
use axum::{extract::{Path, Query, State}, http::{HeaderMap, StatusCode}, routing::{get, post}, Json, Router};
use docseek_core::load::{load_records, parse_records};
use docseek_core::{Error, Record, SearchConfig, SearchHit, Searcher};
use serde::{Deserialize, Serialize};
use std::path::Path as FsPath;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default)]
    pub page: usize,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub page: usize,
    pub page_size: usize,
    pub took_ms: u128,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct RebuildResponse {
    pub generation: u64,
    pub records: usize,
}

#[derive(Clone)]
pub struct AppState {
    pub searcher: Arc<Searcher>,
    pub admin_token: Option<String>,
}

type ApiError = (StatusCode, String);

fn api_error(err: Error) -> ApiError {
    let status = match err {
        Error::MalformedRecord { .. } | Error::Json(_) | Error::UnrecognizedFormat(_) => StatusCode::BAD_REQUEST,
        Error::InvalidQueryState => StatusCode::SERVICE_UNAVAILABLE,
        Error::InvalidConfig(_) | Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, err.to_string())
}

/// Load records (if a file is given) and build the router. Without a file the
/// server starts empty and waits for `POST /index/rebuild`.
pub fn build_app(index_file: Option<&FsPath>, config: SearchConfig) -> Result<Router> {
    let searcher = match index_file {
        Some(path) => Searcher::with_config(load_records(path)?, config)?,
        None => Searcher::unbuilt(config)?,
    };
    let admin_token = std::env::var("ADMIN_TOKEN").ok();
    let app_state = AppState { searcher: Arc::new(searcher), admin_token };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Ok(router(app_state).layer(cors).layer(TraceLayer::new_for_http()))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/record/:id", get(record_handler))
        .route("/index/rebuild", post(rebuild_handler))
        .with_state(state)
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Result<Json<SearchResponse>, ApiError> {
    let start = std::time::Instant::now();
    let ranked = state.searcher.ranked(&params.q).map_err(api_error)?;
    let results = ranked.page(params.page);
    let elapsed = start.elapsed();
    Ok(Json(SearchResponse {
        query: params.q,
        page: params.page,
        page_size: ranked.page_size(),
        took_ms: elapsed.as_millis(),
        took_s: elapsed.as_secs_f64(),
        total_hits: ranked.len(),
        results,
    }))
}

pub async fn record_handler(State(state): State<AppState>, Path(id): Path<u32>) -> Result<Json<Record>, ApiError> {
    let index = state.searcher.index().map_err(api_error)?;
    index
        .record(id)
        .cloned()
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, format!("no record {id}")))
}

/// Body is a record array, a `{"docs": [...]}` object or a generated
/// `search_index.js` script.
async fn rebuild_handler(State(state): State<AppState>, headers: HeaderMap, body: String) -> Result<Json<RebuildResponse>, ApiError> {
    authorize(&state, &headers)?;
    let searcher = Arc::clone(&state.searcher);
    let built = tokio::task::spawn_blocking(move || -> docseek_core::Result<RebuildResponse> {
        let records = parse_records(&body)?;
        let count = records.len();
        searcher.rebuild(records).map(|generation| RebuildResponse { generation, records: count })
    })
    .await
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("rebuild task failed: {e}")))?;
    built.map(Json).map_err(api_error)
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}
