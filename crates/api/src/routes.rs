use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use ratiocheck_core::domain::AnalysisResult;
use ratiocheck_core::error::AnalyzeError;
use ratiocheck_core::orchestrator::Orchestrator;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Instrument;
use uuid::Uuid;

const SERVICE: &str = "ratiocheck-api";

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub analyze_timeout: Duration,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/health", get(health))
        .route("/api/analyze/:ticker", get(analyze))
        .route("/api/cache", delete(clear_cache))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[derive(Debug, Serialize)]
struct ServiceInfo {
    service: &'static str,
    version: &'static str,
    health: &'static str,
    analyze: &'static str,
}

async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: SERVICE,
        version: env!("CARGO_PKG_VERSION"),
        health: "/api/health",
        analyze: "/api/analyze/{ticker}",
    })
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    service: &'static str,
}

async fn health() -> Json<Health> {
    Json(Health {
        status: "healthy",
        service: SERVICE,
    })
}

enum ApiError {
    Analyze(AnalyzeError),
    Timeout(Duration),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            Self::Analyze(err) if err.is_client_error() => (StatusCode::BAD_REQUEST, err.to_string()),
            Self::Analyze(err) => {
                let err = anyhow::Error::new(err);
                sentry_anyhow::capture_anyhow(&err);
                tracing::error!(error = %err, "analysis failed");
                (StatusCode::INTERNAL_SERVER_ERROR, format!("error analyzing ticker: {err}"))
            }
            Self::Timeout(limit) => (
                StatusCode::GATEWAY_TIMEOUT,
                format!("analysis did not finish within {}s", limit.as_secs()),
            ),
        };
        (status, Json(ErrorBody { detail })).into_response()
    }
}

async fn analyze(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<AnalysisResult>, ApiError> {
    let span = tracing::info_span!("analyze", request_id = %Uuid::new_v4(), ticker = %ticker);

    // Dropping the analysis on timeout aborts its in-flight fetches.
    let analysis = tokio::time::timeout(state.analyze_timeout, state.orchestrator.analyze(&ticker))
        .instrument(span.clone())
        .await;

    match analysis {
        Ok(Ok(result)) => Ok(Json(result)),
        Ok(Err(err)) => Err(ApiError::Analyze(err)),
        Err(_) => {
            span.in_scope(|| tracing::warn!(timeout = ?state.analyze_timeout, "analysis timed out"));
            Err(ApiError::Timeout(state.analyze_timeout))
        }
    }
}

#[derive(Debug, Serialize)]
struct Cleared {
    cleared: usize,
}

async fn clear_cache(State(state): State<AppState>) -> Json<Cleared> {
    let cache = state.orchestrator.cache();
    let cleared = cache.len();
    cache.clear();
    tracing::info!(cleared, "reading cache cleared");
    Json(Cleared { cleared })
}
