use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Local;
use serde_json::json;
use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};

use crate::error::ScanError;
use crate::progress::{CancelToken, LogProgress};
use crate::services::export::{csv_file_name, to_csv};
use crate::services::{ScanRequest, ScanResult, Scanner};

pub struct AppState {
    pub scanner: Arc<Scanner>,
    /// Cancel handle of the scan currently running, if any
    pub active_scan: Mutex<Option<CancelToken>>,
}

impl AppState {
    pub fn new(scanner: Scanner) -> Self {
        Self {
            scanner: Arc::new(scanner),
            active_scan: Mutex::new(None),
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/universe", get(get_universe))
        .route("/scan", post(run_scan))
        .route("/scan/csv", post(run_scan_csv))
        .route("/scan/cancel", post(cancel_scan))
        .with_state(state)
}

pub async fn run_server(state: Arc<AppState>, bind_addr: &str) -> std::io::Result<()> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("API Server listening on {}", bind_addr);
    axum::serve(listener, app).await
}

/// Clears `active_scan` when the request finishes, including on early return.
struct ActiveScanGuard<'a> {
    state: &'a AppState,
}

impl Drop for ActiveScanGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.state.active_scan.lock() {
            *slot = None;
        }
    }
}

async fn execute_scan(state: &AppState, request: ScanRequest) -> Result<ScanResult, Response> {
    let token = {
        let mut slot = state
            .active_scan
            .lock()
            .map_err(|_| internal_error("scan state lock poisoned"))?;
        if slot.is_some() {
            return Err((
                StatusCode::CONFLICT,
                Json(json!({"status": "scan_in_progress"})),
            )
                .into_response());
        }
        let token = CancelToken::new();
        *slot = Some(token.clone());
        token
    };
    let _guard = ActiveScanGuard { state };

    state
        .scanner
        .scan_with(&request, &LogProgress, &token)
        .await
        .map_err(error_response)
}

async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

async fn get_universe(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let tickers: Vec<String> = state.scanner.universe().tickers().map(|t| t.to_string()).collect();
    Json(json!({"count": tickers.len(), "tickers": tickers}))
}

async fn run_scan(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ScanRequest>,
) -> Response {
    match execute_scan(&state, request).await {
        Ok(result) => Json(json!({
            "outcome": result.outcome(),
            "summary": result.summary(),
            "result": result,
        }))
        .into_response(),
        Err(resp) => resp,
    }
}

async fn run_scan_csv(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ScanRequest>,
) -> Response {
    match execute_scan(&state, request).await {
        Ok(result) => {
            let file_name = csv_file_name(&Local::now());
            (
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{}\"", file_name),
                    ),
                ],
                to_csv(&result.stocks),
            )
                .into_response()
        }
        Err(resp) => resp,
    }
}

async fn cancel_scan(State(state): State<Arc<AppState>>) -> Response {
    let token = match state.active_scan.lock() {
        Ok(slot) => slot.clone(),
        Err(_) => return internal_error("scan state lock poisoned"),
    };

    match token {
        Some(token) => {
            token.cancel();
            info!("🛑 [API] Cancellation requested");
            Json(json!({"status": "cancelling"})).into_response()
        }
        None => Json(json!({"status": "not_running"})).into_response(),
    }
}

fn error_response(err: ScanError) -> Response {
    let status = if err.is_fatal() && !matches!(err, ScanError::Config(_)) {
        warn!("⚠️ [API] Rejected scan: {}", err);
        StatusCode::BAD_REQUEST
    } else {
        error!("❌ [API] Scan failed: {}", err);
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(json!({"error": err.to_string()}))).into_response()
}

fn internal_error(msg: &str) -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": msg}))).into_response()
}
