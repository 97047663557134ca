//! HTTP route handlers
//!
//! Three endpoints: `/build` runs a build for a product prefix behind the
//! global admission permit, `/status` reports the prefix's last known
//! state, `/stop` triggers graceful shutdown. Builds for all prefixes
//! share one capacity-1 permit: the compiled-classes tree cannot support
//! two builds at once.

use crate::build::{BuildOrchestrator, BuildRequest};
use crate::config::Config;
use crate::error::StagehandResult;
use crate::server::status::{BuildStatus, StatusBoard};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{watch, Mutex, Semaphore};
use tracing::{error, info};

/// Shared state behind every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub status: StatusBoard,

    /// The single global build admission permit, fair FIFO
    pub admission: Arc<Semaphore>,

    /// Warm orchestrators keyed by product prefix
    pub orchestrators: Arc<Mutex<HashMap<String, Arc<BuildOrchestrator>>>>,

    /// Signals graceful shutdown to the listener
    pub shutdown: watch::Sender<bool>,
}

impl AppState {
    pub fn new(config: Config, shutdown: watch::Sender<bool>) -> Self {
        Self {
            config: Arc::new(config),
            status: StatusBoard::new(),
            admission: Arc::new(Semaphore::new(1)),
            orchestrators: Arc::new(Mutex::new(HashMap::new())),
            shutdown,
        }
    }
}

/// Assemble the router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/build", get(build_handler).post(build_handler))
        .route("/status", get(status_handler))
        .route("/stop", post(stop_handler))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct PrefixQuery {
    #[serde(rename = "platformPrefix")]
    pub platform_prefix: String,
}

/// Run a build for a product prefix.
///
/// Marks the prefix in-progress before queueing on the admission permit,
/// so `/status` reflects a waiting request. The permit is held for the
/// whole build and released by drop on every exit path.
pub async fn build_handler(
    State(state): State<AppState>,
    Query(query): Query<PrefixQuery>,
) -> (StatusCode, String) {
    let prefix = query.platform_prefix;
    state.status.set(&prefix, BuildStatus::InProgress).await;

    let permit = match state.admission.clone().acquire_owned().await {
        Ok(permit) => permit,
        Err(_) => {
            state.status.set(&prefix, BuildStatus::Failed).await;
            return (StatusCode::SERVICE_UNAVAILABLE, String::new());
        }
    };

    let result = run_build(&state, &prefix).await;
    drop(permit);

    match result {
        Ok(message) => {
            state.status.set(&prefix, BuildStatus::Ok).await;
            (StatusCode::OK, message)
        }
        Err(e) if e.is_configuration() => {
            state.status.set(&prefix, BuildStatus::Failed).await;
            (StatusCode::BAD_REQUEST, e.to_string())
        }
        Err(e) => {
            state.status.set(&prefix, BuildStatus::Failed).await;
            // Full detail stays server-side; the wire response is opaque
            error!("Build for {prefix} failed: {e}");
            (StatusCode::SERVICE_UNAVAILABLE, String::new())
        }
    }
}

/// Report the last known status for a prefix
pub async fn status_handler(
    State(state): State<AppState>,
    Query(query): Query<PrefixQuery>,
) -> (StatusCode, String) {
    let status = state.status.get(&query.platform_prefix).await;
    (StatusCode::OK, status.to_string())
}

/// Respond, then signal shutdown; idempotent
pub async fn stop_handler(State(state): State<AppState>) -> StatusCode {
    info!("Stop requested");
    let _ = state.shutdown.send(true);
    StatusCode::OK
}

async fn run_build(state: &AppState, prefix: &str) -> StagehandResult<String> {
    let request = request_for(&state.config, prefix);

    let orchestrator = {
        let mut cache = state.orchestrators.lock().await;
        match cache.get(prefix) {
            Some(existing) => existing.clone(),
            None => {
                let created = Arc::new(BuildOrchestrator::new(&state.config, &request).await?);
                if request.keep_context_warm {
                    cache.insert(prefix.to_string(), created.clone());
                }
                created
            }
        }
    };

    let outcome = orchestrator.build(&request).await?;
    Ok(format!("Build {prefix} finished: {}", outcome.summary()))
}

/// Server-mode build request: everything comes from configuration, the
/// product code from the query
fn request_for(config: &Config, prefix: &str) -> BuildRequest {
    let project_root = config
        .build
        .project_root
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));
    let classes_root = config
        .build
        .classes_dir
        .clone()
        .unwrap_or_else(|| project_root.join("out").join("classes"));

    BuildRequest::new(prefix, project_root, classes_root).with_warm_context(true)
}
