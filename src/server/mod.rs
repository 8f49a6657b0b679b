//! Leaderboard REST service (feature = "server").
//!
//! Two routes over one table:
//! - `GET /scores`  top ten rows, best first
//! - `POST /scores` insert `{username, score}`, 201 with the stored row
//!
//! Everything else falls through to the optional static directory so the
//! same process can host the wasm bundle.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

use crate::score::{LEADERBOARD_LIMIT, NewScore, Score};

pub mod config;
pub mod error;
pub mod storage;

pub use config::ServerConfig;
pub use error::ApiError;
pub use storage::{MemoryStore, ScoreStore, SqliteStore, StorageError, open_store};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ScoreStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn ScoreStore>) -> Self {
        Self { store }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/scores", get(list_scores).post(create_score))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

/// Router plus the static fallback from `config`.
pub fn app(state: AppState, config: &ServerConfig) -> Router {
    let api = router(state);
    match &config.static_dir {
        Some(dir) => {
            log::info!("serving static files from {}", dir.display());
            api.fallback_service(ServeDir::new(dir))
        }
        None => api,
    }
}

async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let response = next.run(req).await;
    log::info!("{method} {path} -> {}", response.status().as_u16());
    response
}

async fn list_scores(State(state): State<AppState>) -> Result<Json<Vec<Score>>, ApiError> {
    let store = state.store.clone();
    let scores = tokio::task::spawn_blocking(move || store.top_scores(LEADERBOARD_LIMIT)).await??;
    Ok(Json(scores))
}

/// The body is parsed by hand so that shape errors are reported as 400 with
/// the same `{message}` body as rule violations.
async fn create_score(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Score>), ApiError> {
    let submitted: NewScore =
        serde_json::from_slice(&body).map_err(|e| ApiError::MalformedBody(e.to_string()))?;
    let new = submitted.validated()?;

    let store = state.store.clone();
    let created = tokio::task::spawn_blocking(move || store.create_score(&new)).await??;
    log::info!("new score {} for {} (id {})", created.score, created.username, created.id);
    Ok((StatusCode::CREATED, Json(created)))
}

/// Open the store, bind, and serve until the process is stopped.
pub async fn run(config: ServerConfig) -> Result<()> {
    let store = open_store(&config.database)
        .with_context(|| format!("opening database {}", config.database))?;
    let app = app(AppState::new(store), &config);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    log::info!("leaderboard listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
