use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use crate::assistant::configuration::Configuration;
use crate::assistant::state::QaRequest;
use crate::papers::{ArxivClient, PaperSource};
use crate::services::Services;
use crate::Error;

const DEFAULT_MAX_RESULTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageStatus {
    Connected,
    Unavailable,
    NotConfigured,
}

pub struct AppState {
    config: Configuration,
    source: Arc<dyn PaperSource>,
    services: Option<Services>,
    storage: StorageStatus,
}

impl AppState {
    pub fn new(config: Configuration, source: Arc<dyn PaperSource>, services: Option<Services>) -> Self {
        let storage = match (&services, config.is_configured()) {
            (Some(_), _) => StorageStatus::Connected,
            (None, true) => StorageStatus::Unavailable,
            (None, false) => StorageStatus::NotConfigured,
        };
        Self {
            config,
            source,
            services,
            storage,
        }
    }

    /// Build the arXiv client and, when configured, the storage and answer
    /// services. A failed connection leaves storage unavailable rather than
    /// stopping the server.
    pub async fn initialize(config: Configuration) -> Self {
        let services = if config.is_configured() {
            match Services::connect(&config).await {
                Ok(services) => Some(services),
                Err(e) => {
                    error!("Storage initialization failed: {}", e);
                    None
                }
            }
        } else {
            warn!(
                "Not configured (missing {}); storage and QA endpoints are disabled",
                config.missing_keys().join(", ")
            );
            None
        };
        Self::new(config, Arc::new(ArxivClient::new()), services)
    }

    pub fn storage_status(&self) -> StorageStatus {
        self.storage
    }

    fn services(&self) -> Result<&Services, ApiError> {
        match (&self.services, self.storage) {
            (Some(services), _) => Ok(services),
            (None, StorageStatus::NotConfigured) => Err(ApiError::new(
                StatusCode::SERVICE_UNAVAILABLE,
                format!(
                    "Not configured. Missing: {}",
                    self.config.missing_keys().join(", ")
                ),
            )),
            (None, _) => Err(ApiError::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "Storage unavailable, check server logs",
            )),
        }
    }
}

// Every failure leaves the server as `{"error": ...}`
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = if err.is_upstream() {
            StatusCode::BAD_GATEWAY
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        };
        ApiError::new(status, err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

#[derive(Debug, Deserialize)]
pub struct FetchParams {
    max_results: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct StorageSearchParams {
    query: Option<String>,
    limit: Option<usize>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/search/:topic", get(search_topic))
        .route("/store/:topic", post(store_topic))
        .route("/storage/search", get(storage_search))
        .route("/storage/info", get(storage_info))
        .route("/config/status", get(config_status))
        .route("/qa", post(answer_question))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run_server(config: Configuration) -> anyhow::Result<()> {
    let addr = config.bind_addr;
    let state = Arc::new(AppState::initialize(config).await);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Starting server on http://{}", addr);
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "PaperScope Agentic API" }))
}

async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "Server is running",
        "configured": state.config.is_configured(),
        "storage": state.storage,
    }))
}

async fn config_status(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "configured": state.config.is_configured(),
        "missing_keys": state.config.missing_keys(),
        "has_groq": state.config.has_groq(),
        "has_qdrant": state.config.has_qdrant(),
    }))
}

async fn search_topic(
    State(state): State<Arc<AppState>>,
    Path(topic): Path<String>,
    params: Result<Query<FetchParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(params) = params?;
    let max_results = params.max_results.unwrap_or(DEFAULT_MAX_RESULTS);
    let papers = state.source.fetch(&topic, max_results).await?;

    Ok(Json(json!({
        "topic": topic,
        "papers_found": papers.len(),
        "papers": papers,
    })))
}

async fn store_topic(
    State(state): State<Arc<AppState>>,
    Path(topic): Path<String>,
    params: Result<Query<FetchParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let services = state.services()?;
    let Query(params) = params?;
    let max_results = params.max_results.unwrap_or(DEFAULT_MAX_RESULTS);

    let papers = state.source.fetch(&topic, max_results).await?;
    let stored = services.store.store(&papers).await?;

    Ok(Json(json!({
        "topic": topic,
        "papers_searched": papers.len(),
        "papers_stored": stored,
        "message": format!("Stored {} papers for topic: {}", stored, topic),
    })))
}

async fn storage_search(
    State(state): State<Arc<AppState>>,
    params: Result<Query<StorageSearchParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let services = state.services()?;
    let Query(params) = params?;
    let query = params
        .query
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| ApiError::new(StatusCode::BAD_REQUEST, "query parameter is required"))?;
    let limit = params.limit.unwrap_or(DEFAULT_MAX_RESULTS);

    let papers = services.store.search(&query, limit).await;

    Ok(Json(json!({
        "query": query,
        "papers_found": papers.len(),
        "papers": papers,
    })))
}

async fn storage_info(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let services = state.services()?;
    let info = services.store.collection_info().await?;

    Ok(Json(json!({
        "name": info.name,
        "vectors_count": info.vectors_count,
        "points_count": info.points_count,
    })))
}

async fn answer_question(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<QaRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let services = state.services()?;
    let Json(request) = payload?;
    if request.question.trim().is_empty() {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, "question must not be empty"));
    }

    let response = services.qa.answer(&request.question, request.max_context).await;

    Ok(Json(json!({
        "question": request.question,
        "answer": response.answer,
        "sources_used": response.context_used,
        "sources": response.sources,
        "error": response.error,
    })))
}
