//! HTTP server: translator web form plus a small JSON API

use axum::{
    extract::{Form, Json, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::core::errors::{Result, TranslationError};
use crate::core::models::{LanguageCodePair, TranslationRequest, TranslationResult};
use crate::core::registry::{ModelHandle, ModelRegistry};
use crate::core::service::TranslationService;
use crate::server::page::{self, Outcome, PageView};

/// Application state
#[derive(Debug)]
pub struct AppState {
    registry: Arc<ModelRegistry>,
    service: TranslationService,
    started_at: DateTime<Utc>,
}

impl AppState {
    /// State over a preloaded registry
    pub fn new(registry: Arc<ModelRegistry>, service: TranslationService) -> Self {
        Self {
            registry,
            service,
            started_at: Utc::now(),
        }
    }

    /// Run one translation off the async runtime
    async fn translate(&self, handle: &ModelHandle, text: String) -> Result<String> {
        let handle = handle.clone();
        let service = self.service;
        tokio::task::spawn_blocking(move || service.translate(&text, &handle))
            .await
            .map_err(|e| TranslationError::InternalError(e.to_string()))?
    }
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    service: String,
    version: String,
    started_at: DateTime<Utc>,
    models_loaded: usize,
}

/// Language pair list response
#[derive(Serialize)]
struct PairsResponse {
    object: String,
    data: Vec<PairInfo>,
}

#[derive(Serialize)]
struct PairInfo {
    label: String,
    source: String,
    target: String,
    model: String,
}

/// Web form submission
#[derive(Deserialize)]
pub struct TranslateForm {
    /// Selected pair label
    pub pair: String,
    /// Text to translate
    #[serde(default)]
    pub text: String,
}

/// JSON translation request; `pair` wins over `source`/`target`
#[derive(Deserialize)]
pub struct TranslateRequest {
    /// Text to translate
    pub text: String,
    /// Pair label, e.g. `English → Hindi`
    pub pair: Option<String>,
    /// Source language code
    pub source: Option<String>,
    /// Target language code
    pub target: Option<String>,
}

/// Error response
#[derive(Serialize)]
pub struct ErrorResponse {
    /// Error body
    pub error: ErrorDetail,
}

/// Error body of an [`ErrorResponse`]
#[derive(Serialize)]
pub struct ErrorDetail {
    /// Human-readable message
    pub message: String,
    /// Stable error code, e.g. `unknown_pair`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Error class
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
}

/// JSON API error with its HTTP status
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    code: &'static str,
    kind: &'static str,
}

impl ApiError {
    fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            code: "invalid_request",
            kind: "invalid_request_error",
        }
    }
}

impl From<TranslationError> for ApiError {
    fn from(err: TranslationError) -> Self {
        let (status, code, kind) = match &err {
            TranslationError::NotFound { .. } => {
                (StatusCode::NOT_FOUND, "unknown_pair", "invalid_request_error")
            }
            TranslationError::EmptyInput => {
                (StatusCode::BAD_REQUEST, "empty_input", "invalid_request_error")
            }
            TranslationError::GenerationError { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "translation_error", "api_error")
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "api_error"),
        };

        Self {
            status,
            message: err.to_string(),
            code,
            kind,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: ErrorDetail {
                message: self.message,
                code: Some(self.code.to_string()),
                r#type: Some(self.kind.to_string()),
            },
        };
        (self.status, axum::Json(body)).into_response()
    }
}

/// Translator page
async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let view = PageView::new(state.registry.labels().collect());
    Html(page::render(&view))
}

/// Translator form submission
async fn submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<TranslateForm>,
) -> (StatusCode, Html<String>) {
    let view = PageView::new(state.registry.labels().collect()).with_input(&form.pair, &form.text);
    let request = TranslationRequest::new(form.text.clone(), form.pair.clone());

    let (status, outcome) = if request.is_blank() {
        debug!("Rejected blank input for '{}'", request.pair);
        (
            StatusCode::OK,
            Outcome::Warning(page::EMPTY_INPUT_WARNING.to_string()),
        )
    } else {
        match state.registry.lookup(&request.pair) {
            Err(e) => (StatusCode::NOT_FOUND, Outcome::Error(e.to_string())),
            Ok(handle) => match state.translate(handle, request.text).await {
                Ok(output) => (StatusCode::OK, Outcome::Translation(output)),
                Err(e) => {
                    warn!("Translation failed for '{}': {}", request.pair, e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Outcome::Error(page::GENERIC_FAILURE.to_string()),
                    )
                }
            },
        }
    };

    (status, Html(page::render(&view.with_outcome(outcome))))
}

/// Health check handler
async fn health_check(State(state): State<Arc<AppState>>) -> axum::Json<HealthResponse> {
    axum::Json(HealthResponse {
        status: "ok".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        started_at: state.started_at,
        models_loaded: state.registry.model_count(),
    })
}

/// List language pairs in display order
async fn get_pairs(State(state): State<Arc<AppState>>) -> axum::Json<PairsResponse> {
    let data = state
        .registry
        .handles()
        .map(|h| PairInfo {
            label: h.label.clone(),
            source: h.codes.source.clone(),
            target: h.codes.target.clone(),
            model: h.model_name.clone(),
        })
        .collect();

    axum::Json(PairsResponse {
        object: "list".to_string(),
        data,
    })
}

/// JSON translation handler
async fn translate(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TranslateRequest>,
) -> std::result::Result<axum::Json<TranslationResult>, ApiError> {
    if payload.text.trim().is_empty() {
        return Err(TranslationError::EmptyInput.into());
    }

    let handle = match (&payload.pair, &payload.source, &payload.target) {
        (Some(label), _, _) => state.registry.lookup(label)?,
        (None, Some(source), Some(target)) => state
            .registry
            .lookup_codes(&LanguageCodePair::new(source.as_str(), target.as_str()))?,
        _ => {
            return Err(ApiError::invalid_request(
                "either pair or source and target are required",
            ))
        }
    };

    let translation = state.translate(handle, payload.text).await?;

    Ok(axum::Json(TranslationResult {
        translation,
        pair: handle.label.clone(),
        model: handle.model_name.clone(),
    }))
}

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index).post(submit))
        .route("/health", get(health_check))
        .route("/v1/pairs", get(get_pairs))
        .route("/translate", post(translate))
        .with_state(state)
}

/// Run the HTTP server
pub async fn run_server(host: &str, port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = router(state);

    // Bind address
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
