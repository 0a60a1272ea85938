//! JSON API
//!
//! - `POST /ask`               `{"query"}` -> `{"response", "source", ...}`
//! - `POST /faq`               `{"question", "answer"}` -> 201 with the stored entry
//! - `POST /reload`            re-read the dataset files
//! - `GET  /staff`             unread counters
//! - `POST /staff/:name/read`  clear one counter
//! - `GET  /health`

use crate::adapters::http::{ApiFailure, AppState};
use crate::core::inbox::StaffStatus;
use crate::domain::model::{FaqEntry, Reply};
use crate::utils::error::HelpDeskError;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub response: String,
    pub source: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staff: Option<String>,
}

impl From<Reply> for AskResponse {
    fn from(reply: Reply) -> Self {
        let (domain, staff) = match &reply {
            Reply::Forwarded { domain, staff } => (Some(domain.label().to_string()), Some(staff.clone())),
            _ => (None, None),
        };
        Self {
            response: reply.message(),
            source: reply.source(),
            domain,
            staff,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TeachRequest {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct MarkReadResponse {
    pub staff: String,
    pub previous_unread: u64,
}

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub faq_entries: usize,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub faq_entries: usize,
    pub generator: bool,
}

pub async fn ask(
    State(state): State<AppState>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>, ApiFailure> {
    let Json(request) = payload?;
    let reply = state.desk.answer(&request.query).await?;
    Ok(Json(reply.into()))
}

pub async fn teach(
    State(state): State<AppState>,
    payload: Result<Json<TeachRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<FaqEntry>), ApiFailure> {
    let Json(request) = payload?;
    let entry = state.desk.teach(&request.question, &request.answer).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn reload(State(state): State<AppState>) -> Result<Json<ReloadResponse>, HelpDeskError> {
    let faq_entries = state.desk.reload().await?;
    Ok(Json(ReloadResponse { faq_entries }))
}

pub async fn staff(State(state): State<AppState>) -> Json<Vec<StaffStatus>> {
    Json(state.desk.inbox().snapshot())
}

pub async fn mark_read(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<MarkReadResponse>, HelpDeskError> {
    let previous_unread = state.desk.inbox().mark_read(&name)?;
    Ok(Json(MarkReadResponse {
        staff: name,
        previous_unread,
    }))
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        faq_entries: state.desk.faq_count(),
        generator: state.desk.has_generator(),
    })
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ask", post(ask))
        .route("/faq", post(teach))
        .route("/reload", post(reload))
        .route("/staff", get(staff))
        .route("/staff/:name/read", post(mark_read))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
