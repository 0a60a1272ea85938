//! HTTP surfaces: a JSON API and an HTML form site over the same help desk.

use crate::core::desk::HelpDesk;
use crate::utils::error::{HelpDeskError, Result};
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tokio::net::TcpListener;

pub mod api;
pub mod web;

pub use web::SessionStore;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub desk: Arc<HelpDesk>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(desk: Arc<HelpDesk>) -> Self {
        Self {
            desk,
            sessions: Arc::new(SessionStore::default()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl HelpDeskError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            HelpDeskError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            HelpDeskError::UnknownStaffError { .. } => StatusCode::NOT_FOUND,
            HelpDeskError::ApiError(_) | HelpDeskError::GenerationError { .. } => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HelpDeskError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {} (category: {:?})", self, self.category());
        } else {
            tracing::debug!("Request rejected: {}", self);
        }
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Failure of a JSON handler: either the body was unusable or the desk refused it.
/// Both render as [`ErrorBody`].
#[derive(Debug)]
pub enum ApiFailure {
    Body(JsonRejection),
    Desk(HelpDeskError),
}

impl From<JsonRejection> for ApiFailure {
    fn from(rejection: JsonRejection) -> Self {
        ApiFailure::Body(rejection)
    }
}

impl From<HelpDeskError> for ApiFailure {
    fn from(err: HelpDeskError) -> Self {
        ApiFailure::Desk(err)
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        match self {
            ApiFailure::Desk(err) => err.into_response(),
            ApiFailure::Body(rejection) => {
                tracing::debug!("Rejected request body: {}", rejection.body_text());
                (
                    rejection.status(),
                    Json(ErrorBody {
                        error: rejection.body_text(),
                    }),
                )
                    .into_response()
            }
        }
    }
}

/// Serves `router` until Ctrl-C.
pub async fn serve(listener: TcpListener, router: Router) -> Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server on {} stopped", addr);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
