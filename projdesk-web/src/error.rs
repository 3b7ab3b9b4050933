//! Error types for projdesk-web
//!
//! Handlers log the underlying cause and answer with a static message only;
//! CRM details never reach the client.

use crate::api::ui;
use crate::crm::CrmError;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("{message}: {id}")]
    NotFound { message: &'static str, id: String },

    /// Invalid request (400)
    #[error("{0}")]
    BadRequest(&'static str),

    /// CRM call failed (500)
    #[error("{message}: {source}")]
    Remote {
        message: &'static str,
        #[source]
        source: CrmError,
    },
}

impl ApiError {
    /// Wrap a gateway failure with the message the user will see
    ///
    /// `CrmError::NotFound` maps to a 404, everything else to a 500.
    pub fn crm(message: &'static str, source: CrmError) -> Self {
        match source {
            CrmError::NotFound(id) => ApiError::NotFound {
                message: "Project not found",
                id,
            },
            source => ApiError::Remote { message, source },
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Remote { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the client
    pub fn public_message(&self) -> &'static str {
        match self {
            ApiError::NotFound { message, .. } => *message,
            ApiError::BadRequest(message) => *message,
            ApiError::Remote { message, .. } => *message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Remote { message, source } => {
                tracing::error!("{}: {}", message, source.log_detail());
            }
            ApiError::NotFound { id, .. } => {
                tracing::warn!(id = %id, "CRM object not found");
            }
            ApiError::BadRequest(message) => {
                tracing::warn!("Rejected request: {}", message);
            }
        }

        let status = self.status();
        (status, Html(ui::error_page(status, self.public_message()))).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
