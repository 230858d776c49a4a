use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a forward did not produce an upstream body.
#[derive(Error, Debug)]
pub enum Fault {
    /// A credential the route needs is not configured.
    #[error("{0}")]
    MissingCredential(String),
    /// Caller input failed a precondition.
    #[error("{0}")]
    InvalidInput(String),
    /// Upstream answered with a non-success status.
    #[error("upstream responded with status {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("upstream body is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

impl Fault {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Fault::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// The single JSON shape returned to callers on failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorEnvelope {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            status: None,
            details: None,
        }
    }
}

/// A fault tagged with the operation it interrupted, e.g. "Nutritionix search".
#[derive(Debug)]
pub struct ApiError {
    operation: &'static str,
    fault: Fault,
}

impl ApiError {
    pub fn new(operation: &'static str, fault: Fault) -> Self {
        Self { operation, fault }
    }

    pub fn fault(&self) -> &Fault {
        &self.fault
    }

    pub fn envelope(&self) -> ErrorEnvelope {
        match &self.fault {
            Fault::MissingCredential(msg) | Fault::InvalidInput(msg) => ErrorEnvelope::new(msg.clone()),
            Fault::Upstream { status, body } => ErrorEnvelope {
                error: format!("{} failed", self.operation),
                status: Some(*status),
                details: Some(body.clone()),
            },
            Fault::Transport(_) | Fault::Decode(_) => {
                ErrorEnvelope::new(format!("{} failed (exception)", self.operation))
            }
        }
    }

    fn log(&self) {
        let operation = self.operation;
        match &self.fault {
            Fault::MissingCredential(msg) => tracing::error!(operation, "{}", msg),
            Fault::InvalidInput(msg) => tracing::debug!(operation, "Rejected request: {}", msg),
            Fault::Upstream { status, body } => {
                tracing::error!(operation, status, body = %body, "Upstream API error")
            }
            Fault::Transport(e) => tracing::error!(operation, error = %e, "Upstream request failed"),
            Fault::Decode(e) => tracing::error!(operation, error = %e, "Upstream response was not JSON"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log();
        (self.fault.status_code(), Json(self.envelope())).into_response()
    }
}
