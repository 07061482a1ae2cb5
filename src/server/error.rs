//! HTTP rendering of callback failures.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::oauth::CallbackError;

impl CallbackError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingCode
            | Self::InvalidState
            | Self::CodeAlreadyUsed
            | Self::MissingVerifier => StatusCode::BAD_REQUEST,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for CallbackError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Callback failed: {}", self);
        } else {
            tracing::warn!("Callback rejected: {}", self);
        }
        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.to_string(),
        )
            .into_response()
    }
}
