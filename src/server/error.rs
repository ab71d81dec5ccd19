use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::options::ValidationError;

pub mod messages {
    pub const VALIDATION_FAILED: &str = "Validation failed";
    pub const GENERATE_FAILED: &str = "Failed to generate avatar";
    pub const INFO_FAILED: &str = "Failed to get avatar info";
    pub const SEED_REQUIRED: &str = "Seed cannot be empty";
    pub const UNEXPECTED: &str = "An unexpected error occurred";
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ApiErrorBody {
    Validation {
        error: &'static str,
        details: ValidationError,
    },
    Internal {
        error: &'static str,
        message: String,
    },
    Plain {
        error: String,
    },
}

/// JSON error response for the avatar routes.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ApiErrorBody,
}

impl ApiError {
    /// 400 with per-field details.
    pub fn validation(details: ValidationError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ApiErrorBody::Validation {
                error: messages::VALIDATION_FAILED,
                details,
            },
        }
    }

    /// 500 for a failed render. `detail` is only exposed when `debug` is set.
    pub fn generation(detail: impl Into<String>, debug: bool) -> Self {
        let message = if debug {
            detail.into()
        } else {
            messages::UNEXPECTED.to_string()
        };
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: ApiErrorBody::Internal {
                error: messages::GENERATE_FAILED,
                message,
            },
        }
    }

    /// A bare `{ "error": ... }` body.
    pub fn plain(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            body: ApiErrorBody::Plain {
                error: error.into(),
            },
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
