use crate::auth::AuthError;
use crate::ledger::Rejection;
use axum::http::StatusCode;
use axum::Json;
use serde_json::json;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: message.into(),
        }
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::internal(err)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingFields => Self::bad_request(err.message()),
            AuthError::DuplicateUsername => Self::conflict(err.message()),
            AuthError::InvalidCredentials => Self::unauthorized(err.message()),
            AuthError::Hashing => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: err.message().to_string(),
            },
        }
    }
}

impl From<Rejection> for AppError {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::CapExceeded { .. } => Self::unprocessable(rejection.message()),
            _ => Self::bad_request(rejection.message()),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        // Every failure shares the API's wire shape, so page scripts can
        // treat anything without `ok: true` uniformly.
        let body = Json(json!({ "ok": false, "message": self.message }));
        (self.status, body).into_response()
    }
}
