use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use eao_session::SessionError;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Bad request body: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Session(err) => match err {
                SessionError::NotFound(_) => StatusCode::NOT_FOUND,
                SessionError::DuplicateAsset(_) => StatusCode::CONFLICT,
                SessionError::CapacityExceeded { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                SessionError::Solve(_) => StatusCode::BAD_GATEWAY,
                SessionError::Decode(_)
                | SessionError::WrongKind { .. }
                | SessionError::DerivedKey(_)
                | SessionError::UnresolvedReference { .. }
                | SessionError::MalformedReference { .. }
                | SessionError::Path(_)
                | SessionError::ReservedName(_)
                | SessionError::UnknownSolver { .. } => StatusCode::BAD_REQUEST,
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Session(err) => err.kind(),
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(kind = self.kind(), "{}", self);
        } else {
            warn!(kind = self.kind(), "{}", self);
        }

        let body = Json(json!({
            "error": self.to_string(),
            "kind": self.kind(),
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
