//! Edge error type: projects every subsystem error onto one HTTP status
//! and `{status, message}` body, per `SPEC_FULL.md` §6's table. Grounded
//! on `signia-api::error::ApiError`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use repo_summarizer_orchestrator::error::OrchestratorError;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    BadRequest(String),
    #[error("repository inaccessible: {0}")]
    NotFound(String),
    #[error("{0}")]
    UnprocessableEntity(String),
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("bad gateway: {0}")]
    BadGateway(String),
    #[error("upstream unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("upstream timeout: {0}")]
    GatewayTimeout(String),
    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::GatewayTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody { status: "error", message: self.to_string() };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Status mapping per `SPEC_FULL.md` §6: 400 invalid URL/body, 404 repo
/// inaccessible, 422 digest parse/validation, 429 rate limited, 502
/// shape/output validation, 503 other upstream, 504 timeout, 500 config.
impl From<OrchestratorError> for ApiError {
    fn from(e: OrchestratorError) -> Self {
        match e {
            OrchestratorError::InvalidUrl { message } => Self::BadRequest(message),
            OrchestratorError::RepositoryInaccessible { message } => Self::NotFound(message),
            OrchestratorError::DigestParse { message } => Self::UnprocessableEntity(message),
            OrchestratorError::Budget { message } => Self::UnprocessableEntity(message),
            OrchestratorError::OutputValidation { message } => Self::UnprocessableEntity(message),
            OrchestratorError::RateLimited { message } => Self::RateLimited(message),
            OrchestratorError::ResponseShape { message } => Self::BadGateway(message),
            OrchestratorError::Timeout { message } => Self::GatewayTimeout(message),
            OrchestratorError::Upstream { message, .. } => Self::ServiceUnavailable(message),
            OrchestratorError::Config { message } => Self::Internal(message),
        }
    }
}
