use axum::response::{IntoResponse, Response};
use http::StatusCode;
use tracing::error;

pub type ApiResult<T, E = ApiError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Record cannot be deleted: {0}")]
    NotDeletable(String),

    #[error("Record already exists: {0}")]
    Conflict(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<mms_dal::Error> for ApiError {
    fn from(err: mms_dal::Error) -> Self {
        match err {
            mms_dal::Error::RecordNotFound(entity) => ApiError::NotFound(entity),
            mms_dal::Error::RecordNotDeletable(reason) => ApiError::NotDeletable(reason),
            mms_dal::Error::RecordAlreadyExists(entity) => ApiError::Conflict(entity),
            other => ApiError::Internal(other.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::NotDeletable(_) | ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(e) => {
                error!("Internal server error: {e}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = axum::Json(serde_json::json!({"error": self.to_string()}));
        (status, body).into_response()
    }
}
