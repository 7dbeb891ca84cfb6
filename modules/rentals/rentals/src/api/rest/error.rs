use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::DomainError;

/// Error body shared by every endpoint: `{"error": "<message>"}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

/// HTTP projection of a [`DomainError`].
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        let status = match &err {
            DomainError::Validation { .. } | DomainError::Conflict { .. } => {
                StatusCode::BAD_REQUEST
            }
            DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
            DomainError::Forbidden { .. } => StatusCode::FORBIDDEN,
            DomainError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            DomainError::Storage(source) => {
                tracing::error!("storage failure: {source}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            DomainError::Credential(source) => {
                tracing::error!("credential failure: {source}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        // 5xx details stay in the logs.
        let message = if status.is_server_error() {
            "Internal server error".to_owned()
        } else {
            err.to_string()
        };

        Self { status, message }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn status_of(err: DomainError) -> StatusCode {
        ApiError::from(err).status
    }

    #[test]
    fn domain_errors_map_to_expected_status_codes() {
        assert_eq!(
            status_of(DomainError::validation("price", "Price must be positive")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(DomainError::email_taken()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(DomainError::not_found("Place", Uuid::new_v4())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(DomainError::admin_required()),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(DomainError::invalid_credentials()),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn storage_failures_do_not_leak_details() {
        let err = DomainError::Storage(sea_orm::DbErr::Custom("secret table".to_owned()));
        let api: ApiError = err.into();
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.message, "Internal server error");
    }
}
