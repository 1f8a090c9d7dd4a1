use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use database::StoreError;
use models::CatalogError;
use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("database error: {0}")]
    Db(#[from] DbErr),

    #[error("bad request: {0}")]
    BadRequest(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Db(e) => Self::Db(e),
            StoreError::Catalog(e) => Self::Catalog(e),
        }
    }
}

/// Error body returned by every endpoint
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    /// One entry per offending form field, empty otherwise
    pub details: Vec<String>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Catalog(e) => match e {
                CatalogError::InvalidArgument(_) | CatalogError::ValidationFailed(_) => {
                    StatusCode::BAD_REQUEST
                }
                CatalogError::NotFound { .. } => StatusCode::NOT_FOUND,
                CatalogError::Forbidden(_) => StatusCode::FORBIDDEN,
                CatalogError::InvalidState(_) => StatusCode::CONFLICT,
                CatalogError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("{self}");
        } else {
            log::debug!("Request rejected with {status}: {self}");
        }

        let body = match self {
            Self::Catalog(CatalogError::ValidationFailed(details)) => ErrorResponse {
                error: "validation failed".to_string(),
                details,
            },
            // Internal details stay in the log
            Self::Db(_) | Self::Catalog(CatalogError::Serialization(_)) => ErrorResponse {
                error: "internal server error".to_string(),
                details: vec![],
            },
            other => ErrorResponse {
                error: other.to_string(),
                details: vec![],
            },
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                AppError::from(CatalogError::InvalidArgument("x".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                CatalogError::ValidationFailed(vec!["titel_deutsch is required".into()]).into(),
                StatusCode::BAD_REQUEST,
            ),
            (CatalogError::module_not_found(3).into(), StatusCode::NOT_FOUND),
            (CatalogError::Forbidden("x".into()).into(), StatusCode::FORBIDDEN),
            (CatalogError::InvalidState("x".into()).into(), StatusCode::CONFLICT),
            (
                AppError::Db(DbErr::Custom("boom".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
        ];

        for (error, status) in cases {
            assert_eq!(error.status(), status, "{error}");
        }
    }

    #[test]
    fn test_store_errors_keep_their_kind() {
        let err: AppError = StoreError::Catalog(CatalogError::change_request_not_found(9)).into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err: AppError = StoreError::Db(DbErr::Custom("down".into())).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_response_status() {
        let response = AppError::from(CatalogError::InvalidState("approved".into())).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
