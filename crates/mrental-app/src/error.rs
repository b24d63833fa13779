use axum::{
    response::{IntoResponse, Response},
    Json,
};
use http::StatusCode;
use mrental_dal::SqlxError;
use serde_json::json;
use tracing::{debug, error};

const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";
const INVALID_LOGIN_MESSAGE: &str = "Invalid login, check your credentials and try again";

pub type ApiResult<T, E = ApiError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] garde::Report),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unauthorized: {0}")]
    Unauthorized(&'static str),

    #[error("Database error: {0}")]
    DatabaseError(#[source] SqlxError),

    #[error("Token error: {0}")]
    TokenError(#[from] mrental_auth::Error),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<mrental_dal::Error> for ApiError {
    fn from(value: mrental_dal::Error) -> Self {
        use mrental_dal::Error as DalError;
        match value {
            DalError::DatabaseError(e) => ApiError::DatabaseError(e),
            DalError::RecordNotFound(msg) => ApiError::ResourceNotFound(msg),
            DalError::InvalidCredentials => ApiError::InvalidCredentials,
            e @ DalError::DuplicateEmail(_) => ApiError::InvalidRequest(e.to_string()),
            e @ DalError::UnknownMovies(_) => ApiError::InvalidRequest(e.to_string()),
            e @ DalError::InvalidOrderByField(_) => ApiError::InvalidQuery(e.to_string()),
            e => ApiError::InternalError(e.to_string()),
        }
    }
}

fn classify_sqlx_error(err: &SqlxError) -> (StatusCode, String) {
    match err {
        SqlxError::RowNotFound => (StatusCode::NOT_FOUND, "Resource not found".to_string()),
        SqlxError::Database(db_err) if db_err.is_foreign_key_violation() => {
            debug!("Foreign key violation: {db_err}");
            (
                StatusCode::BAD_REQUEST,
                "Referenced record does not exist".to_string(),
            )
        }
        SqlxError::Database(db_err) if db_err.is_unique_violation() => {
            debug!("Unique violation: {db_err}");
            (StatusCode::BAD_REQUEST, "Record already exists".to_string())
        }
        other => {
            error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                INTERNAL_ERROR_MESSAGE.to_string(),
            )
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::ResourceNotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::InvalidRequest(msg) | ApiError::InvalidQuery(msg) => {
                (StatusCode::BAD_REQUEST, msg)
            }
            ApiError::ValidationFailed(report) => {
                debug!("Validation failed: {report}");
                return (StatusCode::BAD_REQUEST, Json(report)).into_response();
            }
            ApiError::InvalidCredentials => {
                (StatusCode::BAD_REQUEST, INVALID_LOGIN_MESSAGE.to_string())
            }
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.to_string()),
            ApiError::DatabaseError(e) => classify_sqlx_error(&e),
            ApiError::TokenError(e) => {
                error!(error = %e, "Token error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_ERROR_MESSAGE.to_string(),
                )
            }
            ApiError::InternalError(msg) => {
                error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_ERROR_MESSAGE.to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_dal_error_mapping() {
        let response =
            ApiError::from(mrental_dal::Error::RecordNotFound("Genre with ID 7".into()))
                .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "Genre with ID 7");

        let response =
            ApiError::from(mrental_dal::Error::UnknownMovies(vec![3, 999])).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("3, 999"));

        let response = ApiError::from(mrental_dal::Error::InvalidCredentials).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], INVALID_LOGIN_MESSAGE);

        let response = ApiError::from(mrental_dal::Error::InvalidOrderByField("x".into()))
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_internal_errors_are_generic() {
        let response = ApiError::from(mrental_dal::Error::DatabaseError(SqlxError::PoolTimedOut))
            .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["error"], INTERNAL_ERROR_MESSAGE);

        let response =
            ApiError::from(mrental_dal::Error::DatabaseError(SqlxError::RowNotFound))
                .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let response = ApiError::Unauthorized("Missing token").into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"], "Missing token");
    }
}
