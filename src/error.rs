use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Request-level errors with their HTTP status mapping.
///
/// Database and internal failures are logged here and answered with a
/// generic body; the underlying error never reaches the client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Invalid NIK or password")]
    InvalidCredentials,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::InvalidCredentials => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::Database(e) => {
                tracing::error!(error = %e, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            ApiError::Internal(e) => {
                tracing::error!(error = %e, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };
        (status, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_the_entity() {
        assert_eq!(ApiError::NotFound("Patient").to_string(), "Patient not found");
    }

    #[test]
    fn credential_failure_is_uniform() {
        // The same message covers both unknown nik and wrong password.
        assert_eq!(
            ApiError::InvalidCredentials.to_string(),
            "Invalid NIK or password"
        );
    }
}
