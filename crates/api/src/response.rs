use axum::extract::{rejection::JsonRejection, FromRequest};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use storytime_runtime::{CharacterValidationError, GenerationError};

pub type AppSuccess = GenericResponse;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenericResponse {
    pub status: u16,
    pub message: String,
    pub data: Value,
}

impl GenericResponse {
    pub fn new(status: StatusCode, message: &str, data: Value) -> Self {
        Self {
            status: status.as_u16(),
            message: message.to_string(),
            data,
        }
    }
}

impl IntoResponse for GenericResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::OK);
        (status, Json::from(self)).into_response()
    }
}

// Our own error type: a status, the underlying `anyhow::Error`, and optional
// details returned to the client under `data.details`.
#[derive(Debug)]
pub struct AppError(pub StatusCode, pub anyhow::Error, pub Option<Value>);

impl AppError {
    pub fn new(status: StatusCode, err: anyhow::Error) -> Self {
        Self(status, err, None)
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.2 = Some(details);
        self
    }

    pub fn from_generation(err: GenerationError) -> Self {
        let status = StatusCode::from_u16(err.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let details = err.details().cloned();
        Self(status, err.into(), details)
    }

    pub fn from_validation(err: CharacterValidationError) -> Self {
        let details = json!(err.errors());
        Self(StatusCode::BAD_REQUEST, err.into(), Some(details))
    }
}

// Tell axum how to convert `AppError` into a response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!("CODE: {}, MESSAGE: {}", self.0.as_u16(), self.1);
        let data = match self.2 {
            Some(details) => json!({ "details": details }),
            None => json!({}),
        };
        GenericResponse::new(self.0, &self.1.to_string(), data).into_response()
    }
}

// This enables using `?` on functions that return `Result<_, anyhow::Error>` to turn them into
// `Result<_, AppError>`. That way you don't need to do that manually.
// Body rejections keep their own status, database failures are 500, anything else is 400.
impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        let status = if let Some(rejection) = err.downcast_ref::<JsonRejection>() {
            rejection.status()
        } else if err.is::<sqlx::Error>() {
            StatusCode::INTERNAL_SERVER_ERROR
        } else {
            StatusCode::BAD_REQUEST
        };
        Self(status, err, None)
    }
}

/// `Json` whose rejections are answered with the response envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_status_is_forwarded() {
        let err = AppError::from_generation(GenerationError::Provider {
            status: 429,
            message: "slow down".into(),
            details: json!({ "error": { "message": "slow down" } }),
        });
        assert_eq!(err.0, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(err.1.to_string(), "slow down");
        assert!(err.2.is_some());
    }

    #[test]
    fn validation_errors_become_details() {
        let err = AppError::from_validation(CharacterValidationError(vec!["Gender is required".into()]));
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
        assert_eq!(err.2, Some(json!(["Gender is required"])));
    }

    #[test]
    fn database_failures_are_server_errors() {
        let err = AppError::from(sqlx::Error::PoolTimedOut);
        assert_eq!(err.0, StatusCode::INTERNAL_SERVER_ERROR);

        let err = AppError::from(anyhow::anyhow!("bad input"));
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn envelope_carries_the_status() {
        let response = AppError::new(StatusCode::NOT_FOUND, anyhow::anyhow!("Story not found")).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
