use anyhow::anyhow;
use axum::extract::Request;
use axum::http::{header, StatusCode};
use tracing_subscriber::EnvFilter;

use crate::response::AppError;

/// Returns the bearer token of the request, `None` when there is no
/// `Authorization` header at all.
pub fn extract_bearer_token(req: &Request) -> Result<Option<String>, AppError> {
    let Some(auth_header) = req.headers().get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let value = auth_header
        .to_str()
        .map_err(|e| AppError::new(StatusCode::UNAUTHORIZED, anyhow!(e)))?
        .split_whitespace()
        .collect::<Vec<_>>();

    match value.as_slice() {
        ["Bearer", token] => Ok(Some(token.to_string())),
        _ => Err(AppError::new(
            StatusCode::UNAUTHORIZED,
            anyhow!("invalid authorization header"),
        )),
    }
}

pub fn setup_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request_with(auth: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().uri("/");
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn missing_header_is_anonymous() {
        assert_eq!(extract_bearer_token(&request_with(None)).unwrap(), None);
    }

    #[test]
    fn bearer_token_is_extracted() {
        assert_eq!(
            extract_bearer_token(&request_with(Some("Bearer abc.def.ghi"))).unwrap(),
            Some("abc.def.ghi".to_string())
        );
    }

    #[test]
    fn malformed_header_is_rejected() {
        for header in ["Basic abc", "Bearer", "Bearer a b"] {
            let err = extract_bearer_token(&request_with(Some(header))).unwrap_err();
            assert_eq!(err.0, StatusCode::UNAUTHORIZED);
        }
    }
}
