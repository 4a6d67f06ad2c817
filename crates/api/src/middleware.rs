use anyhow::anyhow;
use axum::body::Body;
use axum::http::StatusCode;
use axum::{extract::Request, response::Response};
use axum::middleware::Next;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;

use storytime_common::EnvVars;

use crate::env::ApiServerEnv;
use crate::response::AppError;
use crate::utils::extract_bearer_token;

/// Claims of a hosted-auth token. `sub` is the user id; the platform's
/// anon key is signed with the same secret and carries no `sub`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub sub: Option<Uuid>,
    pub exp: i64,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

pub const ANON_ROLE: &str = "anon";

/// The caller of a request; `None` for anonymous requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthUser(pub Option<Uuid>);

impl AuthUser {
    pub fn user_id(&self) -> Option<Uuid> {
        self.0
    }

    /// The caller's id, or 401 for anonymous requests.
    pub fn require(&self) -> Result<Uuid, AppError> {
        self.0.ok_or_else(|| AppError::new(
            StatusCode::UNAUTHORIZED,
            anyhow!("Authentication required"),
        ))
    }
}

impl Claims {
    /// The signed-in user, `None` for the anon key.
    pub fn user_id(&self) -> Option<Uuid> {
        match self.role.as_deref() {
            Some(ANON_ROLE) => None,
            _ => self.sub,
        }
    }
}

pub fn validate_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_aud = false;
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;
    Ok(token_data.claims)
}

/// Resolves the bearer token (if any) into an `AuthUser` extension.
/// Requests without a token or with the anon key pass through as anonymous;
/// a bad token is a 401.
pub async fn authenticate(
    mut req: Request, next: Next
) -> Result<Response<Body>, AppError> {
    let env = ApiServerEnv::load();

    let user = match extract_bearer_token(&req)? {
        None => AuthUser(None),
        Some(token) => {
            if env.jwt_secret.is_empty() {
                return Err(AppError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    anyhow!("SUPABASE_JWT_SECRET is not configured"),
                ));
            }
            let claims = validate_token(&token, &env.jwt_secret)
                .map_err(|e| AppError::new(StatusCode::UNAUTHORIZED, anyhow!("invalid access token: {}", e)))?;
            AuthUser(claims.user_id())
        }
    };

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token_for(sub: Uuid, exp: i64, secret: &str) -> String {
        let claims = Claims { sub: Some(sub), exp, role: Some("authenticated".into()), email: None };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    #[test]
    fn valid_token_yields_subject() {
        let user = Uuid::new_v4();
        let exp = storytime_common::get_current_timestamp() + 3600;
        let claims = validate_token(&token_for(user, exp, "secret"), "secret").unwrap();
        assert_eq!(claims.user_id(), Some(user));
    }

    #[test]
    fn anon_key_is_an_anonymous_caller() {
        let exp = storytime_common::get_current_timestamp() + 3600;
        let anon = serde_json::json!({ "iss": "supabase", "role": "anon", "exp": exp });
        let token = encode(&Header::default(), &anon, &EncodingKey::from_secret(b"secret")).unwrap();

        let claims = validate_token(&token, "secret").unwrap();
        assert_eq!(claims.sub, None);
        assert_eq!(claims.user_id(), None);
    }

    #[test]
    fn wrong_secret_or_expired_token_fails() {
        let user = Uuid::new_v4();
        let now = storytime_common::get_current_timestamp();
        assert!(validate_token(&token_for(user, now + 3600, "other"), "secret").is_err());
        assert!(validate_token(&token_for(user, now - 3600, "secret"), "secret").is_err());
    }

    #[test]
    fn anonymous_callers_are_rejected_by_require() {
        assert_eq!(AuthUser(None).require().unwrap_err().0, StatusCode::UNAUTHORIZED);
        let user = Uuid::new_v4();
        assert_eq!(AuthUser(Some(user)).require().unwrap(), user);
    }
}
