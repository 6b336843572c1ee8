//! Bearer-token issuance and verification for the protected route tree.
//!
//! Tokens carry a fixed mock identity; this gates routes for demonstration and
//! is not a real login.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::routes::AppState;

pub const MOCK_ID: &str = "MOCKID";
pub const MOCK_USERNAME: &str = "MOCKUSER";

/// JWT claims of an issued token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: String,
    pub username: String,
    /// Issued at (Unix epoch seconds)
    pub iat: i64,
    /// Expiration (Unix epoch seconds)
    pub exp: i64,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuthError {
    #[error("Authorization header is missing")]
    MissingHeader,

    #[error("Token is not valid")]
    InvalidToken,

    #[error("Token is not valid")]
    TokenExpired,

    #[error("Failed to generate token")]
    TokenGenerationFailed,
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingHeader => StatusCode::UNAUTHORIZED,
            AuthError::InvalidToken | AuthError::TokenExpired => StatusCode::FORBIDDEN,
            AuthError::TokenGenerationFailed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "message": self.to_string() }));
        (self.status_code(), body).into_response()
    }
}

/// Signs and checks HS256 tokens.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn issue(&self) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            id: MOCK_ID.to_string(),
            username: MOCK_USERNAME.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|_| AuthError::TokenGenerationFailed)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            })
    }
}

/// Token part of an `Authorization: Bearer <token>` header value.
pub fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Middleware guarding the protected routes.
pub async fn require_bearer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let Some(value) = req.headers().get(header::AUTHORIZATION) else {
        warn!("Rejected {} {}: no authorization header", req.method(), req.uri());
        return Err(AuthError::MissingHeader);
    };

    let token = value
        .to_str()
        .ok()
        .and_then(bearer_token)
        .ok_or(AuthError::InvalidToken)?;

    if let Err(e) = state.token_issuer.verify(token) {
        warn!("Rejected {} {}: {:?}", req.method(), req.uri(), e);
        return Err(e);
    }

    Ok(next.run(req).await)
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    #[serde(rename = "accessToken")]
    pub access_token: String,
}

pub async fn generate_auth_token(State(state): State<AppState>) -> Result<Json<TokenResponse>, AuthError> {
    let access_token = state.token_issuer.issue()?;
    Ok(Json(TokenResponse { access_token }))
}
