use axum::http::HeaderMap;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Authenticated caller, produced by a [`SessionResolver`].
///
/// The user id is an opaque key minted by the external session provider;
/// the API never inspects it beyond equality checks against book ownership.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
}

impl Identity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self { user_id: user_id.into() }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: String, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: user_id,
            exp,
            iat: now.timestamp(),
        }
    }
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self { user_id: claims.sub }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("missing Authorization header")]
    MissingToken,

    #[error("Authorization header must use Bearer token format")]
    MalformedHeader,

    #[error("invalid session token: {0}")]
    InvalidToken(String),

    #[error("session secret not configured")]
    NotConfigured,
}

/// Turns an incoming request's headers into an authenticated identity.
///
/// The HTTP boundary treats every failure uniformly as 401 regardless of
/// cause (missing header, expired token, provider misconfiguration), so
/// implementations are free to report precise errors for server-side logs.
pub trait SessionResolver: Send + Sync {
    fn resolve(&self, headers: &HeaderMap) -> Result<Identity, SessionError>;
}

/// Production resolver: validates an HS256 JWT bearer token minted by the
/// session provider with the shared secret.
pub struct JwtSessionResolver {
    secret: String,
}

impl JwtSessionResolver {
    pub fn new(secret: impl Into<String>) -> Self {
        Self { secret: secret.into() }
    }
}

impl SessionResolver for JwtSessionResolver {
    fn resolve(&self, headers: &HeaderMap) -> Result<Identity, SessionError> {
        if self.secret.is_empty() {
            return Err(SessionError::NotConfigured);
        }

        let token = extract_bearer_token(headers)?;

        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());
        let validation = Validation::default();

        let token_data = decode::<Claims>(&token, &decoding_key, &validation)
            .map_err(|e| SessionError::InvalidToken(e.to_string()))?;

        Ok(Identity::from(token_data.claims))
    }
}

/// Extract a bearer token from the Authorization header
fn extract_bearer_token(headers: &HeaderMap) -> Result<String, SessionError> {
    let auth_header = headers
        .get("authorization")
        .or_else(|| headers.get("Authorization"))
        .ok_or(SessionError::MissingToken)?;

    let auth_str = auth_header.to_str().map_err(|_| SessionError::MalformedHeader)?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err(SessionError::MalformedHeader);
        }
        Ok(token.to_string())
    } else {
        Err(SessionError::MalformedHeader)
    }
}

/// Mint a session token for the given user id. The API itself never issues
/// tokens in production (the session provider does); this is used by the
/// test suite and by operator tooling that shares the secret.
pub fn issue_token(secret: &str, user_id: &str, expiry_hours: u64) -> Result<String, SessionError> {
    if secret.is_empty() {
        return Err(SessionError::NotConfigured);
    }

    let claims = Claims::new(user_id.to_string(), expiry_hours);
    let encoding_key = EncodingKey::from_secret(secret.as_bytes());

    encode(&Header::default(), &claims, &encoding_key)
        .map_err(|e| SessionError::InvalidToken(e.to_string()))
}
