use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::server::AppState;

/// Session middleware: resolves the caller's identity once per request and
/// injects it into the request extensions for handlers to pick up.
///
/// Every resolver failure - missing cookie/header, expired token, provider
/// misconfiguration - maps to the same 401 response; the underlying cause
/// is only visible in server-side logs.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = state.sessions.resolve(request.headers()).map_err(|err| {
        tracing::debug!("session resolution failed: {}", err);
        ApiError::unauthorized("Unauthorized")
    })?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}
