//! Bearer-token guard for mutating routes.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::Response,
};

use super::{ApiState, error::ApiError};

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::AUTHORIZATION)?.to_str().ok()?.strip_prefix("Bearer ")
}

/// Lets the request through only with `Authorization: Bearer <api_key>`.
pub async fn auth(
    State(state): State<ApiState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let authorized =
        bearer_token(request.headers()).is_some_and(|token| state.config.server.accepts(token));
    if !authorized {
        tracing::debug!(path = %request.uri().path(), "Rejected unauthenticated request.");
        return Err(ApiError::Unauthorized);
    }
    Ok(next.run(request).await)
}
