use crate::SharedData;
use crate::routing_utils::error_response;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

/// Extractor that verifies the bearer token on a request and resolves the
/// authenticated user's ID. Requests without a valid token are rejected
/// before any handler logic runs.
pub struct Authenticated(pub i64);

/// Response for requests that fail token verification
pub struct UnauthorizedResponse;

impl IntoResponse for UnauthorizedResponse {
    fn into_response(self) -> Response {
        error_response(StatusCode::UNAUTHORIZED, "Unauthorized")
    }
}

#[async_trait]
impl FromRequestParts<Arc<SharedData>> for Authenticated {
    type Rejection = UnauthorizedResponse;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<SharedData>,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|header_value| header_value.to_str().ok())
            .ok_or(UnauthorizedResponse)?;
        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(UnauthorizedResponse)?;

        let user_id = state
            .token_signer
            .verify(token)
            .map_err(|_| UnauthorizedResponse)?;

        Ok(Authenticated(user_id))
    }
}
