use crate::{error::ApiError, state::AppState};
use axum::{extract::FromRequestParts, RequestPartsExt};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use http::request::Parts;
use mrental_types::claim::ApiClaim;
use tracing::debug;

impl FromRequestParts<AppState> for ApiClaim {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header_token = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .ok()
            .map(|h| h.0.token().to_string());

        match header_token {
            Some(token) => {
                let claim = state.tokens().validate::<ApiClaim>(&token).map_err(|e| {
                    debug!("Failed to validate token: {e}");
                    if e.is_expired() {
                        ApiError::Unauthorized("Token expired")
                    } else {
                        ApiError::Unauthorized("Invalid token")
                    }
                })?;
                Ok(claim)
            }
            None => {
                debug!("No token found");
                Err(ApiError::Unauthorized("Missing bearer token"))
            }
        }
    }
}
