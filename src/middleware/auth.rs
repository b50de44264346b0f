use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use uuid::Uuid;

use crate::state::AppState;
use crate::utils::jwt::verify_token;
use formline_core::AppError;
use formline_models::ids::UserId;
use formline_models::roles::{Principal, Role};

/// Extractor that validates the JWT and resolves the claims into a typed
/// [`Principal`]. Malformed scope combinations (e.g. a regionadmin token
/// without a region) are rejected here, so services never see them.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Principal);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                AppError::unauthorized(anyhow::anyhow!("Missing authorization header"))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::unauthorized(anyhow::anyhow!("Invalid authorization header format"))
        })?;

        let claims = verify_token(token, &state.jwt_config)?;

        let id = Uuid::parse_str(&claims.sub)
            .map(UserId::from_uuid)
            .map_err(|_| AppError::unauthorized(anyhow::anyhow!("Invalid user id in token")))?;

        let role = Role::from_parts(
            &claims.role,
            claims.region_id,
            claims.sector_id,
            claims.school_id,
        )
        .map_err(|err| AppError::unauthorized(anyhow::anyhow!("Invalid role claims: {err}")))?;

        Ok(AuthUser(Principal {
            id,
            email: claims.email,
            role,
        }))
    }
}
