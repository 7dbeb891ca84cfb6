//! Authentication endpoints.

use axum::extract::State;
use axum::{Extension, Json};

use rentals_sdk::{LoginRequest, ProtectedResponse, TokenResponse};

use super::SharedServices;
use super::error::{ApiError, ErrorBody};
use crate::domain::repos::{
    AmenitiesRepository, PlacesRepository, ReviewsRepository, UsersRepository,
};
use crate::security::SecurityContext;

/// Authenticate a user and return a JWT access token.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Missing email or password", body = ErrorBody),
        (status = 401, description = "Invalid credentials", body = ErrorBody)
    ),
    tag = "auth"
)]
pub async fn login<UR, PR, AR, RR>(
    State(services): State<SharedServices<UR, PR, AR, RR>>,
    Json(credentials): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError>
where
    UR: UsersRepository,
    PR: PlacesRepository,
    AR: AmenitiesRepository,
    RR: ReviewsRepository,
{
    let response = services.auth.login(credentials).await?;
    Ok(Json(response))
}

/// Demo endpoint proving the bearer token round-trip.
#[utoipa::path(
    get,
    path = "/api/v1/auth/protected",
    responses(
        (status = 200, description = "Authenticated", body = ProtectedResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    ),
    tag = "auth"
)]
pub async fn protected(
    Extension(ctx): Extension<SecurityContext>,
) -> Result<Json<ProtectedResponse>, ApiError> {
    let user_id = ctx
        .subject_id()
        .ok_or_else(|| ApiError::unauthorized("Missing or invalid Authorization header"))?;

    Ok(Json(ProtectedResponse {
        message: format!("Hello, user {user_id}"),
        user_id,
        is_admin: ctx.is_admin(),
    }))
}
