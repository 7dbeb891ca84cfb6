//! User endpoints. Everything here is admin-gated except reading one's
//! own account; the gates live in the domain service.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use uuid::Uuid;

use rentals_sdk::{NewUser, User, UserPatch};

use super::SharedServices;
use super::error::{ApiError, ErrorBody};
use crate::domain::repos::{
    AmenitiesRepository, PlacesRepository, ReviewsRepository, UsersRepository,
};
use crate::security::SecurityContext;

/// Create a new user (admin only).
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = NewUser,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Invalid input data", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Admin privileges required", body = ErrorBody)
    ),
    tag = "users"
)]
pub async fn create_user<UR, PR, AR, RR>(
    State(services): State<SharedServices<UR, PR, AR, RR>>,
    Extension(ctx): Extension<SecurityContext>,
    Json(body): Json<NewUser>,
) -> Result<(StatusCode, Json<User>), ApiError>
where
    UR: UsersRepository,
    PR: PlacesRepository,
    AR: AmenitiesRepository,
    RR: ReviewsRepository,
{
    let user = services.users.create_user(&ctx, body).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// List all users (admin only).
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "All users", body = [User]),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Admin privileges required", body = ErrorBody)
    ),
    tag = "users"
)]
pub async fn list_users<UR, PR, AR, RR>(
    State(services): State<SharedServices<UR, PR, AR, RR>>,
    Extension(ctx): Extension<SecurityContext>,
) -> Result<Json<Vec<User>>, ApiError>
where
    UR: UsersRepository,
    PR: PlacesRepository,
    AR: AmenitiesRepository,
    RR: ReviewsRepository,
{
    let users = services.users.list_users(&ctx).await?;
    Ok(Json(users))
}

/// Fetch one user (admin, or the user itself).
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "The user", body = User),
        (status = 403, description = "Forbidden", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody)
    ),
    tag = "users"
)]
pub async fn get_user<UR, PR, AR, RR>(
    State(services): State<SharedServices<UR, PR, AR, RR>>,
    Extension(ctx): Extension<SecurityContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, ApiError>
where
    UR: UsersRepository,
    PR: PlacesRepository,
    AR: AmenitiesRepository,
    RR: ReviewsRepository,
{
    let user = services.users.get_user(&ctx, id).await?;
    Ok(Json(user))
}

/// Update a user (admin only).
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = UserPatch,
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 400, description = "Invalid input data", body = ErrorBody),
        (status = 403, description = "Admin privileges required", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody)
    ),
    tag = "users"
)]
pub async fn update_user<UR, PR, AR, RR>(
    State(services): State<SharedServices<UR, PR, AR, RR>>,
    Extension(ctx): Extension<SecurityContext>,
    Path(id): Path<Uuid>,
    Json(patch): Json<UserPatch>,
) -> Result<Json<User>, ApiError>
where
    UR: UsersRepository,
    PR: PlacesRepository,
    AR: AmenitiesRepository,
    RR: ReviewsRepository,
{
    let user = services.users.update_user(&ctx, id, patch).await?;
    Ok(Json(user))
}

/// Delete a user and everything they own (admin only).
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 403, description = "Admin privileges required", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody)
    ),
    tag = "users"
)]
pub async fn delete_user<UR, PR, AR, RR>(
    State(services): State<SharedServices<UR, PR, AR, RR>>,
    Extension(ctx): Extension<SecurityContext>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
    UR: UsersRepository,
    PR: PlacesRepository,
    AR: AmenitiesRepository,
    RR: ReviewsRepository,
{
    services.users.delete_user(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
