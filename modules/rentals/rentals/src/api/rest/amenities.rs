//! Amenity endpoints. Reads are public, mutations admin-gated.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use uuid::Uuid;

use rentals_sdk::{Amenity, AmenityPatch, NewAmenity};

use super::SharedServices;
use super::error::{ApiError, ErrorBody};
use crate::domain::repos::{
    AmenitiesRepository, PlacesRepository, ReviewsRepository, UsersRepository,
};
use crate::security::SecurityContext;

/// Create a new amenity (admin only).
#[utoipa::path(
    post,
    path = "/api/v1/amenities",
    request_body = NewAmenity,
    responses(
        (status = 201, description = "Amenity created", body = Amenity),
        (status = 400, description = "Invalid input data", body = ErrorBody),
        (status = 403, description = "Admin privileges required", body = ErrorBody)
    ),
    tag = "amenities"
)]
pub async fn create_amenity<UR, PR, AR, RR>(
    State(services): State<SharedServices<UR, PR, AR, RR>>,
    Extension(ctx): Extension<SecurityContext>,
    Json(body): Json<NewAmenity>,
) -> Result<(StatusCode, Json<Amenity>), ApiError>
where
    UR: UsersRepository,
    PR: PlacesRepository,
    AR: AmenitiesRepository,
    RR: ReviewsRepository,
{
    let amenity = services.amenities.create_amenity(&ctx, body).await?;
    Ok((StatusCode::CREATED, Json(amenity)))
}

/// List all amenities (public).
#[utoipa::path(
    get,
    path = "/api/v1/amenities",
    responses((status = 200, description = "All amenities", body = [Amenity])),
    tag = "amenities"
)]
pub async fn list_amenities<UR, PR, AR, RR>(
    State(services): State<SharedServices<UR, PR, AR, RR>>,
) -> Result<Json<Vec<Amenity>>, ApiError>
where
    UR: UsersRepository,
    PR: PlacesRepository,
    AR: AmenitiesRepository,
    RR: ReviewsRepository,
{
    let amenities = services.amenities.list_amenities().await?;
    Ok(Json(amenities))
}

/// Fetch one amenity (public).
#[utoipa::path(
    get,
    path = "/api/v1/amenities/{id}",
    params(("id" = Uuid, Path, description = "Amenity id")),
    responses(
        (status = 200, description = "The amenity", body = Amenity),
        (status = 404, description = "Amenity not found", body = ErrorBody)
    ),
    tag = "amenities"
)]
pub async fn get_amenity<UR, PR, AR, RR>(
    State(services): State<SharedServices<UR, PR, AR, RR>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Amenity>, ApiError>
where
    UR: UsersRepository,
    PR: PlacesRepository,
    AR: AmenitiesRepository,
    RR: ReviewsRepository,
{
    let amenity = services.amenities.get_amenity(id).await?;
    Ok(Json(amenity))
}

/// Rename an amenity (admin only).
#[utoipa::path(
    put,
    path = "/api/v1/amenities/{id}",
    params(("id" = Uuid, Path, description = "Amenity id")),
    request_body = AmenityPatch,
    responses(
        (status = 200, description = "Updated amenity", body = Amenity),
        (status = 400, description = "Invalid input data", body = ErrorBody),
        (status = 403, description = "Admin privileges required", body = ErrorBody),
        (status = 404, description = "Amenity not found", body = ErrorBody)
    ),
    tag = "amenities"
)]
pub async fn update_amenity<UR, PR, AR, RR>(
    State(services): State<SharedServices<UR, PR, AR, RR>>,
    Extension(ctx): Extension<SecurityContext>,
    Path(id): Path<Uuid>,
    Json(patch): Json<AmenityPatch>,
) -> Result<Json<Amenity>, ApiError>
where
    UR: UsersRepository,
    PR: PlacesRepository,
    AR: AmenitiesRepository,
    RR: ReviewsRepository,
{
    let amenity = services.amenities.update_amenity(&ctx, id, patch).await?;
    Ok(Json(amenity))
}

/// Delete an amenity (admin only).
#[utoipa::path(
    delete,
    path = "/api/v1/amenities/{id}",
    params(("id" = Uuid, Path, description = "Amenity id")),
    responses(
        (status = 204, description = "Amenity deleted"),
        (status = 403, description = "Admin privileges required", body = ErrorBody),
        (status = 404, description = "Amenity not found", body = ErrorBody)
    ),
    tag = "amenities"
)]
pub async fn delete_amenity<UR, PR, AR, RR>(
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
    services.amenities.delete_amenity(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
