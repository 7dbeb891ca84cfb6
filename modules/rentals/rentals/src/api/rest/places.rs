//! Place endpoints. Reads are public and resolve owner and amenities;
//! mutations are owner-or-admin.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use uuid::Uuid;

use rentals_sdk::{NewPlace, Place, PlaceDetails, PlacePatch};

use super::SharedServices;
use super::error::{ApiError, ErrorBody};
use crate::domain::repos::{
    AmenitiesRepository, PlacesRepository, ReviewsRepository, UsersRepository,
};
use crate::security::SecurityContext;

/// Create a new place owned by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/places",
    request_body = NewPlace,
    responses(
        (status = 201, description = "Place created", body = Place),
        (status = 400, description = "Invalid input data", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    ),
    tag = "places"
)]
pub async fn create_place<UR, PR, AR, RR>(
    State(services): State<SharedServices<UR, PR, AR, RR>>,
    Extension(ctx): Extension<SecurityContext>,
    Json(body): Json<NewPlace>,
) -> Result<(StatusCode, Json<Place>), ApiError>
where
    UR: UsersRepository,
    PR: PlacesRepository,
    AR: AmenitiesRepository,
    RR: ReviewsRepository,
{
    let place = services.places.create_place(&ctx, body).await?;
    Ok((StatusCode::CREATED, Json(place)))
}

/// List all places with owner and amenities resolved (public).
#[utoipa::path(
    get,
    path = "/api/v1/places",
    responses((status = 200, description = "All places", body = [PlaceDetails])),
    tag = "places"
)]
pub async fn list_places<UR, PR, AR, RR>(
    State(services): State<SharedServices<UR, PR, AR, RR>>,
) -> Result<Json<Vec<PlaceDetails>>, ApiError>
where
    UR: UsersRepository,
    PR: PlacesRepository,
    AR: AmenitiesRepository,
    RR: ReviewsRepository,
{
    let places = services.places.list_places().await?;
    Ok(Json(places))
}

/// Fetch one place with owner and amenities resolved (public).
#[utoipa::path(
    get,
    path = "/api/v1/places/{id}",
    params(("id" = Uuid, Path, description = "Place id")),
    responses(
        (status = 200, description = "The place", body = PlaceDetails),
        (status = 404, description = "Place not found", body = ErrorBody)
    ),
    tag = "places"
)]
pub async fn get_place<UR, PR, AR, RR>(
    State(services): State<SharedServices<UR, PR, AR, RR>>,
    Path(id): Path<Uuid>,
) -> Result<Json<PlaceDetails>, ApiError>
where
    UR: UsersRepository,
    PR: PlacesRepository,
    AR: AmenitiesRepository,
    RR: ReviewsRepository,
{
    let place = services.places.get_place(id).await?;
    Ok(Json(place))
}

/// Update a place (owner or admin).
#[utoipa::path(
    put,
    path = "/api/v1/places/{id}",
    params(("id" = Uuid, Path, description = "Place id")),
    request_body = PlacePatch,
    responses(
        (status = 200, description = "Updated place", body = Place),
        (status = 400, description = "Invalid input data", body = ErrorBody),
        (status = 403, description = "Unauthorized action", body = ErrorBody),
        (status = 404, description = "Place not found", body = ErrorBody)
    ),
    tag = "places"
)]
pub async fn update_place<UR, PR, AR, RR>(
    State(services): State<SharedServices<UR, PR, AR, RR>>,
    Extension(ctx): Extension<SecurityContext>,
    Path(id): Path<Uuid>,
    Json(patch): Json<PlacePatch>,
) -> Result<Json<Place>, ApiError>
where
    UR: UsersRepository,
    PR: PlacesRepository,
    AR: AmenitiesRepository,
    RR: ReviewsRepository,
{
    let place = services.places.update_place(&ctx, id, patch).await?;
    Ok(Json(place))
}

/// Delete a place and its reviews (owner or admin).
#[utoipa::path(
    delete,
    path = "/api/v1/places/{id}",
    params(("id" = Uuid, Path, description = "Place id")),
    responses(
        (status = 204, description = "Place deleted"),
        (status = 403, description = "Unauthorized action", body = ErrorBody),
        (status = 404, description = "Place not found", body = ErrorBody)
    ),
    tag = "places"
)]
pub async fn delete_place<UR, PR, AR, RR>(
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
    services.places.delete_place(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
