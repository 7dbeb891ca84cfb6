//! Review endpoints. Reads are public; the author is always the
//! authenticated subject, mutations are author-or-admin.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use uuid::Uuid;

use rentals_sdk::{NewReview, Review, ReviewPatch};

use super::SharedServices;
use super::error::{ApiError, ErrorBody};
use crate::domain::repos::{
    AmenitiesRepository, PlacesRepository, ReviewsRepository, UsersRepository,
};
use crate::security::SecurityContext;

/// Create a review authored by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/reviews",
    request_body = NewReview,
    responses(
        (status = 201, description = "Review created", body = Review),
        (status = 400, description = "Invalid input data", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    ),
    tag = "reviews"
)]
pub async fn create_review<UR, PR, AR, RR>(
    State(services): State<SharedServices<UR, PR, AR, RR>>,
    Extension(ctx): Extension<SecurityContext>,
    Json(body): Json<NewReview>,
) -> Result<(StatusCode, Json<Review>), ApiError>
where
    UR: UsersRepository,
    PR: PlacesRepository,
    AR: AmenitiesRepository,
    RR: ReviewsRepository,
{
    let review = services.reviews.create_review(&ctx, body).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// List all reviews (public).
#[utoipa::path(
    get,
    path = "/api/v1/reviews",
    responses((status = 200, description = "All reviews", body = [Review])),
    tag = "reviews"
)]
pub async fn list_reviews<UR, PR, AR, RR>(
    State(services): State<SharedServices<UR, PR, AR, RR>>,
) -> Result<Json<Vec<Review>>, ApiError>
where
    UR: UsersRepository,
    PR: PlacesRepository,
    AR: AmenitiesRepository,
    RR: ReviewsRepository,
{
    let reviews = services.reviews.list_reviews().await?;
    Ok(Json(reviews))
}

/// List the reviews of one place (public).
#[utoipa::path(
    get,
    path = "/api/v1/places/{id}/reviews",
    params(("id" = Uuid, Path, description = "Place id")),
    responses(
        (status = 200, description = "Reviews of the place", body = [Review]),
        (status = 404, description = "Place not found", body = ErrorBody)
    ),
    tag = "reviews"
)]
pub async fn list_place_reviews<UR, PR, AR, RR>(
    State(services): State<SharedServices<UR, PR, AR, RR>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Review>>, ApiError>
where
    UR: UsersRepository,
    PR: PlacesRepository,
    AR: AmenitiesRepository,
    RR: ReviewsRepository,
{
    let reviews = services.reviews.list_reviews_by_place(id).await?;
    Ok(Json(reviews))
}

/// Fetch one review (public).
#[utoipa::path(
    get,
    path = "/api/v1/reviews/{id}",
    params(("id" = Uuid, Path, description = "Review id")),
    responses(
        (status = 200, description = "The review", body = Review),
        (status = 404, description = "Review not found", body = ErrorBody)
    ),
    tag = "reviews"
)]
pub async fn get_review<UR, PR, AR, RR>(
    State(services): State<SharedServices<UR, PR, AR, RR>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Review>, ApiError>
where
    UR: UsersRepository,
    PR: PlacesRepository,
    AR: AmenitiesRepository,
    RR: ReviewsRepository,
{
    let review = services.reviews.get_review(id).await?;
    Ok(Json(review))
}

/// Update a review's text or rating (author or admin).
#[utoipa::path(
    put,
    path = "/api/v1/reviews/{id}",
    params(("id" = Uuid, Path, description = "Review id")),
    request_body = ReviewPatch,
    responses(
        (status = 200, description = "Updated review", body = Review),
        (status = 400, description = "Invalid input data", body = ErrorBody),
        (status = 403, description = "Unauthorized action", body = ErrorBody),
        (status = 404, description = "Review not found", body = ErrorBody)
    ),
    tag = "reviews"
)]
pub async fn update_review<UR, PR, AR, RR>(
    State(services): State<SharedServices<UR, PR, AR, RR>>,
    Extension(ctx): Extension<SecurityContext>,
    Path(id): Path<Uuid>,
    Json(patch): Json<ReviewPatch>,
) -> Result<Json<Review>, ApiError>
where
    UR: UsersRepository,
    PR: PlacesRepository,
    AR: AmenitiesRepository,
    RR: ReviewsRepository,
{
    let review = services.reviews.update_review(&ctx, id, patch).await?;
    Ok(Json(review))
}

/// Delete a review (author or admin).
#[utoipa::path(
    delete,
    path = "/api/v1/reviews/{id}",
    params(("id" = Uuid, Path, description = "Review id")),
    responses(
        (status = 204, description = "Review deleted"),
        (status = 403, description = "Unauthorized action", body = ErrorBody),
        (status = 404, description = "Review not found", body = ErrorBody)
    ),
    tag = "reviews"
)]
pub async fn delete_review<UR, PR, AR, RR>(
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
    services.reviews.delete_review(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
