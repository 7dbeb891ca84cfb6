//! REST surface: router assembly, route policy, OpenAPI document.
//!
//! The router is generic over the repository implementations behind
//! [`AppServices`], so the same wiring serves the in-memory and the
//! SeaORM backend.

use std::sync::Arc;

use axum::http::Method;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

pub mod amenities;
pub mod auth;
pub mod error;
pub mod middleware;
pub mod places;
pub mod reviews;
pub mod users;

use crate::auth::TokenService;
use crate::domain::repos::{
    AmenitiesRepository, PlacesRepository, ReviewsRepository, UsersRepository,
};
use crate::domain::service::AppServices;
use error::ErrorBody;
use middleware::{AuthState, RoutePolicy, authn_middleware};

/// Shared handler state.
pub type SharedServices<UR, PR, AR, RR> = Arc<AppServices<UR, PR, AR, RR>>;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HBnB API",
        description = "Property-rental API: users, places, amenities, reviews."
    ),
    paths(
        auth::login,
        auth::protected,
        users::create_user,
        users::list_users,
        users::get_user,
        users::update_user,
        users::delete_user,
        amenities::create_amenity,
        amenities::list_amenities,
        amenities::get_amenity,
        amenities::update_amenity,
        amenities::delete_amenity,
        places::create_place,
        places::list_places,
        places::get_place,
        places::update_place,
        places::delete_place,
        reviews::create_review,
        reviews::list_reviews,
        reviews::list_place_reviews,
        reviews::get_review,
        reviews::update_review,
        reviews::delete_review,
    ),
    components(schemas(
        rentals_sdk::User,
        rentals_sdk::NewUser,
        rentals_sdk::UserPatch,
        rentals_sdk::Place,
        rentals_sdk::NewPlace,
        rentals_sdk::PlacePatch,
        rentals_sdk::PlaceDetails,
        rentals_sdk::PlaceOwner,
        rentals_sdk::Amenity,
        rentals_sdk::NewAmenity,
        rentals_sdk::AmenityPatch,
        rentals_sdk::Review,
        rentals_sdk::NewReview,
        rentals_sdk::ReviewPatch,
        rentals_sdk::LoginRequest,
        rentals_sdk::TokenResponse,
        rentals_sdk::ProtectedResponse,
        ErrorBody,
    )),
    tags(
        (name = "auth", description = "Authentication"),
        (name = "users", description = "User administration"),
        (name = "places", description = "Rental places"),
        (name = "amenities", description = "Amenities"),
        (name = "reviews", description = "Reviews"),
    )
)]
struct ApiDoc;

/// The public routes of the surface; everything else demands a bearer
/// token. Patterns use the router's `{param}` syntax.
fn default_route_policy() -> Result<RoutePolicy, matchit::InsertError> {
    RoutePolicy::builder()
        .public(Method::POST, "/api/v1/auth/login")
        .public(Method::GET, "/api/v1/places")
        .public(Method::GET, "/api/v1/places/{id}")
        .public(Method::GET, "/api/v1/places/{id}/reviews")
        .public(Method::GET, "/api/v1/amenities")
        .public(Method::GET, "/api/v1/amenities/{id}")
        .public(Method::GET, "/api/v1/reviews")
        .public(Method::GET, "/api/v1/reviews/{id}")
        .public(Method::GET, "/health")
        .public(Method::GET, "/api-docs/openapi.json")
        .build()
}

/// Build the application router.
///
/// # Panics
///
/// Panics if the built-in route policy patterns are invalid, which is a
/// programming error caught by the router tests.
pub fn router<UR, PR, AR, RR>(
    services: SharedServices<UR, PR, AR, RR>,
    tokens: Arc<TokenService>,
) -> Router
where
    UR: UsersRepository,
    PR: PlacesRepository,
    AR: AmenitiesRepository,
    RR: ReviewsRepository,
{
    #[allow(clippy::unwrap_used)]
    let policy = default_route_policy().unwrap();
    let auth_state = AuthState { tokens, policy };

    let api = Router::new()
        .route(
            "/auth/login",
            post(auth::login::<UR, PR, AR, RR>),
        )
        .route("/auth/protected", get(auth::protected))
        .route(
            "/users",
            post(users::create_user::<UR, PR, AR, RR>)
                .get(users::list_users::<UR, PR, AR, RR>),
        )
        .route(
            "/users/{id}",
            get(users::get_user::<UR, PR, AR, RR>)
                .put(users::update_user::<UR, PR, AR, RR>)
                .delete(users::delete_user::<UR, PR, AR, RR>),
        )
        .route(
            "/amenities",
            post(amenities::create_amenity::<UR, PR, AR, RR>)
                .get(amenities::list_amenities::<UR, PR, AR, RR>),
        )
        .route(
            "/amenities/{id}",
            get(amenities::get_amenity::<UR, PR, AR, RR>)
                .put(amenities::update_amenity::<UR, PR, AR, RR>)
                .delete(amenities::delete_amenity::<UR, PR, AR, RR>),
        )
        .route(
            "/places",
            post(places::create_place::<UR, PR, AR, RR>)
                .get(places::list_places::<UR, PR, AR, RR>),
        )
        .route(
            "/places/{id}",
            get(places::get_place::<UR, PR, AR, RR>)
                .put(places::update_place::<UR, PR, AR, RR>)
                .delete(places::delete_place::<UR, PR, AR, RR>),
        )
        .route(
            "/places/{id}/reviews",
            get(reviews::list_place_reviews::<UR, PR, AR, RR>),
        )
        .route(
            "/reviews",
            post(reviews::create_review::<UR, PR, AR, RR>)
                .get(reviews::list_reviews::<UR, PR, AR, RR>),
        )
        .route(
            "/reviews/{id}",
            get(reviews::get_review::<UR, PR, AR, RR>)
                .put(reviews::update_review::<UR, PR, AR, RR>)
                .delete(reviews::delete_review::<UR, PR, AR, RR>),
        );

    Router::new()
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi_document))
        .nest("/api/v1", api)
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            authn_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(services)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn openapi_document() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn default_route_policy_builds() {
        let policy = default_route_policy().unwrap();
        assert_eq!(
            policy.resolve(&Method::POST, "/api/v1/auth/login"),
            middleware::AuthRequirement::None
        );
        assert_eq!(
            policy.resolve(&Method::POST, "/api/v1/places"),
            middleware::AuthRequirement::Required
        );
    }

    #[test]
    fn openapi_document_lists_every_surface_path() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/auth/login",
            "/api/v1/users",
            "/api/v1/users/{id}",
            "/api/v1/amenities/{id}",
            "/api/v1/places/{id}",
            "/api/v1/places/{id}/reviews",
            "/api/v1/reviews/{id}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
