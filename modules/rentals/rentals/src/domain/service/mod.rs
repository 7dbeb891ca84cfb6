//! Domain service layer - business logic and rules.
//!
//! ## Architecture
//!
//! One service per resource, plus login:
//! - `users` - user CRUD, admin-gated, email uniqueness, password hashing
//! - `places` - place CRUD with owner/admin checks and amenity resolution
//! - `amenities` - amenity CRUD, admin-gated mutations
//! - `reviews` - review CRUD with author rules (no self-review, one per
//!   place, author-or-admin mutation)
//! - `auth` - credential verification and token issuance
//!
//! ## Layering Rules
//!
//! The domain layer:
//! - **MAY** import: `rentals_sdk` (contract types), repository traits
//! - **MUST NOT** import: `api::*` (one-way dependency: API → Domain)
//! - **Uses**: SDK contract types (`User`, `Place`, ...) as primary
//!   domain models; users additionally carry a stored-hash record type
//!
//! ## Security
//!
//! Every operation takes a [`SecurityContext`](crate::security::SecurityContext)
//! resolved by the API middleware and applies the resource's rule itself
//! (admin gate, owner gate, author gate). Repositories never see the
//! context; they are handed fully-decided operations only.

use std::sync::Arc;

use crate::auth::{PasswordHasher, TokenService};
use crate::domain::repos::{
    AmenitiesRepository, PlacesRepository, ReviewsRepository, UsersRepository,
};

mod amenities;
mod auth;
mod places;
mod reviews;
mod users;

pub use amenities::AmenitiesService;
pub use auth::AuthService;
pub use places::PlacesService;
pub use reviews::ReviewsService;
pub use users::UsersService;

/// Validation limits for the domain services.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub max_name_length: usize,
    pub max_title_length: usize,
    pub max_description_length: usize,
    pub max_review_length: usize,
    pub max_amenity_name_length: usize,
    pub min_password_length: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_name_length: 50,
            max_title_length: 100,
            max_description_length: 500,
            max_review_length: 500,
            max_amenity_name_length: 50,
            min_password_length: 6,
        }
    }
}

// DI container - aggregates all domain services.
//
// Generic over the repository implementations so the same wiring serves
// both the in-memory and the SeaORM backend.
pub struct AppServices<UR, PR, AR, RR>
where
    UR: UsersRepository,
    PR: PlacesRepository,
    AR: AmenitiesRepository,
    RR: ReviewsRepository,
{
    pub users: UsersService<UR, PR, RR>,
    pub places: PlacesService<PR, UR, AR, RR>,
    pub amenities: AmenitiesService<AR, PR>,
    pub reviews: ReviewsService<RR, UR, PR>,
    pub auth: AuthService<UR>,
}

impl<UR, PR, AR, RR> AppServices<UR, PR, AR, RR>
where
    UR: UsersRepository,
    PR: PlacesRepository,
    AR: AmenitiesRepository,
    RR: ReviewsRepository,
{
    pub fn new(
        users_repo: UR,
        places_repo: PR,
        amenities_repo: AR,
        reviews_repo: RR,
        hasher: PasswordHasher,
        tokens: Arc<TokenService>,
        config: ServiceConfig,
    ) -> Self {
        let users_repo = Arc::new(users_repo);
        let places_repo = Arc::new(places_repo);
        let amenities_repo = Arc::new(amenities_repo);
        let reviews_repo = Arc::new(reviews_repo);

        Self {
            users: UsersService::new(
                Arc::clone(&users_repo),
                Arc::clone(&places_repo),
                Arc::clone(&reviews_repo),
                hasher,
                config.clone(),
            ),
            places: PlacesService::new(
                Arc::clone(&places_repo),
                Arc::clone(&users_repo),
                Arc::clone(&amenities_repo),
                Arc::clone(&reviews_repo),
                config.clone(),
            ),
            amenities: AmenitiesService::new(
                Arc::clone(&amenities_repo),
                Arc::clone(&places_repo),
                config.clone(),
            ),
            reviews: ReviewsService::new(
                Arc::clone(&reviews_repo),
                Arc::clone(&users_repo),
                Arc::clone(&places_repo),
                config,
            ),
            auth: AuthService::new(users_repo, hasher, tokens),
        }
    }
}
