#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Helpers shared by unit and blackbox tests.

use std::sync::Arc;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use secrecy::SecretString;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use rentals_sdk::{NewPlace, NewUser, User};

use crate::auth::{PasswordHasher, TokenService};
use crate::domain::repos::{
    AmenitiesRepository, PlacesRepository, ReviewsRepository, UserRecord, UsersRepository,
};
use crate::domain::service::{AppServices, ServiceConfig};
use crate::infra::memory::{
    InMemoryAmenitiesRepository, InMemoryPlacesRepository, InMemoryReviewsRepository,
    InMemoryUsersRepository,
};
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::{
    OrmAmenitiesRepository, OrmPlacesRepository, OrmReviewsRepository, OrmUsersRepository,
};
use crate::security::SecurityContext;

pub type MemoryAppServices = AppServices<
    InMemoryUsersRepository,
    InMemoryPlacesRepository,
    InMemoryAmenitiesRepository,
    InMemoryReviewsRepository,
>;

pub type OrmAppServices =
    AppServices<OrmUsersRepository, OrmPlacesRepository, OrmAmenitiesRepository, OrmReviewsRepository>;

/// The password every seeded test account uses.
pub const TEST_PASSWORD: &str = "password123";

/// Token service with a fixed secret; every instance verifies tokens of
/// every other, so helpers and routers need not share one.
#[must_use]
pub fn test_token_service() -> Arc<TokenService> {
    Arc::new(TokenService::new(
        &SecretString::from("unit-test-jwt-secret"),
        Duration::hours(1),
    ))
}

/// Create an in-memory sqlite database with the schema applied.
///
/// A single pooled connection, otherwise each checkout would see its own
/// empty `:memory:` database.
pub async fn inmem_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1);

    let db = Database::connect(options)
        .await
        .expect("Failed to connect to in-memory database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

/// Services over the in-memory backend.
#[must_use]
pub fn memory_services() -> MemoryAppServices {
    AppServices::new(
        InMemoryUsersRepository::default(),
        InMemoryPlacesRepository::default(),
        InMemoryAmenitiesRepository::default(),
        InMemoryReviewsRepository::default(),
        PasswordHasher::fast_for_tests(),
        test_token_service(),
        ServiceConfig::default(),
    )
}

/// Services over a SeaORM connection (see [`inmem_db`]).
#[must_use]
pub fn orm_services(db: &DatabaseConnection) -> OrmAppServices {
    AppServices::new(
        OrmUsersRepository::new(db.clone()),
        OrmPlacesRepository::new(db.clone()),
        OrmAmenitiesRepository::new(db.clone()),
        OrmReviewsRepository::new(db.clone()),
        PasswordHasher::fast_for_tests(),
        test_token_service(),
        ServiceConfig::default(),
    )
}

#[must_use]
pub fn admin_ctx() -> SecurityContext {
    SecurityContext::admin(Uuid::new_v4())
}

/// A stored user row with [`TEST_PASSWORD`] hashed at minimum cost.
///
/// Timestamps are truncated to whole seconds so records survive a
/// database round-trip bit-identically.
#[must_use]
pub fn user_record(email: &str, is_admin: bool) -> UserRecord {
    let now = OffsetDateTime::from_unix_timestamp(OffsetDateTime::now_utc().unix_timestamp())
        .expect("valid timestamp");
    let password_hash = PasswordHasher::fast_for_tests()
        .hash(TEST_PASSWORD)
        .expect("hashing cannot fail");

    UserRecord {
        id: Uuid::now_v7(),
        first_name: "Test".to_owned(),
        last_name: "User".to_owned(),
        email: email.to_owned(),
        password_hash,
        is_admin,
        created_at: now,
        updated_at: now,
    }
}

/// Create a user through the service layer and return its public view.
pub async fn seed_user<UR, PR, AR, RR>(
    services: &AppServices<UR, PR, AR, RR>,
    email: &str,
    is_admin: bool,
) -> User
where
    UR: UsersRepository,
    PR: PlacesRepository,
    AR: AmenitiesRepository,
    RR: ReviewsRepository,
{
    let mut payload = new_user_payload(email);
    payload.is_admin = is_admin;
    services
        .users
        .create_user(&admin_ctx(), payload)
        .await
        .expect("seeding user")
}

#[must_use]
pub fn new_user_payload(email: &str) -> NewUser {
    NewUser {
        first_name: "Test".to_owned(),
        last_name: "User".to_owned(),
        email: email.to_owned(),
        password: TEST_PASSWORD.to_owned(),
        is_admin: false,
    }
}

#[must_use]
pub fn new_place_payload() -> NewPlace {
    NewPlace {
        title: "Sea view loft".to_owned(),
        description: Some("Two rooms over the harbour".to_owned()),
        price: 120.0,
        latitude: 48.85,
        longitude: 2.35,
        owner_id: None,
        amenity_ids: Vec::new(),
    }
}
