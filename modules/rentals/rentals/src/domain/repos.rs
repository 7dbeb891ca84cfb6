//! Repository traits.
//!
//! Each resource gets the same generic operation set (add, get, get-all,
//! update, delete) plus the attribute lookups its service needs.
//! Implementations live in [`crate::infra`]: a DashMap-backed store and
//! a SeaORM store, selected at startup.
//!
//! Repositories are pure data access: no validation, no authorization,
//! no cross-entity rules. Those belong to the services.

use async_trait::async_trait;
use rentals_sdk::{Amenity, Place, Review, User};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::error::DomainError;

/// A stored user: the public [`User`] fields plus the password hash.
///
/// Only this layer and the auth service ever see the hash; it is stripped
/// before anything crosses the API boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserRecord {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl UserRecord {
    /// The API-facing projection, without the password hash.
    #[must_use]
    pub fn to_public(&self) -> User {
        User {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            is_admin: self.is_admin,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[async_trait]
pub trait UsersRepository: Send + Sync + 'static {
    async fn add(&self, user: UserRecord) -> Result<(), DomainError>;
    async fn get(&self, id: Uuid) -> Result<Option<UserRecord>, DomainError>;
    async fn get_all(&self) -> Result<Vec<UserRecord>, DomainError>;
    async fn update(&self, user: UserRecord) -> Result<(), DomainError>;
    /// Returns whether a row was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
    /// Lookup by exact (already lowercased) email.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, DomainError>;
}

#[async_trait]
pub trait PlacesRepository: Send + Sync + 'static {
    async fn add(&self, place: Place) -> Result<(), DomainError>;
    async fn get(&self, id: Uuid) -> Result<Option<Place>, DomainError>;
    async fn get_all(&self) -> Result<Vec<Place>, DomainError>;
    /// Full replacement of the place row and its amenity links.
    async fn update(&self, place: Place) -> Result<(), DomainError>;
    async fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Place>, DomainError>;
    /// Remove an amenity from every place referencing it.
    async fn detach_amenity(&self, amenity_id: Uuid) -> Result<(), DomainError>;
}

#[async_trait]
pub trait AmenitiesRepository: Send + Sync + 'static {
    async fn add(&self, amenity: Amenity) -> Result<(), DomainError>;
    async fn get(&self, id: Uuid) -> Result<Option<Amenity>, DomainError>;
    async fn get_all(&self) -> Result<Vec<Amenity>, DomainError>;
    async fn update(&self, amenity: Amenity) -> Result<(), DomainError>;
    async fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
    /// Lookup by exact name.
    async fn find_by_name(&self, name: &str) -> Result<Option<Amenity>, DomainError>;
    /// Fetch a batch of amenities; missing ids are simply absent from the
    /// result, in no guaranteed order.
    async fn get_many(&self, ids: &[Uuid]) -> Result<Vec<Amenity>, DomainError>;
}

#[async_trait]
pub trait ReviewsRepository: Send + Sync + 'static {
    async fn add(&self, review: Review) -> Result<(), DomainError>;
    async fn get(&self, id: Uuid) -> Result<Option<Review>, DomainError>;
    async fn get_all(&self) -> Result<Vec<Review>, DomainError>;
    async fn update(&self, review: Review) -> Result<(), DomainError>;
    async fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
    async fn list_by_place(&self, place_id: Uuid) -> Result<Vec<Review>, DomainError>;
    async fn find_by_user_and_place(
        &self,
        user_id: Uuid,
        place_id: Uuid,
    ) -> Result<Option<Review>, DomainError>;
    async fn delete_by_place(&self, place_id: Uuid) -> Result<(), DomainError>;
    async fn delete_by_user(&self, user_id: Uuid) -> Result<(), DomainError>;
}
