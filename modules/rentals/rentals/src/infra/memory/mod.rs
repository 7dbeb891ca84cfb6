//! In-memory repository backend.
//!
//! DashMap-backed stores keyed by id, available as a runtime option
//! (`database.backend = "memory"`) and as the test double for
//! service-level tests. Nothing here survives a restart.

use async_trait::async_trait;
use dashmap::DashMap;
use rentals_sdk::{Amenity, Place, Review};
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::repos::{
    AmenitiesRepository, PlacesRepository, ReviewsRepository, UserRecord, UsersRepository,
};

#[derive(Default)]
pub struct InMemoryUsersRepository {
    storage: DashMap<Uuid, UserRecord>,
}

#[async_trait]
impl UsersRepository for InMemoryUsersRepository {
    async fn add(&self, user: UserRecord) -> Result<(), DomainError> {
        self.storage.insert(user.id, user);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<UserRecord>, DomainError> {
        Ok(self.storage.get(&id).map(|entry| entry.value().clone()))
    }

    async fn get_all(&self) -> Result<Vec<UserRecord>, DomainError> {
        Ok(self.storage.iter().map(|entry| entry.value().clone()).collect())
    }

    async fn update(&self, user: UserRecord) -> Result<(), DomainError> {
        self.storage.insert(user.id, user);
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        Ok(self.storage.remove(&id).is_some())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, DomainError> {
        Ok(self
            .storage
            .iter()
            .find(|entry| entry.email == email)
            .map(|entry| entry.value().clone()))
    }
}

#[derive(Default)]
pub struct InMemoryPlacesRepository {
    storage: DashMap<Uuid, Place>,
}

#[async_trait]
impl PlacesRepository for InMemoryPlacesRepository {
    async fn add(&self, place: Place) -> Result<(), DomainError> {
        self.storage.insert(place.id, place);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Place>, DomainError> {
        Ok(self.storage.get(&id).map(|entry| entry.value().clone()))
    }

    async fn get_all(&self) -> Result<Vec<Place>, DomainError> {
        Ok(self.storage.iter().map(|entry| entry.value().clone()).collect())
    }

    async fn update(&self, place: Place) -> Result<(), DomainError> {
        self.storage.insert(place.id, place);
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        Ok(self.storage.remove(&id).is_some())
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Place>, DomainError> {
        Ok(self
            .storage
            .iter()
            .filter(|entry| entry.owner_id == owner_id)
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn detach_amenity(&self, amenity_id: Uuid) -> Result<(), DomainError> {
        for mut entry in self.storage.iter_mut() {
            entry.amenity_ids.retain(|id| *id != amenity_id);
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryAmenitiesRepository {
    storage: DashMap<Uuid, Amenity>,
}

#[async_trait]
impl AmenitiesRepository for InMemoryAmenitiesRepository {
    async fn add(&self, amenity: Amenity) -> Result<(), DomainError> {
        self.storage.insert(amenity.id, amenity);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Amenity>, DomainError> {
        Ok(self.storage.get(&id).map(|entry| entry.value().clone()))
    }

    async fn get_all(&self) -> Result<Vec<Amenity>, DomainError> {
        Ok(self.storage.iter().map(|entry| entry.value().clone()).collect())
    }

    async fn update(&self, amenity: Amenity) -> Result<(), DomainError> {
        self.storage.insert(amenity.id, amenity);
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        Ok(self.storage.remove(&id).is_some())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Amenity>, DomainError> {
        Ok(self
            .storage
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.value().clone()))
    }

    async fn get_many(&self, ids: &[Uuid]) -> Result<Vec<Amenity>, DomainError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.storage.get(id).map(|entry| entry.value().clone()))
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryReviewsRepository {
    storage: DashMap<Uuid, Review>,
}

#[async_trait]
impl ReviewsRepository for InMemoryReviewsRepository {
    async fn add(&self, review: Review) -> Result<(), DomainError> {
        self.storage.insert(review.id, review);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Review>, DomainError> {
        Ok(self.storage.get(&id).map(|entry| entry.value().clone()))
    }

    async fn get_all(&self) -> Result<Vec<Review>, DomainError> {
        Ok(self.storage.iter().map(|entry| entry.value().clone()).collect())
    }

    async fn update(&self, review: Review) -> Result<(), DomainError> {
        self.storage.insert(review.id, review);
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        Ok(self.storage.remove(&id).is_some())
    }

    async fn list_by_place(&self, place_id: Uuid) -> Result<Vec<Review>, DomainError> {
        Ok(self
            .storage
            .iter()
            .filter(|entry| entry.place_id == place_id)
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn find_by_user_and_place(
        &self,
        user_id: Uuid,
        place_id: Uuid,
    ) -> Result<Option<Review>, DomainError> {
        Ok(self
            .storage
            .iter()
            .find(|entry| entry.user_id == user_id && entry.place_id == place_id)
            .map(|entry| entry.value().clone()))
    }

    async fn delete_by_place(&self, place_id: Uuid) -> Result<(), DomainError> {
        self.storage.retain(|_, review| review.place_id != place_id);
        Ok(())
    }

    async fn delete_by_user(&self, user_id: Uuid) -> Result<(), DomainError> {
        self.storage.retain(|_, review| review.user_id != user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use time::OffsetDateTime;

    fn record(email: &str) -> UserRecord {
        let now = OffsetDateTime::now_utc();
        UserRecord {
            id: Uuid::now_v7(),
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            email: email.to_owned(),
            password_hash: "hash".to_owned(),
            is_admin: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn users_crud_roundtrip() {
        let repo = InMemoryUsersRepository::default();
        let user = record("ada@example.com");
        let id = user.id;

        repo.add(user.clone()).await.unwrap();
        assert_eq!(repo.get(id).await.unwrap(), Some(user.clone()));
        assert_eq!(
            repo.find_by_email("ada@example.com").await.unwrap(),
            Some(user.clone())
        );

        let mut renamed = user;
        renamed.first_name = "Augusta".to_owned();
        repo.update(renamed.clone()).await.unwrap();
        assert_eq!(repo.get(id).await.unwrap(), Some(renamed));

        assert!(repo.delete(id).await.unwrap());
        assert!(!repo.delete(id).await.unwrap());
        assert_eq!(repo.get(id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn reviews_scoped_deletes() {
        let repo = InMemoryReviewsRepository::default();
        let place_a = Uuid::now_v7();
        let place_b = Uuid::now_v7();
        let author = Uuid::now_v7();
        let now = OffsetDateTime::now_utc();

        for place_id in [place_a, place_b] {
            repo.add(Review {
                id: Uuid::now_v7(),
                text: "ok".to_owned(),
                rating: 3,
                user_id: author,
                place_id,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
        }

        repo.delete_by_place(place_a).await.unwrap();
        assert!(repo.list_by_place(place_a).await.unwrap().is_empty());
        assert_eq!(repo.list_by_place(place_b).await.unwrap().len(), 1);

        repo.delete_by_user(author).await.unwrap();
        assert!(repo.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn detach_amenity_strips_links() {
        let repo = InMemoryPlacesRepository::default();
        let amenity = Uuid::now_v7();
        let now = OffsetDateTime::now_utc();
        let place = Place {
            id: Uuid::now_v7(),
            title: "Loft".to_owned(),
            description: None,
            price: 100.0,
            latitude: 0.0,
            longitude: 0.0,
            owner_id: Uuid::now_v7(),
            amenity_ids: vec![amenity],
            created_at: now,
            updated_at: now,
        };
        let id = place.id;

        repo.add(place).await.unwrap();
        repo.detach_amenity(amenity).await.unwrap();

        let stored = repo.get(id).await.unwrap().unwrap();
        assert!(stored.amenity_ids.is_empty());
    }
}
