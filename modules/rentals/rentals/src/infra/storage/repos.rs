use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use uuid::Uuid;

use rentals_sdk::{Amenity, Place, Review};

use crate::domain::error::DomainError;
use crate::domain::repos::{
    AmenitiesRepository, PlacesRepository, ReviewsRepository, UserRecord, UsersRepository,
};
use crate::infra::storage::entity::{amenity, place, place_amenity, review, user};

// ── Row ↔ domain conversions ────────────────────────────────────────

fn user_from_row(row: user::Model) -> UserRecord {
    UserRecord {
        id: row.id,
        first_name: row.first_name,
        last_name: row.last_name,
        email: row.email,
        password_hash: row.password_hash,
        is_admin: row.is_admin,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

fn user_to_row(record: UserRecord) -> user::ActiveModel {
    user::ActiveModel {
        id: Set(record.id),
        first_name: Set(record.first_name),
        last_name: Set(record.last_name),
        email: Set(record.email),
        password_hash: Set(record.password_hash),
        is_admin: Set(record.is_admin),
        created_at: Set(record.created_at),
        updated_at: Set(record.updated_at),
    }
}

fn place_from_row(row: place::Model, amenity_ids: Vec<Uuid>) -> Place {
    Place {
        id: row.id,
        title: row.title,
        description: row.description,
        price: row.price,
        latitude: row.latitude,
        longitude: row.longitude,
        owner_id: row.owner_id,
        amenity_ids,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

fn place_to_row(place: &Place) -> place::ActiveModel {
    place::ActiveModel {
        id: Set(place.id),
        title: Set(place.title.clone()),
        description: Set(place.description.clone()),
        price: Set(place.price),
        latitude: Set(place.latitude),
        longitude: Set(place.longitude),
        owner_id: Set(place.owner_id),
        created_at: Set(place.created_at),
        updated_at: Set(place.updated_at),
    }
}

fn amenity_from_row(row: amenity::Model) -> Amenity {
    Amenity {
        id: row.id,
        name: row.name,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

fn amenity_to_row(amenity: Amenity) -> amenity::ActiveModel {
    amenity::ActiveModel {
        id: Set(amenity.id),
        name: Set(amenity.name),
        created_at: Set(amenity.created_at),
        updated_at: Set(amenity.updated_at),
    }
}

fn review_from_row(row: review::Model) -> Review {
    Review {
        id: row.id,
        text: row.text,
        rating: u8::try_from(row.rating).unwrap_or_default(),
        user_id: row.user_id,
        place_id: row.place_id,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

fn review_to_row(review: Review) -> review::ActiveModel {
    review::ActiveModel {
        id: Set(review.id),
        text: Set(review.text),
        rating: Set(i16::from(review.rating)),
        user_id: Set(review.user_id),
        place_id: Set(review.place_id),
        created_at: Set(review.created_at),
        updated_at: Set(review.updated_at),
    }
}

fn link_rows(place_id: Uuid, amenity_ids: &[Uuid]) -> Vec<place_amenity::ActiveModel> {
    amenity_ids
        .iter()
        .map(|amenity_id| place_amenity::ActiveModel {
            place_id: Set(place_id),
            amenity_id: Set(*amenity_id),
        })
        .collect()
}

// ── Users ───────────────────────────────────────────────────────────

pub struct OrmUsersRepository {
    db: DatabaseConnection,
}

impl OrmUsersRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UsersRepository for OrmUsersRepository {
    async fn add(&self, user: UserRecord) -> Result<(), DomainError> {
        user_to_row(user).insert(&self.db).await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<UserRecord>, DomainError> {
        let found = user::Entity::find_by_id(id).one(&self.db).await?;
        Ok(found.map(user_from_row))
    }

    async fn get_all(&self) -> Result<Vec<UserRecord>, DomainError> {
        let rows = user::Entity::find().all(&self.db).await?;
        Ok(rows.into_iter().map(user_from_row).collect())
    }

    async fn update(&self, user: UserRecord) -> Result<(), DomainError> {
        user_to_row(user).update(&self.db).await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let result = user::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, DomainError> {
        let found = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;
        Ok(found.map(user_from_row))
    }
}

// ── Places ──────────────────────────────────────────────────────────

pub struct OrmPlacesRepository {
    db: DatabaseConnection,
}

impl OrmPlacesRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn amenity_ids_for(&self, place_id: Uuid) -> Result<Vec<Uuid>, DomainError> {
        let links = place_amenity::Entity::find()
            .filter(place_amenity::Column::PlaceId.eq(place_id))
            .all(&self.db)
            .await?;
        Ok(links.into_iter().map(|link| link.amenity_id).collect())
    }

    /// One link query for a whole batch of places.
    async fn with_amenities(&self, rows: Vec<place::Model>) -> Result<Vec<Place>, DomainError> {
        let links = place_amenity::Entity::find().all(&self.db).await?;
        let mut by_place: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for link in links {
            by_place.entry(link.place_id).or_default().push(link.amenity_id);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let amenity_ids = by_place.remove(&row.id).unwrap_or_default();
                place_from_row(row, amenity_ids)
            })
            .collect())
    }
}

#[async_trait]
impl PlacesRepository for OrmPlacesRepository {
    async fn add(&self, place: Place) -> Result<(), DomainError> {
        let txn = self.db.begin().await?;
        place_to_row(&place).insert(&txn).await?;
        if !place.amenity_ids.is_empty() {
            place_amenity::Entity::insert_many(link_rows(place.id, &place.amenity_ids))
                .exec(&txn)
                .await?;
        }
        txn.commit().await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Place>, DomainError> {
        let Some(row) = place::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };
        let amenity_ids = self.amenity_ids_for(id).await?;
        Ok(Some(place_from_row(row, amenity_ids)))
    }

    async fn get_all(&self) -> Result<Vec<Place>, DomainError> {
        let rows = place::Entity::find().all(&self.db).await?;
        self.with_amenities(rows).await
    }

    async fn update(&self, place: Place) -> Result<(), DomainError> {
        let txn = self.db.begin().await?;
        place_to_row(&place).update(&txn).await?;
        place_amenity::Entity::delete_many()
            .filter(place_amenity::Column::PlaceId.eq(place.id))
            .exec(&txn)
            .await?;
        if !place.amenity_ids.is_empty() {
            place_amenity::Entity::insert_many(link_rows(place.id, &place.amenity_ids))
                .exec(&txn)
                .await?;
        }
        txn.commit().await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let txn = self.db.begin().await?;
        place_amenity::Entity::delete_many()
            .filter(place_amenity::Column::PlaceId.eq(id))
            .exec(&txn)
            .await?;
        let result = place::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(result.rows_affected > 0)
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Place>, DomainError> {
        let rows = place::Entity::find()
            .filter(place::Column::OwnerId.eq(owner_id))
            .all(&self.db)
            .await?;
        self.with_amenities(rows).await
    }

    async fn detach_amenity(&self, amenity_id: Uuid) -> Result<(), DomainError> {
        place_amenity::Entity::delete_many()
            .filter(place_amenity::Column::AmenityId.eq(amenity_id))
            .exec(&self.db)
            .await?;
        Ok(())
    }
}

// ── Amenities ───────────────────────────────────────────────────────

pub struct OrmAmenitiesRepository {
    db: DatabaseConnection,
}

impl OrmAmenitiesRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AmenitiesRepository for OrmAmenitiesRepository {
    async fn add(&self, amenity: Amenity) -> Result<(), DomainError> {
        amenity_to_row(amenity).insert(&self.db).await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Amenity>, DomainError> {
        let found = amenity::Entity::find_by_id(id).one(&self.db).await?;
        Ok(found.map(amenity_from_row))
    }

    async fn get_all(&self) -> Result<Vec<Amenity>, DomainError> {
        let rows = amenity::Entity::find().all(&self.db).await?;
        Ok(rows.into_iter().map(amenity_from_row).collect())
    }

    async fn update(&self, amenity: Amenity) -> Result<(), DomainError> {
        amenity_to_row(amenity).update(&self.db).await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let result = amenity::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Amenity>, DomainError> {
        let found = amenity::Entity::find()
            .filter(amenity::Column::Name.eq(name))
            .one(&self.db)
            .await?;
        Ok(found.map(amenity_from_row))
    }

    async fn get_many(&self, ids: &[Uuid]) -> Result<Vec<Amenity>, DomainError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = amenity::Entity::find()
            .filter(amenity::Column::Id.is_in(ids.to_vec()))
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(amenity_from_row).collect())
    }
}

// ── Reviews ─────────────────────────────────────────────────────────

pub struct OrmReviewsRepository {
    db: DatabaseConnection,
}

impl OrmReviewsRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ReviewsRepository for OrmReviewsRepository {
    async fn add(&self, review: Review) -> Result<(), DomainError> {
        review_to_row(review).insert(&self.db).await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Review>, DomainError> {
        let found = review::Entity::find_by_id(id).one(&self.db).await?;
        Ok(found.map(review_from_row))
    }

    async fn get_all(&self) -> Result<Vec<Review>, DomainError> {
        let rows = review::Entity::find().all(&self.db).await?;
        Ok(rows.into_iter().map(review_from_row).collect())
    }

    async fn update(&self, review: Review) -> Result<(), DomainError> {
        review_to_row(review).update(&self.db).await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let result = review::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    async fn list_by_place(&self, place_id: Uuid) -> Result<Vec<Review>, DomainError> {
        let rows = review::Entity::find()
            .filter(review::Column::PlaceId.eq(place_id))
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(review_from_row).collect())
    }

    async fn find_by_user_and_place(
        &self,
        user_id: Uuid,
        place_id: Uuid,
    ) -> Result<Option<Review>, DomainError> {
        let found = review::Entity::find()
            .filter(review::Column::UserId.eq(user_id))
            .filter(review::Column::PlaceId.eq(place_id))
            .one(&self.db)
            .await?;
        Ok(found.map(review_from_row))
    }

    async fn delete_by_place(&self, place_id: Uuid) -> Result<(), DomainError> {
        review::Entity::delete_many()
            .filter(review::Column::PlaceId.eq(place_id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn delete_by_user(&self, user_id: Uuid) -> Result<(), DomainError> {
        review::Entity::delete_many()
            .filter(review::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::test_support::{inmem_db, user_record};

    #[tokio::test]
    async fn users_roundtrip_through_sqlite() {
        let db = inmem_db().await;
        let repo = OrmUsersRepository::new(db);
        let record = user_record("ada@example.com", false);
        let id = record.id;

        repo.add(record.clone()).await.unwrap();
        assert_eq!(repo.get(id).await.unwrap(), Some(record.clone()));
        assert_eq!(
            repo.find_by_email("ada@example.com").await.unwrap(),
            Some(record)
        );

        assert!(repo.delete(id).await.unwrap());
        assert!(!repo.delete(id).await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_email_violates_unique_index() {
        let db = inmem_db().await;
        let repo = OrmUsersRepository::new(db);

        repo.add(user_record("ada@example.com", false)).await.unwrap();
        let err = repo.add(user_record("ada@example.com", false)).await;
        assert!(matches!(err, Err(DomainError::Storage(_))));
    }

    #[tokio::test]
    async fn place_amenity_links_roundtrip() {
        let db = inmem_db().await;
        let users = OrmUsersRepository::new(db.clone());
        let amenities = OrmAmenitiesRepository::new(db.clone());
        let places = OrmPlacesRepository::new(db);

        let owner = user_record("ada@example.com", false);
        users.add(owner.clone()).await.unwrap();

        let now = time::OffsetDateTime::now_utc();
        let wifi = Amenity {
            id: Uuid::now_v7(),
            name: "Wifi".to_owned(),
            created_at: now,
            updated_at: now,
        };
        amenities.add(wifi.clone()).await.unwrap();

        let mut place = Place {
            id: Uuid::now_v7(),
            title: "Loft".to_owned(),
            description: Some("Cosy".to_owned()),
            price: 120.0,
            latitude: 48.85,
            longitude: 2.35,
            owner_id: owner.id,
            amenity_ids: vec![wifi.id],
            created_at: now,
            updated_at: now,
        };
        places.add(place.clone()).await.unwrap();

        let stored = places.get(place.id).await.unwrap().unwrap();
        assert_eq!(stored.amenity_ids, vec![wifi.id]);

        // Replacing the link set on update.
        place.amenity_ids.clear();
        places.update(place.clone()).await.unwrap();
        let stored = places.get(place.id).await.unwrap().unwrap();
        assert!(stored.amenity_ids.is_empty());

        assert!(places.delete(place.id).await.unwrap());
        assert_eq!(places.get(place.id).await.unwrap(), None);
    }
}
