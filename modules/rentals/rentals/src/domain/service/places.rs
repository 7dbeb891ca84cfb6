use std::sync::Arc;

use tracing::instrument;

use rentals_sdk::{NewPlace, Place, PlaceDetails, PlaceOwner, PlacePatch};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::repos::{
    AmenitiesRepository, PlacesRepository, ReviewsRepository, UserRecord, UsersRepository,
};
use crate::domain::service::ServiceConfig;
use crate::security::SecurityContext;

/// Places service.
///
/// Creation is open to any authenticated user; non-admins always become
/// the owner of what they create. Mutations are owner-or-admin. Reads
/// are public and resolve the owner summary and amenity objects.
pub struct PlacesService<PR, UR, AR, RR>
where
    PR: PlacesRepository,
    UR: UsersRepository,
    AR: AmenitiesRepository,
    RR: ReviewsRepository,
{
    repo: Arc<PR>,
    users: Arc<UR>,
    amenities: Arc<AR>,
    reviews: Arc<RR>,
    config: ServiceConfig,
}

impl<PR, UR, AR, RR> PlacesService<PR, UR, AR, RR>
where
    PR: PlacesRepository,
    UR: UsersRepository,
    AR: AmenitiesRepository,
    RR: ReviewsRepository,
{
    pub fn new(
        repo: Arc<PR>,
        users: Arc<UR>,
        amenities: Arc<AR>,
        reviews: Arc<RR>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            repo,
            users,
            amenities,
            reviews,
            config,
        }
    }
}

// Business logic methods
impl<PR, UR, AR, RR> PlacesService<PR, UR, AR, RR>
where
    PR: PlacesRepository,
    UR: UsersRepository,
    AR: AmenitiesRepository,
    RR: ReviewsRepository,
{
    /// Create a new place owned by the caller (admins may name another
    /// existing user as owner).
    #[instrument(skip(self, ctx, new_place), fields(title = %new_place.title))]
    pub async fn create_place(
        &self,
        ctx: &SecurityContext,
        new_place: NewPlace,
    ) -> Result<Place, DomainError> {
        let subject = ctx.subject_id().ok_or_else(DomainError::missing_token)?;

        tracing::info!("Creating new place");

        let owner_id = if ctx.is_admin() {
            new_place.owner_id.unwrap_or(subject)
        } else {
            subject
        };

        self.validate_title(&new_place.title)?;
        self.validate_description(new_place.description.as_deref())?;
        validate_price(new_place.price)?;
        validate_coordinates(new_place.latitude, new_place.longitude)?;

        if self.users.get(owner_id).await?.is_none() {
            return Err(DomainError::validation("owner_id", "Owner not found"));
        }

        let amenity_ids = self.resolve_amenity_ids(new_place.amenity_ids).await?;

        let now = OffsetDateTime::now_utc();
        let place = Place {
            id: Uuid::now_v7(),
            title: new_place.title,
            description: new_place.description,
            price: new_place.price,
            latitude: new_place.latitude,
            longitude: new_place.longitude,
            owner_id,
            amenity_ids,
            created_at: now,
            updated_at: now,
        };

        self.repo.add(place.clone()).await?;

        tracing::info!("Successfully created place with id={}", place.id);
        Ok(place)
    }

    /// List all places with owner and amenities resolved (public).
    #[instrument(skip(self))]
    pub async fn list_places(&self) -> Result<Vec<PlaceDetails>, DomainError> {
        tracing::debug!("Listing places");

        let places = self.repo.get_all().await?;
        let mut result = Vec::with_capacity(places.len());
        for place in places {
            if let Some(details) = self.resolve_details(place).await? {
                result.push(details);
            }
        }
        Ok(result)
    }

    /// Fetch one place with owner and amenities resolved (public).
    #[instrument(skip(self), fields(place_id = %id))]
    pub async fn get_place(&self, id: Uuid) -> Result<PlaceDetails, DomainError> {
        tracing::debug!("Getting place by id");

        let found = self.repo.get(id).await?;
        let place = found.ok_or_else(|| DomainError::not_found("Place", id))?;

        self.resolve_details(place)
            .await?
            .ok_or_else(|| DomainError::not_found("Place", id))
    }

    /// Update an existing place (owner or admin).
    #[instrument(skip(self, ctx, patch), fields(place_id = %id))]
    pub async fn update_place(
        &self,
        ctx: &SecurityContext,
        id: Uuid,
        patch: PlacePatch,
    ) -> Result<Place, DomainError> {
        tracing::info!("Updating place");

        let found = self.repo.get(id).await?;
        let mut current = found.ok_or_else(|| DomainError::not_found("Place", id))?;

        if !ctx.can_act_as(current.owner_id) {
            return Err(DomainError::unauthorized_action());
        }

        if let Some(title) = patch.title {
            self.validate_title(&title)?;
            current.title = title;
        }
        if let Some(description) = patch.description {
            self.validate_description(Some(&description))?;
            current.description = Some(description);
        }
        if let Some(price) = patch.price {
            validate_price(price)?;
            current.price = price;
        }
        let latitude = patch.latitude.unwrap_or(current.latitude);
        let longitude = patch.longitude.unwrap_or(current.longitude);
        validate_coordinates(latitude, longitude)?;
        current.latitude = latitude;
        current.longitude = longitude;

        if let Some(amenity_ids) = patch.amenity_ids {
            current.amenity_ids = self.resolve_amenity_ids(amenity_ids).await?;
        }
        current.updated_at = OffsetDateTime::now_utc();

        self.repo.update(current.clone()).await?;

        tracing::info!("Successfully updated place");
        Ok(current)
    }

    /// Delete a place and its reviews (owner or admin).
    #[instrument(skip(self, ctx), fields(place_id = %id))]
    pub async fn delete_place(&self, ctx: &SecurityContext, id: Uuid) -> Result<(), DomainError> {
        tracing::info!("Deleting place");

        let found = self.repo.get(id).await?;
        let place = found.ok_or_else(|| DomainError::not_found("Place", id))?;

        if !ctx.can_act_as(place.owner_id) {
            return Err(DomainError::unauthorized_action());
        }

        self.reviews.delete_by_place(id).await?;
        let _ = self.repo.delete(id).await?;

        tracing::info!("Successfully deleted place");
        Ok(())
    }

    async fn resolve_details(&self, place: Place) -> Result<Option<PlaceDetails>, DomainError> {
        let Some(owner) = self.users.get(place.owner_id).await? else {
            tracing::warn!(
                place_id = %place.id,
                owner_id = %place.owner_id,
                "place owner missing, skipping"
            );
            return Ok(None);
        };

        let mut amenities = self.amenities.get_many(&place.amenity_ids).await?;
        amenities.sort_by_key(|amenity| {
            place
                .amenity_ids
                .iter()
                .position(|id| *id == amenity.id)
                .unwrap_or(usize::MAX)
        });

        Ok(Some(PlaceDetails {
            id: place.id,
            title: place.title,
            description: place.description,
            price: place.price,
            latitude: place.latitude,
            longitude: place.longitude,
            owner: owner_summary(&owner),
            amenities,
            created_at: place.created_at,
            updated_at: place.updated_at,
        }))
    }

    /// Deduplicate and existence-check amenity references.
    async fn resolve_amenity_ids(&self, ids: Vec<Uuid>) -> Result<Vec<Uuid>, DomainError> {
        let mut unique: Vec<Uuid> = Vec::with_capacity(ids.len());
        for id in ids {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }

        let found = self.amenities.get_many(&unique).await?;
        if found.len() != unique.len() {
            let missing = unique
                .iter()
                .find(|id| !found.iter().any(|amenity| amenity.id == **id));
            if let Some(id) = missing {
                return Err(DomainError::validation(
                    "amenity_ids",
                    format!("Amenity {id} not found"),
                ));
            }
        }
        Ok(unique)
    }

    fn validate_title(&self, title: &str) -> Result<(), DomainError> {
        if title.trim().is_empty() {
            return Err(DomainError::validation("title", "Title is required"));
        }
        if title.len() > self.config.max_title_length {
            return Err(DomainError::validation(
                "title",
                format!(
                    "Title must be at most {} characters",
                    self.config.max_title_length
                ),
            ));
        }
        Ok(())
    }

    fn validate_description(&self, description: Option<&str>) -> Result<(), DomainError> {
        if let Some(description) = description {
            if description.len() > self.config.max_description_length {
                return Err(DomainError::validation(
                    "description",
                    format!(
                        "Description must be at most {} characters",
                        self.config.max_description_length
                    ),
                ));
            }
        }
        Ok(())
    }
}

fn owner_summary(owner: &UserRecord) -> PlaceOwner {
    PlaceOwner {
        id: owner.id,
        first_name: owner.first_name.clone(),
        last_name: owner.last_name.clone(),
        email: owner.email.clone(),
    }
}

fn validate_price(price: f64) -> Result<(), DomainError> {
    if !price.is_finite() || price <= 0.0 {
        return Err(DomainError::validation("price", "Price must be positive"));
    }
    Ok(())
}

fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), DomainError> {
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(DomainError::validation("latitude", "Invalid latitude"));
    }
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(DomainError::validation("longitude", "Invalid longitude"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::test_support::{admin_ctx, memory_services, new_place_payload, seed_user};

    #[tokio::test]
    async fn non_admin_always_owns_what_it_creates() {
        let services = memory_services();
        let ada = seed_user(&services, "ada@example.com", false).await;
        let grace = seed_user(&services, "grace@example.com", false).await;

        let mut payload = new_place_payload();
        payload.owner_id = Some(grace.id);

        let place = services
            .places
            .create_place(&SecurityContext::user(ada.id), payload)
            .await
            .unwrap();

        assert_eq!(place.owner_id, ada.id);
    }

    #[tokio::test]
    async fn admin_may_create_for_another_owner() {
        let services = memory_services();
        let ada = seed_user(&services, "ada@example.com", false).await;
        let root = seed_user(&services, "root@example.com", true).await;

        let mut payload = new_place_payload();
        payload.owner_id = Some(ada.id);

        let place = services
            .places
            .create_place(&SecurityContext::admin(root.id), payload)
            .await
            .unwrap();

        assert_eq!(place.owner_id, ada.id);
    }

    #[tokio::test]
    async fn unknown_owner_is_rejected() {
        let services = memory_services();
        let root = seed_user(&services, "root@example.com", true).await;

        let mut payload = new_place_payload();
        payload.owner_id = Some(Uuid::new_v4());

        let err = services
            .places
            .create_place(&SecurityContext::admin(root.id), payload)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation {
                field: "owner_id",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn price_and_coordinates_are_validated() {
        let services = memory_services();
        let ada = seed_user(&services, "ada@example.com", false).await;
        let ctx = SecurityContext::user(ada.id);

        let mut payload = new_place_payload();
        payload.price = 0.0;
        let err = services.places.create_place(&ctx, payload).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation { field: "price", .. }
        ));

        let mut payload = new_place_payload();
        payload.latitude = 91.0;
        let err = services.places.create_place(&ctx, payload).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation {
                field: "latitude",
                ..
            }
        ));

        let mut payload = new_place_payload();
        payload.longitude = -180.5;
        let err = services.places.create_place(&ctx, payload).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation {
                field: "longitude",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn unknown_amenity_reference_is_rejected() {
        let services = memory_services();
        let ada = seed_user(&services, "ada@example.com", false).await;

        let mut payload = new_place_payload();
        payload.amenity_ids = vec![Uuid::new_v4()];

        let err = services
            .places
            .create_place(&SecurityContext::user(ada.id), payload)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation {
                field: "amenity_ids",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn only_owner_or_admin_may_update() {
        let services = memory_services();
        let ada = seed_user(&services, "ada@example.com", false).await;
        let grace = seed_user(&services, "grace@example.com", false).await;

        let place = services
            .places
            .create_place(&SecurityContext::user(ada.id), new_place_payload())
            .await
            .unwrap();

        let patch = PlacePatch {
            title: Some("Updated".to_owned()),
            ..PlacePatch::default()
        };

        let err = services
            .places
            .update_place(&SecurityContext::user(grace.id), place.id, patch.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden { .. }));

        let updated = services
            .places
            .update_place(&admin_ctx(), place.id, patch)
            .await
            .unwrap();
        assert_eq!(updated.title, "Updated");
    }

    #[tokio::test]
    async fn details_resolve_owner_and_amenities() {
        let services = memory_services();
        let ada = seed_user(&services, "ada@example.com", false).await;
        let wifi = services
            .amenities
            .create_amenity(
                &admin_ctx(),
                rentals_sdk::NewAmenity {
                    name: "Wifi".to_owned(),
                },
            )
            .await
            .unwrap();

        let mut payload = new_place_payload();
        payload.amenity_ids = vec![wifi.id];

        let place = services
            .places
            .create_place(&SecurityContext::user(ada.id), payload)
            .await
            .unwrap();

        let details = services.places.get_place(place.id).await.unwrap();
        assert_eq!(details.owner.id, ada.id);
        assert_eq!(details.amenities.len(), 1);
        assert_eq!(details.amenities[0].name, "Wifi");
    }
}
