use std::sync::Arc;

use tracing::instrument;

use rentals_sdk::{Amenity, AmenityPatch, NewAmenity};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::repos::{AmenitiesRepository, PlacesRepository};
use crate::domain::service::ServiceConfig;
use crate::security::SecurityContext;

/// Amenities service. Mutations are admin-gated, reads are public.
pub struct AmenitiesService<AR, PR>
where
    AR: AmenitiesRepository,
    PR: PlacesRepository,
{
    repo: Arc<AR>,
    places: Arc<PR>,
    config: ServiceConfig,
}

impl<AR, PR> AmenitiesService<AR, PR>
where
    AR: AmenitiesRepository,
    PR: PlacesRepository,
{
    pub fn new(repo: Arc<AR>, places: Arc<PR>, config: ServiceConfig) -> Self {
        Self {
            repo,
            places,
            config,
        }
    }
}

// Business logic methods
impl<AR, PR> AmenitiesService<AR, PR>
where
    AR: AmenitiesRepository,
    PR: PlacesRepository,
{
    /// Create a new amenity (admin only).
    #[instrument(skip(self, ctx), fields(name = %new_amenity.name))]
    pub async fn create_amenity(
        &self,
        ctx: &SecurityContext,
        new_amenity: NewAmenity,
    ) -> Result<Amenity, DomainError> {
        if !ctx.is_admin() {
            return Err(DomainError::admin_required());
        }

        tracing::info!("Creating new amenity");

        self.validate_name(&new_amenity.name)?;
        if self.repo.find_by_name(&new_amenity.name).await?.is_some() {
            return Err(DomainError::conflict("Amenity already exists"));
        }

        let now = OffsetDateTime::now_utc();
        let amenity = Amenity {
            id: Uuid::now_v7(),
            name: new_amenity.name,
            created_at: now,
            updated_at: now,
        };

        self.repo.add(amenity.clone()).await?;

        tracing::info!("Successfully created amenity with id={}", amenity.id);
        Ok(amenity)
    }

    /// List all amenities (public).
    #[instrument(skip(self))]
    pub async fn list_amenities(&self) -> Result<Vec<Amenity>, DomainError> {
        self.repo.get_all().await
    }

    /// Fetch one amenity (public).
    #[instrument(skip(self), fields(amenity_id = %id))]
    pub async fn get_amenity(&self, id: Uuid) -> Result<Amenity, DomainError> {
        let found = self.repo.get(id).await?;
        found.ok_or_else(|| DomainError::not_found("Amenity", id))
    }

    /// Rename an amenity (admin only).
    #[instrument(skip(self, ctx, patch), fields(amenity_id = %id))]
    pub async fn update_amenity(
        &self,
        ctx: &SecurityContext,
        id: Uuid,
        patch: AmenityPatch,
    ) -> Result<Amenity, DomainError> {
        if !ctx.is_admin() {
            return Err(DomainError::admin_required());
        }

        tracing::info!("Updating amenity");

        let found = self.repo.get(id).await?;
        let mut current = found.ok_or_else(|| DomainError::not_found("Amenity", id))?;

        if let Some(name) = patch.name {
            self.validate_name(&name)?;
            if name != current.name {
                if self.repo.find_by_name(&name).await?.is_some() {
                    return Err(DomainError::conflict("Amenity already exists"));
                }
                current.name = name;
            }
        }
        current.updated_at = OffsetDateTime::now_utc();

        self.repo.update(current.clone()).await?;

        tracing::info!("Successfully updated amenity");
        Ok(current)
    }

    /// Delete an amenity and detach it from every place (admin only).
    #[instrument(skip(self, ctx), fields(amenity_id = %id))]
    pub async fn delete_amenity(&self, ctx: &SecurityContext, id: Uuid) -> Result<(), DomainError> {
        if !ctx.is_admin() {
            return Err(DomainError::admin_required());
        }

        tracing::info!("Deleting amenity");

        let deleted = self.repo.delete(id).await?;
        if !deleted {
            return Err(DomainError::not_found("Amenity", id));
        }
        self.places.detach_amenity(id).await?;

        tracing::info!("Successfully deleted amenity");
        Ok(())
    }

    fn validate_name(&self, name: &str) -> Result<(), DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::validation("name", "Amenity name is required"));
        }
        if name.len() > self.config.max_amenity_name_length {
            return Err(DomainError::validation(
                "name",
                format!(
                    "Amenity name must be at most {} characters",
                    self.config.max_amenity_name_length
                ),
            ));
        }
        Ok(())
    }
}
