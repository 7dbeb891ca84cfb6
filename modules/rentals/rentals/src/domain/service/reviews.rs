use std::sync::Arc;

use tracing::instrument;

use rentals_sdk::{NewReview, Review, ReviewPatch};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::repos::{PlacesRepository, ReviewsRepository, UsersRepository};
use crate::domain::service::ServiceConfig;
use crate::security::SecurityContext;

/// Reviews service.
///
/// The author is always the authenticated subject. Owners cannot review
/// their own places, and each user gets one review per place. Updates
/// may change text and rating only.
pub struct ReviewsService<RR, UR, PR>
where
    RR: ReviewsRepository,
    UR: UsersRepository,
    PR: PlacesRepository,
{
    repo: Arc<RR>,
    users: Arc<UR>,
    places: Arc<PR>,
    config: ServiceConfig,
}

impl<RR, UR, PR> ReviewsService<RR, UR, PR>
where
    RR: ReviewsRepository,
    UR: UsersRepository,
    PR: PlacesRepository,
{
    pub fn new(repo: Arc<RR>, users: Arc<UR>, places: Arc<PR>, config: ServiceConfig) -> Self {
        Self {
            repo,
            users,
            places,
            config,
        }
    }
}

// Business logic methods
impl<RR, UR, PR> ReviewsService<RR, UR, PR>
where
    RR: ReviewsRepository,
    UR: UsersRepository,
    PR: PlacesRepository,
{
    /// Create a review authored by the caller.
    #[instrument(skip(self, ctx, new_review), fields(place_id = %new_review.place_id))]
    pub async fn create_review(
        &self,
        ctx: &SecurityContext,
        new_review: NewReview,
    ) -> Result<Review, DomainError> {
        let subject = ctx.subject_id().ok_or_else(DomainError::missing_token)?;

        tracing::info!("Creating new review");

        let text = self.validate_text(&new_review.text)?;
        validate_rating(new_review.rating)?;

        if self.users.get(subject).await?.is_none() {
            return Err(DomainError::validation("user_id", "User not found"));
        }

        let Some(place) = self.places.get(new_review.place_id).await? else {
            return Err(DomainError::validation("place_id", "Place not found"));
        };

        if place.owner_id == subject {
            return Err(DomainError::validation(
                "place_id",
                "You cannot review your own place",
            ));
        }

        if self
            .repo
            .find_by_user_and_place(subject, place.id)
            .await?
            .is_some()
        {
            return Err(DomainError::conflict("You have already reviewed this place"));
        }

        let now = OffsetDateTime::now_utc();
        let review = Review {
            id: Uuid::now_v7(),
            text,
            rating: new_review.rating,
            user_id: subject,
            place_id: place.id,
            created_at: now,
            updated_at: now,
        };

        self.repo.add(review.clone()).await?;

        tracing::info!("Successfully created review with id={}", review.id);
        Ok(review)
    }

    /// List all reviews (public).
    #[instrument(skip(self))]
    pub async fn list_reviews(&self) -> Result<Vec<Review>, DomainError> {
        self.repo.get_all().await
    }

    /// List the reviews of one place (public).
    #[instrument(skip(self), fields(place_id = %place_id))]
    pub async fn list_reviews_by_place(&self, place_id: Uuid) -> Result<Vec<Review>, DomainError> {
        if self.places.get(place_id).await?.is_none() {
            return Err(DomainError::not_found("Place", place_id));
        }
        self.repo.list_by_place(place_id).await
    }

    /// Fetch one review (public).
    #[instrument(skip(self), fields(review_id = %id))]
    pub async fn get_review(&self, id: Uuid) -> Result<Review, DomainError> {
        let found = self.repo.get(id).await?;
        found.ok_or_else(|| DomainError::not_found("Review", id))
    }

    /// Update a review's text or rating (author or admin).
    #[instrument(skip(self, ctx, patch), fields(review_id = %id))]
    pub async fn update_review(
        &self,
        ctx: &SecurityContext,
        id: Uuid,
        patch: ReviewPatch,
    ) -> Result<Review, DomainError> {
        tracing::info!("Updating review");

        let found = self.repo.get(id).await?;
        let mut current = found.ok_or_else(|| DomainError::not_found("Review", id))?;

        if !ctx.can_act_as(current.user_id) {
            return Err(DomainError::unauthorized_action());
        }

        if let Some(ref text) = patch.text {
            current.text = self.validate_text(text)?;
        }
        if let Some(rating) = patch.rating {
            validate_rating(rating)?;
            current.rating = rating;
        }
        current.updated_at = OffsetDateTime::now_utc();

        self.repo.update(current.clone()).await?;

        tracing::info!("Successfully updated review");
        Ok(current)
    }

    /// Delete a review (author or admin).
    #[instrument(skip(self, ctx), fields(review_id = %id))]
    pub async fn delete_review(&self, ctx: &SecurityContext, id: Uuid) -> Result<(), DomainError> {
        tracing::info!("Deleting review");

        let found = self.repo.get(id).await?;
        let review = found.ok_or_else(|| DomainError::not_found("Review", id))?;

        if !ctx.can_act_as(review.user_id) {
            return Err(DomainError::unauthorized_action());
        }

        let _ = self.repo.delete(id).await?;

        tracing::info!("Successfully deleted review");
        Ok(())
    }

    /// Trimmed review text, or a validation error.
    fn validate_text(&self, text: &str) -> Result<String, DomainError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation(
                "text",
                "Review text is required and cannot be empty",
            ));
        }
        if trimmed.len() > self.config.max_review_length {
            return Err(DomainError::validation(
                "text",
                format!(
                    "Review text cannot exceed {} characters",
                    self.config.max_review_length
                ),
            ));
        }
        Ok(trimmed.to_owned())
    }
}

fn validate_rating(rating: u8) -> Result<(), DomainError> {
    if !(1..=5).contains(&rating) {
        return Err(DomainError::validation(
            "rating",
            "Rating must be between 1 and 5",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::test_support::{memory_services, new_place_payload, seed_user};

    async fn seeded_place(
        services: &crate::test_support::MemoryAppServices,
        owner_email: &str,
    ) -> (Uuid, Uuid) {
        let owner = seed_user(services, owner_email, false).await;
        let place = services
            .places
            .create_place(&SecurityContext::user(owner.id), new_place_payload())
            .await
            .unwrap();
        (owner.id, place.id)
    }

    fn review_payload(place_id: Uuid) -> NewReview {
        NewReview {
            text: "Great stay".to_owned(),
            rating: 5,
            place_id,
        }
    }

    #[tokio::test]
    async fn owner_cannot_review_own_place() {
        let services = memory_services();
        let (owner_id, place_id) = seeded_place(&services, "ada@example.com").await;

        let err = services
            .reviews
            .create_review(&SecurityContext::user(owner_id), review_payload(place_id))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DomainError::Validation {
                field: "place_id",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn one_review_per_user_per_place() {
        let services = memory_services();
        let (_, place_id) = seeded_place(&services, "ada@example.com").await;
        let grace = seed_user(&services, "grace@example.com", false).await;
        let ctx = SecurityContext::user(grace.id);

        services
            .reviews
            .create_review(&ctx, review_payload(place_id))
            .await
            .unwrap();

        let err = services
            .reviews
            .create_review(&ctx, review_payload(place_id))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict { .. }));
    }

    #[tokio::test]
    async fn rating_out_of_range_is_rejected() {
        let services = memory_services();
        let (_, place_id) = seeded_place(&services, "ada@example.com").await;
        let grace = seed_user(&services, "grace@example.com", false).await;

        let mut payload = review_payload(place_id);
        payload.rating = 0;
        let err = services
            .reviews
            .create_review(&SecurityContext::user(grace.id), payload)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation {
                field: "rating",
                ..
            }
        ));

        let mut payload = review_payload(place_id);
        payload.rating = 6;
        let err = services
            .reviews
            .create_review(&SecurityContext::user(grace.id), payload)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation {
                field: "rating",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn review_text_is_trimmed() {
        let services = memory_services();
        let (_, place_id) = seeded_place(&services, "ada@example.com").await;
        let grace = seed_user(&services, "grace@example.com", false).await;

        let mut payload = review_payload(place_id);
        payload.text = "  lovely  ".to_owned();

        let review = services
            .reviews
            .create_review(&SecurityContext::user(grace.id), payload)
            .await
            .unwrap();
        assert_eq!(review.text, "lovely");
    }

    #[tokio::test]
    async fn only_author_or_admin_may_mutate() {
        let services = memory_services();
        let (_, place_id) = seeded_place(&services, "ada@example.com").await;
        let grace = seed_user(&services, "grace@example.com", false).await;
        let eve = seed_user(&services, "eve@example.com", false).await;

        let review = services
            .reviews
            .create_review(&SecurityContext::user(grace.id), review_payload(place_id))
            .await
            .unwrap();

        let patch = ReviewPatch {
            rating: Some(1),
            ..ReviewPatch::default()
        };
        let err = services
            .reviews
            .update_review(&SecurityContext::user(eve.id), review.id, patch.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden { .. }));

        let updated = services
            .reviews
            .update_review(&SecurityContext::user(grace.id), review.id, patch)
            .await
            .unwrap();
        assert_eq!(updated.rating, 1);

        let err = services
            .reviews
            .delete_review(&SecurityContext::user(eve.id), review.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden { .. }));

        services
            .reviews
            .delete_review(&SecurityContext::admin(Uuid::new_v4()), review.id)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn listing_reviews_of_unknown_place_is_not_found() {
        let services = memory_services();
        let err = services
            .reviews
            .list_reviews_by_place(Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }
}
