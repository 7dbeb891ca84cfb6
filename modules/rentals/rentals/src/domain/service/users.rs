use std::sync::Arc;

use tracing::instrument;

use rentals_sdk::{NewUser, User, UserPatch};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::PasswordHasher;
use crate::domain::error::DomainError;
use crate::domain::repos::{PlacesRepository, ReviewsRepository, UserRecord, UsersRepository};
use crate::domain::service::ServiceConfig;
use crate::security::SecurityContext;

/// Users service.
///
/// All mutations are admin-gated; reads are admin-or-self. Passwords are
/// hashed here, before anything reaches a repository.
pub struct UsersService<UR, PR, RR>
where
    UR: UsersRepository,
    PR: PlacesRepository,
    RR: ReviewsRepository,
{
    repo: Arc<UR>,
    places: Arc<PR>,
    reviews: Arc<RR>,
    hasher: PasswordHasher,
    config: ServiceConfig,
}

impl<UR, PR, RR> UsersService<UR, PR, RR>
where
    UR: UsersRepository,
    PR: PlacesRepository,
    RR: ReviewsRepository,
{
    pub fn new(
        repo: Arc<UR>,
        places: Arc<PR>,
        reviews: Arc<RR>,
        hasher: PasswordHasher,
        config: ServiceConfig,
    ) -> Self {
        Self {
            repo,
            places,
            reviews,
            hasher,
            config,
        }
    }
}

// Business logic methods
impl<UR, PR, RR> UsersService<UR, PR, RR>
where
    UR: UsersRepository,
    PR: PlacesRepository,
    RR: ReviewsRepository,
{
    /// Create a new user (admin only).
    #[instrument(skip(self, ctx, new_user), fields(email = %new_user.email))]
    pub async fn create_user(
        &self,
        ctx: &SecurityContext,
        new_user: NewUser,
    ) -> Result<User, DomainError> {
        if !ctx.is_admin() {
            return Err(DomainError::admin_required());
        }

        tracing::info!("Creating new user");

        self.validate_new_user(&new_user)?;

        let email = normalize_email(&new_user.email);
        if self.repo.find_by_email(&email).await?.is_some() {
            return Err(DomainError::email_taken());
        }

        let password_hash = self.hasher.hash(&new_user.password)?;
        let now = OffsetDateTime::now_utc();

        let record = UserRecord {
            id: Uuid::now_v7(),
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            email,
            password_hash,
            is_admin: new_user.is_admin,
            created_at: now,
            updated_at: now,
        };

        self.repo.add(record.clone()).await?;

        tracing::info!("Successfully created user with id={}", record.id);
        Ok(record.to_public())
    }

    /// List all users (admin only).
    #[instrument(skip(self, ctx))]
    pub async fn list_users(&self, ctx: &SecurityContext) -> Result<Vec<User>, DomainError> {
        if !ctx.is_admin() {
            return Err(DomainError::admin_required());
        }

        let users = self.repo.get_all().await?;
        Ok(users.iter().map(UserRecord::to_public).collect())
    }

    /// Fetch one user (admin, or the user itself).
    #[instrument(skip(self, ctx), fields(user_id = %id))]
    pub async fn get_user(&self, ctx: &SecurityContext, id: Uuid) -> Result<User, DomainError> {
        if !ctx.can_act_as(id) {
            return Err(DomainError::forbidden("Forbidden"));
        }

        tracing::debug!("Getting user by id");

        let found = self.repo.get(id).await?;
        let record = found.ok_or_else(|| DomainError::not_found("User", id))?;
        Ok(record.to_public())
    }

    /// Update an existing user (admin only).
    #[instrument(skip(self, ctx, patch), fields(user_id = %id))]
    pub async fn update_user(
        &self,
        ctx: &SecurityContext,
        id: Uuid,
        patch: UserPatch,
    ) -> Result<User, DomainError> {
        if !ctx.is_admin() {
            return Err(DomainError::admin_required());
        }

        tracing::info!("Updating user");

        self.validate_user_patch(&patch)?;

        let found = self.repo.get(id).await?;
        let mut current = found.ok_or_else(|| DomainError::not_found("User", id))?;

        if let Some(ref email) = patch.email {
            let email = normalize_email(email);
            if email != current.email {
                if self.repo.find_by_email(&email).await?.is_some() {
                    return Err(DomainError::email_taken());
                }
                current.email = email;
            }
        }

        if let Some(first_name) = patch.first_name {
            current.first_name = first_name;
        }
        if let Some(last_name) = patch.last_name {
            current.last_name = last_name;
        }
        if let Some(password) = patch.password {
            current.password_hash = self.hasher.hash(&password)?;
        }
        if let Some(is_admin) = patch.is_admin {
            current.is_admin = is_admin;
        }
        current.updated_at = OffsetDateTime::now_utc();

        self.repo.update(current.clone()).await?;

        tracing::info!("Successfully updated user");
        Ok(current.to_public())
    }

    /// Delete a user and everything they own (admin only).
    #[instrument(skip(self, ctx), fields(user_id = %id))]
    pub async fn delete_user(&self, ctx: &SecurityContext, id: Uuid) -> Result<(), DomainError> {
        if !ctx.is_admin() {
            return Err(DomainError::admin_required());
        }

        tracing::info!("Deleting user");

        // Owned places (and their reviews) go first, then the user's own
        // reviews on other places, so no dangling references survive on
        // either backend.
        for place in self.places.list_by_owner(id).await? {
            self.reviews.delete_by_place(place.id).await?;
            let _ = self.places.delete(place.id).await?;
        }
        self.reviews.delete_by_user(id).await?;

        let deleted = self.repo.delete(id).await?;
        if !deleted {
            return Err(DomainError::not_found("User", id));
        }

        tracing::info!("Successfully deleted user");
        Ok(())
    }

    fn validate_new_user(&self, new_user: &NewUser) -> Result<(), DomainError> {
        self.validate_name("first_name", "First name", &new_user.first_name)?;
        self.validate_name("last_name", "Last name", &new_user.last_name)?;
        validate_email(&new_user.email)?;
        self.validate_password(&new_user.password)?;
        Ok(())
    }

    fn validate_user_patch(&self, patch: &UserPatch) -> Result<(), DomainError> {
        if let Some(ref first_name) = patch.first_name {
            self.validate_name("first_name", "First name", first_name)?;
        }
        if let Some(ref last_name) = patch.last_name {
            self.validate_name("last_name", "Last name", last_name)?;
        }
        if let Some(ref email) = patch.email {
            validate_email(email)?;
        }
        if let Some(ref password) = patch.password {
            self.validate_password(password)?;
        }
        Ok(())
    }

    fn validate_name(
        &self,
        field: &'static str,
        label: &str,
        value: &str,
    ) -> Result<(), DomainError> {
        if value.trim().is_empty() {
            return Err(DomainError::validation(field, format!("{label} is required")));
        }
        if value.len() > self.config.max_name_length {
            return Err(DomainError::validation(
                field,
                format!(
                    "{label} must be at most {} characters",
                    self.config.max_name_length
                ),
            ));
        }
        Ok(())
    }

    fn validate_password(&self, password: &str) -> Result<(), DomainError> {
        if password.is_empty() {
            return Err(DomainError::validation("password", "Password is required"));
        }
        if password.len() < self.config.min_password_length {
            return Err(DomainError::validation(
                "password",
                format!(
                    "Password must be at least {} characters",
                    self.config.min_password_length
                ),
            ));
        }
        Ok(())
    }
}

fn validate_email(email: &str) -> Result<(), DomainError> {
    if email.trim().is_empty() {
        return Err(DomainError::validation("email", "Email is required"));
    }
    if !email.contains('@') || !email.contains('.') {
        return Err(DomainError::validation("email", "Invalid email format"));
    }
    Ok(())
}

/// Emails are compared and stored lowercase.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::test_support::{admin_ctx, memory_services, new_user_payload};

    #[tokio::test]
    async fn admin_creates_user() {
        let services = memory_services();
        let admin = admin_ctx();

        let user = services
            .users
            .create_user(&admin, new_user_payload("ada@example.com"))
            .await
            .unwrap();

        assert_eq!(user.email, "ada@example.com");
        assert!(!user.is_admin);
    }

    #[tokio::test]
    async fn non_admin_cannot_create_user() {
        let services = memory_services();
        let ctx = SecurityContext::user(Uuid::new_v4());

        let err = services
            .users
            .create_user(&ctx, new_user_payload("ada@example.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict_case_insensitively() {
        let services = memory_services();
        let admin = admin_ctx();

        services
            .users
            .create_user(&admin, new_user_payload("ada@example.com"))
            .await
            .unwrap();

        let err = services
            .users
            .create_user(&admin, new_user_payload("Ada@Example.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Conflict { .. }));
    }

    #[tokio::test]
    async fn invalid_email_is_rejected() {
        let services = memory_services();
        let admin = admin_ctx();

        let payload = new_user_payload("not-an-email");
        let err = services.users.create_user(&admin, payload).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation { field: "email", .. }
        ));
    }

    #[tokio::test]
    async fn short_password_is_rejected() {
        let services = memory_services();
        let admin = admin_ctx();

        let mut payload = new_user_payload("ada@example.com");
        payload.password = "abc".to_owned();

        let err = services.users.create_user(&admin, payload).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation {
                field: "password",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn user_reads_itself_but_not_others() {
        let services = memory_services();
        let admin = admin_ctx();

        let ada = services
            .users
            .create_user(&admin, new_user_payload("ada@example.com"))
            .await
            .unwrap();
        let grace = services
            .users
            .create_user(&admin, new_user_payload("grace@example.com"))
            .await
            .unwrap();

        let ada_ctx = SecurityContext::user(ada.id);
        assert!(services.users.get_user(&ada_ctx, ada.id).await.is_ok());

        let err = services
            .users
            .get_user(&ada_ctx, grace.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn update_to_taken_email_is_a_conflict() {
        let services = memory_services();
        let admin = admin_ctx();

        services
            .users
            .create_user(&admin, new_user_payload("ada@example.com"))
            .await
            .unwrap();
        let grace = services
            .users
            .create_user(&admin, new_user_payload("grace@example.com"))
            .await
            .unwrap();

        let patch = UserPatch {
            email: Some("ada@example.com".to_owned()),
            ..UserPatch::default()
        };
        let err = services
            .users
            .update_user(&admin, grace.id, patch)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict { .. }));
    }

    #[tokio::test]
    async fn delete_unknown_user_is_not_found() {
        let services = memory_services();
        let err = services
            .users
            .delete_user(&admin_ctx(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }
}
