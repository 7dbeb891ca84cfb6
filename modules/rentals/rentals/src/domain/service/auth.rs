use std::sync::Arc;

use tracing::instrument;

use rentals_sdk::{LoginRequest, TokenResponse};

use crate::auth::{PasswordHasher, TokenService};
use crate::domain::error::DomainError;
use crate::domain::repos::UsersRepository;
use crate::domain::service::users::normalize_email;

/// Login: credential verification and token issuance.
///
/// Unknown email and wrong password produce the same rejection, so the
/// endpoint cannot be used to probe which addresses are registered.
pub struct AuthService<UR>
where
    UR: UsersRepository,
{
    users: Arc<UR>,
    hasher: PasswordHasher,
    tokens: Arc<TokenService>,
}

impl<UR> AuthService<UR>
where
    UR: UsersRepository,
{
    pub fn new(users: Arc<UR>, hasher: PasswordHasher, tokens: Arc<TokenService>) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }

    /// Authenticate and return a fresh access token.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(&self, credentials: LoginRequest) -> Result<TokenResponse, DomainError> {
        if credentials.email.is_empty() || credentials.password.is_empty() {
            return Err(DomainError::validation(
                "credentials",
                "Missing email or password",
            ));
        }

        let email = normalize_email(&credentials.email);
        let found = self.users.find_by_email(&email).await?;

        let Some(user) = found else {
            tracing::debug!("login rejected: unknown email");
            return Err(DomainError::invalid_credentials());
        };

        if !self.hasher.verify(&credentials.password, &user.password_hash) {
            tracing::debug!("login rejected: password mismatch");
            return Err(DomainError::invalid_credentials());
        }

        let access_token = self.tokens.issue(user.id, user.is_admin)?;

        tracing::info!("Issued access token for user {}", user.id);
        Ok(TokenResponse { access_token })
    }
}
