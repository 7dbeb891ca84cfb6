use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use super::AuthError;
use crate::security::SecurityContext;

/// Claims carried by an access token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id.
    pub sub: Uuid,
    pub is_admin: bool,
    /// Issued-at, unix seconds.
    pub iat: i64,
    /// Expiry, unix seconds.
    pub exp: i64,
}

impl Claims {
    /// Security context this token authenticates.
    #[must_use]
    pub fn to_context(&self) -> SecurityContext {
        if self.is_admin {
            SecurityContext::admin(self.sub)
        } else {
            SecurityContext::user(self.sub)
        }
    }
}

/// HS256 access-token issue and verification.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    #[must_use]
    pub fn new(secret: &SecretString, ttl: Duration) -> Self {
        let secret_bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret_bytes),
            decoding: DecodingKey::from_secret(secret_bytes),
            validation: Validation::new(Algorithm::HS256),
            ttl,
        }
    }

    /// Issue a token for the given subject.
    pub fn issue(&self, user_id: Uuid, is_admin: bool) -> Result<String, AuthError> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = Claims {
            sub: user_id,
            is_admin,
            iat: now,
            exp: now + self.ttl.whole_seconds(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(AuthError::Issue)
    }

    /// Verify a token and return its claims.
    ///
    /// Signature, algorithm and expiry failures all collapse into
    /// [`AuthError::InvalidToken`].
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| {
                tracing::debug!("token rejected: {err}");
                AuthError::InvalidToken
            })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn service(ttl: Duration) -> TokenService {
        TokenService::new(&SecretString::from("unit-test-secret"), ttl)
    }

    #[test]
    fn issue_then_verify_roundtrip() {
        let tokens = service(Duration::hours(24));
        let user_id = Uuid::new_v4();

        let token = tokens.issue(user_id, true).unwrap();
        let claims = tokens.verify(&token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert!(claims.is_admin);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn expired_token_is_rejected() {
        // Past the default validation leeway.
        let tokens = service(Duration::minutes(-5));
        let token = tokens.issue(Uuid::new_v4(), false).unwrap();

        assert!(matches!(
            tokens.verify(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let issuer = service(Duration::hours(1));
        let verifier = TokenService::new(&SecretString::from("other-secret"), Duration::hours(1));

        let token = issuer.issue(Uuid::new_v4(), false).unwrap();
        assert!(matches!(
            verifier.verify(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn garbage_token_is_rejected() {
        let tokens = service(Duration::hours(1));
        assert!(matches!(
            tokens.verify("not.a.jwt"),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn claims_map_to_matching_context() {
        let id = Uuid::new_v4();
        let admin = Claims {
            sub: id,
            is_admin: true,
            iat: 0,
            exp: 0,
        };
        assert!(admin.to_context().is_admin());
        assert_eq!(admin.to_context().subject_id(), Some(id));

        let user = Claims {
            is_admin: false,
            ..admin
        };
        assert!(!user.to_context().is_admin());
    }
}
