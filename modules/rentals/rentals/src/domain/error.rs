use uuid::Uuid;

use crate::auth::AuthError;

/// Domain-level failure.
///
/// Messages on the 4xx-mapped variants are part of the API contract and
/// surface verbatim in `{"error": ...}` bodies; storage and credential
/// faults are logged and masked at the API boundary.
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("{message}")]
    Validation { field: &'static str, message: String },

    #[error("{entity} not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("{message}")]
    Conflict { message: String },

    #[error("{message}")]
    Forbidden { message: String },

    #[error("{message}")]
    Unauthorized { message: String },

    #[error("storage error")]
    Storage(#[from] sea_orm::DbErr),

    #[error("credential error")]
    Credential(#[from] AuthError),
}

impl DomainError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// The admin-gate rejection.
    #[must_use]
    pub fn admin_required() -> Self {
        Self::forbidden("Admin privileges required")
    }

    /// The owner-gate rejection.
    #[must_use]
    pub fn unauthorized_action() -> Self {
        Self::forbidden("Unauthorized action")
    }

    #[must_use]
    pub fn email_taken() -> Self {
        Self::conflict("Email already exists")
    }

    #[must_use]
    pub fn invalid_credentials() -> Self {
        Self::Unauthorized {
            message: "Invalid credentials".to_owned(),
        }
    }

    #[must_use]
    pub fn missing_token() -> Self {
        Self::Unauthorized {
            message: "Missing or invalid Authorization header".to_owned(),
        }
    }

    #[must_use]
    pub fn invalid_token() -> Self {
        Self::Unauthorized {
            message: "Invalid or expired token".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_passes_through() {
        let err = DomainError::validation("price", "Price must be positive");
        assert_eq!(err.to_string(), "Price must be positive");
    }

    #[test]
    fn not_found_names_the_entity_only() {
        let err = DomainError::not_found("Place", Uuid::new_v4());
        assert_eq!(err.to_string(), "Place not found");
    }
}
