//! Per-request security context.
//!
//! The authentication middleware resolves the bearer token into a
//! [`SecurityContext`] and inserts it into request extensions; domain
//! services consult it for owner/admin decisions. Anonymous contexts are
//! inserted for public routes so handlers always find one.

use uuid::Uuid;

/// The caller's role as carried by the token's `is_admin` claim.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Anonymous,
    User,
    Admin,
}

/// Identity attached to a request after authentication.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecurityContext {
    subject_id: Option<Uuid>,
    role: Role,
}

impl SecurityContext {
    /// Context for requests that carried no (required) credentials.
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            subject_id: None,
            role: Role::Anonymous,
        }
    }

    /// Context for an authenticated regular user.
    #[must_use]
    pub fn user(subject_id: Uuid) -> Self {
        Self {
            subject_id: Some(subject_id),
            role: Role::User,
        }
    }

    /// Context for an authenticated administrator.
    #[must_use]
    pub fn admin(subject_id: Uuid) -> Self {
        Self {
            subject_id: Some(subject_id),
            role: Role::Admin,
        }
    }

    /// The authenticated subject, if any.
    #[inline]
    #[must_use]
    pub fn subject_id(&self) -> Option<Uuid> {
        self.subject_id
    }

    #[inline]
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    #[inline]
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.subject_id.is_some()
    }

    #[inline]
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Whether the caller may act on resources owned by `user_id`.
    ///
    /// Admins may act on anything; everyone else only on their own.
    #[must_use]
    pub fn can_act_as(&self, user_id: Uuid) -> bool {
        self.is_admin() || self.subject_id == Some(user_id)
    }
}
