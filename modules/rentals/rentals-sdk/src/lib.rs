//! Contract types for the HBnB rentals module.
//!
//! These are the wire-level models shared by the REST surface and any
//! client of it. The module's domain services use them directly as their
//! primary models; the infrastructure layer maps them to storage rows.
//!
//! Conventions:
//! - identifiers are UUIDs;
//! - timestamps serialize as RFC 3339 strings in UTC;
//! - credential-bearing inputs never expose the secret via `Debug`, and
//!   persisted password hashes never appear in any output type.

pub mod amenities;
pub mod auth;
pub mod places;
pub mod reviews;
pub mod users;

pub use amenities::{Amenity, AmenityPatch, NewAmenity};
pub use auth::{LoginRequest, ProtectedResponse, TokenResponse};
pub use places::{NewPlace, Place, PlaceDetails, PlaceOwner, PlacePatch};
pub use reviews::{NewReview, Review, ReviewPatch};
pub use users::{NewUser, User, UserPatch};
