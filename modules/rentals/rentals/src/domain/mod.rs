//! Domain layer: business rules over repository traits.

pub mod error;
pub mod repos;
pub mod service;

pub use error::DomainError;
pub use repos::{
    AmenitiesRepository, PlacesRepository, ReviewsRepository, UserRecord, UsersRepository,
};
pub use service::{AppServices, ServiceConfig};
