//! SeaORM storage backend (sqlite via sqlx).
//!
//! Entities mirror the contract types column-for-column; repositories
//! translate between rows and the domain models and keep the
//! place↔amenity join table consistent inside transactions.

pub mod entity;
pub mod migrations;
mod repos;

pub use repos::{
    OrmAmenitiesRepository, OrmPlacesRepository, OrmReviewsRepository, OrmUsersRepository,
};
