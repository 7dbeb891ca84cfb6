//! SeaORM entity definitions.

pub mod amenity;
pub mod place;
pub mod place_amenity;
pub mod review;
pub mod user;
