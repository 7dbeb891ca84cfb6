//! HBnB rentals module.
//!
//! Implements the property-rental domain (users, places, amenities,
//! reviews) behind a REST surface, layered as:
//!
//! - [`api`] - axum routes, DTO/error mapping, bearer authentication
//!   middleware (API → Domain, one-way dependency);
//! - [`domain`] - per-resource services holding validation and
//!   owner/admin authorization, over repository traits;
//! - [`infra`] - repository backends: an in-memory map store and a
//!   SeaORM/sqlite store, interchangeable behind the domain traits;
//! - [`auth`] / [`security`] - password hashing, JWT issue/verify, and
//!   the per-request [`security::SecurityContext`].

pub mod api;
pub mod auth;
pub mod domain;
pub mod infra;
pub mod security;
pub mod test_support;
