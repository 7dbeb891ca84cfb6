//! API surface. REST only; see [`rest`].

pub mod rest;
