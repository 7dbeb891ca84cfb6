//! Repository backends.
//!
//! `memory` keeps everything in process-local maps and needs no setup;
//! `storage` persists through SeaORM. Both implement the same domain
//! traits, so services and the REST surface never know which one runs.

pub mod memory;
pub mod storage;
