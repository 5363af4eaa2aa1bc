//! Domain types shared across Lifeline crates.
//!
//! This crate contains only pure types with no framework dependencies.
//! Import in `usecase/` and `domain/` layers; never in `infra/` or `handlers/`.

pub mod date;
pub mod event;
pub mod id;
pub mod photo;
pub mod timeline;
pub mod user;
pub mod validation;
