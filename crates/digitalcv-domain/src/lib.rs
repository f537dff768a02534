//! Domain types shared across DigitalCV crates.
//!
//! This crate contains only pure types with no framework dependencies.
//! Import in `usecase/` and `domain/` layers; never in `infra/` or `handlers/`.

pub mod cv;
pub mod id;
pub mod payment;
