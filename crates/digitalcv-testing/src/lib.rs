//! Test utilities for DigitalCV services.
//!
//! Import from `[dev-dependencies]` only.

pub mod auth;
