//! Auth types shared across DigitalCV crates.
//!
//! Authentication itself lives in the external identity provider; this crate
//! only reads the identity it forwards.

pub mod identity;
