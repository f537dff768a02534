//! HTTP and runtime plumbing shared by DigitalCV services.

pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
