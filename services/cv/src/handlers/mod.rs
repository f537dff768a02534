pub mod cv;
pub mod health;
pub mod payment;
pub mod public;
pub mod webhook;
