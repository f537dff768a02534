pub mod cv;
pub mod payment;
pub mod webhook;
