pub mod payments;
pub mod processed_webhooks;
pub mod user_cvs;
pub mod users;
