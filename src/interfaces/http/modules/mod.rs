pub mod admin;
pub mod health;
pub mod metrics;
pub mod pos;
pub mod request_id;
