//! Liveness and storage reachability

pub mod handlers;

pub use handlers::{health_check, HealthState};
