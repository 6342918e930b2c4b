//! HTTP REST API
//!
//! - `common`: error rendering and the validating JSON extractor
//! - `modules`: handlers and DTOs per resource
//! - `router`: route table, middleware stack and Swagger documentation

pub mod common;
pub mod modules;
pub mod router;

pub use router::{create_api_router, ApiDoc, ApiState};
