//! Shared HTTP plumbing: error rendering and request body extraction

pub mod error;
pub mod validated_json;

pub use error::{error_code, ApiError, ErrorBody};
pub use validated_json::ValidatedJson;
