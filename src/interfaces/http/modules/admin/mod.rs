//! Administrative endpoints

pub mod handlers;

pub use handlers::{require_admin_token, reset_pos, AdminState, ADMIN_TOKEN_HEADER};
