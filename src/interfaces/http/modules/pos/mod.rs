//! Point-of-sale directory endpoints

pub mod dto;
pub mod handlers;

pub use dto::{CreatePosRequest, PosResponse, UpdatePosRequest};
pub use handlers::{create_pos, get_pos, list_pos, update_pos, PosState};
