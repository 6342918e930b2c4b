//! Application services

pub mod pos;

pub use pos::{PosService, PosServiceConfig};
