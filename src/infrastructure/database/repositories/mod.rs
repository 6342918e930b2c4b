//! Database repository implementations

pub mod pos_repository;

pub use pos_repository::SeaOrmPosRepository;
