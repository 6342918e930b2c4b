//! # Campus Coffee POS directory
//!
//! REST service managing the coffee points of sale across the university
//! campuses: cafeterias, coffee shops, bakeries and vending machines.
//!
//! ## Architecture
//!
//! The project follows Clean Architecture principles:
//!
//! - **domain**: the `PointOfSale` entity, field rules and the storage port
//! - **application**: `PosService`, the create/retrieve/update/clear use cases
//! - **infrastructure**: SeaORM (SQLite/PostgreSQL) and in-memory repositories
//! - **interfaces**: axum REST API with Swagger documentation
//! - **server**: runtime wiring and graceful shutdown

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

pub use application::{PosService, PosServiceConfig};
pub use infrastructure::{init_database, DatabaseConfig, InMemoryPosRepository, SeaOrmPosRepository};
pub use interfaces::http::create_api_router;
