//! Point-of-sale aggregate
//!
//! The entity, its closed enumerations, field rules and the partial-update
//! overlay, plus the storage port the service depends on.

pub mod model;
pub mod repository;

pub use model::{
    CampusType, NewPos, PointOfSale, PosId, PosPatch, PosType, ValidatedPatch, ValidatedPos,
};
pub use repository::{PosMutation, PosRepository};
