pub mod pos;

pub use pos::{
    CampusType, NewPos, PointOfSale, PosId, PosMutation, PosPatch, PosRepository, PosType,
    ValidatedPatch, ValidatedPos,
};

// Re-export DomainError from shared for convenience
pub use crate::shared::errors::{DomainError, DomainResult};
