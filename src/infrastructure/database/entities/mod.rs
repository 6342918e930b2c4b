//! Database entities module

pub mod point_of_sale;

pub use point_of_sale::Entity as PointOfSale;
