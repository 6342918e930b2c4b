//! Point-of-sale entity

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of point of sale
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum PosType {
    #[sea_orm(string_value = "CAFE")]
    Cafe,
    #[sea_orm(string_value = "COFFEE_SHOP")]
    CoffeeShop,
    #[sea_orm(string_value = "CAFETERIA")]
    Cafeteria,
    #[sea_orm(string_value = "VENDING_MACHINE")]
    VendingMachine,
    #[sea_orm(string_value = "BAKERY")]
    Bakery,
}

/// Campus
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum Campus {
    #[sea_orm(string_value = "ALTSTADT")]
    Altstadt,
    #[sea_orm(string_value = "BERGHEIM")]
    Bergheim,
    #[sea_orm(string_value = "INF")]
    Inf,
    #[sea_orm(string_value = "CENTRAL")]
    Central,
}

/// Point of sale row
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "points_of_sale")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Display name (e.g., "Main Cafeteria")
    pub name: String,

    pub description: Option<String>,

    pub pos_type: PosType,

    pub campus: Campus,

    pub street: String,

    pub house_number: String,

    /// Always non-negative
    pub postal_code: i32,

    pub city: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
