//! Point-of-sale domain entity

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::shared::errors::{DomainError, DomainResult};

/// Storage-assigned identifier of a point of sale.
pub type PosId = i32;

const MAX_TEXT_LEN: usize = 255;
const MAX_DESCRIPTION_LEN: usize = 2000;
const MAX_POSTAL_CODE: i64 = 99_999_999;

/// Kind of point of sale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PosType {
    Cafe,
    CoffeeShop,
    Cafeteria,
    VendingMachine,
    Bakery,
}

impl PosType {
    pub const ALL: [PosType; 5] = [
        Self::Cafe,
        Self::CoffeeShop,
        Self::Cafeteria,
        Self::VendingMachine,
        Self::Bakery,
    ];

    /// Symbolic name used on the wire and in storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cafe => "CAFE",
            Self::CoffeeShop => "COFFEE_SHOP",
            Self::Cafeteria => "CAFETERIA",
            Self::VendingMachine => "VENDING_MACHINE",
            Self::Bakery => "BAKERY",
        }
    }
}

impl fmt::Display for PosType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PosType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| DomainError::validation("type", format!("unknown POS type '{}'", s)))
    }
}

/// Campus a point of sale belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CampusType {
    Altstadt,
    Bergheim,
    Inf,
    Central,
}

impl CampusType {
    pub const ALL: [CampusType; 4] = [Self::Altstadt, Self::Bergheim, Self::Inf, Self::Central];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Altstadt => "ALTSTADT",
            Self::Bergheim => "BERGHEIM",
            Self::Inf => "INF",
            Self::Central => "CENTRAL",
        }
    }
}

impl fmt::Display for CampusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CampusType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| DomainError::validation("campus", format!("unknown campus '{}'", s)))
    }
}

/// A stored point of sale.
///
/// Treated as an immutable version: updates go through [`PointOfSale::apply`],
/// which returns the next version instead of mutating in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointOfSale {
    pub id: PosId,
    pub name: String,
    pub description: Option<String>,
    pub pos_type: PosType,
    pub campus: CampusType,
    pub street: String,
    pub house_number: String,
    pub postal_code: u32,
    pub city: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PointOfSale {
    /// Next version of this record with `patch` overlaid.
    ///
    /// `id` and `created_at` are carried over unchanged; `updated_at` is set to
    /// `now` even when the patch is empty.
    pub fn apply(&self, patch: &ValidatedPatch, now: DateTime<Utc>) -> PointOfSale {
        PointOfSale {
            id: self.id,
            name: patch.name.clone().unwrap_or_else(|| self.name.clone()),
            description: match &patch.description {
                Some(replacement) => replacement.clone(),
                None => self.description.clone(),
            },
            pos_type: patch.pos_type.unwrap_or(self.pos_type),
            campus: patch.campus.unwrap_or(self.campus),
            street: patch.street.clone().unwrap_or_else(|| self.street.clone()),
            house_number: patch
                .house_number
                .clone()
                .unwrap_or_else(|| self.house_number.clone()),
            postal_code: patch.postal_code.unwrap_or(self.postal_code),
            city: patch.city.clone().unwrap_or_else(|| self.city.clone()),
            created_at: self.created_at,
            updated_at: now,
        }
    }
}

/// Create candidate as received from a caller, before validation.
///
/// Enumerations arrive as symbolic names and the postal code as a signed
/// number so that out-of-range input is reported instead of failing to decode.
#[derive(Debug, Clone)]
pub struct NewPos {
    pub name: String,
    pub description: Option<String>,
    pub pos_type: String,
    pub campus: String,
    pub street: String,
    pub house_number: String,
    pub postal_code: i64,
    pub city: String,
}

/// Create candidate that passed every field rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPos {
    pub name: String,
    pub description: Option<String>,
    pub pos_type: PosType,
    pub campus: CampusType,
    pub street: String,
    pub house_number: String,
    pub postal_code: u32,
    pub city: String,
}

impl NewPos {
    pub fn validate(self) -> DomainResult<ValidatedPos> {
        Ok(ValidatedPos {
            name: required_text("name", self.name)?,
            description: optional_description(self.description)?,
            pos_type: self.pos_type.parse()?,
            campus: self.campus.parse()?,
            street: required_text("street", self.street)?,
            house_number: required_text("houseNumber", self.house_number)?,
            postal_code: postal_code(self.postal_code)?,
            city: required_text("city", self.city)?,
        })
    }
}

/// Partial overlay for an existing record. `None` means "keep".
///
/// `description` is tri-state: `None` keeps the stored value, `Some(None)`
/// clears it, `Some(Some(text))` replaces it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PosPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub pos_type: Option<String>,
    pub campus: Option<String>,
    pub street: Option<String>,
    pub house_number: Option<String>,
    pub postal_code: Option<i64>,
    pub city: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatedPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub pos_type: Option<PosType>,
    pub campus: Option<CampusType>,
    pub street: Option<String>,
    pub house_number: Option<String>,
    pub postal_code: Option<u32>,
    pub city: Option<String>,
}

impl PosPatch {
    pub fn validate(self) -> DomainResult<ValidatedPatch> {
        Ok(ValidatedPatch {
            name: self.name.map(|v| required_text("name", v)).transpose()?,
            description: self.description.map(optional_description).transpose()?,
            pos_type: self.pos_type.map(|v| v.parse()).transpose()?,
            campus: self.campus.map(|v| v.parse()).transpose()?,
            street: self.street.map(|v| required_text("street", v)).transpose()?,
            house_number: self
                .house_number
                .map(|v| required_text("houseNumber", v))
                .transpose()?,
            postal_code: self.postal_code.map(postal_code).transpose()?,
            city: self.city.map(|v| required_text("city", v)).transpose()?,
        })
    }
}

impl ValidatedPatch {
    pub fn is_empty(&self) -> bool {
        *self == ValidatedPatch::default()
    }
}

fn required_text(field: &'static str, value: String) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(field, "must not be empty"));
    }
    if trimmed.chars().count() > MAX_TEXT_LEN {
        return Err(DomainError::validation(
            field,
            format!("must be at most {} characters", MAX_TEXT_LEN),
        ));
    }
    Ok(trimmed.to_string())
}

fn optional_description(value: Option<String>) -> DomainResult<Option<String>> {
    match value {
        Some(text) if text.chars().count() > MAX_DESCRIPTION_LEN => Err(DomainError::validation(
            "description",
            format!("must be at most {} characters", MAX_DESCRIPTION_LEN),
        )),
        other => Ok(other),
    }
}

fn postal_code(value: i64) -> DomainResult<u32> {
    if !(0..=MAX_POSTAL_CODE).contains(&value) {
        return Err(DomainError::validation(
            "postalCode",
            format!("must be between 0 and {}", MAX_POSTAL_CODE),
        ));
    }
    // range-checked above, always fits
    Ok(value as u32)
}

// ── Tests ──────────────────────────────────────────────────────
