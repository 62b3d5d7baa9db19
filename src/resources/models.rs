//! Entity DTOs and submission forms.
//!
//! Entities decode leniently (camelCase, unknown fields kept in `extra`) so a
//! backend that grows a field never breaks a list view. Forms are strict and
//! validate before anything is sent.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use time::Date;

use super::{EntityId, Validate, require};
use crate::error::ApiError;
use crate::services::principal::{Role, lenient_role};

// =============================================================================
// Wire helpers
// =============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum AmountRepr {
    Num(f64),
    Text(String),
}

/// Money and quantities may arrive as numbers or numeric strings. Anything
/// unreadable, including `null`, counts as zero.
pub(crate) fn amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Option::<AmountRepr>::deserialize(deserializer).unwrap_or(None);
    Ok(match value {
        Some(AmountRepr::Num(n)) => n,
        Some(AmountRepr::Text(s)) => s.trim().parse().unwrap_or(0.0),
        None => 0.0,
    })
}

fn optional_amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Option::<AmountRepr>::deserialize(deserializer).unwrap_or(None);
    Ok(match value {
        Some(AmountRepr::Num(n)) => Some(n),
        Some(AmountRepr::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}

pub(crate) fn iso_date<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(date)
}

/// Current UTC calendar date.
#[must_use]
pub fn today_utc() -> Date {
    time::OffsetDateTime::now_utc().date()
}

fn role_object<S: Serializer>(role: &Role, serializer: S) -> Result<S::Ok, S::Error> {
    #[derive(Serialize)]
    struct Named<'a> {
        name: &'a str,
    }
    Named { name: role.as_str() }.serialize(serializer)
}

// =============================================================================
// Entities
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: EntityId,
    pub name: String,
    #[serde(default, deserialize_with = "amount")]
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, alias = "active", skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: EntityId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiningTable {
    pub id: EntityId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_code: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: EntityId,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    /// `None` when the backend sends a role this client does not know.
    #[serde(default, deserialize_with = "lenient_role")]
    pub role: Option<Role>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Promotion {
    pub id: EntityId,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_type: Option<String>,
    #[serde(default, deserialize_with = "optional_amount", skip_serializing_if = "Option::is_none")]
    pub discount_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftAssignment {
    pub id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// `SCHEDULED`, `WORKING`, `COMPLETED`, ...
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Per-employee attendance figures. The backend's shape varies by endpoint,
/// so only the identifying fields are typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftStats {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// =============================================================================
// Forms
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemForm {
    pub name: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl MenuItemForm {
    #[must_use]
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self { name: name.into(), price, description: None, category_id: None, image_url: None }
    }
}

impl Validate for MenuItemForm {
    fn validate(&self) -> Result<(), ApiError> {
        require("name", &self.name)?;
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(ApiError::validation("price", "must be a non-negative number"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryForm {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Validate for CategoryForm {
    fn validate(&self) -> Result<(), ApiError> {
        require("name", &self.name)
    }
}

pub const TABLE_STATUSES: [&str; 3] = ["FREE", "OCCUPIED", "RESERVED"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableForm {
    pub name: String,
    pub status: String,
}

impl TableForm {
    /// A new table starts out free.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), status: "FREE".to_owned() }
    }
}

impl Validate for TableForm {
    fn validate(&self) -> Result<(), ApiError> {
        require("name", &self.name)?;
        if !TABLE_STATUSES.contains(&self.status.as_str()) {
            return Err(ApiError::validation("status", &format!("must be one of {}", TABLE_STATUSES.join(", "))));
        }
        Ok(())
    }
}

/// User create/update payload. The role goes out as `{ "name": "ADMIN" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserForm {
    pub username: String,
    /// Required on create, omitted on update.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(serialize_with = "role_object")]
    pub role: Role,
}

impl Validate for UserForm {
    fn validate(&self) -> Result<(), ApiError> {
        require("username", &self.username)?;
        if let Some(email) = &self.email {
            if !email.is_empty() && !email.contains('@') {
                return Err(ApiError::validation("email", "is not an email address"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DiscountType {
    Percent,
    Fixed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionForm {
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: f64,
    #[serde(serialize_with = "iso_date")]
    pub start_date: Date,
    #[serde(serialize_with = "iso_date")]
    pub end_date: Date,
    pub active: bool,
}

impl PromotionForm {
    /// Codes are stored uppercase.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.code = self.code.trim().to_ascii_uppercase();
        self
    }
}

impl Validate for PromotionForm {
    fn validate(&self) -> Result<(), ApiError> {
        require("code", &self.code)?;
        if !self.discount_value.is_finite() || self.discount_value <= 0.0 {
            return Err(ApiError::validation("discountValue", "must be greater than zero"));
        }
        if self.discount_type == DiscountType::Percent && self.discount_value > 100.0 {
            return Err(ApiError::validation("discountValue", "percent discount cannot exceed 100"));
        }
        if self.end_date < self.start_date {
            return Err(ApiError::validation("endDate", "must not be before start date"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftForm {
    pub name: String,
    /// `HH:MM`
    pub start_time: String,
    /// `HH:MM`
    pub end_time: String,
}

impl Validate for ShiftForm {
    fn validate(&self) -> Result<(), ApiError> {
        require("name", &self.name)?;
        require("startTime", &self.start_time)?;
        require("endTime", &self.end_time)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentForm {
    pub user_id: EntityId,
    pub shift_id: EntityId,
    #[serde(serialize_with = "iso_date")]
    pub date: Date,
}

impl AssignmentForm {
    /// Shifts cannot be assigned in the past.
    ///
    /// # Errors
    ///
    /// `ApiError::Validation` on `date` if it is before `today`.
    pub fn validate_as_of(&self, today: Date) -> Result<(), ApiError> {
        if self.date < today {
            return Err(ApiError::validation("date", "cannot assign a shift in the past"));
        }
        Ok(())
    }
}

impl Validate for AssignmentForm {
    fn validate(&self) -> Result<(), ApiError> {
        self.validate_as_of(today_utc())
    }
}

#[cfg(test)]
#[path = "models_test.rs"]
mod tests;
