//! User Entity
//!
//! Storefront customer and staff accounts. Each user holds exactly one role;
//! super-admin is a capability granted from configuration and never stored.

use std::fmt;
use std::str::FromStr;

use bson::oid::ObjectId;
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Stored user role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Registered customer
    #[default]
    User,
    /// Delivery staff
    Courier,
    /// Store manager
    Manager,
    /// Administrator
    Admin,
}

impl UserRole {
    pub const ALL: [UserRole; 4] = [Self::User, Self::Courier, Self::Manager, Self::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Courier => "courier",
            Self::Manager => "manager",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "courier" => Ok(Self::Courier),
            "manager" => Ok(Self::Manager),
            "admin" => Ok(Self::Admin),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

/// User identity key (MongoDB ObjectId).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(ObjectId);

impl UserId {
    pub fn new() -> Self {
        Self(ObjectId::new())
    }

    /// Parse a 24-character hex key. Anything else is rejected.
    pub fn parse(value: &str) -> Option<Self> {
        if value.len() != 24 {
            return None;
        }
        ObjectId::parse_str(value).ok().map(Self)
    }

    pub fn as_object_id(&self) -> &ObjectId {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_hex())
    }
}

impl From<ObjectId> for UserId {
    fn from(value: ObjectId) -> Self {
        Self(value)
    }
}

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: UserId,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Email address (unique, used for session resolution)
    pub email: String,

    /// Avatar URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub street_address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    /// Current role. A missing or null `role` reads as `user`.
    #[serde(default, deserialize_with = "role_or_default")]
    pub role: UserRole,

    #[serde(with = "chrono_datetime_as_bson_datetime", default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime", default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

fn role_or_default<'de, D>(deserializer: D) -> Result<UserRole, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<UserRole>::deserialize(deserializer)?.unwrap_or_default())
}

impl User {
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            name: name.into(),
            email: normalize_email(&email.into()),
            image: None,
            phone: None,
            street_address: None,
            postal_code: None,
            city: None,
            country: None,
            role: UserRole::User,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_role(mut self, role: UserRole) -> Self {
        self.role = role;
        self
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn set_role(&mut self, role: UserRole) {
        self.role = role;
        self.updated_at = Utc::now();
    }
}

/// Partial update of the self-service profile fields.
///
/// `email` and `role` are deliberately absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub image: Option<String>,
    pub phone: Option<String>,
    pub street_address: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.image.is_none()
            && self.phone.is_none()
            && self.street_address.is_none()
            && self.postal_code.is_none()
            && self.city.is_none()
            && self.country.is_none()
    }

    pub fn apply_to(&self, user: &mut User) {
        if let Some(name) = &self.name {
            user.name = name.clone();
        }
        if let Some(image) = &self.image {
            user.image = Some(image.clone());
        }
        if let Some(phone) = &self.phone {
            user.phone = Some(phone.clone());
        }
        if let Some(street) = &self.street_address {
            user.street_address = Some(street.clone());
        }
        if let Some(postal) = &self.postal_code {
            user.postal_code = Some(postal.clone());
        }
        if let Some(city) = &self.city {
            user.city = Some(city.clone());
        }
        if let Some(country) = &self.country {
            user.country = Some(country.clone());
        }
        user.updated_at = Utc::now();
    }
}

/// Emails are compared case-insensitively everywhere.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
