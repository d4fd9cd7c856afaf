//! Domain types for the user and driver collections.
//!
//! Every user-supplied field is an `Option<String>`; absent values read as
//! the empty string through the accessor methods. All types are
//! serializable via serde (`camelCase` on the wire, matching the documents).

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The role value that marks a user as a driver (compared case-insensitively).
pub const DRIVER_ROLE: &str = "driver";

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Opaque identifier of a user document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Store-assigned identifier of a driver document.
///
/// Distinct from [`UserId`]: driver documents are found by querying their
/// `driverId` field, never by this key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub String);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for DocumentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for DocumentId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Lifecycle status of a driver document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DriverStatus {
    #[default]
    Active,
    Inactive,
}

impl fmt::Display for DriverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverStatus::Active => write!(f, "active"),
            DriverStatus::Inactive => write!(f, "inactive"),
        }
    }
}

// ---------------------------------------------------------------------------
// User collection
// ---------------------------------------------------------------------------

/// A document from the primary `users` collection. Owned by an external
/// actor; the sync engine only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct UserRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl UserRecord {
    /// Lowercased role; absent reads as `""`.
    pub fn role(&self) -> String {
        self.role.as_deref().unwrap_or_default().to_lowercase()
    }

    pub fn is_driver(&self) -> bool {
        is_driver_role(self.role.as_deref().unwrap_or_default())
    }

    pub fn email(&self) -> &str {
        self.email.as_deref().unwrap_or_default()
    }

    pub fn phone(&self) -> &str {
        self.phone.as_deref().unwrap_or_default()
    }

    /// `"<first> <last>"` with surrounding whitespace trimmed.
    pub fn display_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or_default(),
            self.last_name.as_deref().unwrap_or_default()
        )
        .trim()
        .to_string()
    }

    /// Project this user onto the fields a driver document tracks.
    pub fn profile(&self) -> DriverProfile {
        DriverProfile {
            name: self.display_name(),
            email: self.email().to_string(),
            phone: self.phone().to_string(),
        }
    }
}

/// Case-insensitive check against [`DRIVER_ROLE`].
pub fn is_driver_role(role: &str) -> bool {
    role.eq_ignore_ascii_case(DRIVER_ROLE)
}

/// The three user fields mirrored onto a driver document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DriverProfile {
    pub name: String,
    pub email: String,
    pub phone: String,
}

// ---------------------------------------------------------------------------
// Driver collection
// ---------------------------------------------------------------------------

/// A document from the derived `drivers` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverRecord {
    /// Foreign key to the owning user.
    pub driver_id: UserId,
    pub driver_name: String,
    pub driver_email: String,
    pub driver_phone: String,
    #[serde(default)]
    pub assigned_bus_number: String,
    #[serde(default)]
    pub assigned_route: String,
    pub status: DriverStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A driver record together with its document id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverDocument {
    pub id: DocumentId,
    #[serde(flatten)]
    pub record: DriverRecord,
}

/// Insert payload for a driver document. The store assigns the document id
/// and both timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDriver {
    pub driver_id: UserId,
    pub profile: DriverProfile,
    pub assigned_bus_number: String,
    pub assigned_route: String,
    pub status: DriverStatus,
}

impl NewDriver {
    /// An active driver with empty bus and route assignments.
    pub fn active(driver_id: UserId, profile: DriverProfile) -> Self {
        Self {
            driver_id,
            profile,
            assigned_bus_number: String::new(),
            assigned_route: String::new(),
            status: DriverStatus::Active,
        }
    }
}

/// Partial update of a driver document. `None` fields are left untouched;
/// `updatedAt` is refreshed by the store on every applied patch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DriverPatch {
    pub driver_name: Option<String>,
    pub driver_email: Option<String>,
    pub driver_phone: Option<String>,
    pub assigned_bus_number: Option<String>,
    pub assigned_route: Option<String>,
    pub status: Option<DriverStatus>,
}

impl DriverPatch {
    /// Overwrite all three profile fields.
    pub fn profile(profile: &DriverProfile) -> Self {
        Self {
            driver_name: Some(profile.name.clone()),
            driver_email: Some(profile.email.clone()),
            driver_phone: Some(profile.phone.clone()),
            ..Self::default()
        }
    }

    pub fn status(status: DriverStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: DriverStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Copy every set field onto `record`. Timestamps are the caller's job.
    pub fn apply_to(&self, record: &mut DriverRecord) {
        if let Some(name) = &self.driver_name {
            record.driver_name.clone_from(name);
        }
        if let Some(email) = &self.driver_email {
            record.driver_email.clone_from(email);
        }
        if let Some(phone) = &self.driver_phone {
            record.driver_phone.clone_from(phone);
        }
        if let Some(bus) = &self.assigned_bus_number {
            record.assigned_bus_number.clone_from(bus);
        }
        if let Some(route) = &self.assigned_route {
            record.assigned_route.clone_from(route);
        }
        if let Some(status) = self.status {
            record.status = status;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
