//! User and specialization profiles as served by the backend.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{FirebaseUid, UserId};

/// Role of a system user.
///
/// Unknown role strings from the backend collapse into [`UserRole::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Doctor,
    Police,
    #[serde(other)]
    Other,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Doctor => "doctor",
            UserRole::Police => "police",
            UserRole::Other => "other",
        }
    }

    /// Roles that carry a specialization profile.
    pub fn is_specialized(&self) -> bool {
        matches!(self, UserRole::Doctor | UserRole::Police)
    }
}

impl core::fmt::Display for UserRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extra capability granted on top of a role (e.g. `recruiter`).
///
/// Capabilities are opaque strings at this layer; guards decide what they mean.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capability(Cow<'static, str>);

impl Capability {
    /// Permits reviewing recruitment submissions.
    pub const RECRUITER: Capability = Capability(Cow::Borrowed("recruiter"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Capability {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonical backend profile, independent of specialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemUser {
    pub user_id: UserId,
    pub firebase_uid: FirebaseUid,
    pub name: String,
    pub dni: String,
    pub email: String,
    pub role: UserRole,
    pub enabled: bool,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

/// Doctor-specific profile.
///
/// Legacy records may omit `is_admin` and `roles`; both default to empty/false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoctorProfile {
    pub name: String,
    pub dni: String,
    pub email: String,
    pub enabled: bool,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub roles: Vec<Capability>,
}

impl DoctorProfile {
    /// Minimal doctor identity built from fields the system user already has.
    ///
    /// Capabilities are not part of the system user record, so none are granted.
    pub fn degraded_from(user: &SystemUser) -> Self {
        Self {
            name: user.name.clone(),
            dni: user.dni.clone(),
            email: user.email.clone(),
            enabled: user.enabled,
            is_admin: user.is_admin,
            roles: Vec::new(),
        }
    }

    pub fn has_capability(&self, capability: &Capability) -> bool {
        self.roles.contains(capability)
    }
}

/// Police-specific profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoliceProfile {
    pub name: String,
    pub dni: String,
    pub email: String,
    pub enabled: bool,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub badge_number: Option<String>,
    #[serde(default)]
    pub rank: Option<String>,
    #[serde(default)]
    pub roles: Vec<Capability>,
}

impl PoliceProfile {
    /// Minimal police identity built from the system user (no badge, no rank).
    pub fn degraded_from(user: &SystemUser) -> Self {
        Self {
            name: user.name.clone(),
            dni: user.dni.clone(),
            email: user.email.clone(),
            enabled: user.enabled,
            is_admin: user.is_admin,
            badge_number: None,
            rank: None,
            roles: Vec::new(),
        }
    }

    pub fn has_capability(&self, capability: &Capability) -> bool {
        self.roles.contains(capability)
    }
}

/// Backend timestamps are ISO-8601, sometimes without an offset (naive = UTC).
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    pub fn parse(raw: &str) -> Result<DateTime<Utc>, String> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Ok(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|e| format!("invalid timestamp '{raw}': {e}"))
    }

    /// Optional timestamps; `null` and a missing field both read as `None`
    /// when paired with `#[serde(default)]`.
    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match value {
                Some(dt) => serializer.serialize_str(&dt.to_rfc3339()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
        where
            D: Deserializer<'de>,
        {
            Option::<String>::deserialize(deserializer)?
                .map(|raw| super::parse(&raw).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}
