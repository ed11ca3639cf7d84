//! The user behind a session, and its specialization.
//!
//! A session's user comes from one of two places: the backend's system-user
//! record, or (for accounts that predate it) a legacy doctor record from which
//! a system user is synthesized. Both are modeled explicitly so callers never
//! guess which fields are present.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{FirebaseUid, UserId};
use crate::user::{DoctorProfile, PoliceProfile, SystemUser, UserRole};

/// A doctor known only through the legacy lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyUser {
    pub firebase_uid: FirebaseUid,
    pub doctor: DoctorProfile,
    /// When the legacy record was fetched; stands in for both timestamps.
    pub fetched_at: DateTime<Utc>,
}

impl LegacyUser {
    pub fn new(firebase_uid: FirebaseUid, doctor: DoctorProfile, fetched_at: DateTime<Utc>) -> Self {
        Self {
            firebase_uid,
            doctor,
            fetched_at,
        }
    }

    /// Synthesize the system-user view of a legacy doctor.
    pub fn to_system_user(&self) -> SystemUser {
        SystemUser {
            user_id: UserId::from(self.firebase_uid.clone()),
            firebase_uid: self.firebase_uid.clone(),
            name: self.doctor.name.clone(),
            dni: self.doctor.dni.clone(),
            email: self.doctor.email.clone(),
            role: UserRole::Doctor,
            enabled: self.doctor.enabled,
            is_admin: self.doctor.is_admin,
            created_at: self.fetched_at,
            updated_at: self.fetched_at,
        }
    }
}

/// Where the session's user record came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum SessionUser {
    System(SystemUser),
    LegacySynthetic(LegacyUser),
}

impl SessionUser {
    pub fn role(&self) -> UserRole {
        match self {
            SessionUser::System(user) => user.role,
            SessionUser::LegacySynthetic(_) => UserRole::Doctor,
        }
    }

    pub fn is_admin(&self) -> bool {
        match self {
            SessionUser::System(user) => user.is_admin,
            SessionUser::LegacySynthetic(legacy) => legacy.doctor.is_admin,
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, SessionUser::LegacySynthetic(_))
    }

    /// The system-user view, synthesized for legacy accounts.
    pub fn to_system_user(&self) -> SystemUser {
        match self {
            SessionUser::System(user) => user.clone(),
            SessionUser::LegacySynthetic(legacy) => legacy.to_system_user(),
        }
    }
}

impl From<SystemUser> for SessionUser {
    fn from(value: SystemUser) -> Self {
        SessionUser::System(value)
    }
}

impl From<LegacyUser> for SessionUser {
    fn from(value: LegacyUser) -> Self {
        SessionUser::LegacySynthetic(value)
    }
}

/// Role-specific profile; at most one exists per session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Specialization {
    Doctor(DoctorProfile),
    Police(PoliceProfile),
}

impl Specialization {
    pub fn role(&self) -> UserRole {
        match self {
            Specialization::Doctor(_) => UserRole::Doctor,
            Specialization::Police(_) => UserRole::Police,
        }
    }

    pub fn doctor(&self) -> Option<&DoctorProfile> {
        match self {
            Specialization::Doctor(doctor) => Some(doctor),
            Specialization::Police(_) => None,
        }
    }

    pub fn police(&self) -> Option<&PoliceProfile> {
        match self {
            Specialization::Police(police) => Some(police),
            Specialization::Doctor(_) => None,
        }
    }

    pub fn is_admin(&self) -> bool {
        match self {
            Specialization::Doctor(doctor) => doctor.is_admin,
            Specialization::Police(police) => police.is_admin,
        }
    }
}
