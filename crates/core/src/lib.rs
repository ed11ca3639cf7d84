//! `sigma-core`: domain foundation shared by every portal crate.
//!
//! This crate contains **pure domain** types (no IO, no async): identifiers,
//! the user/profile data model and the domain error.

pub mod error;
pub mod id;
pub mod session_user;
pub mod user;

pub use error::{DomainError, DomainResult};
pub use id::{FirebaseUid, RecruitmentId, UserId};
pub use session_user::{LegacyUser, SessionUser, Specialization};
pub use user::{Capability, DoctorProfile, PoliceProfile, SystemUser, UserRole};
