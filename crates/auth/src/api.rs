//! Backend profile API boundary.

use async_trait::async_trait;
use thiserror::Error;

use sigma_core::{DoctorProfile, PoliceProfile, SystemUser};

use crate::credential::Credential;

/// Failure of a backend call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The backend rejected the credential (401/403).
    #[error("unauthorized ({0})")]
    Unauthorized(u16),
    #[error("not found")]
    NotFound,
    #[error("API error ({0}): {1}")]
    Status(u16, String),
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}")]
    Decode(String),
}

impl ApiError {
    /// Map a non-success HTTP status to an error.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        match status {
            401 | 403 => ApiError::Unauthorized(status),
            404 => ApiError::NotFound,
            _ => ApiError::Status(status, body.into()),
        }
    }

    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }
}

/// Profile lookups for the account behind a credential.
#[async_trait]
pub trait ProfileApi: Send + Sync {
    /// The system-level profile.
    async fn current_user(&self, credential: &Credential) -> Result<SystemUser, ApiError>;

    /// The doctor profile (also the legacy, doctor-only lookup).
    async fn current_doctor(&self, credential: &Credential) -> Result<DoctorProfile, ApiError>;

    async fn current_police(&self, credential: &Credential) -> Result<PoliceProfile, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(ApiError::from_status(401, ""), ApiError::Unauthorized(401));
        assert_eq!(ApiError::from_status(403, ""), ApiError::Unauthorized(403));
        assert_eq!(ApiError::from_status(404, "nope"), ApiError::NotFound);
        assert_eq!(
            ApiError::from_status(502, "bad gateway"),
            ApiError::Status(502, "bad gateway".to_string())
        );
        assert!(ApiError::Unauthorized(401).is_auth_failure());
        assert!(!ApiError::NotFound.is_auth_failure());
    }
}
