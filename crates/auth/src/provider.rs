//! Identity-provider boundary.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::watch;

use crate::credential::Credential;

/// Provider error codes the portal distinguishes.
///
/// Codes use the provider's `auth/<kebab-case>` spelling.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProviderErrorCode {
    InvalidEmail,
    UserNotFound,
    WrongPassword,
    InvalidCredential,
    WeakPassword,
    RequiresRecentLogin,
    TooManyRequests,
    EmailAlreadyInUse,
    UserDisabled,
    NetworkRequestFailed,
    Other(String),
}

impl ProviderErrorCode {
    pub fn from_code(code: &str) -> Self {
        match code {
            "auth/invalid-email" => Self::InvalidEmail,
            "auth/user-not-found" => Self::UserNotFound,
            "auth/wrong-password" => Self::WrongPassword,
            "auth/invalid-credential" => Self::InvalidCredential,
            "auth/weak-password" => Self::WeakPassword,
            "auth/requires-recent-login" => Self::RequiresRecentLogin,
            "auth/too-many-requests" => Self::TooManyRequests,
            "auth/email-already-in-use" => Self::EmailAlreadyInUse,
            "auth/user-disabled" => Self::UserDisabled,
            "auth/network-request-failed" => Self::NetworkRequestFailed,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::InvalidEmail => "auth/invalid-email",
            Self::UserNotFound => "auth/user-not-found",
            Self::WrongPassword => "auth/wrong-password",
            Self::InvalidCredential => "auth/invalid-credential",
            Self::WeakPassword => "auth/weak-password",
            Self::RequiresRecentLogin => "auth/requires-recent-login",
            Self::TooManyRequests => "auth/too-many-requests",
            Self::EmailAlreadyInUse => "auth/email-already-in-use",
            Self::UserDisabled => "auth/user-disabled",
            Self::NetworkRequestFailed => "auth/network-request-failed",
            Self::Other(code) => code,
        }
    }
}

impl core::fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw identity-provider failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("identity provider error ({code}): {message}")]
pub struct ProviderError {
    pub code: ProviderErrorCode,
    pub message: String,
}

impl ProviderError {
    pub fn new(code: ProviderErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<ProviderErrorCode> for ProviderError {
    fn from(code: ProviderErrorCode) -> Self {
        let message = code.as_str().to_string();
        Self { code, message }
    }
}

/// External identity provider (email/password accounts).
///
/// Credential changes are published through a `watch` channel: a fresh
/// receiver immediately observes the current credential, then every
/// login/logout. Token refreshes update the value without notifying.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Subscribe to credential changes.
    fn subscribe(&self) -> watch::Receiver<Option<Credential>>;

    /// The credential currently held by the provider, if any.
    fn current(&self) -> Option<Credential>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Credential, ProviderError>;

    async fn sign_up(&self, email: &str, password: &str) -> Result<Credential, ProviderError>;

    async fn sign_out(&self) -> Result<(), ProviderError>;

    /// Prove the holder of `credential` still knows the password.
    async fn reauthenticate(
        &self,
        credential: &Credential,
        email: &str,
        password: &str,
    ) -> Result<Credential, ProviderError>;

    async fn update_password(
        &self,
        credential: &Credential,
        new_password: &str,
    ) -> Result<(), ProviderError>;

    async fn send_password_reset(&self, email: &str) -> Result<(), ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for code in [
            "auth/invalid-email",
            "auth/user-not-found",
            "auth/wrong-password",
            "auth/weak-password",
            "auth/requires-recent-login",
            "auth/too-many-requests",
        ] {
            assert_eq!(ProviderErrorCode::from_code(code).as_str(), code);
        }
    }

    #[test]
    fn unknown_codes_are_preserved() {
        let code = ProviderErrorCode::from_code("auth/quota-exceeded");
        assert_eq!(code, ProviderErrorCode::Other("auth/quota-exceeded".to_string()));
        assert_eq!(code.to_string(), "auth/quota-exceeded");
    }
}
