//! Shared handling of backend authentication failures.

use std::sync::Arc;

use async_trait::async_trait;

use crate::api::ApiError;
use crate::provider::IdentityProvider;

/// Inspects a terminal profile-fetch failure; may end the session.
#[async_trait]
pub trait AuthErrorHandler: Send + Sync {
    async fn handle(&self, error: &ApiError);
}

/// Signs the account out when the backend rejected its credential.
pub struct ForceLogoutOnUnauthorized {
    provider: Arc<dyn IdentityProvider>,
}

impl ForceLogoutOnUnauthorized {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl AuthErrorHandler for ForceLogoutOnUnauthorized {
    async fn handle(&self, error: &ApiError) {
        if !error.is_auth_failure() {
            return;
        }

        tracing::warn!(error = %error, "backend rejected credential; forcing sign-out");
        if let Err(e) = self.provider.sign_out().await {
            tracing::error!(error = %e, "forced sign-out failed");
        }
    }
}

/// Leaves the session alone whatever the failure.
#[derive(Debug, Default, Clone, Copy)]
pub struct IgnoreAuthErrors;

#[async_trait]
impl AuthErrorHandler for IgnoreAuthErrors {
    async fn handle(&self, _error: &ApiError) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{credential, FakeIdentityProvider};

    #[tokio::test]
    async fn unauthorized_signs_out() {
        let provider = Arc::new(FakeIdentityProvider::new());
        provider.set_credential(Some(credential("fb-1")));

        let handler = ForceLogoutOnUnauthorized::new(provider.clone());
        handler.handle(&ApiError::Unauthorized(401)).await;

        assert!(provider.current().is_none());
    }

    #[tokio::test]
    async fn other_failures_keep_the_credential() {
        let provider = Arc::new(FakeIdentityProvider::new());
        provider.set_credential(Some(credential("fb-1")));

        let handler = ForceLogoutOnUnauthorized::new(provider.clone());
        handler.handle(&ApiError::Network("connection reset".to_string())).await;

        assert!(provider.current().is_some());
    }
}
