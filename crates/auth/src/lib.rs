//! `sigma-auth`: session resolution and authentication operations.
//!
//! This crate turns identity-provider credential changes into an application
//! session (system user + optional doctor/police profile) and exposes the
//! sign-in, sign-up, logout, change-password and reset-password operations.
//!
//! The identity provider and the backend are reached only through the
//! [`IdentityProvider`] and [`ProfileApi`] traits.

pub mod api;
pub mod config;
pub mod credential;
pub mod handler;
pub mod navigator;
pub mod operations;
pub mod password;
pub mod provider;
pub mod resolver;
pub mod session;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use api::{ApiError, ProfileApi};
pub use config::{SessionConfig, SpecializationFailurePolicy};
pub use credential::Credential;
pub use handler::{AuthErrorHandler, ForceLogoutOnUnauthorized, IgnoreAuthErrors};
pub use navigator::{Navigator, NoopNavigator};
pub use operations::{ChangePasswordError, ResetPasswordError, SignInError};
pub use password::{ChangePasswordForm, PasswordFormError, PasswordPolicyError, PasswordViolation};
pub use provider::{IdentityProvider, ProviderError, ProviderErrorCode};
pub use resolver::{ResolutionState, ResolvedProfile, Resolver};
pub use session::{DisplayIdentity, ResolvedSession, SessionStore, SessionStoreBuilder};
