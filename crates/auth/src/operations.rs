//! Account operations exposed alongside the session.
//!
//! Each talks to the identity provider directly; the session itself is
//! repopulated through the credential subscription. The only exception is a
//! password change, which copies the provider's refreshed token.

use thiserror::Error;

use crate::credential::Credential;
use crate::password::{ChangePasswordForm, PasswordFormError, validate_change};
use crate::provider::{ProviderError, ProviderErrorCode};
use crate::session::SessionStore;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignInError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("user not found")]
    UserNotFound,
    #[error("wrong password")]
    WrongPassword,
    #[error("sign-in failed: {0}")]
    AuthError(ProviderError),
}

impl From<ProviderError> for SignInError {
    fn from(error: ProviderError) -> Self {
        match error.code {
            ProviderErrorCode::InvalidEmail | ProviderErrorCode::InvalidCredential => {
                SignInError::InvalidCredentials
            }
            ProviderErrorCode::UserNotFound => SignInError::UserNotFound,
            ProviderErrorCode::WrongPassword => SignInError::WrongPassword,
            _ => SignInError::AuthError(error),
        }
    }
}

impl SignInError {
    pub fn user_message(&self) -> &'static str {
        match self {
            SignInError::InvalidCredentials => "Correo electrónico o contraseña inválidos",
            SignInError::UserNotFound => "Usuario no encontrado",
            SignInError::WrongPassword => "Contraseña incorrecta",
            SignInError::AuthError(_) => "Error al iniciar sesión. Inténtalo de nuevo.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChangePasswordError {
    #[error(transparent)]
    Invalid(#[from] PasswordFormError),
    #[error("no authenticated user")]
    NotAuthenticated,
    #[error("current password is wrong")]
    WrongCurrentPassword,
    #[error("new password is too weak")]
    WeakNewPassword,
    #[error("recent sign-in required")]
    ReauthenticationRequired,
    #[error("password change failed: {0}")]
    ChangePasswordFailed(ProviderError),
}

impl From<ProviderError> for ChangePasswordError {
    fn from(error: ProviderError) -> Self {
        match error.code {
            ProviderErrorCode::WrongPassword | ProviderErrorCode::InvalidCredential => {
                ChangePasswordError::WrongCurrentPassword
            }
            ProviderErrorCode::WeakPassword => ChangePasswordError::WeakNewPassword,
            ProviderErrorCode::RequiresRecentLogin => ChangePasswordError::ReauthenticationRequired,
            _ => ChangePasswordError::ChangePasswordFailed(error),
        }
    }
}

impl ChangePasswordError {
    pub fn user_message(&self) -> String {
        match self {
            ChangePasswordError::Invalid(form) => form.user_message(),
            ChangePasswordError::NotAuthenticated => "No hay usuario autenticado".to_string(),
            ChangePasswordError::WrongCurrentPassword => {
                "La contraseña actual es incorrecta".to_string()
            }
            ChangePasswordError::WeakNewPassword => "La nueva contraseña es muy débil".to_string(),
            ChangePasswordError::ReauthenticationRequired => {
                "Por seguridad, necesitas iniciar sesión nuevamente antes de cambiar tu contraseña"
                    .to_string()
            }
            ChangePasswordError::ChangePasswordFailed(_) => {
                "Error al cambiar la contraseña. Inténtalo de nuevo.".to_string()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResetPasswordError {
    #[error("email is required")]
    MissingEmail,
    #[error("no account for this email")]
    UserNotFound,
    #[error("invalid email")]
    InvalidEmail,
    #[error("too many requests")]
    TooManyRequests,
    #[error("password reset failed: {0}")]
    ResetFailed(ProviderError),
}

impl From<ProviderError> for ResetPasswordError {
    fn from(error: ProviderError) -> Self {
        match error.code {
            ProviderErrorCode::UserNotFound => ResetPasswordError::UserNotFound,
            ProviderErrorCode::InvalidEmail => ResetPasswordError::InvalidEmail,
            ProviderErrorCode::TooManyRequests => ResetPasswordError::TooManyRequests,
            _ => ResetPasswordError::ResetFailed(error),
        }
    }
}

impl ResetPasswordError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ResetPasswordError::MissingEmail => "Por favor ingresa tu correo electrónico",
            ResetPasswordError::UserNotFound => {
                "No se encontró una cuenta con este correo electrónico"
            }
            ResetPasswordError::InvalidEmail => "El correo electrónico no es válido",
            ResetPasswordError::TooManyRequests => {
                "Demasiados intentos. Espera un momento antes de intentar nuevamente"
            }
            ResetPasswordError::ResetFailed(_) => {
                "Error al enviar el correo de recuperación. Inténtalo de nuevo."
            }
        }
    }
}

impl SessionStore {
    /// Sign in and go home. The session repopulates from the credential event.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Credential, SignInError> {
        let credential = self
            .inner
            .provider
            .sign_in(email, password)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "sign-in rejected");
                SignInError::from(e)
            })?;

        tracing::info!(uid = %credential.uid, "signed in");
        self.inner.navigator.navigate(&self.inner.config.home_route);
        Ok(credential)
    }

    /// Create an account; provider errors are returned unchanged.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Credential, ProviderError> {
        let credential = self.inner.provider.sign_up(email, password).await.map_err(|e| {
            tracing::warn!(error = %e, "sign-up rejected");
            e
        })?;
        tracing::info!(uid = %credential.uid, "account created");
        Ok(credential)
    }

    /// Revoke the credential, clear the session and go to the login view.
    ///
    /// The session is cleared even if the provider call fails. In-flight
    /// resolutions are not cancelled; they are discarded when they complete.
    pub async fn logout(&self) {
        if let Err(e) = self.inner.provider.sign_out().await {
            tracing::error!(error = %e, "error signing out");
        }
        self.inner.clear();
        tracing::info!("signed out");
        self.inner.navigator.navigate(&self.inner.config.login_route);
    }

    /// Reauthenticate with `current`, then set `new`.
    ///
    /// Same-password and strength checks run before any provider call.
    pub async fn change_password(&self, current: &str, new: &str) -> Result<(), ChangePasswordError> {
        validate_change(current, new)?;

        let Some(credential) = self.snapshot().credential else {
            return Err(ChangePasswordError::NotAuthenticated);
        };
        let Some(email) = credential.email.clone() else {
            tracing::warn!(uid = %credential.uid, "credential carries no email; cannot reauthenticate");
            return Err(ChangePasswordError::NotAuthenticated);
        };

        let provider = &self.inner.provider;
        let result = async {
            let refreshed = provider.reauthenticate(&credential, &email, current).await?;
            provider.update_password(&refreshed, new).await
        }
        .await;

        match result {
            Ok(()) => {
                self.refresh_credential();
                tracing::info!(uid = %credential.uid, "password changed");
                Ok(())
            }
            Err(e) => {
                tracing::error!(uid = %credential.uid, error = %e, "error changing password");
                Err(e.into())
            }
        }
    }

    /// Validate the full form (presence, confirmation), then change the password.
    pub async fn change_password_form(&self, form: &ChangePasswordForm) -> Result<(), ChangePasswordError> {
        form.validate()?;
        self.change_password(&form.current, &form.new).await
    }

    pub async fn reset_password(&self, email: &str) -> Result<(), ResetPasswordError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(ResetPasswordError::MissingEmail);
        }

        match self.inner.provider.send_password_reset(email).await {
            Ok(()) => {
                tracing::info!("password reset email sent");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "error sending password reset email");
                Err(e.into())
            }
        }
    }
}
