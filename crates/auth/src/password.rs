//! Client-side password checks run before any provider call.

use thiserror::Error;

/// Minimum length of a new password.
pub const MIN_PASSWORD_LEN: usize = 6;

/// A single strength rule a password breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordViolation {
    TooShort,
    MissingLowercase,
    MissingUppercase,
    MissingDigit,
}

impl PasswordViolation {
    pub fn user_message(&self) -> &'static str {
        match self {
            PasswordViolation::TooShort => "La contraseña debe tener al menos 6 caracteres",
            PasswordViolation::MissingLowercase => {
                "La contraseña debe contener al menos una letra minúscula"
            }
            PasswordViolation::MissingUppercase => {
                "La contraseña debe contener al menos una letra mayúscula"
            }
            PasswordViolation::MissingDigit => "La contraseña debe contener al menos un número",
        }
    }
}

/// Every strength rule a password breaks, in rule order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("weak password: {violations:?}")]
pub struct PasswordPolicyError {
    pub violations: Vec<PasswordViolation>,
}

impl PasswordPolicyError {
    /// Violation messages joined by `". "`.
    pub fn user_message(&self) -> String {
        self.violations
            .iter()
            .map(PasswordViolation::user_message)
            .collect::<Vec<_>>()
            .join(". ")
    }
}

pub fn check_strength(password: &str) -> Result<(), PasswordPolicyError> {
    let mut violations = Vec::new();
    if password.chars().count() < MIN_PASSWORD_LEN {
        violations.push(PasswordViolation::TooShort);
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        violations.push(PasswordViolation::MissingLowercase);
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        violations.push(PasswordViolation::MissingUppercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        violations.push(PasswordViolation::MissingDigit);
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(PasswordPolicyError { violations })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordFormError {
    #[error("current password is required")]
    MissingCurrent,
    #[error("new password is required")]
    MissingNew,
    #[error("password confirmation is required")]
    MissingConfirmation,
    #[error("new password and confirmation differ")]
    ConfirmationMismatch,
    #[error("new password equals the current one")]
    SameAsCurrent,
    #[error(transparent)]
    Weak(#[from] PasswordPolicyError),
}

impl PasswordFormError {
    pub fn user_message(&self) -> String {
        match self {
            PasswordFormError::MissingCurrent => "Por favor ingresa tu contraseña actual".to_string(),
            PasswordFormError::MissingNew => "Por favor ingresa una nueva contraseña".to_string(),
            PasswordFormError::MissingConfirmation => {
                "Por favor confirma tu nueva contraseña".to_string()
            }
            PasswordFormError::ConfirmationMismatch => {
                "Las contraseñas nuevas no coinciden".to_string()
            }
            PasswordFormError::SameAsCurrent => {
                "La nueva contraseña debe ser diferente a la actual".to_string()
            }
            PasswordFormError::Weak(policy) => policy.user_message(),
        }
    }
}

/// The change-password form as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangePasswordForm {
    pub current: String,
    pub new: String,
    pub confirm: String,
}

impl ChangePasswordForm {
    pub fn new(
        current: impl Into<String>,
        new: impl Into<String>,
        confirm: impl Into<String>,
    ) -> Self {
        Self {
            current: current.into(),
            new: new.into(),
            confirm: confirm.into(),
        }
    }

    /// First failing check wins; strength violations are reported together.
    pub fn validate(&self) -> Result<(), PasswordFormError> {
        if self.current.is_empty() {
            return Err(PasswordFormError::MissingCurrent);
        }
        if self.new.is_empty() {
            return Err(PasswordFormError::MissingNew);
        }
        if self.confirm.is_empty() {
            return Err(PasswordFormError::MissingConfirmation);
        }
        if self.new != self.confirm {
            return Err(PasswordFormError::ConfirmationMismatch);
        }
        validate_change(&self.current, &self.new)
    }
}

/// Same-password and strength checks for a `(current, new)` pair.
pub fn validate_change(current: &str, new: &str) -> Result<(), PasswordFormError> {
    if current == new {
        return Err(PasswordFormError::SameAsCurrent);
    }
    check_strength(new)?;
    Ok(())
}
