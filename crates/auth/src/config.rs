//! Session resolution settings.

use std::time::Duration;

use sigma_core::UserRole;

/// Minimum time the loading flag stays raised after a credential change.
///
/// Smooths UI flicker on fast networks; not a correctness requirement.
pub const DEFAULT_MIN_LOADING_DURATION: Duration = Duration::from_millis(500);

/// What to do when a role's specialization profile cannot be fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpecializationFailurePolicy {
    /// Synthesize a minimal profile from the system user.
    Degrade,
    /// Leave both specialization profiles empty.
    Clear,
    /// Degrade doctors, clear police.
    #[default]
    ByRole,
}

impl SpecializationFailurePolicy {
    pub fn degrades(&self, role: UserRole) -> bool {
        match self {
            SpecializationFailurePolicy::Degrade => true,
            SpecializationFailurePolicy::Clear => false,
            SpecializationFailurePolicy::ByRole => role == UserRole::Doctor,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "degrade" => Some(Self::Degrade),
            "clear" => Some(Self::Clear),
            "by-role" | "by_role" => Some(Self::ByRole),
            _ => None,
        }
    }
}

/// Settings for a [`crate::SessionStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub min_loading_duration: Duration,
    pub on_specialization_fetch_failure: SpecializationFailurePolicy,
    /// Where a successful sign-in lands.
    pub home_route: String,
    /// Where logout lands.
    pub login_route: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            min_loading_duration: DEFAULT_MIN_LOADING_DURATION,
            on_specialization_fetch_failure: SpecializationFailurePolicy::default(),
            home_route: "/".to_string(),
            login_route: "/login".to_string(),
        }
    }
}

impl SessionConfig {
    pub fn with_min_loading_duration(mut self, duration: Duration) -> Self {
        self.min_loading_duration = duration;
        self
    }

    pub fn with_specialization_policy(mut self, policy: SpecializationFailurePolicy) -> Self {
        self.on_specialization_fetch_failure = policy;
        self
    }
}
