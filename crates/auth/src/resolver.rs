//! Profile resolution pipeline.
//!
//! Resolving a credential is a small finite-state machine:
//!
//! ```text
//! Idle ──► FetchingProfile ──ok(doctor|police)──► FetchingSpecialization ──► Resolved
//!                 │            └─ok(other)─────────────────────────────────► Resolved
//!                 └─err──► FallbackLegacy ──ok──► Resolved
//!                                    └─err──► Failed
//! ```
//!
//! Every fetch failure is absorbed here; nothing propagates to the caller.

use chrono::Utc;

use sigma_core::{
    DoctorProfile, LegacyUser, PoliceProfile, SessionUser, Specialization, SystemUser, UserRole,
};

use crate::api::{ApiError, ProfileApi};
use crate::config::SpecializationFailurePolicy;
use crate::credential::Credential;
use crate::handler::AuthErrorHandler;

/// User and specialization produced by a resolution.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolvedProfile {
    pub user: Option<SessionUser>,
    pub specialization: Option<Specialization>,
}

impl ResolvedProfile {
    fn system(user: SystemUser, specialization: Option<Specialization>) -> Self {
        Self {
            user: Some(SessionUser::System(user)),
            specialization,
        }
    }
}

/// States of a single resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionState {
    Idle,
    FetchingProfile,
    FetchingSpecialization(SystemUser),
    FallbackLegacy,
    Resolved(ResolvedProfile),
    Failed(ApiError),
}

impl ResolutionState {
    pub fn name(&self) -> &'static str {
        match self {
            ResolutionState::Idle => "idle",
            ResolutionState::FetchingProfile => "fetching_profile",
            ResolutionState::FetchingSpecialization(_) => "fetching_specialization",
            ResolutionState::FallbackLegacy => "fallback_legacy",
            ResolutionState::Resolved(_) => "resolved",
            ResolutionState::Failed(_) => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ResolutionState::Resolved(_) | ResolutionState::Failed(_))
    }
}

/// Drives one credential through the resolution states.
pub struct Resolver<'a> {
    api: &'a dyn ProfileApi,
    error_handler: &'a dyn AuthErrorHandler,
    policy: SpecializationFailurePolicy,
}

impl<'a> Resolver<'a> {
    pub fn new(
        api: &'a dyn ProfileApi,
        error_handler: &'a dyn AuthErrorHandler,
        policy: SpecializationFailurePolicy,
    ) -> Self {
        Self {
            api,
            error_handler,
            policy,
        }
    }

    /// Run to completion. An absent credential resolves to nothing without any call.
    pub async fn resolve(&self, credential: Option<&Credential>) -> ResolvedProfile {
        let Some(credential) = credential else {
            return ResolvedProfile::default();
        };

        let mut state = ResolutionState::Idle;
        loop {
            state = match self.step(state, credential).await {
                ResolutionState::Resolved(profile) => return profile,
                ResolutionState::Failed(_) => return ResolvedProfile::default(),
                next => next,
            };
        }
    }

    /// Perform one transition. Terminal states are returned unchanged.
    pub async fn step(&self, state: ResolutionState, credential: &Credential) -> ResolutionState {
        let from = state.name();
        let next = match state {
            ResolutionState::Idle => ResolutionState::FetchingProfile,
            ResolutionState::FetchingProfile => self.fetch_profile(credential).await,
            ResolutionState::FetchingSpecialization(user) => {
                self.fetch_specialization(credential, user).await
            }
            ResolutionState::FallbackLegacy => self.fetch_legacy(credential).await,
            terminal @ (ResolutionState::Resolved(_) | ResolutionState::Failed(_)) => terminal,
        };

        tracing::debug!(uid = %credential.uid, from, to = next.name(), "resolution step");
        next
    }

    async fn fetch_profile(&self, credential: &Credential) -> ResolutionState {
        match self.api.current_user(credential).await {
            Ok(user) if user.role.is_specialized() => ResolutionState::FetchingSpecialization(user),
            Ok(user) => ResolutionState::Resolved(ResolvedProfile::system(user, None)),
            Err(e) => {
                tracing::warn!(
                    uid = %credential.uid,
                    error = %e,
                    "system user lookup failed; falling back to legacy doctor lookup"
                );
                ResolutionState::FallbackLegacy
            }
        }
    }

    async fn fetch_specialization(&self, credential: &Credential, user: SystemUser) -> ResolutionState {
        let fetched = match user.role {
            UserRole::Doctor => self
                .api
                .current_doctor(credential)
                .await
                .map(Specialization::Doctor),
            UserRole::Police => self
                .api
                .current_police(credential)
                .await
                .map(Specialization::Police),
            UserRole::Other => return ResolutionState::Resolved(ResolvedProfile::system(user, None)),
        };

        match fetched {
            Ok(specialization) => {
                ResolutionState::Resolved(ResolvedProfile::system(user, Some(specialization)))
            }
            Err(e) => {
                let specialization = self.fallback_specialization(&user);
                tracing::warn!(
                    user_id = %user.user_id,
                    role = %user.role,
                    error = %e,
                    degraded = specialization.is_some(),
                    "specialization profile lookup failed"
                );
                ResolutionState::Resolved(ResolvedProfile::system(user, specialization))
            }
        }
    }

    fn fallback_specialization(&self, user: &SystemUser) -> Option<Specialization> {
        if !self.policy.degrades(user.role) {
            return None;
        }
        match user.role {
            UserRole::Doctor => Some(Specialization::Doctor(DoctorProfile::degraded_from(user))),
            UserRole::Police => Some(Specialization::Police(PoliceProfile::degraded_from(user))),
            UserRole::Other => None,
        }
    }

    async fn fetch_legacy(&self, credential: &Credential) -> ResolutionState {
        match self.api.current_doctor(credential).await {
            Ok(doctor) => {
                let legacy = LegacyUser::new(credential.uid.clone(), doctor.clone(), Utc::now());
                ResolutionState::Resolved(ResolvedProfile {
                    user: Some(SessionUser::LegacySynthetic(legacy)),
                    specialization: Some(Specialization::Doctor(doctor)),
                })
            }
            Err(e) => {
                tracing::error!(uid = %credential.uid, error = %e, "legacy doctor lookup failed");
                self.error_handler.handle(&e).await;
                ResolutionState::Failed(e)
            }
        }
    }
}
