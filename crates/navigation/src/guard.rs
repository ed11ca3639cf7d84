//! Render-time guards for protected pages.
//!
//! A guard never shows an error: while the session is still loading it asks
//! the page to render nothing, and on denial it redirects home.

use serde::Serialize;

use sigma_auth::ResolvedSession;
use sigma_core::{Capability, UserRole};

/// Requirement a page places on the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteGuard {
    Public,
    Authenticated,
    Doctor,
    Police,
    Admin,
    /// Doctor holding the `recruiter` capability.
    DoctorRecruiter,
}

/// Outcome of a guard check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "to", rename_all = "snake_case")]
pub enum GuardDecision {
    Allow,
    /// Session still resolving; render nothing yet.
    Pending,
    Redirect(String),
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardDecision::Allow)
    }
}

impl RouteGuard {
    /// Guard for a page path. Paths nobody declared are public.
    pub fn for_path(pathname: &str) -> RouteGuard {
        let path = pathname.trim_end_matches('/');
        if path == "/recruitment/manage" || path.starts_with("/recruitment/manage/") {
            RouteGuard::DoctorRecruiter
        } else if path.starts_with("/patients") || path.starts_with("/admissions") {
            RouteGuard::Doctor
        } else if path == "/exams" || path.starts_with("/exams/") {
            RouteGuard::Admin
        } else if path == "/change-password" || path == "/services" {
            RouteGuard::Authenticated
        } else {
            RouteGuard::Public
        }
    }

    /// Whether a settled session meets the requirement.
    pub fn permits(&self, session: &ResolvedSession) -> bool {
        match self {
            RouteGuard::Public => true,
            RouteGuard::Authenticated => session.is_authenticated(),
            RouteGuard::Doctor => session.role() == Some(UserRole::Doctor),
            RouteGuard::Police => session.role() == Some(UserRole::Police),
            RouteGuard::Admin => session.is_authenticated() && session.is_admin(),
            RouteGuard::DoctorRecruiter => session
                .doctor_profile()
                .is_some_and(|doctor| doctor.has_capability(&Capability::RECRUITER)),
        }
    }

    /// Decide what the guarded page does; `home` is the redirect target.
    pub fn check(&self, session: &ResolvedSession, home: &str) -> GuardDecision {
        if *self == RouteGuard::Public {
            return GuardDecision::Allow;
        }
        if session.is_loading {
            return GuardDecision::Pending;
        }
        if self.permits(session) {
            GuardDecision::Allow
        } else {
            tracing::info!(guard = ?self, role = ?session.role(), "route guard denied access");
            GuardDecision::Redirect(home.to_string())
        }
    }
}
