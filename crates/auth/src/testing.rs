//! In-memory collaborators for tests.
//!
//! Enabled in this crate's own tests and, through the `testing` feature, in
//! downstream crates.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::sync::{Notify, watch};

use sigma_core::{
    Capability, DoctorProfile, FirebaseUid, PoliceProfile, SystemUser, UserId, UserRole,
};

use crate::api::{ApiError, ProfileApi};
use crate::credential::Credential;
use crate::navigator::Navigator;
use crate::provider::{IdentityProvider, ProviderError, ProviderErrorCode};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub fn credential(uid: &str) -> Credential {
    Credential::new(FirebaseUid::new(uid), None, format!("token-{uid}"))
}

/// Credential the fake provider issues for `email`.
pub fn account_credential(email: &str) -> Credential {
    Credential::new(
        FirebaseUid::new(format!("uid-{email}")),
        Some(email.to_string()),
        format!("token-{email}"),
    )
}

pub fn system_user(role: UserRole) -> SystemUser {
    let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).single().unwrap_or_default();
    SystemUser {
        user_id: UserId::new("user-1"),
        firebase_uid: FirebaseUid::new("fb-1"),
        name: "Ana Pérez".to_string(),
        dni: "30111222".to_string(),
        email: "ana@sigma.test".to_string(),
        role,
        enabled: true,
        is_admin: false,
        created_at: at,
        updated_at: at,
    }
}

pub fn doctor_profile() -> DoctorProfile {
    DoctorProfile {
        name: "Ana Pérez".to_string(),
        dni: "30111222".to_string(),
        email: "ana@sigma.test".to_string(),
        enabled: true,
        is_admin: false,
        roles: Vec::new(),
    }
}

pub fn recruiter_doctor() -> DoctorProfile {
    DoctorProfile {
        roles: vec![Capability::RECRUITER],
        ..doctor_profile()
    }
}

pub fn police_profile() -> PoliceProfile {
    PoliceProfile {
        name: "Juan Gómez".to_string(),
        dni: "28999111".to_string(),
        email: "juan@sigma.test".to_string(),
        enabled: true,
        is_admin: false,
        badge_number: Some("P-042".to_string()),
        rank: Some("Sargento".to_string()),
        roles: Vec::new(),
    }
}

/// Identity-provider operations, as recorded by [`FakeIdentityProvider`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderOp {
    SignIn,
    SignUp,
    SignOut,
    Reauthenticate,
    UpdatePassword,
    SendPasswordReset,
}

/// Email/password accounts held in memory.
pub struct FakeIdentityProvider {
    credential: watch::Sender<Option<Credential>>,
    accounts: Mutex<HashMap<String, String>>,
    failures: Mutex<HashMap<ProviderOp, ProviderErrorCode>>,
    calls: Mutex<Vec<ProviderOp>>,
}

impl Default for FakeIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeIdentityProvider {
    pub fn new() -> Self {
        let (credential, _) = watch::channel(None);
        Self {
            credential,
            accounts: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_account(self, email: &str, password: &str) -> Self {
        lock(&self.accounts).insert(email.to_string(), password.to_string());
        self
    }

    /// Publish a credential change as if it came from the provider.
    pub fn set_credential(&self, credential: Option<Credential>) {
        self.credential.send_replace(credential);
    }

    /// Make the next call of `op` fail with `code`.
    pub fn fail_next(&self, op: ProviderOp, code: ProviderErrorCode) {
        lock(&self.failures).insert(op, code);
    }

    pub fn calls(&self) -> Vec<ProviderOp> {
        lock(&self.calls).clone()
    }

    pub fn password_of(&self, email: &str) -> Option<String> {
        lock(&self.accounts).get(email).cloned()
    }

    fn record(&self, op: ProviderOp) -> Result<(), ProviderError> {
        lock(&self.calls).push(op);
        match lock(&self.failures).remove(&op) {
            Some(code) => Err(code.into()),
            None => Ok(()),
        }
    }

    /// Issue a new token for the held credential without a change event.
    fn rotate_token(&self) {
        self.credential.send_if_modified(|current| {
            if let Some(credential) = current {
                credential.id_token = format!("{}~", credential.id_token);
            }
            false
        });
    }

    fn check_password(&self, email: &str, password: &str) -> Result<(), ProviderError> {
        if !email.contains('@') {
            return Err(ProviderErrorCode::InvalidEmail.into());
        }
        match lock(&self.accounts).get(email) {
            None => Err(ProviderErrorCode::UserNotFound.into()),
            Some(stored) if stored != password => Err(ProviderErrorCode::WrongPassword.into()),
            Some(_) => Ok(()),
        }
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    fn subscribe(&self) -> watch::Receiver<Option<Credential>> {
        self.credential.subscribe()
    }

    fn current(&self) -> Option<Credential> {
        self.credential.borrow().clone()
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Credential, ProviderError> {
        self.record(ProviderOp::SignIn)?;
        self.check_password(email, password)?;
        let credential = account_credential(email);
        self.credential.send_replace(Some(credential.clone()));
        Ok(credential)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Credential, ProviderError> {
        self.record(ProviderOp::SignUp)?;
        if !email.contains('@') {
            return Err(ProviderErrorCode::InvalidEmail.into());
        }
        if password.chars().count() < 6 {
            return Err(ProviderErrorCode::WeakPassword.into());
        }
        {
            let mut accounts = lock(&self.accounts);
            if accounts.contains_key(email) {
                return Err(ProviderErrorCode::EmailAlreadyInUse.into());
            }
            accounts.insert(email.to_string(), password.to_string());
        }
        let credential = account_credential(email);
        self.credential.send_replace(Some(credential.clone()));
        Ok(credential)
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        self.record(ProviderOp::SignOut)?;
        self.credential.send_replace(None);
        Ok(())
    }

    async fn reauthenticate(
        &self,
        credential: &Credential,
        email: &str,
        password: &str,
    ) -> Result<Credential, ProviderError> {
        self.record(ProviderOp::Reauthenticate)?;
        self.check_password(email, password)?;
        Ok(credential.clone())
    }

    async fn update_password(
        &self,
        credential: &Credential,
        new_password: &str,
    ) -> Result<(), ProviderError> {
        self.record(ProviderOp::UpdatePassword)?;
        if new_password.chars().count() < 6 {
            return Err(ProviderErrorCode::WeakPassword.into());
        }
        let email = credential
            .email
            .clone()
            .ok_or_else(|| ProviderError::from(ProviderErrorCode::UserNotFound))?;
        lock(&self.accounts).insert(email, new_password.to_string());
        self.rotate_token();
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), ProviderError> {
        self.record(ProviderOp::SendPasswordReset)?;
        if !email.contains('@') {
            return Err(ProviderErrorCode::InvalidEmail.into());
        }
        if !lock(&self.accounts).contains_key(email) {
            return Err(ProviderErrorCode::UserNotFound.into());
        }
        Ok(())
    }
}

/// Pauses a fetch until released.
#[derive(Clone, Default)]
pub struct FetchGate {
    entered: Arc<Notify>,
    release: Arc<Notify>,
}

impl FetchGate {
    /// Wait until the held fetch has started.
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    pub fn release(&self) {
        self.release.notify_one();
    }

    /// Called by the held fetch: announce entry, then wait for release.
    pub async fn hold(&self) {
        self.entered.notify_one();
        self.release.notified().await;
    }
}

/// Canned profile responses, one per endpoint.
pub struct FakeProfileApi {
    user: Result<SystemUser, ApiError>,
    doctor: Result<DoctorProfile, ApiError>,
    police: Result<PoliceProfile, ApiError>,
    calls: Mutex<Vec<&'static str>>,
    user_gate: Mutex<Option<FetchGate>>,
}

impl Default for FakeProfileApi {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeProfileApi {
    /// Every endpoint answers 404 until configured.
    pub fn new() -> Self {
        Self {
            user: Err(ApiError::NotFound),
            doctor: Err(ApiError::NotFound),
            police: Err(ApiError::NotFound),
            calls: Mutex::new(Vec::new()),
            user_gate: Mutex::new(None),
        }
    }

    pub fn with_user(mut self, user: Result<SystemUser, ApiError>) -> Self {
        self.user = user;
        self
    }

    pub fn with_doctor(mut self, doctor: Result<DoctorProfile, ApiError>) -> Self {
        self.doctor = doctor;
        self
    }

    pub fn with_police(mut self, police: Result<PoliceProfile, ApiError>) -> Self {
        self.police = police;
        self
    }

    /// Hold the next system-user fetch until the returned gate is released.
    pub fn hold_user_fetch(&self) -> FetchGate {
        let gate = FetchGate::default();
        *lock(&self.user_gate) = Some(gate.clone());
        gate
    }

    pub fn calls(&self) -> Vec<&'static str> {
        lock(&self.calls).clone()
    }
}

#[async_trait]
impl ProfileApi for FakeProfileApi {
    async fn current_user(&self, _credential: &Credential) -> Result<SystemUser, ApiError> {
        lock(&self.calls).push("current_user");
        let gate = lock(&self.user_gate).take();
        if let Some(gate) = gate {
            gate.hold().await;
        }
        self.user.clone()
    }

    async fn current_doctor(&self, _credential: &Credential) -> Result<DoctorProfile, ApiError> {
        lock(&self.calls).push("current_doctor");
        self.doctor.clone()
    }

    async fn current_police(&self, _credential: &Credential) -> Result<PoliceProfile, ApiError> {
        lock(&self.calls).push("current_police");
        self.police.clone()
    }
}

/// Remembers every route it was asked to open.
#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<String> {
        lock(&self.routes).clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str) {
        lock(&self.routes).push(route.to_string());
    }
}
