//! Session store: the single writer of the resolved session.
//!
//! The store subscribes to the identity provider when started and re-resolves
//! the session on every credential change. Readers get a `watch` receiver.
//!
//! Each resolution is tagged with a monotonically increasing generation;
//! logout and newer credential events bump it, and a resolution whose
//! generation is no longer current is discarded instead of committed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use sigma_core::{
    Capability, DoctorProfile, PoliceProfile, SessionUser, Specialization, SystemUser, UserRole,
};

use crate::api::ProfileApi;
use crate::config::SessionConfig;
use crate::credential::Credential;
use crate::handler::{AuthErrorHandler, ForceLogoutOnUnauthorized};
use crate::navigator::{Navigator, NoopNavigator};
use crate::provider::IdentityProvider;
use crate::resolver::Resolver;

/// Application-level view of the signed-in account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSession {
    pub credential: Option<Credential>,
    pub user: Option<SessionUser>,
    pub specialization: Option<Specialization>,
    pub is_loading: bool,
}

impl ResolvedSession {
    /// State before the first credential event has been resolved.
    pub fn initial() -> Self {
        Self {
            credential: None,
            user: None,
            specialization: None,
            is_loading: true,
        }
    }

    pub fn signed_out() -> Self {
        Self {
            is_loading: false,
            ..Self::initial()
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.credential.is_some()
    }

    /// System-user view; synthesized for legacy accounts.
    pub fn system_user(&self) -> Option<SystemUser> {
        self.user.as_ref().map(SessionUser::to_system_user)
    }

    pub fn doctor_profile(&self) -> Option<&DoctorProfile> {
        self.specialization.as_ref().and_then(Specialization::doctor)
    }

    pub fn police_profile(&self) -> Option<&PoliceProfile> {
        self.specialization.as_ref().and_then(Specialization::police)
    }

    /// The user's role, falling back to whichever profile is present.
    pub fn role(&self) -> Option<UserRole> {
        self.user
            .as_ref()
            .map(SessionUser::role)
            .or_else(|| self.specialization.as_ref().map(Specialization::role))
    }

    /// Admin if the user record or the specialization profile says so.
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(SessionUser::is_admin)
            || self.specialization.as_ref().is_some_and(Specialization::is_admin)
    }

    pub fn has_capability(&self, capability: &Capability) -> bool {
        match &self.specialization {
            Some(Specialization::Doctor(doctor)) => doctor.has_capability(capability),
            Some(Specialization::Police(police)) => police.has_capability(capability),
            None => false,
        }
    }

    /// Name/DNI (and badge, rank) shown in the account menu.
    pub fn display_identity(&self) -> Option<DisplayIdentity> {
        match self.specialization.as_ref()? {
            Specialization::Doctor(doctor) => Some(DisplayIdentity {
                name: doctor.name.clone(),
                dni: doctor.dni.clone(),
                badge_number: None,
                rank: None,
                role_label: "Médico",
            }),
            Specialization::Police(police) => Some(DisplayIdentity {
                name: police.name.clone(),
                dni: police.dni.clone(),
                badge_number: police.badge_number.clone(),
                rank: police.rank.clone(),
                role_label: "Policía",
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayIdentity {
    pub name: String,
    pub dni: String,
    pub badge_number: Option<String>,
    pub rank: Option<String>,
    pub role_label: &'static str,
}

pub(crate) struct SessionInner {
    pub(crate) provider: Arc<dyn IdentityProvider>,
    pub(crate) api: Arc<dyn ProfileApi>,
    pub(crate) error_handler: Arc<dyn AuthErrorHandler>,
    pub(crate) navigator: Arc<dyn Navigator>,
    pub(crate) config: SessionConfig,
    generation: AtomicU64,
    state: watch::Sender<ResolvedSession>,
    shutdown: Notify,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl SessionInner {
    async fn apply_credential(&self, credential: Option<Credential>) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let started = Instant::now();
        self.state.send_modify(|session| session.is_loading = true);

        let resolver = Resolver::new(
            self.api.as_ref(),
            self.error_handler.as_ref(),
            self.config.on_specialization_fetch_failure,
        );
        let profile = resolver.resolve(credential.as_ref()).await;

        let remaining = self
            .config
            .min_loading_duration
            .saturating_sub(started.elapsed());
        if !remaining.is_zero() {
            tokio::time::sleep(remaining).await;
        }

        let role = profile.user.as_ref().map(SessionUser::role);
        let committed = self.state.send_if_modified(|session| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            *session = ResolvedSession {
                credential,
                user: profile.user,
                specialization: profile.specialization,
                is_loading: false,
            };
            true
        });

        if committed {
            tracing::info!(generation, role = ?role, "session resolved");
        } else {
            tracing::debug!(generation, "discarding stale session resolution");
        }
    }

    /// Copy a silently refreshed token into the session. Never re-resolves.
    pub(crate) fn sync_credential(&self) -> bool {
        let Some(fresh) = self.provider.current() else {
            return false;
        };
        self.state.send_if_modified(|session| match &mut session.credential {
            Some(held) if held.same_account(&fresh) && held.id_token != fresh.id_token => {
                held.id_token = fresh.id_token;
                true
            }
            _ => false,
        })
    }

    pub(crate) fn clear(&self) {
        self.state.send_modify(|session| {
            self.generation.fetch_add(1, Ordering::SeqCst);
            *session = ResolvedSession::signed_out();
        });
    }
}

/// Handle to the process-wide session; cheap to clone.
#[derive(Clone)]
pub struct SessionStore {
    pub(crate) inner: Arc<SessionInner>,
}

/// Wires a [`SessionStore`] to its collaborators.
pub struct SessionStoreBuilder {
    provider: Arc<dyn IdentityProvider>,
    api: Arc<dyn ProfileApi>,
    error_handler: Option<Arc<dyn AuthErrorHandler>>,
    navigator: Option<Arc<dyn Navigator>>,
    config: SessionConfig,
}

impl SessionStoreBuilder {
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Defaults to [`ForceLogoutOnUnauthorized`] over the same provider.
    pub fn error_handler(mut self, handler: Arc<dyn AuthErrorHandler>) -> Self {
        self.error_handler = Some(handler);
        self
    }

    /// Build without subscribing; drive it with [`SessionStore::apply_credential`].
    pub fn build(self) -> SessionStore {
        let error_handler = self
            .error_handler
            .unwrap_or_else(|| Arc::new(ForceLogoutOnUnauthorized::new(Arc::clone(&self.provider))));
        let (state, _) = watch::channel(ResolvedSession::initial());

        SessionStore {
            inner: Arc::new(SessionInner {
                provider: self.provider,
                api: self.api,
                error_handler,
                navigator: self.navigator.unwrap_or_else(|| Arc::new(NoopNavigator)),
                config: self.config,
                generation: AtomicU64::new(0),
                state,
                shutdown: Notify::new(),
                listener: Mutex::new(None),
            }),
        }
    }

    /// Build and subscribe to the provider. Must run inside a Tokio runtime.
    pub fn start(self) -> SessionStore {
        let store = self.build();
        store.spawn_listener();
        store
    }
}

impl SessionStore {
    pub fn builder(provider: Arc<dyn IdentityProvider>, api: Arc<dyn ProfileApi>) -> SessionStoreBuilder {
        SessionStoreBuilder {
            provider,
            api,
            error_handler: None,
            navigator: None,
            config: SessionConfig::default(),
        }
    }

    fn spawn_listener(&self) {
        let mut credentials = self.inner.provider.subscribe();
        let inner = Arc::clone(&self.inner);

        let handle = tokio::spawn(async move {
            tracing::info!("session listener started");
            loop {
                let credential = credentials.borrow_and_update().clone();
                tokio::select! {
                    _ = inner.shutdown.notified() => break,
                    // A newer event abandons the in-flight resolution.
                    changed = credentials.changed() => {
                        if changed.is_err() {
                            tracing::warn!("identity provider dropped its credential channel");
                            break;
                        }
                    }
                    _ = inner.apply_credential(credential) => {
                        tokio::select! {
                            _ = inner.shutdown.notified() => break,
                            changed = credentials.changed() => {
                                if changed.is_err() {
                                    tracing::warn!("identity provider dropped its credential channel");
                                    break;
                                }
                            }
                        }
                    }
                }
            }
            tracing::info!("session listener stopped");
        });

        if let Ok(mut listener) = self.inner.listener.lock() {
            *listener = Some(handle);
        }
    }

    /// Unsubscribe from the provider and wait for the listener to exit.
    pub async fn shutdown(&self) {
        self.inner.shutdown.notify_one();
        let handle = match self.inner.listener.lock() {
            Ok(mut listener) => listener.take(),
            Err(_) => None,
        };
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "session listener ended abnormally");
            }
        }
    }

    /// Resolve a credential-change event and commit it unless superseded.
    pub async fn apply_credential(&self, credential: Option<Credential>) {
        self.inner.apply_credential(credential).await;
    }

    pub fn subscribe(&self) -> watch::Receiver<ResolvedSession> {
        self.inner.state.subscribe()
    }

    pub fn snapshot(&self) -> ResolvedSession {
        self.inner.state.borrow().clone()
    }

    /// Wait until no resolution is pending and return that session.
    pub async fn settled(&self) -> ResolvedSession {
        let mut receiver = self.subscribe();
        let settled = match receiver.wait_for(|session| !session.is_loading).await {
            Ok(session) => session.clone(),
            Err(_) => self.snapshot(),
        };
        settled
    }

    /// Pick up a token the provider refreshed without a credential event.
    ///
    /// Returns whether the held token changed.
    pub fn refresh_credential(&self) -> bool {
        let refreshed = self.inner.sync_credential();
        if refreshed {
            tracing::debug!("session token refreshed");
        }
        refreshed
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }
}
