//! `sigma-portal`: wires the session store, navigation and recruitment
//! flows into one handle, the way the portal's pages consume them.

use std::sync::Arc;

use serde::Serialize;

use sigma_auth::{
    Credential, DisplayIdentity, IdentityProvider, Navigator, ProfileApi, ResolvedSession,
    SessionConfig, SessionStore, SignInError,
};
use sigma_client::{ClientConfig, FirebaseIdentityProvider, HttpBackend};
use sigma_navigation::{
    GuardDecision, NavigationItem, RouteGuard, Service, SessionAccess, Theme, ThemeConfig,
    navigation_for_route, services_for,
};
use sigma_recruitment::{
    RecruitmentApi, RecruitmentEnvelope, RecruitmentForm, ReviewError, ReviewQueue, SubmitError,
};

/// Logs route changes; there is no browser to drive.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNavigator;

impl Navigator for TracingNavigator {
    fn navigate(&self, route: &str) {
        tracing::info!(route, "navigate");
    }
}

/// Everything a page at one path renders from.
#[derive(Debug, Clone, Serialize)]
pub struct PageView {
    pub pathname: String,
    pub theme: Theme,
    pub branding: &'static ThemeConfig,
    pub guard: GuardDecision,
    pub navigation: Vec<NavigationItem>,
    pub identity: Option<DisplayIdentity>,
    pub services: Vec<Service>,
    pub session: ResolvedSession,
}

pub struct Portal {
    session: SessionStore,
    recruitment: Arc<dyn RecruitmentApi>,
}

impl Portal {
    /// Connect to the configured backend and identity provider and start
    /// listening for credential changes.
    pub fn connect(config: &ClientConfig) -> Self {
        let provider = Arc::new(FirebaseIdentityProvider::new(
            config.identity_url.clone(),
            config.firebase_api_key.clone(),
        ));
        let backend = Arc::new(HttpBackend::new(config.api_url.clone()));
        Self::start(provider, backend.clone(), backend, config.session.clone())
    }

    pub fn start(
        provider: Arc<dyn IdentityProvider>,
        profiles: Arc<dyn ProfileApi>,
        recruitment: Arc<dyn RecruitmentApi>,
        config: SessionConfig,
    ) -> Self {
        let session = SessionStore::builder(provider, profiles)
            .config(config)
            .navigator(Arc::new(TracingNavigator))
            .start();
        Self {
            session,
            recruitment,
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Sign in and wait until the new account's session has resolved.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<ResolvedSession, SignInError> {
        let credential = self.session.sign_in(email, password).await?;
        Ok(self.settled_for(&credential).await)
    }

    async fn settled_for(&self, credential: &Credential) -> ResolvedSession {
        let mut receiver = self.session.subscribe();
        let settled = match receiver
            .wait_for(|s| {
                !s.is_loading && s.credential.as_ref().is_some_and(|c| c.same_account(credential))
            })
            .await
        {
            Ok(session) => session.clone(),
            Err(_) => self.session.snapshot(),
        };
        settled
    }

    pub fn page(&self, pathname: &str) -> PageView {
        let session = self.session.snapshot();
        let access = SessionAccess::of(&session);
        let theme = Theme::for_route(pathname);

        PageView {
            pathname: pathname.to_string(),
            theme,
            branding: theme.config(),
            guard: RouteGuard::for_path(pathname).check(&session, &self.session.config().home_route),
            navigation: navigation_for_route(&session, pathname),
            identity: session.display_identity(),
            services: services_for(access.role, access.is_admin),
            session,
        }
    }

    pub async fn submit_recruitment(&self, form: &mut RecruitmentForm) -> Result<RecruitmentEnvelope, SubmitError> {
        form.submit(self.recruitment.as_ref()).await
    }

    /// Open and load the recruiter review queue for the current session.
    pub async fn review_queue(&self) -> Result<ReviewQueue, ReviewError> {
        let queue = ReviewQueue::open(&self.session.settled().await, self.recruitment.clone())?;
        queue.load().await?;
        Ok(queue)
    }

    pub async fn shutdown(&self) {
        self.session.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use sigma_auth::testing::{FakeIdentityProvider, FakeProfileApi, recruiter_doctor, system_user};
    use sigma_core::UserRole;
    use sigma_recruitment::testing::InMemoryRecruitmentApi;

    fn portal(profiles: FakeProfileApi) -> (Portal, Arc<InMemoryRecruitmentApi>) {
        let provider = Arc::new(FakeIdentityProvider::new().with_account("ana@sigma.test", "Secret1"));
        let recruitment = Arc::new(InMemoryRecruitmentApi::new());
        let portal = Portal::start(
            provider,
            Arc::new(profiles),
            recruitment.clone(),
            SessionConfig::default().with_min_loading_duration(Duration::ZERO),
        );
        (portal, recruitment)
    }

    #[tokio::test]
    async fn anonymous_page_is_public_sigma() {
        let (portal, _) = portal(FakeProfileApi::new());
        portal.session().settled().await;

        let view = portal.page("/");
        assert_eq!(view.theme, Theme::Sigma);
        assert_eq!(view.guard, GuardDecision::Allow);
        assert_eq!(view.navigation.len(), 2);
        assert!(view.identity.is_none());

        let manage = portal.page("/recruitment/manage");
        assert_eq!(manage.guard, GuardDecision::Redirect("/".to_string()));
        portal.shutdown().await;
    }

    #[tokio::test]
    async fn recruiter_signs_in_and_reviews_applications() {
        let profiles = FakeProfileApi::new()
            .with_user(Ok(system_user(UserRole::Doctor)))
            .with_doctor(Ok(recruiter_doctor()));
        let (portal, _) = portal(profiles);
        portal.session().settled().await;

        let session = portal.sign_in("ana@sigma.test", "Secret1").await.unwrap();
        assert_eq!(session.role(), Some(UserRole::Doctor));

        let view = portal.page("/patients");
        assert_eq!(view.theme, Theme::Hospital);
        assert!(view.guard.is_allowed());
        assert_eq!(view.identity.map(|i| i.role_label), Some("Médico"));

        let mut form = RecruitmentForm::new();
        form.name = "Carla".to_string();
        form.discord = "carla#1".to_string();
        form.phone = "555".to_string();
        form.dni = "A-77".to_string();
        form.motivation = "ayudar".to_string();
        form.experience = "poca".to_string();
        form.set_description_line(0, "tranquila").unwrap();
        let created = portal.submit_recruitment(&mut form).await.unwrap();

        let queue = portal.review_queue().await.unwrap();
        assert_eq!(queue.snapshot().entries.len(), 1);
        queue.mark_attended(&created.recruitment.id).await.unwrap();
        assert!(queue.snapshot().entries.is_empty());

        portal.shutdown().await;
    }

    #[tokio::test]
    async fn queue_opened_after_password_change_sends_the_new_token() {
        let provider = Arc::new(FakeIdentityProvider::new().with_account("ana@sigma.test", "Secret1"));
        let profiles = FakeProfileApi::new()
            .with_user(Ok(system_user(UserRole::Doctor)))
            .with_doctor(Ok(recruiter_doctor()));
        let recruitment = Arc::new(InMemoryRecruitmentApi::new());
        let portal = Portal::start(
            provider.clone(),
            Arc::new(profiles),
            recruitment.clone(),
            SessionConfig::default().with_min_loading_duration(Duration::ZERO),
        );
        portal.sign_in("ana@sigma.test", "Secret1").await.unwrap();
        let old_token = provider.current().unwrap().id_token;

        portal.session().change_password("Secret1", "Better2").await.unwrap();
        let new_token = provider.current().unwrap().id_token;
        assert_ne!(new_token, old_token);

        portal.review_queue().await.unwrap();
        assert_eq!(recruitment.bearer_tokens().last(), Some(&new_token));

        portal.shutdown().await;
    }
}
