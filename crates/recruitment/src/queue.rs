//! Recruiter-side review of pending medical applications.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use sigma_auth::{Credential, ResolvedSession};
use sigma_core::RecruitmentId;
use sigma_navigation::RouteGuard;

use crate::api::RecruitmentApi;
use crate::error::ReviewError;
use crate::model::Recruitment;

/// What the review page shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueSnapshot {
    pub entries: Vec<Recruitment>,
    pub selected: Option<Recruitment>,
    /// Last failure, ready to display.
    pub error: Option<&'static str>,
    pub marking: bool,
}

#[derive(Default)]
struct QueueState {
    entries: Vec<Recruitment>,
    selected: Option<RecruitmentId>,
    error: Option<&'static str>,
}

/// Pending medical applications for one recruiter session.
pub struct ReviewQueue {
    api: Arc<dyn RecruitmentApi>,
    credential: Credential,
    state: Mutex<QueueState>,
    marking: AtomicBool,
}

struct MarkingFlag<'a>(&'a AtomicBool);

impl Drop for MarkingFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl ReviewQueue {
    /// Open the queue for a settled session that passes the recruiter guard.
    pub fn open(session: &ResolvedSession, api: Arc<dyn RecruitmentApi>) -> Result<Self, ReviewError> {
        let credential = match &session.credential {
            Some(credential) if RouteGuard::DoctorRecruiter.permits(session) => credential.clone(),
            _ => {
                tracing::warn!(role = ?session.role(), "review queue refused: recruiter access required");
                return Err(ReviewError::Forbidden);
            }
        };

        Ok(Self {
            api,
            credential,
            state: Mutex::new(QueueState::default()),
            marking: AtomicBool::new(false),
        })
    }

    fn state(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        let state = self.state();
        let selected = state
            .selected
            .as_ref()
            .and_then(|id| state.entries.iter().find(|entry| &entry.id == id))
            .cloned();
        QueueSnapshot {
            entries: state.entries.clone(),
            selected,
            error: state.error,
            marking: self.marking.load(Ordering::SeqCst),
        }
    }

    /// Fetch the pending list, replacing what is shown.
    pub async fn load(&self) -> Result<usize, ReviewError> {
        match self.api.pending_medical(&self.credential).await {
            Ok(entries) => {
                let count = entries.len();
                tracing::info!(count, "loaded pending medical recruitments");
                let mut state = self.state();
                if let Some(selected) = &state.selected {
                    if !entries.iter().any(|entry| &entry.id == selected) {
                        state.selected = None;
                    }
                }
                state.entries = entries;
                state.error = None;
                Ok(count)
            }
            Err(e) => {
                tracing::error!(error = %e, "error loading recruitments");
                let err = ReviewError::Load(e);
                self.state().error = Some(err.user_message());
                Err(err)
            }
        }
    }

    pub fn select(&self, id: &RecruitmentId) -> Result<Recruitment, ReviewError> {
        let mut state = self.state();
        let entry = state
            .entries
            .iter()
            .find(|entry| &entry.id == id)
            .cloned()
            .ok_or_else(|| ReviewError::UnknownEntry(id.clone()))?;
        state.selected = Some(id.clone());
        Ok(entry)
    }

    pub fn clear_selection(&self) {
        self.state().selected = None;
    }

    /// Mark an application attended, then clear the selection and reload.
    ///
    /// A failed reload does not undo the mark; its message stays in the
    /// snapshot. Only one mark may be in flight; a second call fails with
    /// [`ReviewError::Busy`].
    pub async fn mark_attended(&self, id: &RecruitmentId) -> Result<(), ReviewError> {
        if self.marking.swap(true, Ordering::SeqCst) {
            return Err(ReviewError::Busy);
        }
        let _flag = MarkingFlag(&self.marking);

        if let Err(e) = self.api.mark_attended(&self.credential, id).await {
            tracing::error!(recruitment_id = %id, error = %e, "error marking recruitment as attended");
            let err = ReviewError::Mark(e);
            self.state().error = Some(err.user_message());
            return Err(err);
        }

        tracing::info!(recruitment_id = %id, "recruitment marked attended");
        self.clear_selection();
        if let Err(e) = self.load().await {
            tracing::warn!(recruitment_id = %id, error = %e, "pending list is stale after marking");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Profession, RecruitmentRequest};
    use crate::testing::InMemoryRecruitmentApi;
    use sigma_auth::ApiError;
    use sigma_auth::testing::{credential, doctor_profile, police_profile, recruiter_doctor, system_user};
    use sigma_core::{SessionUser, Specialization, UserRole};

    fn recruiter_session() -> ResolvedSession {
        ResolvedSession {
            credential: Some(credential("fb-rec")),
            user: Some(SessionUser::System(system_user(UserRole::Doctor))),
            specialization: Some(Specialization::Doctor(recruiter_doctor())),
            is_loading: false,
        }
    }

    fn request(name: &str) -> RecruitmentRequest {
        RecruitmentRequest {
            name: name.to_string(),
            discord: format!("{name}#1"),
            phone: "555".to_string(),
            profession: Profession::Ems,
            dni: format!("id-{name}"),
            motivation: "ayudar".to_string(),
            experience: "poca".to_string(),
            description: vec!["amable".to_string()],
        }
    }

    async fn seeded(names: &[&str]) -> (Arc<InMemoryRecruitmentApi>, Vec<RecruitmentId>) {
        let api = Arc::new(InMemoryRecruitmentApi::new());
        let mut ids = Vec::new();
        for name in names {
            ids.push(api.submit(&request(name)).await.unwrap().recruitment.id);
        }
        (api, ids)
    }

    #[test]
    fn non_recruiters_are_refused() {
        let api: Arc<dyn RecruitmentApi> = Arc::new(InMemoryRecruitmentApi::new());

        let plain_doctor = ResolvedSession {
            specialization: Some(Specialization::Doctor(doctor_profile())),
            ..recruiter_session()
        };
        let police = ResolvedSession {
            user: Some(SessionUser::System(system_user(UserRole::Police))),
            specialization: Some(Specialization::Police(police_profile())),
            ..recruiter_session()
        };

        for session in [plain_doctor, police, ResolvedSession::signed_out()] {
            assert!(matches!(
                ReviewQueue::open(&session, api.clone()),
                Err(ReviewError::Forbidden)
            ));
        }
    }

    #[tokio::test]
    async fn load_lists_pending_entries() {
        let (api, _) = seeded(&["ana", "beto"]).await;
        let queue = ReviewQueue::open(&recruiter_session(), api).unwrap();

        assert_eq!(queue.load().await.unwrap(), 2);
        let snapshot = queue.snapshot();
        assert_eq!(snapshot.entries.len(), 2);
        assert!(snapshot.error.is_none());
    }

    #[tokio::test]
    async fn mark_attended_reloads_and_clears_selection() {
        let (api, ids) = seeded(&["ana", "beto"]).await;
        let queue = ReviewQueue::open(&recruiter_session(), api.clone()).unwrap();
        queue.load().await.unwrap();

        queue.select(&ids[0]).unwrap();
        assert_eq!(queue.snapshot().selected.map(|r| r.id), Some(ids[0].clone()));

        queue.mark_attended(&ids[0]).await.unwrap();

        let snapshot = queue.snapshot();
        assert!(snapshot.selected.is_none());
        assert_eq!(snapshot.entries.iter().map(|r| r.id.clone()).collect::<Vec<_>>(), vec![ids[1].clone()]);
        assert!(!snapshot.marking);
        assert_eq!(api.attended_by(&ids[0]).as_deref(), Some("fb-rec"));
    }

    #[tokio::test]
    async fn second_mark_while_first_in_flight_is_refused() {
        let (api, ids) = seeded(&["ana", "beto"]).await;
        let queue = Arc::new(ReviewQueue::open(&recruiter_session(), api.clone()).unwrap());
        queue.load().await.unwrap();
        let gate = api.hold_next_mark();

        let first = tokio::spawn({
            let queue = queue.clone();
            let id = ids[0].clone();
            async move { queue.mark_attended(&id).await }
        });
        gate.entered().await;

        assert_eq!(queue.mark_attended(&ids[1]).await, Err(ReviewError::Busy));
        assert!(queue.snapshot().marking);

        gate.release();
        first.await.unwrap().unwrap();
        assert!(!queue.snapshot().marking);
        assert_eq!(queue.snapshot().entries.len(), 1);
    }

    #[tokio::test]
    async fn failures_are_kept_as_messages() {
        let (api, ids) = seeded(&["ana"]).await;
        let queue = ReviewQueue::open(&recruiter_session(), api.clone()).unwrap();
        queue.load().await.unwrap();

        api.fail_next_mark(ApiError::Status(500, "boom".to_string()));
        let err = queue.mark_attended(&ids[0]).await.unwrap_err();
        assert!(matches!(err, ReviewError::Mark(_)));
        assert_eq!(
            queue.snapshot().error,
            Some("Error al marcar la solicitud como atendida")
        );
        assert!(!queue.snapshot().marking);

        queue.load().await.unwrap();
        assert!(queue.snapshot().error.is_none());
    }

    #[tokio::test]
    async fn failed_reload_after_mark_still_reports_success() {
        let (api, ids) = seeded(&["ana", "beto"]).await;
        let queue = ReviewQueue::open(&recruiter_session(), api.clone()).unwrap();
        queue.load().await.unwrap();
        queue.select(&ids[0]).unwrap();

        api.fail_next_load(ApiError::Network("blip".to_string()));
        queue.mark_attended(&ids[0]).await.unwrap();

        assert_eq!(api.attended_by(&ids[0]).as_deref(), Some("fb-rec"));
        let snapshot = queue.snapshot();
        assert!(snapshot.selected.is_none());
        assert_eq!(
            snapshot.error,
            Some("Error al cargar las solicitudes de reclutamiento")
        );
        assert!(!snapshot.marking);

        queue.load().await.unwrap();
        assert_eq!(queue.snapshot().entries.len(), 1);
        assert!(queue.snapshot().error.is_none());
    }

    #[tokio::test]
    async fn selecting_unknown_entry_fails() {
        let (api, _) = seeded(&["ana"]).await;
        let queue = ReviewQueue::open(&recruiter_session(), api).unwrap();
        queue.load().await.unwrap();

        let missing = RecruitmentId::new("nope");
        assert_eq!(queue.select(&missing), Err(ReviewError::UnknownEntry(missing)));
    }
}
