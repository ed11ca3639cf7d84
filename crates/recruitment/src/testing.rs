//! In-memory recruitment backend for tests.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use sigma_auth::testing::FetchGate;
use sigma_auth::{ApiError, Credential};
use sigma_core::RecruitmentId;

use crate::api::RecruitmentApi;
use crate::model::{Profession, Recruitment, RecruitmentEnvelope, RecruitmentRequest};

#[derive(Default)]
struct Store {
    recruitments: Vec<Recruitment>,
    submit_failure: Option<ApiError>,
    mark_failure: Option<ApiError>,
    mark_gate: Option<FetchGate>,
    load_failure: Option<ApiError>,
    bearer_tokens: Vec<String>,
}

/// Keeps submissions in memory; ids are UUIDv7 strings.
#[derive(Default)]
pub struct InMemoryRecruitmentApi {
    store: Mutex<Store>,
}

impl InMemoryRecruitmentApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn store(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn fail_submit(&self, error: ApiError) {
        self.store().submit_failure = Some(error);
    }

    pub fn fail_next_mark(&self, error: ApiError) {
        self.store().mark_failure = Some(error);
    }

    pub fn fail_next_load(&self, error: ApiError) {
        self.store().load_failure = Some(error);
    }

    /// Id tokens presented by authenticated calls, oldest first.
    pub fn bearer_tokens(&self) -> Vec<String> {
        self.store().bearer_tokens.clone()
    }

    /// Hold the next mark-attended call until the gate is released.
    pub fn hold_next_mark(&self) -> FetchGate {
        let gate = FetchGate::default();
        self.store().mark_gate = Some(gate.clone());
        gate
    }

    pub fn submitted(&self) -> Vec<Recruitment> {
        self.store().recruitments.clone()
    }

    pub fn attended_by(&self, id: &RecruitmentId) -> Option<String> {
        self.store()
            .recruitments
            .iter()
            .find(|r| &r.id == id)
            .and_then(|r| r.attended_by.clone())
    }
}

#[async_trait]
impl RecruitmentApi for InMemoryRecruitmentApi {
    async fn submit(&self, request: &RecruitmentRequest) -> Result<RecruitmentEnvelope, ApiError> {
        let mut store = self.store();
        if let Some(error) = store.submit_failure.take() {
            return Err(error);
        }
        let recruitment = Recruitment {
            id: RecruitmentId::new(Uuid::now_v7().to_string()),
            request: request.clone(),
            attended: false,
            attended_by: None,
            attended_at: None,
            created_at: Some(Utc::now()),
        };
        store.recruitments.push(recruitment.clone());
        Ok(RecruitmentEnvelope {
            message: format!(
                "Solicitud de reclutamiento para {} creada exitosamente",
                request.profession
            ),
            recruitment,
        })
    }

    async fn pending_medical(&self, credential: &Credential) -> Result<Vec<Recruitment>, ApiError> {
        let mut store = self.store();
        store.bearer_tokens.push(credential.id_token.clone());
        if let Some(error) = store.load_failure.take() {
            return Err(error);
        }
        Ok(store
            .recruitments
            .iter()
            .filter(|r| r.request.profession == Profession::Ems && !r.attended)
            .cloned()
            .collect())
    }

    async fn mark_attended(
        &self,
        credential: &Credential,
        id: &RecruitmentId,
    ) -> Result<RecruitmentEnvelope, ApiError> {
        let gate = self.store().mark_gate.take();
        if let Some(gate) = gate {
            gate.hold().await;
        }

        let mut store = self.store();
        store.bearer_tokens.push(credential.id_token.clone());
        if let Some(error) = store.mark_failure.take() {
            return Err(error);
        }
        let recruitment = store
            .recruitments
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or(ApiError::NotFound)?;
        recruitment.attended = true;
        recruitment.attended_by = Some(credential.uid.to_string());
        recruitment.attended_at = Some(Utc::now());

        Ok(RecruitmentEnvelope {
            message: "Solicitud médica marcada como atendida exitosamente".to_string(),
            recruitment: recruitment.clone(),
        })
    }
}
