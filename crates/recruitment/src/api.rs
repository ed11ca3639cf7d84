use async_trait::async_trait;

use sigma_auth::{ApiError, Credential};
use sigma_core::RecruitmentId;

use crate::model::{Recruitment, RecruitmentEnvelope, RecruitmentRequest};

/// Backend recruitment endpoints.
#[async_trait]
pub trait RecruitmentApi: Send + Sync {
    /// Public; no credential needed.
    async fn submit(&self, request: &RecruitmentRequest) -> Result<RecruitmentEnvelope, ApiError>;

    /// Medical applications nobody has attended yet.
    async fn pending_medical(&self, credential: &Credential) -> Result<Vec<Recruitment>, ApiError>;

    async fn mark_attended(
        &self,
        credential: &Credential,
        id: &RecruitmentId,
    ) -> Result<RecruitmentEnvelope, ApiError>;
}
