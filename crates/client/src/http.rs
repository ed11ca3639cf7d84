//! Backend REST adapter.
//!
//! Every call forwards the credential's id token as a bearer token. Non-2xx
//! answers become [`ApiError`]s via [`ApiError::from_status`].

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use sigma_auth::{ApiError, Credential, ProfileApi};
use sigma_core::{DoctorProfile, PoliceProfile, RecruitmentId, SystemUser};
use sigma_recruitment::{Recruitment, RecruitmentApi, RecruitmentEnvelope, RecruitmentRequest};

#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read<T: DeserializeOwned>(&self, path: &str, resp: reqwest::Response) -> Result<T, ApiError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::debug!(path, status = status.as_u16(), "backend call failed");
            return Err(ApiError::from_status(status.as_u16(), body));
        }
        resp.json::<T>()
            .await
            .map_err(|e| ApiError::Decode(format!("{path}: {e}")))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, credential: &Credential) -> Result<T, ApiError> {
        let resp = self
            .client
            .get(self.url(path))
            .bearer_auth(&credential.id_token)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        self.read(path, resp).await
    }

    async fn send<B, T>(
        &self,
        method: reqwest::Method,
        path: &str,
        credential: Option<&Credential>,
        body: Option<&B>,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let mut req = self.client.request(method, self.url(path));
        if let Some(credential) = credential {
            req = req.bearer_auth(&credential.id_token);
        }
        if let Some(body) = body {
            req = req.json(body);
        }
        let resp = req.send().await.map_err(|e| ApiError::Network(e.to_string()))?;
        self.read(path, resp).await
    }
}

#[async_trait]
impl ProfileApi for HttpBackend {
    async fn current_user(&self, credential: &Credential) -> Result<SystemUser, ApiError> {
        self.get("/users/me", credential).await
    }

    async fn current_doctor(&self, credential: &Credential) -> Result<DoctorProfile, ApiError> {
        self.get("/doctors/me", credential).await
    }

    async fn current_police(&self, credential: &Credential) -> Result<PoliceProfile, ApiError> {
        self.get("/police/me", credential).await
    }
}

#[async_trait]
impl RecruitmentApi for HttpBackend {
    async fn submit(&self, request: &RecruitmentRequest) -> Result<RecruitmentEnvelope, ApiError> {
        self.send(reqwest::Method::POST, "/recruitment/", None, Some(request))
            .await
    }

    async fn pending_medical(&self, credential: &Credential) -> Result<Vec<Recruitment>, ApiError> {
        self.get("/recruitment/medical/pending", credential).await
    }

    async fn mark_attended(
        &self,
        credential: &Credential,
        id: &RecruitmentId,
    ) -> Result<RecruitmentEnvelope, ApiError> {
        let path = format!("/recruitment/medical/{id}/attend");
        self.send::<(), _>(reqwest::Method::PUT, &path, Some(credential), None)
            .await
    }
}
