//! Identity provider over the Firebase Auth REST API (identitytoolkit v1).
//!
//! The provider keeps the current credential in a `watch` channel. Sign-in,
//! sign-up and sign-out notify subscribers; token refreshes from
//! reauthentication and password updates replace the value silently.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::watch;

use sigma_auth::{Credential, IdentityProvider, ProviderError, ProviderErrorCode};
use sigma_core::FirebaseUid;

pub struct FirebaseIdentityProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    credential: watch::Sender<Option<Credential>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    id_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateResponse {
    #[serde(default)]
    id_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

/// Map a REST error message (e.g. `WEAK_PASSWORD : ...`) to a provider code.
pub fn code_for_message(message: &str) -> ProviderErrorCode {
    let head = message.split(':').next().unwrap_or_default().trim();
    match head {
        "EMAIL_NOT_FOUND" => ProviderErrorCode::UserNotFound,
        "INVALID_PASSWORD" => ProviderErrorCode::WrongPassword,
        "INVALID_LOGIN_CREDENTIALS" => ProviderErrorCode::InvalidCredential,
        "INVALID_EMAIL" | "MISSING_EMAIL" => ProviderErrorCode::InvalidEmail,
        "WEAK_PASSWORD" => ProviderErrorCode::WeakPassword,
        "CREDENTIAL_TOO_OLD_LOGIN_AGAIN" | "TOKEN_EXPIRED" => ProviderErrorCode::RequiresRecentLogin,
        "TOO_MANY_ATTEMPTS_TRY_LATER" => ProviderErrorCode::TooManyRequests,
        "EMAIL_EXISTS" => ProviderErrorCode::EmailAlreadyInUse,
        "USER_DISABLED" => ProviderErrorCode::UserDisabled,
        other => ProviderErrorCode::Other(format!("auth/{}", other.to_ascii_lowercase().replace('_', "-"))),
    }
}

impl FirebaseIdentityProvider {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let (credential, _) = watch::channel(None);
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            credential,
        }
    }

    async fn call<T, B>(&self, endpoint: &str, body: &B) -> Result<T, ProviderError>
    where
        T: for<'de> Deserialize<'de>,
        B: Serialize + ?Sized + Sync,
    {
        let url = format!("{}/accounts:{}", self.base_url, endpoint);
        let resp = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::new(ProviderErrorCode::NetworkRequestFailed, e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|envelope| envelope.error.message)
                .unwrap_or_else(|_| format!("HTTP {}", status.as_u16()));
            tracing::debug!(endpoint, status = status.as_u16(), %message, "identity provider rejected request");
            return Err(ProviderError::new(code_for_message(&message), message));
        }

        resp.json::<T>().await.map_err(|e| {
            ProviderError::new(ProviderErrorCode::Other("auth/internal-error".to_string()), e.to_string())
        })
    }

    async fn password_call(&self, endpoint: &str, email: &str, password: &str) -> Result<Credential, ProviderError> {
        let body = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };
        let resp: AuthResponse = self.call(endpoint, &body).await?;
        Ok(Credential::new(
            FirebaseUid::new(resp.local_id),
            resp.email.or_else(|| Some(email.to_string())),
            resp.id_token,
        ))
    }

    /// Replace the stored credential without waking subscribers.
    fn refresh_silently(&self, credential: Credential) {
        self.credential.send_if_modified(|current| {
            *current = Some(credential);
            false
        });
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentityProvider {
    fn subscribe(&self) -> watch::Receiver<Option<Credential>> {
        self.credential.subscribe()
    }

    fn current(&self) -> Option<Credential> {
        self.credential.borrow().clone()
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Credential, ProviderError> {
        let credential = self.password_call("signInWithPassword", email, password).await?;
        self.credential.send_replace(Some(credential.clone()));
        Ok(credential)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Credential, ProviderError> {
        let credential = self.password_call("signUp", email, password).await?;
        self.credential.send_replace(Some(credential.clone()));
        Ok(credential)
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        self.credential.send_replace(None);
        Ok(())
    }

    async fn reauthenticate(
        &self,
        credential: &Credential,
        email: &str,
        password: &str,
    ) -> Result<Credential, ProviderError> {
        let refreshed = self.password_call("signInWithPassword", email, password).await?;
        if !refreshed.same_account(credential) {
            return Err(ProviderError::new(
                ProviderErrorCode::Other("auth/user-mismatch".to_string()),
                "reauthenticated as a different account",
            ));
        }
        self.refresh_silently(refreshed.clone());
        Ok(refreshed)
    }

    async fn update_password(&self, credential: &Credential, new_password: &str) -> Result<(), ProviderError> {
        let body = json!({
            "idToken": credential.id_token,
            "password": new_password,
            "returnSecureToken": true,
        });
        let resp: UpdateResponse = self.call("update", &body).await?;
        if let Some(id_token) = resp.id_token {
            self.refresh_silently(Credential::new(credential.uid.clone(), credential.email.clone(), id_token));
        }
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), ProviderError> {
        let body = json!({ "requestType": "PASSWORD_RESET", "email": email });
        let _: serde_json::Value = self.call("sendOobCode", &body).await?;
        Ok(())
    }
}
