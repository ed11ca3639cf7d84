use serde::{Deserialize, Serialize};

use sigma_core::FirebaseUid;

/// Identity-provider proof of an authenticated session.
///
/// Owned by the provider; the session only keeps a copy. The id token is
/// forwarded to the backend as a bearer token and is never serialized out.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub uid: FirebaseUid,
    pub email: Option<String>,
    #[serde(skip_serializing, default)]
    pub id_token: String,
}

impl Credential {
    pub fn new(uid: FirebaseUid, email: Option<String>, id_token: impl Into<String>) -> Self {
        Self {
            uid,
            email,
            id_token: id_token.into(),
        }
    }

    /// Same account, possibly with a refreshed token.
    pub fn same_account(&self, other: &Credential) -> bool {
        self.uid == other.uid
    }
}

impl core::fmt::Debug for Credential {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Credential")
            .field("uid", &self.uid)
            .field("email", &self.email)
            .field("id_token", &"<redacted>")
            .finish()
    }
}
