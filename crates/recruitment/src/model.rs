//! Recruitment wire types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sigma_core::RecruitmentId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Profession {
    #[default]
    #[serde(rename = "EMS")]
    Ems,
    #[serde(rename = "POLICE")]
    Police,
}

impl Profession {
    pub fn as_str(&self) -> &'static str {
        match self {
            Profession::Ems => "EMS",
            Profession::Police => "POLICE",
        }
    }
}

impl core::fmt::Display for Profession {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An application as submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecruitmentRequest {
    pub name: String,
    pub discord: String,
    pub phone: String,
    pub profession: Profession,
    /// In-game ID.
    pub dni: String,
    pub motivation: String,
    pub experience: String,
    pub description: Vec<String>,
}

/// A stored application, as listed for review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recruitment {
    pub id: RecruitmentId,
    #[serde(flatten)]
    pub request: RecruitmentRequest,
    #[serde(default)]
    pub attended: bool,
    /// Who marked it attended.
    #[serde(default)]
    pub attended_by: Option<String>,
    #[serde(default, with = "sigma_core::user::timestamp::option")]
    pub attended_at: Option<DateTime<Utc>>,
    #[serde(default, with = "sigma_core::user::timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,
}

/// `{message, recruitment}` reply to submit and attend calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecruitmentEnvelope {
    pub message: String,
    pub recruitment: Recruitment,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stored_recruitment_reads_backend_shape() {
        let recruitment: Recruitment = serde_json::from_value(json!({
            "id": "rec-1",
            "name": "Carla",
            "discord": "carla#1",
            "phone": "555-0101",
            "profession": "EMS",
            "dni": "A-77",
            "motivation": "ayudar",
            "experience": "2 años",
            "description": ["tranquila"],
            "attended": false,
            "attended_by": null,
            "attended_at": null,
            "created_at": "2024-06-01T18:30:00.250000"
        }))
        .unwrap();

        assert_eq!(recruitment.id.as_str(), "rec-1");
        assert_eq!(recruitment.request.profession, Profession::Ems);
        assert!(recruitment.attended_at.is_none());
        assert_eq!(
            recruitment.created_at.map(|t| t.timestamp()),
            Some(1_717_266_600)
        );
    }

    #[test]
    fn profession_is_uppercase_on_the_wire() {
        assert_eq!(serde_json::to_value(Profession::Police).unwrap(), json!("POLICE"));
    }
}
