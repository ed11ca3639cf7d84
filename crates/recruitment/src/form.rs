//! The public application form.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use sigma_core::{DomainError, DomainResult};

use crate::api::RecruitmentApi;
use crate::error::SubmitError;
use crate::model::{Profession, RecruitmentEnvelope, RecruitmentRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecruitmentField {
    Name,
    Discord,
    Phone,
    Dni,
    Profession,
    Motivation,
    Experience,
    Description,
}

/// Per-field validation messages.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Error)]
#[error("invalid recruitment form: {fields:?}")]
pub struct FormErrors {
    pub fields: BTreeMap<RecruitmentField, &'static str>,
}

impl FormErrors {
    pub fn get(&self, field: RecruitmentField) -> Option<&'static str> {
        self.fields.get(&field).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// All messages, in field order.
    pub fn summary(&self) -> String {
        self.fields.values().copied().collect::<Vec<_>>().join(". ")
    }

    fn insert(&mut self, field: RecruitmentField, message: &'static str) {
        self.fields.insert(field, message);
    }
}

/// Form state as edited by the applicant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecruitmentForm {
    pub name: String,
    pub discord: String,
    pub phone: String,
    pub profession: Profession,
    pub dni: String,
    pub motivation: String,
    pub experience: String,
    description: Vec<String>,
}

impl Default for RecruitmentForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            discord: String::new(),
            phone: String::new(),
            profession: Profession::Ems,
            dni: String::new(),
            motivation: String::new(),
            experience: String::new(),
            description: vec![String::new()],
        }
    }
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

impl RecruitmentForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn description(&self) -> &[String] {
        &self.description
    }

    pub fn add_description_line(&mut self) {
        self.description.push(String::new());
    }

    pub fn set_description_line(&mut self, index: usize, value: impl Into<String>) -> DomainResult<()> {
        let line = self
            .description
            .get_mut(index)
            .ok_or_else(|| DomainError::validation(format!("no description line {index}")))?;
        *line = value.into();
        Ok(())
    }

    /// The form always keeps at least one line.
    pub fn remove_description_line(&mut self, index: usize) -> DomainResult<()> {
        if self.description.len() <= 1 {
            return Err(DomainError::invariant("the last description line cannot be removed"));
        }
        if index >= self.description.len() {
            return Err(DomainError::validation(format!("no description line {index}")));
        }
        self.description.remove(index);
        Ok(())
    }

    /// Check every field and build the request to send.
    ///
    /// Police applications are closed; when one is chosen, checking stops there.
    pub fn validate(&self) -> Result<RecruitmentRequest, FormErrors> {
        let mut errors = FormErrors::default();

        if blank(&self.name) {
            errors.insert(RecruitmentField::Name, "El nombre es requerido");
        }
        if blank(&self.discord) {
            errors.insert(RecruitmentField::Discord, "El discord es requerido");
        }
        if blank(&self.phone) {
            errors.insert(RecruitmentField::Phone, "El teléfono es requerido");
        }
        if blank(&self.dni) {
            errors.insert(RecruitmentField::Dni, "El ID Ingame es requerido");
        }
        if self.profession == Profession::Police {
            errors.insert(
                RecruitmentField::Profession,
                "El reclutamiento policial no está disponible actualmente",
            );
            return Err(errors);
        }
        if blank(&self.motivation) {
            errors.insert(RecruitmentField::Motivation, "La motivación es requerida");
        }
        if blank(&self.experience) {
            errors.insert(RecruitmentField::Experience, "La experiencia es requerida");
        }

        let description: Vec<String> = self
            .description
            .iter()
            .filter(|line| !blank(line))
            .cloned()
            .collect();
        if description.is_empty() {
            errors.insert(
                RecruitmentField::Description,
                "Debe proporcionar al menos una descripción del personaje",
            );
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(RecruitmentRequest {
            name: self.name.clone(),
            discord: self.discord.clone(),
            phone: self.phone.clone(),
            profession: self.profession,
            dni: self.dni.clone(),
            motivation: self.motivation.clone(),
            experience: self.experience.clone(),
            description,
        })
    }

    /// Validate, send, and reset the form once the backend accepted it.
    pub async fn submit(&mut self, api: &dyn RecruitmentApi) -> Result<RecruitmentEnvelope, SubmitError> {
        let request = self.validate()?;

        let envelope = api.submit(&request).await.map_err(|e| {
            tracing::error!(error = %e, profession = %request.profession, "error submitting recruitment");
            SubmitError::from(e)
        })?;

        tracing::info!(
            recruitment_id = %envelope.recruitment.id,
            profession = %request.profession,
            "recruitment submitted"
        );
        *self = Self::default();
        Ok(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryRecruitmentApi;
    use sigma_auth::ApiError;

    fn filled() -> RecruitmentForm {
        let mut form = RecruitmentForm::new();
        form.name = "Carla Díaz".to_string();
        form.discord = "carla#0001".to_string();
        form.phone = "555-0101".to_string();
        form.dni = "A-77".to_string();
        form.motivation = "Quiero ayudar".to_string();
        form.experience = "Dos años de rol médico".to_string();
        form.set_description_line(0, "Tranquila y metódica").unwrap();
        form
    }

    #[test]
    fn empty_form_reports_every_required_field() {
        let errors = RecruitmentForm::new().validate().unwrap_err();

        assert_eq!(errors.get(RecruitmentField::Name), Some("El nombre es requerido"));
        assert_eq!(errors.get(RecruitmentField::Dni), Some("El ID Ingame es requerido"));
        assert_eq!(
            errors.get(RecruitmentField::Description),
            Some("Debe proporcionar al menos una descripción del personaje")
        );
        assert_eq!(errors.fields.len(), 7);
        assert_eq!(errors.get(RecruitmentField::Profession), None);
    }

    #[test]
    fn police_applications_stop_validation() {
        let mut form = RecruitmentForm::new();
        form.name = "Pablo".to_string();
        form.profession = Profession::Police;

        let errors = form.validate().unwrap_err();

        assert!(errors.get(RecruitmentField::Profession).is_some());
        assert!(errors.get(RecruitmentField::Discord).is_some());
        assert_eq!(errors.get(RecruitmentField::Motivation), None);
        assert_eq!(errors.get(RecruitmentField::Description), None);
    }

    #[test]
    fn blank_description_lines_are_dropped() {
        let mut form = filled();
        form.add_description_line();
        form.add_description_line();
        form.set_description_line(2, "Buen trato con pacientes").unwrap();

        let request = form.validate().unwrap();

        assert_eq!(
            request.description,
            vec!["Tranquila y metódica".to_string(), "Buen trato con pacientes".to_string()]
        );
    }

    #[test]
    fn whitespace_only_description_counts_as_missing() {
        let mut form = filled();
        form.set_description_line(0, "   ").unwrap();

        let errors = form.validate().unwrap_err();
        assert_eq!(errors.fields.keys().copied().collect::<Vec<_>>(), vec![RecruitmentField::Description]);
    }

    #[test]
    fn last_description_line_cannot_be_removed() {
        let mut form = RecruitmentForm::new();
        assert!(form.remove_description_line(0).is_err());

        form.add_description_line();
        form.remove_description_line(1).unwrap();
        assert_eq!(form.description().len(), 1);
        assert!(form.remove_description_line(5).is_err());
    }

    #[tokio::test]
    async fn submit_sends_cleaned_request_and_resets() {
        let api = InMemoryRecruitmentApi::new();
        let mut form = filled();
        form.add_description_line();

        let envelope = form.submit(&api).await.unwrap();

        assert_eq!(envelope.recruitment.request.description.len(), 1);
        assert!(!envelope.recruitment.attended);
        assert_eq!(form, RecruitmentForm::new());
        assert_eq!(api.submitted().len(), 1);
    }

    #[tokio::test]
    async fn invalid_form_is_not_sent() {
        let api = InMemoryRecruitmentApi::new();
        let mut form = RecruitmentForm::new();

        let err = form.submit(&api).await.unwrap_err();

        assert!(matches!(err, SubmitError::Invalid(_)));
        assert!(api.submitted().is_empty());
    }

    #[tokio::test]
    async fn backend_failure_keeps_the_form() {
        let api = InMemoryRecruitmentApi::new();
        api.fail_submit(ApiError::Status(500, "boom".to_string()));
        let mut form = filled();

        let err = form.submit(&api).await.unwrap_err();

        assert_eq!(err.user_message(), "Error al enviar la solicitud");
        assert_eq!(form, filled());
    }
}
