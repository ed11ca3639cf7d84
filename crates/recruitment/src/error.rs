use thiserror::Error;

use sigma_auth::ApiError;
use sigma_core::RecruitmentId;

use crate::form::FormErrors;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] FormErrors),
    #[error("submission failed: {0}")]
    Api(#[from] ApiError),
}

impl SubmitError {
    pub fn user_message(&self) -> String {
        match self {
            SubmitError::Invalid(errors) => errors.summary(),
            SubmitError::Api(_) => "Error al enviar la solicitud".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReviewError {
    /// The session is not a doctor with the recruiter capability.
    #[error("recruiter access required")]
    Forbidden,
    #[error("a mark-attended request is already in flight")]
    Busy,
    #[error("unknown recruitment {0}")]
    UnknownEntry(RecruitmentId),
    #[error("loading pending recruitments failed: {0}")]
    Load(ApiError),
    #[error("marking recruitment attended failed: {0}")]
    Mark(ApiError),
}

impl ReviewError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ReviewError::Forbidden => "No tienes permisos para gestionar el reclutamiento",
            ReviewError::Busy => "Ya se está procesando una solicitud",
            ReviewError::UnknownEntry(_) => "La solicitud ya no está pendiente",
            ReviewError::Load(_) => "Error al cargar las solicitudes de reclutamiento",
            ReviewError::Mark(_) => "Error al marcar la solicitud como atendida",
        }
    }
}
