//! The "Mis Servicios" catalog.

use serde::Serialize;

use sigma_core::UserRole;

use crate::theme::Theme;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Service {
    pub title: &'static str,
    pub description: &'static str,
    pub href: &'static str,
    /// Skin whose colour the service card uses.
    pub theme: Theme,
    pub available: bool,
}

/// Every service, flagged with whether this role may use it.
pub fn services_for(role: Option<UserRole>, is_admin: bool) -> Vec<Service> {
    vec![
        Service {
            title: "Gestión Hospitalaria",
            description: "Administra pacientes, admisiones y servicios médicos",
            href: "/patients",
            theme: Theme::Hospital,
            available: role == Some(UserRole::Doctor),
        },
        Service {
            title: "Verificación Policial",
            description: "Verifica y consulta certificados emitidos",
            href: "/police",
            theme: Theme::Police,
            available: role == Some(UserRole::Police),
        },
        Service {
            title: "Gestión de Exámenes",
            description: "Administra los exámenes del sistema",
            href: "/exams",
            theme: Theme::Sigma,
            available: is_admin,
        },
        Service {
            title: "Nuestro Equipo",
            description: "Conoce al equipo detrás de SIGMA",
            href: "/team",
            theme: Theme::Sigma,
            available: true,
        },
        Service {
            title: "Reclutamiento",
            description: "Postúlate para formar parte de los servicios municipales",
            href: "/recruitment",
            theme: Theme::Sigma,
            available: true,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn available(role: Option<UserRole>, is_admin: bool) -> Vec<&'static str> {
        services_for(role, is_admin)
            .into_iter()
            .filter(|s| s.available)
            .map(|s| s.href)
            .collect()
    }

    #[test]
    fn doctor_gets_hospital_services() {
        assert_eq!(available(Some(UserRole::Doctor), false), vec!["/patients", "/team", "/recruitment"]);
    }

    #[test]
    fn police_admin_gets_verification_and_exams() {
        assert_eq!(
            available(Some(UserRole::Police), true),
            vec!["/police", "/exams", "/team", "/recruitment"]
        );
    }

    #[test]
    fn anonymous_sees_only_public_services() {
        assert_eq!(available(None, false), vec!["/team", "/recruitment"]);
    }
}
