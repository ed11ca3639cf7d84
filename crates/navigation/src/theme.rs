//! Portal skins and which routes use them.

use serde::Serialize;

/// One of the three portal skins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Sigma,
    Hospital,
    Police,
}

/// Branding shown by a skin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThemeConfig {
    pub name: &'static str,
    pub primary_color: &'static str,
    pub logo_image: &'static str,
    pub title_image: &'static str,
    /// Title image on light backgrounds.
    pub title_image_base: &'static str,
    pub alt_text: &'static str,
    pub description: &'static str,
}

const SIGMA: ThemeConfig = ThemeConfig {
    name: "SIGMA",
    primary_color: "#ea7317",
    logo_image: "/sigma.png",
    title_image: "/sigma.png",
    title_image_base: "/sigma.png",
    alt_text: "SIGMA - Sistema Integral de Gestión Municipal",
    description: "Sistema integral de gestión de servicios municipales",
};

const HOSPITAL: ThemeConfig = ThemeConfig {
    name: "Hospital",
    primary_color: "#004e81",
    logo_image: "/hosp-logo.png",
    title_image: "/hosp-title-wh.png",
    title_image_base: "/hosp-title.png",
    alt_text: "Hospital General de Real",
    description: "Gestión de pacientes y servicios médicos",
};

const POLICE: ThemeConfig = ThemeConfig {
    name: "Policía",
    primary_color: "#810000",
    logo_image: "/police-logo.png",
    title_image: "/police-title-wh.png",
    title_image_base: "/police-title.png",
    alt_text: "Policía Nacional",
    description: "Verificación y consulta de certificados",
};

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::Sigma, Theme::Hospital, Theme::Police];

    /// Hospital pages get the hospital skin, police pages the police skin,
    /// shared pages the SIGMA skin.
    pub fn for_route(pathname: &str) -> Theme {
        if pathname.starts_with("/patients") || pathname.starts_with("/admissions") {
            Theme::Hospital
        } else if pathname.starts_with("/police") {
            Theme::Police
        } else {
            Theme::Sigma
        }
    }

    pub fn config(&self) -> &'static ThemeConfig {
        match self {
            Theme::Sigma => &SIGMA,
            Theme::Hospital => &HOSPITAL,
            Theme::Police => &POLICE,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Sigma => "sigma",
            Theme::Hospital => "hospital",
            Theme::Police => "police",
        }
    }
}

impl core::fmt::Display for Theme {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
