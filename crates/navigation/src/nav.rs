//! Navigation bar entries per theme, filtered by role.

use serde::Serialize;

use sigma_auth::ResolvedSession;
use sigma_core::UserRole;

use crate::theme::Theme;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationItem {
    pub name: &'static str,
    pub href: &'static str,
    /// Set only by [`navigation_for_route`] for the page being shown.
    pub current: bool,
}

const fn item(name: &'static str, href: &'static str) -> NavigationItem {
    NavigationItem {
        name,
        href,
        current: false,
    }
}

const SIGMA_ITEMS: &[NavigationItem] = &[item("SIGMA", "/"), item("Nuestro Equipo", "/team")];

const HOSPITAL_ITEMS: &[NavigationItem] = &[
    item("Inicio", "/"),
    item("Nuestro Equipo", "/team"),
    item("Pacientes", "/patients"),
    item("Admisiones", "/admissions"),
    item("Exámenes", "/exams"),
];

const POLICE_ITEMS: &[NavigationItem] = &[
    item("Inicio", "/"),
    item("Nuestro Equipo", "/team"),
    item("Verificación", "/police"),
    item("Exámenes", "/exams"),
];

fn template(theme: Theme) -> &'static [NavigationItem] {
    match theme {
        Theme::Sigma => SIGMA_ITEMS,
        Theme::Hospital => HOSPITAL_ITEMS,
        Theme::Police => POLICE_ITEMS,
    }
}

/// The role/admin pair navigation decisions are made from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionAccess {
    /// `None` when nobody is signed in.
    pub role: Option<UserRole>,
    pub is_admin: bool,
}

impl SessionAccess {
    pub fn new(role: Option<UserRole>, is_admin: bool) -> Self {
        Self { role, is_admin }
    }

    pub fn of(session: &ResolvedSession) -> Self {
        Self {
            role: session.role(),
            is_admin: session.is_admin(),
        }
    }
}

fn visible_anonymously(href: &str, theme: Theme) -> bool {
    href == "/" || href == "/team" || (theme == Theme::Police && href == "/police")
}

fn visible_to(href: &str, role: UserRole, is_admin: bool) -> bool {
    match href {
        "/" | "/team" => true,
        "/exams" => is_admin,
        "/patients" | "/admissions" => role == UserRole::Doctor,
        "/police" => role == UserRole::Police,
        // Undeclared pages are public.
        _ => true,
    }
}

/// The theme's entries the given role may see, in template order.
pub fn navigation_for(role: Option<UserRole>, is_admin: bool, theme: Theme) -> Vec<NavigationItem> {
    let items = template(theme).iter();
    match role {
        None => items
            .filter(|item| visible_anonymously(item.href, theme))
            .cloned()
            .collect(),
        Some(role) => items
            .filter(|item| visible_to(item.href, role, is_admin))
            .cloned()
            .collect(),
    }
}

/// Navigation for the page at `pathname`, with that page marked current.
pub fn navigation_for_route(session: &ResolvedSession, pathname: &str) -> Vec<NavigationItem> {
    let access = SessionAccess::of(session);
    let theme = Theme::for_route(pathname);

    let mut items = navigation_for(access.role, access.is_admin, theme);
    for item in &mut items {
        item.current = item.href == pathname;
    }
    items
}
