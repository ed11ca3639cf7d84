//! `sigma-navigation`: what a session may see and open.
//!
//! Everything here is a pure function of the session snapshot and the current
//! path: theme selection, the navigation bar, the services catalog and the
//! per-page route guards.

pub mod guard;
pub mod nav;
pub mod services;
pub mod theme;

pub use guard::{GuardDecision, RouteGuard};
pub use nav::{NavigationItem, SessionAccess, navigation_for, navigation_for_route};
pub use services::{Service, services_for};
pub use theme::{Theme, ThemeConfig};
