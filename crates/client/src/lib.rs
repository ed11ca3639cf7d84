//! `sigma-client`: HTTP adapters for the backend REST API and the identity
//! provider's REST endpoints.

pub mod config;
pub mod firebase;
pub mod http;

pub use config::{ClientConfig, ConfigError};
pub use firebase::FirebaseIdentityProvider;
pub use http::HttpBackend;
