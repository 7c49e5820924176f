//! Sessions and caller resolution

pub mod auth_service;
pub mod caller;

pub use auth_service::{AuthConfig, AuthService, SessionClaims, extract_bearer_token};
pub use caller::{CallerContext, SessionResolver, SuperAdminAllowList};
