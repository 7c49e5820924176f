//! Caller Resolution
//!
//! Turns validated session claims into a `CallerContext`: the caller's email
//! plus two independently derived capability flags.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::auth::auth_service::SessionClaims;
use crate::shared::error::Result;
use crate::user::entity::normalize_email;
use crate::user::repository::UserStore;

/// Per-request caller identity and capabilities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallerContext {
    /// Absent when the request carries no valid session.
    pub email: Option<String>,
    /// Caller's own record is stored with role `admin`.
    pub is_admin: bool,
    /// Caller's email is on the super-admin allow-list.
    pub is_super_admin: bool,
}

impl CallerContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            is_admin: false,
            is_super_admin: false,
        }
    }

    pub fn with_admin(mut self, is_admin: bool) -> Self {
        self.is_admin = is_admin;
        self
    }

    pub fn with_super_admin(mut self, is_super_admin: bool) -> Self {
        self.is_super_admin = is_super_admin;
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.email.is_some()
    }

    /// Label for log lines.
    pub fn label(&self) -> &str {
        self.email.as_deref().unwrap_or("anonymous")
    }
}

/// Emails granted the super-admin capability.
#[derive(Debug, Clone, Default)]
pub struct SuperAdminAllowList {
    emails: HashSet<String>,
}

impl SuperAdminAllowList {
    pub fn new<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            emails: emails
                .into_iter()
                .map(|e| normalize_email(e.as_ref()))
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    pub fn contains(&self, email: &str) -> bool {
        self.emails.contains(&normalize_email(email))
    }

    pub fn len(&self) -> usize {
        self.emails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }
}

pub struct SessionResolver {
    store: Arc<dyn UserStore>,
    super_admins: SuperAdminAllowList,
}

impl SessionResolver {
    pub fn new(store: Arc<dyn UserStore>, super_admins: SuperAdminAllowList) -> Self {
        Self { store, super_admins }
    }

    /// Build the caller context for validated claims.
    ///
    /// A missing user record is not an error: the caller keeps their email
    /// and super-admin status but is not an admin.
    pub async fn resolve(&self, claims: &SessionClaims) -> Result<CallerContext> {
        let email = normalize_email(&claims.email);
        if email.is_empty() {
            return Ok(CallerContext::anonymous());
        }

        let is_super_admin = self.super_admins.contains(&email);
        let is_admin = self
            .store
            .find_by_email(&email)
            .await?
            .map(|user| user.is_admin())
            .unwrap_or(false);

        debug!(caller = %email, is_admin, is_super_admin, "Resolved caller");

        Ok(CallerContext {
            email: Some(email),
            is_admin,
            is_super_admin,
        })
    }
}
