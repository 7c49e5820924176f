//! Development Data Seeder
//!
//! Seeds one account per role on startup in dev mode and logs a session
//! token for each so the admin endpoints can be exercised with curl.
//!
//! Default accounts:
//!   Super-admin: the first configured super-admin email (stored as `user`)
//!   Admin:       admin@pizzahub.local
//!   Manager:     manager@pizzahub.local
//!   Courier:     courier@pizzahub.local
//!   Customer:    customer@pizzahub.local

use std::sync::Arc;

use tracing::info;

use crate::auth::AuthService;
use crate::shared::error::Result;
use crate::user::entity::{User, UserRole};
use crate::user::repository::UserStore;

pub const DEFAULT_SUPER_ADMIN_EMAIL: &str = "owner@pizzahub.local";

/// Development data seeder
pub struct DevDataSeeder {
    store: Arc<dyn UserStore>,
    auth_service: Arc<AuthService>,
    super_admin_email: String,
}

impl DevDataSeeder {
    pub fn new(store: Arc<dyn UserStore>, auth_service: Arc<AuthService>) -> Self {
        Self {
            store,
            auth_service,
            super_admin_email: DEFAULT_SUPER_ADMIN_EMAIL.to_string(),
        }
    }

    pub fn with_super_admin_email(mut self, email: impl Into<String>) -> Self {
        self.super_admin_email = email.into();
        self
    }

    /// Seed all development users. Existing emails are left untouched.
    pub async fn seed(&self) -> Result<Vec<User>> {
        info!("=== DEV DATA SEEDER ===");

        // The super-admin is stored as a plain user; the capability comes from config
        let accounts = [
            (self.super_admin_email.as_str(), "Pizza Hub Owner", UserRole::User),
            ("admin@pizzahub.local", "Ada Admin", UserRole::Admin),
            ("manager@pizzahub.local", "Marco Manager", UserRole::Manager),
            ("courier@pizzahub.local", "Carla Courier", UserRole::Courier),
            ("customer@pizzahub.local", "Chris Customer", UserRole::User),
        ];

        let mut users = Vec::with_capacity(accounts.len());
        for (email, name, role) in accounts {
            users.push(self.create_user_if_not_exists(email, name, role).await?);
        }

        info!("Development users seeded. Session tokens:");
        for user in &users {
            let token = self.auth_service.issue_session_token(user)?;
            info!("  {} ({}): {}", user.email, user.role, token);
        }
        info!("=======================");

        Ok(users)
    }

    async fn create_user_if_not_exists(
        &self,
        email: &str,
        name: &str,
        role: UserRole,
    ) -> Result<User> {
        if let Some(existing) = self.store.find_by_email(email).await? {
            return Ok(existing);
        }

        let user = User::new(email, name).with_role(role);
        self.store.insert(&user).await?;
        info!("Created user: {} ({})", user.email, role);

        Ok(user)
    }
}
