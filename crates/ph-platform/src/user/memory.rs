//! In-memory user store, used by the `memory` storage backend and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::shared::error::{PlatformError, Result};
use crate::user::entity::{normalize_email, ProfileUpdate, User, UserId, UserRole};
use crate::user::repository::{RoleCondition, UserStore};

#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let store = Self::new();
        {
            let mut map = store.users.write();
            for user in users {
                map.insert(user.id, user);
            }
        }
        store
    }

    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.read().is_empty()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>> {
        Ok(self.users.read().get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let email = normalize_email(email);
        Ok(self.users.read().values().find(|u| u.email == email).cloned())
    }

    async fn find_all(&self) -> Result<Vec<User>> {
        let mut users: Vec<User> = self.users.read().values().cloned().collect();
        users.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(users)
    }

    async fn insert(&self, user: &User) -> Result<()> {
        let mut users = self.users.write();
        if users.values().any(|u| u.email == user.email) {
            return Err(PlatformError::Conflict {
                code: "DUPLICATE_EMAIL".to_string(),
                message: format!("A user with email {} already exists", user.email),
            });
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update_role_if(
        &self,
        id: &UserId,
        condition: RoleCondition,
        role: UserRole,
    ) -> Result<Option<User>> {
        // Check and write under one lock so the guard cannot go stale
        let mut users = self.users.write();
        match users.get_mut(id) {
            Some(user) if condition.matches(user.role) => {
                user.set_role(role);
                Ok(Some(user.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn update_profile(&self, id: &UserId, update: &ProfileUpdate) -> Result<Option<User>> {
        let mut users = self.users.write();
        Ok(users.get_mut(id).map(|user| {
            update.apply_to(user);
            user.clone()
        }))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
