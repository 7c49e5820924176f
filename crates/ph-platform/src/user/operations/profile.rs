//! Self-service profile use cases.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::CallerContext;
use crate::usecase::{UseCaseError, UseCaseResult};
use crate::user::entity::{ProfileUpdate, User};
use crate::user::repository::UserStore;

const MAX_NAME_LEN: usize = 100;

/// The caller's record with derived capability flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub user: User,
    pub is_admin: bool,
    pub is_super_admin: bool,
}

fn unauthenticated<T>() -> UseCaseResult<T> {
    UseCaseResult::failure(UseCaseError::unauthorized("UNAUTHENTICATED", "Unauthorized"))
}

fn profile_not_found<T>() -> UseCaseResult<T> {
    UseCaseResult::failure(UseCaseError::not_found("USER_NOT_FOUND", "User not found"))
}

pub struct GetProfileUseCase {
    store: Arc<dyn UserStore>,
}

impl GetProfileUseCase {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    pub async fn execute(&self, caller: &CallerContext) -> UseCaseResult<ProfileView> {
        let Some(email) = caller.email.as_deref() else {
            return unauthenticated();
        };

        match self.store.find_by_email(email).await {
            Ok(Some(user)) => UseCaseResult::success(ProfileView {
                is_admin: user.is_admin(),
                is_super_admin: caller.is_super_admin,
                user,
            }),
            Ok(None) => profile_not_found(),
            Err(e) => UseCaseResult::failure(UseCaseError::store(format!(
                "Failed to fetch profile: {}",
                e
            ))),
        }
    }
}

pub struct UpdateProfileUseCase {
    store: Arc<dyn UserStore>,
}

impl UpdateProfileUseCase {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    pub async fn execute(
        &self,
        caller: &CallerContext,
        update: ProfileUpdate,
    ) -> UseCaseResult<User> {
        let Some(email) = caller.email.as_deref() else {
            return unauthenticated();
        };

        if let Some(name) = &update.name {
            if name.trim().is_empty() {
                return UseCaseResult::failure(UseCaseError::invalid_argument(
                    "NAME_REQUIRED",
                    "Name cannot be blank",
                ));
            }
            if name.chars().count() > MAX_NAME_LEN {
                return UseCaseResult::failure(UseCaseError::invalid_argument(
                    "NAME_TOO_LONG",
                    format!("Name must be at most {} characters", MAX_NAME_LEN),
                ));
            }
        }

        let existing = match self.store.find_by_email(email).await {
            Ok(Some(user)) => user,
            Ok(None) => return profile_not_found(),
            Err(e) => {
                return UseCaseResult::failure(UseCaseError::store(format!(
                    "Failed to fetch profile: {}",
                    e
                )));
            }
        };

        if update.is_empty() {
            return UseCaseResult::success(existing);
        }

        match self.store.update_profile(&existing.id, &update).await {
            Ok(Some(user)) => {
                info!(user_id = %user.id, "Profile updated");
                UseCaseResult::success(user)
            }
            Ok(None) => profile_not_found(),
            Err(e) => UseCaseResult::failure(UseCaseError::store(format!(
                "Failed to update profile: {}",
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::entity::UserRole;
    use crate::user::memory::InMemoryUserStore;

    fn store() -> Arc<InMemoryUserStore> {
        Arc::new(InMemoryUserStore::with_users([
            User::new("admin@pizzahub.test", "Admin").with_role(UserRole::Admin),
            User::new("mario@pizzahub.test", "Mario"),
        ]))
    }

    #[tokio::test]
    async fn test_get_profile_flags() {
        let use_case = GetProfileUseCase::new(store());
        let caller = CallerContext::authenticated("admin@pizzahub.test").with_super_admin(true);

        let view = use_case.execute(&caller).await.unwrap();
        assert_eq!(view.user.email, "admin@pizzahub.test");
        assert!(view.is_admin);
        assert!(view.is_super_admin);
    }

    #[tokio::test]
    async fn test_get_profile_requires_session() {
        let use_case = GetProfileUseCase::new(store());
        let err = use_case.execute(&CallerContext::anonymous()).await.unwrap_err();
        assert_eq!(err.http_status_code(), 401);
    }

    #[tokio::test]
    async fn test_get_profile_without_record() {
        let use_case = GetProfileUseCase::new(store());
        let caller = CallerContext::authenticated("ghost@pizzahub.test");
        let err = use_case.execute(&caller).await.unwrap_err();
        assert_eq!(err.http_status_code(), 404);
    }

    #[tokio::test]
    async fn test_update_profile_changes_only_given_fields() {
        let store = store();
        let use_case = UpdateProfileUseCase::new(store.clone());
        let caller = CallerContext::authenticated("mario@pizzahub.test");

        let updated = use_case
            .execute(&caller, ProfileUpdate {
                city: Some("Naples".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(updated.city.as_deref(), Some("Naples"));
        assert_eq!(updated.name, "Mario");
        assert_eq!(updated.role, UserRole::User);
    }

    #[tokio::test]
    async fn test_update_profile_rejects_long_name() {
        let use_case = UpdateProfileUseCase::new(store());
        let caller = CallerContext::authenticated("mario@pizzahub.test");

        let err = use_case
            .execute(&caller, ProfileUpdate {
                name: Some("x".repeat(MAX_NAME_LEN + 1)),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), "NAME_TOO_LONG");
        assert_eq!(err.http_status_code(), 400);
    }
}
