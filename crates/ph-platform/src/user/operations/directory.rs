//! Admin user directory: listing and lookup.

use std::sync::Arc;

use crate::auth::CallerContext;
use crate::usecase::{UseCaseError, UseCaseResult};
use crate::user::entity::{User, UserId};
use crate::user::repository::UserStore;

/// Admins and super-admins may browse users.
fn check_directory_access(caller: &CallerContext) -> Result<(), UseCaseError> {
    if !caller.is_authenticated() {
        return Err(UseCaseError::unauthorized("UNAUTHENTICATED", "Unauthorized"));
    }
    if !(caller.is_admin || caller.is_super_admin) {
        return Err(UseCaseError::unauthorized(
            "UNAUTHORIZED",
            "Unauthorized: admin capability required",
        ));
    }
    Ok(())
}

pub struct ListUsersUseCase {
    store: Arc<dyn UserStore>,
}

impl ListUsersUseCase {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    pub async fn execute(&self, caller: &CallerContext) -> UseCaseResult<Vec<User>> {
        if let Err(e) = check_directory_access(caller) {
            return UseCaseResult::failure(e);
        }

        match self.store.find_all().await {
            Ok(users) => UseCaseResult::success(users),
            Err(e) => UseCaseResult::failure(UseCaseError::store(format!(
                "Failed to list users: {}",
                e
            ))),
        }
    }
}

pub struct GetUserUseCase {
    store: Arc<dyn UserStore>,
}

impl GetUserUseCase {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    pub async fn execute(&self, caller: &CallerContext, user_id: &str) -> UseCaseResult<User> {
        if let Err(e) = check_directory_access(caller) {
            return UseCaseResult::failure(e);
        }

        let Some(id) = UserId::parse(user_id) else {
            return UseCaseResult::failure(UseCaseError::invalid_argument(
                "INVALID_USER_ID",
                "Invalid user ID",
            ));
        };

        match self.store.find_by_id(&id).await {
            Ok(Some(user)) => UseCaseResult::success(user),
            Ok(None) => UseCaseResult::failure(UseCaseError::not_found(
                "USER_NOT_FOUND",
                "User not found",
            )),
            Err(e) => UseCaseResult::failure(UseCaseError::store(format!(
                "Failed to fetch user: {}",
                e
            ))),
        }
    }
}
