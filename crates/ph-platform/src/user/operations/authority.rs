//! Role Authority
//!
//! Promotion and demotion of users. Every operation checks, in order: an
//! authenticated caller, the required capability, a well-formed target id,
//! target existence, and the target's current role. Only then is the store
//! asked to apply the change, with the role guard repeated inside the same
//! conditional update.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use utoipa::ToSchema;

use crate::auth::CallerContext;
use crate::details;
use crate::usecase::{UseCaseError, UseCaseResult};
use crate::user::entity::{User, UserId};
use crate::user::repository::UserStore;
use super::transition::RoleTransition;

/// Command naming the user whose role changes.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleChangeCommand {
    /// Target user ID (24 hex characters)
    pub user_id: String,
}

impl RoleChangeCommand {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self { user_id: user_id.into() }
    }
}

pub struct RoleAuthority {
    store: Arc<dyn UserStore>,
}

impl RoleAuthority {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Grant `admin`. Super-admin only; fails if the target is already an admin.
    pub async fn promote_to_admin(
        &self,
        caller: &CallerContext,
        command: &RoleChangeCommand,
    ) -> UseCaseResult<User> {
        self.execute(RoleTransition::PromoteToAdmin, caller, command).await
    }

    /// Set `manager` from any role. Admin only.
    pub async fn promote_to_manager(
        &self,
        caller: &CallerContext,
        command: &RoleChangeCommand,
    ) -> UseCaseResult<User> {
        self.execute(RoleTransition::PromoteToManager, caller, command).await
    }

    /// Return an admin to `user`. Super-admin only.
    pub async fn demote_admin_to_user(
        &self,
        caller: &CallerContext,
        command: &RoleChangeCommand,
    ) -> UseCaseResult<User> {
        self.execute(RoleTransition::DemoteAdminToUser, caller, command).await
    }

    async fn execute(
        &self,
        transition: RoleTransition,
        caller: &CallerContext,
        command: &RoleChangeCommand,
    ) -> UseCaseResult<User> {
        let Some(caller_email) = caller.email.as_deref() else {
            debug!(operation = transition.name(), "Rejected unauthenticated role change");
            return UseCaseResult::failure(UseCaseError::unauthorized(
                "UNAUTHENTICATED",
                "Unauthorized",
            ));
        };

        let capability = transition.required_capability();
        if !capability.held_by(caller) {
            warn!(
                operation = transition.name(),
                caller = caller_email,
                capability = capability.as_str(),
                "Rejected role change: missing capability"
            );
            return UseCaseResult::failure(UseCaseError::unauthorized(
                "UNAUTHORIZED",
                format!("Unauthorized: {} capability required", capability.as_str()),
            ));
        }

        let Some(user_id) = UserId::parse(&command.user_id) else {
            return UseCaseResult::failure(UseCaseError::invalid_argument_with_details(
                "INVALID_USER_ID",
                "Invalid user ID",
                details! { "userId" => command.user_id },
            ));
        };

        let current = match self.store.find_by_id(&user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => return UseCaseResult::failure(user_not_found(&user_id)),
            Err(e) => {
                return UseCaseResult::failure(UseCaseError::store(format!(
                    "Failed to fetch user: {}",
                    e
                )));
            }
        };

        let precondition = transition.precondition();
        if !precondition.matches(current.role) {
            return UseCaseResult::failure(conflict(transition, &user_id, &current));
        }

        let target = transition.target_role();
        match self.store.update_role_if(&user_id, precondition, target).await {
            Ok(Some(updated)) => {
                info!(
                    operation = transition.name(),
                    caller = caller_email,
                    user_id = %user_id,
                    from = %current.role,
                    to = %updated.role,
                    "User role changed"
                );
                UseCaseResult::success(updated)
            }
            // Nothing matched: the record vanished or its role moved since the read
            Ok(None) => match self.store.find_by_id(&user_id).await {
                Ok(None) => UseCaseResult::failure(user_not_found(&user_id)),
                Ok(Some(latest)) => {
                    warn!(
                        operation = transition.name(),
                        user_id = %user_id,
                        role = %latest.role,
                        "Role changed concurrently"
                    );
                    UseCaseResult::failure(conflict(transition, &user_id, &latest))
                }
                Err(e) => UseCaseResult::failure(UseCaseError::store(format!(
                    "Failed to re-read user: {}",
                    e
                ))),
            },
            Err(e) => UseCaseResult::failure(UseCaseError::store(format!(
                "Failed to update user role: {}",
                e
            ))),
        }
    }
}

fn user_not_found(user_id: &UserId) -> UseCaseError {
    UseCaseError::not_found_with_details(
        "USER_NOT_FOUND",
        "User not found",
        details! { "userId" => user_id.to_hex() },
    )
}

fn conflict(transition: RoleTransition, user_id: &UserId, user: &User) -> UseCaseError {
    let (code, message) = transition.conflict();
    UseCaseError::conflict_with_details(
        code,
        message,
        details! {
            "userId" => user_id.to_hex(),
            "role" => user.role.as_str(),
        },
    )
}
