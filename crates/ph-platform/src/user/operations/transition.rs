//! Role transition table.

use crate::auth::CallerContext;
use crate::user::entity::UserRole;
use crate::user::repository::RoleCondition;

/// Capability a caller must hold to request a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Admin,
    SuperAdmin,
}

impl Capability {
    pub fn held_by(&self, caller: &CallerContext) -> bool {
        match self {
            Self::Admin => caller.is_admin,
            Self::SuperAdmin => caller.is_super_admin,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::SuperAdmin => "super-admin",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleTransition {
    PromoteToAdmin,
    PromoteToManager,
    DemoteAdminToUser,
}

impl RoleTransition {
    pub fn name(&self) -> &'static str {
        match self {
            Self::PromoteToAdmin => "promote_to_admin",
            Self::PromoteToManager => "promote_to_manager",
            Self::DemoteAdminToUser => "demote_admin_to_user",
        }
    }

    pub fn required_capability(&self) -> Capability {
        match self {
            Self::PromoteToAdmin | Self::DemoteAdminToUser => Capability::SuperAdmin,
            Self::PromoteToManager => Capability::Admin,
        }
    }

    /// Condition the target's current role must satisfy.
    pub fn precondition(&self) -> RoleCondition {
        match self {
            Self::PromoteToAdmin => RoleCondition::IsNot(UserRole::Admin),
            // Re-promoting a manager re-persists `manager`
            Self::PromoteToManager => RoleCondition::Any,
            Self::DemoteAdminToUser => RoleCondition::Is(UserRole::Admin),
        }
    }

    pub fn target_role(&self) -> UserRole {
        match self {
            Self::PromoteToAdmin => UserRole::Admin,
            Self::PromoteToManager => UserRole::Manager,
            Self::DemoteAdminToUser => UserRole::User,
        }
    }

    /// Error code and message reported when the precondition fails.
    pub fn conflict(&self) -> (&'static str, &'static str) {
        match self {
            Self::PromoteToAdmin => ("ALREADY_ADMIN", "User is already an admin"),
            Self::DemoteAdminToUser => ("NOT_ADMIN", "User is not an admin"),
            Self::PromoteToManager => ("ROLE_CHANGED", "User role changed concurrently"),
        }
    }
}
