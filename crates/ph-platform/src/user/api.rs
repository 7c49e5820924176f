//! User API
//!
//! Admin endpoints for role changes and the user directory, plus the
//! caller's own profile.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::shared::api_common::ApiJson;
use crate::shared::error::{ErrorResponse, PlatformError};
use crate::shared::middleware::Authenticated;
use crate::usecase::UseCaseResult;
use crate::user::entity::{ProfileUpdate, User};
use crate::user::operations::{
    GetProfileUseCase, GetUserUseCase, ListUsersUseCase, ProfileView, RoleAuthority,
    RoleChangeCommand, UpdateProfileUseCase,
};

/// User response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// user, courier, manager or admin
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id.to_hex(),
            name: u.name,
            email: u.email,
            image: u.image,
            phone: u.phone,
            street_address: u.street_address,
            postal_code: u.postal_code,
            city: u.city,
            country: u.country,
            role: u.role.as_str().to_string(),
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

/// The caller's own profile
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub is_admin: bool,
    pub is_super_admin: bool,
}

impl From<ProfileView> for ProfileResponse {
    fn from(view: ProfileView) -> Self {
        Self {
            user: view.user.into(),
            is_admin: view.is_admin,
            is_super_admin: view.is_super_admin,
        }
    }
}

/// Update profile request. Omitted fields are left unchanged.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub image: Option<String>,
    pub phone: Option<String>,
    pub street_address: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

impl From<UpdateProfileRequest> for ProfileUpdate {
    fn from(req: UpdateProfileRequest) -> Self {
        Self {
            name: req.name,
            image: req.image,
            phone: req.phone,
            street_address: req.street_address,
            postal_code: req.postal_code,
            city: req.city,
            country: req.country,
        }
    }
}

/// Admin API state
#[derive(Clone)]
pub struct AdminUsersState {
    pub role_authority: Arc<RoleAuthority>,
    pub list_users: Arc<ListUsersUseCase>,
    pub get_user: Arc<GetUserUseCase>,
}

/// Profile API state
#[derive(Clone)]
pub struct ProfileState {
    pub get_profile: Arc<GetProfileUseCase>,
    pub update_profile: Arc<UpdateProfileUseCase>,
}

fn respond<T, R: From<T>>(result: UseCaseResult<T>) -> Result<Json<R>, PlatformError> {
    match result {
        UseCaseResult::Success(value) => Ok(Json(value.into())),
        UseCaseResult::Failure(err) => Err(err.into()),
    }
}

/// Promote a user to admin (super-admin only)
#[utoipa::path(
    patch,
    path = "/promote-admin",
    tag = "admin-users",
    operation_id = "patchApiAdminPromoteAdmin",
    request_body = RoleChangeCommand,
    responses(
        (status = 200, description = "User promoted", body = UserResponse),
        (status = 400, description = "Invalid user ID or user is already an admin", body = ErrorResponse),
        (status = 401, description = "Caller is not a super-admin", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn promote_admin(
    State(state): State<AdminUsersState>,
    auth: Authenticated,
    ApiJson(req): ApiJson<RoleChangeCommand>,
) -> Result<Json<UserResponse>, PlatformError> {
    respond(state.role_authority.promote_to_admin(&auth, &req).await)
}

/// Promote a user to manager (admin only)
#[utoipa::path(
    patch,
    path = "/promote-manager",
    tag = "admin-users",
    operation_id = "patchApiAdminPromoteManager",
    request_body = RoleChangeCommand,
    responses(
        (status = 200, description = "User promoted", body = UserResponse),
        (status = 400, description = "Invalid user ID", body = ErrorResponse),
        (status = 401, description = "Caller is not an admin", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn promote_manager(
    State(state): State<AdminUsersState>,
    auth: Authenticated,
    ApiJson(req): ApiJson<RoleChangeCommand>,
) -> Result<Json<UserResponse>, PlatformError> {
    respond(state.role_authority.promote_to_manager(&auth, &req).await)
}

/// Demote an admin to user (super-admin only)
#[utoipa::path(
    patch,
    path = "/demote-admin",
    tag = "admin-users",
    operation_id = "patchApiAdminDemoteAdmin",
    request_body = RoleChangeCommand,
    responses(
        (status = 200, description = "Admin demoted", body = UserResponse),
        (status = 400, description = "Invalid user ID or user is not an admin", body = ErrorResponse),
        (status = 401, description = "Caller is not a super-admin", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn demote_admin(
    State(state): State<AdminUsersState>,
    auth: Authenticated,
    ApiJson(req): ApiJson<RoleChangeCommand>,
) -> Result<Json<UserResponse>, PlatformError> {
    respond(state.role_authority.demote_admin_to_user(&auth, &req).await)
}

/// List all users, ordered by email
#[utoipa::path(
    get,
    path = "/users",
    tag = "admin-users",
    operation_id = "getApiAdminUsers",
    responses(
        (status = 200, description = "All users", body = Vec<UserResponse>),
        (status = 401, description = "Caller is not an admin", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_users(
    State(state): State<AdminUsersState>,
    auth: Authenticated,
) -> Result<Json<Vec<UserResponse>>, PlatformError> {
    match state.list_users.execute(&auth).await {
        UseCaseResult::Success(users) => {
            Ok(Json(users.into_iter().map(UserResponse::from).collect()))
        }
        UseCaseResult::Failure(err) => Err(err.into()),
    }
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "admin-users",
    operation_id = "getApiAdminUsersById",
    params(
        ("id" = String, Path, description = "User ID (24 hex characters)")
    ),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 400, description = "Invalid user ID", body = ErrorResponse),
        (status = 401, description = "Caller is not an admin", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_user(
    State(state): State<AdminUsersState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, PlatformError> {
    respond(state.get_user.execute(&auth, &id).await)
}

/// Get the caller's profile
#[utoipa::path(
    get,
    path = "",
    tag = "profile",
    operation_id = "getApiProfile",
    responses(
        (status = 200, description = "Caller profile", body = ProfileResponse),
        (status = 401, description = "No session", body = ErrorResponse),
        (status = 404, description = "No record for the session email", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_profile(
    State(state): State<ProfileState>,
    auth: Authenticated,
) -> Result<Json<ProfileResponse>, PlatformError> {
    respond(state.get_profile.execute(&auth).await)
}

/// Update the caller's profile
#[utoipa::path(
    put,
    path = "",
    tag = "profile",
    operation_id = "putApiProfile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "No session", body = ErrorResponse),
        (status = 404, description = "No record for the session email", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_profile(
    State(state): State<ProfileState>,
    auth: Authenticated,
    ApiJson(req): ApiJson<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, PlatformError> {
    respond(state.update_profile.execute(&auth, req.into()).await)
}

/// Create the admin users router
pub fn admin_users_router(state: AdminUsersState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(promote_admin))
        .routes(routes!(promote_manager))
        .routes(routes!(demote_admin))
        .routes(routes!(list_users))
        .routes(routes!(get_user))
        .with_state(state)
}

/// Create the profile router
pub fn profile_router(state: ProfileState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(get_profile, update_profile))
        .with_state(state)
}
