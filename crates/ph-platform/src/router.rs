//! Platform router assembly.

use std::sync::Arc;

use axum::{routing::get, Json, Router};
use utoipa::openapi::OpenApi;
use utoipa_axum::router::OpenApiRouter;

use crate::shared::health_api::{health_router, HealthState};
use crate::shared::middleware::{AppState, AuthLayer};
use crate::user::api::{admin_users_router, profile_router, AdminUsersState, ProfileState};
use crate::user::operations::{
    GetProfileUseCase, GetUserUseCase, ListUsersUseCase, RoleAuthority, UpdateProfileUseCase,
};
use crate::user::repository::UserStore;

/// Build every platform route over one shared store handle.
///
/// The generated OpenAPI document is served at `/q/openapi` and also
/// returned so callers can amend or export it.
pub fn platform_router(
    store: Arc<dyn UserStore>,
    app_state: AppState,
    health: HealthState,
) -> (Router, OpenApi) {
    let admin_state = AdminUsersState {
        role_authority: Arc::new(RoleAuthority::new(store.clone())),
        list_users: Arc::new(ListUsersUseCase::new(store.clone())),
        get_user: Arc::new(GetUserUseCase::new(store.clone())),
    };
    let profile_state = ProfileState {
        get_profile: Arc::new(GetProfileUseCase::new(store.clone())),
        update_profile: Arc::new(UpdateProfileUseCase::new(store)),
    };

    let (router, mut openapi) = OpenApiRouter::new()
        .nest("/api/admin", admin_users_router(admin_state))
        .nest("/api/profile", profile_router(profile_state))
        .split_for_parts();

    openapi.info.title = "Pizza Hub Platform API".to_string();
    openapi.info.version = env!("CARGO_PKG_VERSION").to_string();
    openapi.info.description = Some("User profiles and role administration".to_string());

    let spec = openapi.clone();
    let app = Router::new()
        .merge(router)
        .nest("/health", health_router(health))
        .route("/q/openapi", get(move || {
            let spec = spec.clone();
            async move { Json(spec) }
        }))
        .layer(AuthLayer::new(app_state));

    (app, openapi)
}
