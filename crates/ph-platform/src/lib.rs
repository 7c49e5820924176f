//! Pizza Hub Platform
//!
//! User accounts and role administration for the storefront:
//! - Single-role user records (`user`, `courier`, `manager`, `admin`)
//! - `RoleAuthority`: capability-gated promotion and demotion applied as
//!   one conditional store update
//! - Session tokens and caller resolution (super-admin via allow-list)
//! - Profile and admin REST endpoints
//!
//! ## Module Organization
//!
//! The `user` aggregate contains:
//! - `entity` - Domain entities
//! - `repository` - `UserStore` trait and MongoDB implementation
//! - `memory` - In-memory `UserStore`
//! - `operations` - Use case operations
//! - `api` - REST endpoints

pub mod user;

// Authentication & caller resolution
pub mod auth;

// Shared infrastructure
pub mod shared;

// Cross-cutting concerns
pub mod usecase;
pub mod seed;

pub mod router;

pub use shared::error::{PlatformError, Result};
pub use usecase::{UseCaseError, UseCaseResult};

pub use user::entity::{ProfileUpdate, User, UserId, UserRole};
pub use user::repository::{MongoUserRepository, RoleCondition, UserStore};
pub use user::memory::InMemoryUserStore;
pub use user::operations::{RoleAuthority, RoleChangeCommand};

pub use auth::{AuthConfig, AuthService, CallerContext, SessionResolver, SuperAdminAllowList};
pub use shared::middleware::{AppState, AuthLayer, Authenticated};
pub use shared::health_api::HealthState;
pub use router::platform_router;
pub use seed::DevDataSeeder;
