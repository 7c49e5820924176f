//! User Aggregate
//!
//! Storefront accounts, their single stored role, and the operations that
//! read and change them.

pub mod api;
pub mod entity;
pub mod memory;
pub mod operations;
pub mod repository;

pub use entity::{ProfileUpdate, User, UserId, UserRole};
pub use memory::InMemoryUserStore;
pub use repository::{MongoUserRepository, RoleCondition, UserStore};
