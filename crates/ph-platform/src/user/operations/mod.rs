//! User Operations

pub mod authority;
pub mod directory;
pub mod profile;
pub mod transition;

pub use authority::{RoleAuthority, RoleChangeCommand};
pub use directory::{GetUserUseCase, ListUsersUseCase};
pub use profile::{GetProfileUseCase, ProfileView, UpdateProfileUseCase};
pub use transition::{Capability, RoleTransition};
