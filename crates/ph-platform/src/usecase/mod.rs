//! Use Case Infrastructure
//!
//! - `UseCaseResult<T>` - sealed result type for use case outcomes
//! - `UseCaseError` - categorized error types for consistent handling

pub mod error;
pub mod result;

pub use error::UseCaseError;
pub use result::UseCaseResult;
