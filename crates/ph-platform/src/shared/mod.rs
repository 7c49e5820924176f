//! Shared HTTP plumbing and error types

pub mod api_common;
pub mod error;
pub mod health_api;
pub mod middleware;

pub use error::{PlatformError, Result};
