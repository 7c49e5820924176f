//! Use Case Errors
//!
//! Categorized error types for use case failures.
//! Errors are categorized by type to enable consistent HTTP status mapping.
//!
//! # Creating Errors with Details
//!
//! ```ignore
//! use ph_platform::{details, usecase::UseCaseError};
//!
//! UseCaseError::conflict_with_details(
//!     "ALREADY_ADMIN",
//!     "User is already an admin",
//!     details! { "userId" => user_id },
//! );
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Macro for creating error detail maps.
///
/// ```ignore
/// let details = details! {
///     "userId" => user_id,
///     "role" => "admin",
/// };
/// ```
#[macro_export]
macro_rules! details {
    () => {
        std::collections::HashMap::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = std::collections::HashMap::new();
        $(
            map.insert($key.to_string(), serde_json::json!($value));
        )+
        map
    }};
}

/// Categorized error types for use case failures.
///
/// Each variant maps to a specific HTTP status code:
/// - `Unauthorized` -> 401
/// - `InvalidArgument` -> 400
/// - `NotFound` -> 404
/// - `Conflict` -> 400
/// - `StoreFailure` -> 500
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UseCaseError {
    /// Caller is unauthenticated or lacks the required capability.
    Unauthorized {
        code: String,
        message: String,
        #[serde(default)]
        details: HashMap<String, serde_json::Value>,
    },

    /// Malformed input (e.g. a target id that is not a valid key).
    InvalidArgument {
        code: String,
        message: String,
        #[serde(default)]
        details: HashMap<String, serde_json::Value>,
    },

    /// Target record does not exist.
    NotFound {
        code: String,
        message: String,
        #[serde(default)]
        details: HashMap<String, serde_json::Value>,
    },

    /// Target's current state violates the operation's precondition.
    Conflict {
        code: String,
        message: String,
        #[serde(default)]
        details: HashMap<String, serde_json::Value>,
    },

    /// The user store could not complete the request.
    StoreFailure {
        code: String,
        message: String,
        #[serde(default)]
        details: HashMap<String, serde_json::Value>,
    },
}

impl UseCaseError {
    pub fn unauthorized(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unauthorized {
            code: code.into(),
            message: message.into(),
            details: HashMap::new(),
        }
    }

    pub fn invalid_argument(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            code: code.into(),
            message: message.into(),
            details: HashMap::new(),
        }
    }

    pub fn invalid_argument_with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self::InvalidArgument {
            code: code.into(),
            message: message.into(),
            details,
        }
    }

    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFound {
            code: code.into(),
            message: message.into(),
            details: HashMap::new(),
        }
    }

    pub fn not_found_with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self::NotFound {
            code: code.into(),
            message: message.into(),
            details,
        }
    }

    pub fn conflict(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Conflict {
            code: code.into(),
            message: message.into(),
            details: HashMap::new(),
        }
    }

    pub fn conflict_with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self::Conflict {
            code: code.into(),
            message: message.into(),
            details,
        }
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::StoreFailure {
            code: "STORE_FAILURE".to_string(),
            message: message.into(),
            details: HashMap::new(),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Self::Unauthorized { code, .. } => code,
            Self::InvalidArgument { code, .. } => code,
            Self::NotFound { code, .. } => code,
            Self::Conflict { code, .. } => code,
            Self::StoreFailure { code, .. } => code,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Unauthorized { message, .. } => message,
            Self::InvalidArgument { message, .. } => message,
            Self::NotFound { message, .. } => message,
            Self::Conflict { message, .. } => message,
            Self::StoreFailure { message, .. } => message,
        }
    }

    pub fn details(&self) -> &HashMap<String, serde_json::Value> {
        match self {
            Self::Unauthorized { details, .. } => details,
            Self::InvalidArgument { details, .. } => details,
            Self::NotFound { details, .. } => details,
            Self::Conflict { details, .. } => details,
            Self::StoreFailure { details, .. } => details,
        }
    }

    /// HTTP status the transport layer answers with.
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Unauthorized { .. } => 401,
            Self::InvalidArgument { .. } => 400,
            Self::NotFound { .. } => 404,
            Self::Conflict { .. } => 400,
            Self::StoreFailure { .. } => 500,
        }
    }
}

impl std::fmt::Display for UseCaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message())
    }
}

impl std::error::Error for UseCaseError {}
