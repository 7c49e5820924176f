//! Outcome of a role or profile operation.
//!
//! `Success` can only be constructed inside this crate, so a caller holding
//! one knows the store accepted the change.

use super::error::UseCaseError;

#[derive(Debug)]
pub enum UseCaseResult<T> {
    Success(T),
    Failure(UseCaseError),
}

impl<T> UseCaseResult<T> {
    pub fn failure(error: UseCaseError) -> Self {
        UseCaseResult::Failure(error)
    }

    pub(crate) fn success(value: T) -> Self {
        UseCaseResult::Success(value)
    }

    /// Panics on `Failure`. Meant for tests.
    pub fn unwrap(self) -> T {
        match self {
            UseCaseResult::Success(v) => v,
            UseCaseResult::Failure(e) => panic!("operation failed: {}", e),
        }
    }

    /// Panics on `Success`. Meant for tests.
    pub fn unwrap_err(self) -> UseCaseError {
        match self {
            UseCaseResult::Failure(e) => e,
            UseCaseResult::Success(_) => panic!("operation unexpectedly succeeded"),
        }
    }

    pub fn into_result(self) -> Result<T, UseCaseError> {
        match self {
            UseCaseResult::Success(v) => Ok(v),
            UseCaseResult::Failure(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_keeps_code() {
        let result: UseCaseResult<()> =
            UseCaseResult::failure(UseCaseError::conflict("NOT_ADMIN", "User is not an admin"));
        assert_eq!(result.unwrap_err().code(), "NOT_ADMIN");
    }

    #[test]
    fn test_into_result() {
        let ok: UseCaseResult<&str> = UseCaseResult::success("admin");
        assert_eq!(ok.into_result().unwrap(), "admin");

        let err: UseCaseResult<&str> =
            UseCaseResult::failure(UseCaseError::not_found("USER_NOT_FOUND", "User not found"));
        assert!(err.into_result().is_err());
    }
}
