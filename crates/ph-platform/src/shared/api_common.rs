//! Request body extraction

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::shared::error::PlatformError;

/// JSON body extractor whose rejections use the platform error body.
///
/// Malformed JSON and missing fields both answer 400, where plain
/// `axum::Json` would answer 422 for the latter.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = PlatformError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(PlatformError::Validation {
                code: "INVALID_REQUEST_BODY".to_string(),
                message: rejection.body_text(),
            }),
        }
    }
}
