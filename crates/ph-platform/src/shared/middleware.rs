//! API Middleware
//!
//! Session resolution for Axum handlers. Supports both Bearer token
//! (Authorization header) and session cookie authentication.
//!
//! A request without credentials, or with credentials that fail validation,
//! is not rejected here: handlers receive an anonymous `CallerContext` and
//! the operation itself reports `Unauthorized`.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, header::COOKIE, request::Parts, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::debug;

use crate::auth::{extract_bearer_token, AuthService, CallerContext, SessionResolver};
use crate::shared::error::ErrorResponse;

/// Default session cookie name
pub const SESSION_COOKIE_NAME: &str = "ph_session";

/// Application state containing shared session services
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub session_resolver: Arc<SessionResolver>,
    pub cookie_name: String,
}

impl AppState {
    pub fn new(auth_service: Arc<AuthService>, session_resolver: Arc<SessionResolver>) -> Self {
        Self {
            auth_service,
            session_resolver,
            cookie_name: SESSION_COOKIE_NAME.to_string(),
        }
    }

    pub fn with_cookie_name(mut self, cookie_name: impl Into<String>) -> Self {
        self.cookie_name = cookie_name.into();
        self
    }
}

/// Caller extractor. Always yields a `CallerContext`, anonymous when the
/// request carries no valid session.
pub struct Authenticated(pub CallerContext);

impl std::ops::Deref for Authenticated {
    type Target = CallerContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Error response for session resolution failures
pub struct AuthError {
    pub status: StatusCode,
    pub message: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: "SESSION_ERROR".to_string(),
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

/// Extract token from the named session cookie
fn extract_session_cookie(parts: &Parts, cookie_name: &str) -> Option<String> {
    parts.headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|c| c.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

#[async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get AppState from extensions (set by middleware layer)
        let app_state = parts.extensions.get::<AppState>()
            .cloned()
            .ok_or_else(|| AuthError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: "Auth service not configured".to_string(),
            })?;

        // Try Authorization header first, then the session cookie
        let token = parts.headers
            .get(AUTHORIZATION)
            .and_then(|v: &HeaderValue| v.to_str().ok())
            .and_then(extract_bearer_token)
            .map(String::from)
            .or_else(|| extract_session_cookie(parts, &app_state.cookie_name));

        let Some(token) = token else {
            return Ok(Authenticated(CallerContext::anonymous()));
        };

        let claims = match app_state.auth_service.validate_token(&token) {
            Ok(claims) => claims,
            Err(e) => {
                debug!(error = %e, "Ignoring invalid session token");
                return Ok(Authenticated(CallerContext::anonymous()));
            }
        };

        let context = app_state.session_resolver.resolve(&claims).await
            .map_err(|e| AuthError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: format!("Failed to resolve session: {}", e),
            })?;

        Ok(Authenticated(context))
    }
}

/// Middleware layer that injects AppState into request extensions
/// This enables the Authenticated extractor to work
#[derive(Clone)]
pub struct AuthLayer {
    state: AppState,
}

impl AuthLayer {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            state: self.state.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    state: AppState,
}

impl<S, B> Service<axum::http::Request<B>> for AuthMiddleware<S>
where
    S: Service<axum::http::Request<B>, Response = Response> + Send + Clone + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        req.extensions_mut().insert(self.state.clone());

        let future = self.inner.call(req);
        Box::pin(future)
    }
}
