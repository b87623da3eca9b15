//! `requireAuth` Middleware
//!
//! Three-tier credential extraction — session cookie, then bearer JWT, then
//! API key — attaching a single [`AuthContext`] shape regardless of which
//! tier matched. See [`scope_matches`] for the wildcard rules the scope
//! extractors apply.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, header::COOKIE, request::Parts, HeaderValue},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::warn;

use crate::api_key::operations::ValidateApiKeyUseCase;
use crate::auth::auth_service::{extract_bearer_token, AccessTokenClaims, AuthService};
use crate::shared::error::PlatformError;
use crate::uai::operations::{ResolveUaiCommand, ResolveUaiUseCase};
use crate::usecase::ExecutionContext;

/// Cookie carrying the raw access token, scoped to the parent domain.
pub const SESSION_COOKIE_NAME: &str = "lanonasis_session";

/// Header carrying a raw API key, as an alternative to a namespaced bearer token.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Bearer-token prefixes that identify an API key rather than a JWT.
const API_KEY_NAMESPACE_PREFIXES: &[&str] = &["lano_", "lms_", "pk_"];

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub validate_api_key: Arc<ValidateApiKeyUseCase>,
    pub resolve_uai: Arc<ResolveUaiUseCase>,
}

/// The identity and scopes attached to a request by [`Authenticated`].
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: String,
    pub organization_id: Option<String>,
    pub role: String,
    pub plan: Option<String>,
    pub email: Option<String>,
    pub universal_id: Option<String>,
    pub auth_method: AuthMethod,
    pub scopes: Vec<String>,
    pub bypass_all_checks: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    Cookie,
    Bearer,
    ApiKey,
}

impl AuthMethod {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Cookie => "cookie",
            Self::Bearer => "bearer",
            Self::ApiKey => "api_key",
        }
    }
}

impl AuthContext {
    fn from_claims(claims: AccessTokenClaims, method: AuthMethod) -> Self {
        Self {
            user_id: claims.sub,
            organization_id: claims.organization_id,
            role: claims.role,
            plan: claims.plan,
            email: claims.email,
            universal_id: None,
            auth_method: method,
            scopes: if claims.bypass_all_checks { vec!["*".to_string()] } else { Vec::new() },
            bypass_all_checks: claims.bypass_all_checks,
        }
    }

    /// `*` and `legacy.full_access` match everything; `memories.*` matches
    /// `memories.read` and vice versa (reciprocal wildcard).
    pub fn has_any_scope(&self, required: &[&str]) -> bool {
        self.bypass_all_checks || required.iter().any(|r| self.scopes.iter().any(|g| scope_matches(r, g)))
    }

    pub fn has_all_scopes(&self, required: &[&str]) -> bool {
        self.bypass_all_checks || required.iter().all(|r| self.scopes.iter().any(|g| scope_matches(r, g)))
    }
}

/// Whether a granted scope `granted` satisfies a required scope `required`.
pub fn scope_matches(required: &str, granted: &str) -> bool {
    if granted == "*" || granted == "legacy.full_access" {
        return true;
    }
    if required == granted {
        return true;
    }
    if let Some(prefix) = granted.strip_suffix(".*") {
        if required == prefix || required.starts_with(&format!("{}.", prefix)) {
            return true;
        }
    }
    if let Some(prefix) = required.strip_suffix(".*") {
        if granted == prefix || granted.starts_with(&format!("{}.", prefix)) {
            return true;
        }
    }
    false
}

pub struct Authenticated(pub AuthContext);

impl std::ops::Deref for Authenticated {
    type Target = AuthContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

fn extract_cookie(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get(COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|cookies| {
            cookies
                .split(';')
                .map(|c| c.trim())
                .find(|c| c.starts_with(name))
                .and_then(|c| c.split_once('='))
                .map(|(_, v)| v.to_string())
        })
}

fn extract_bearer(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v: &HeaderValue| v.to_str().ok())
        .and_then(extract_bearer_token)
        .map(String::from)
}

fn extract_api_key_header(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

fn looks_like_api_key(token: &str) -> bool {
    API_KEY_NAMESPACE_PREFIXES.iter().any(|p| token.starts_with(p))
}

enum Credential {
    Cookie(String),
    Bearer(String),
    ApiKey(String),
}

fn extract_credential(parts: &Parts) -> Option<Credential> {
    if let Some(key) = extract_api_key_header(parts) {
        return Some(Credential::ApiKey(key));
    }
    if let Some(token) = extract_bearer(parts) {
        return Some(if looks_like_api_key(&token) {
            Credential::ApiKey(token)
        } else {
            Credential::Bearer(token)
        });
    }
    if let Some(token) = extract_cookie(parts, SESSION_COOKIE_NAME) {
        return Some(if looks_like_api_key(&token) { Credential::ApiKey(token) } else { Credential::Cookie(token) });
    }
    None
}

#[async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = PlatformError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let app_state = parts
            .extensions
            .get::<AppState>()
            .ok_or_else(|| PlatformError::internal("auth state not configured"))?
            .clone();

        let credential = extract_credential(parts).ok_or_else(|| PlatformError::unauthorized("missing authentication credential"))?;

        let mut context = match credential {
            Credential::Cookie(token) => {
                let claims = app_state.auth_service.validate_token(&token)?;
                AuthContext::from_claims(claims, AuthMethod::Cookie)
            }
            Credential::Bearer(token) => {
                let claims = app_state.auth_service.validate_token(&token)?;
                AuthContext::from_claims(claims, AuthMethod::Bearer)
            }
            Credential::ApiKey(presented) => {
                let key = app_state
                    .validate_api_key
                    .execute(&presented)
                    .await
                    .ok_or_else(|| PlatformError::unauthorized("invalid or revoked api key"))?;
                AuthContext {
                    user_id: key.user_id.clone(),
                    organization_id: None,
                    role: key.access_level.clone(),
                    plan: None,
                    email: None,
                    universal_id: None,
                    auth_method: AuthMethod::ApiKey,
                    scopes: key.scopes_vec(),
                    bypass_all_checks: false,
                }
            }
        };

        // UAI resolution is best-effort: failures never fail the request.
        let ctx = ExecutionContext::create(context.user_id.clone());
        let command = ResolveUaiCommand {
            method: format!("gateway:{}", context.auth_method.as_str()),
            identifier: context.user_id.clone(),
            primary_email: context.email.clone(),
            create_if_missing: true,
        };
        context.universal_id = app_state.resolve_uai.resolve(command, ctx).await;

        Ok(Authenticated(context))
    }
}

pub struct OptionalAuth(pub Option<AuthContext>);

impl std::ops::Deref for OptionalAuth {
    type Target = Option<AuthContext>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Authenticated::from_request_parts(parts, state).await {
            Ok(Authenticated(ctx)) => Ok(OptionalAuth(Some(ctx))),
            Err(e) => {
                warn!(error = %e, "optional auth extraction failed, proceeding unauthenticated");
                Ok(OptionalAuth(None))
            }
        }
    }
}

/// Reject unless the context carries at least one of `required` scopes, or
/// `bypass_all_checks` is set.
pub fn require_scopes(context: &AuthContext, required: &[&str]) -> Result<(), PlatformError> {
    if context.has_any_scope(required) {
        Ok(())
    } else {
        Err(PlatformError::ScopeInsufficient {
            message: format!("requires one of: {}, provided: {}", required.join(", "), context.scopes.join(", ")),
        })
    }
}

/// Reject unless the context carries every one of `required` scopes, or
/// `bypass_all_checks` is set.
pub fn require_all_scopes(context: &AuthContext, required: &[&str]) -> Result<(), PlatformError> {
    if context.has_all_scopes(required) {
        Ok(())
    } else {
        Err(PlatformError::ScopeInsufficient {
            message: format!("requires all of: {}, provided: {}", required.join(", "), context.scopes.join(", ")),
        })
    }
}

/// Middleware layer that injects [`AppState`] into request extensions so the
/// [`Authenticated`] extractor can see it.
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tower::{Layer, Service};

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
        AuthMiddleware { inner, state: self.state.clone() }
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
        Box::pin(async move { future.await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcard_matches_all() {
        assert!(scope_matches("memories.read", "*"));
        assert!(scope_matches("anything.at.all", "legacy.full_access"));
    }

    #[test]
    fn test_exact_match() {
        assert!(scope_matches("memories.read", "memories.read"));
        assert!(!scope_matches("memories.read", "memories.write"));
    }

    #[test]
    fn test_reciprocal_namespace_wildcard() {
        assert!(scope_matches("memories.read", "memories.*"));
        assert!(scope_matches("memories.*", "memories.read"));
        assert!(!scope_matches("memories.read", "projects.*"));
    }

    #[test]
    fn test_any_vs_all() {
        let ctx = AuthContext {
            user_id: "u1".into(),
            organization_id: None,
            role: "user".into(),
            plan: None,
            email: None,
            universal_id: None,
            auth_method: AuthMethod::Bearer,
            scopes: vec!["memories.read".to_string()],
            bypass_all_checks: false,
        };
        assert!(ctx.has_any_scope(&["memories.read", "memories.write"]));
        assert!(!ctx.has_all_scopes(&["memories.read", "memories.write"]));
    }

    #[test]
    fn test_bypass_all_checks_short_circuits() {
        let ctx = AuthContext {
            user_id: "admin:a@b.c".into(),
            organization_id: None,
            role: "admin_override".into(),
            plan: None,
            email: None,
            universal_id: None,
            auth_method: AuthMethod::Bearer,
            scopes: vec![],
            bypass_all_checks: true,
        };
        assert!(ctx.has_all_scopes(&["literally.anything"]));
    }
}
