//! OAuth 2.1 Authorization Code + PKCE, Refresh, and Device Code Grants
//!
//! `GET /oauth/authorize`, `POST /oauth/token` (three grant types), and
//! `POST /oauth/introspect`. Consent is a JSON descriptor, never HTML — the
//! caller renders it however it wants, or skips straight to approval when
//! the request already carries an authenticated session.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::authorization_code::AuthorizationCode;
use crate::auth::authorization_code_repository::AuthorizationCodeRepository;
use crate::auth::auth_service::AuthService;
use crate::auth::device_code::DeviceCodeStatus;
use crate::auth::device_code_repository::DeviceCodeRepository;
use crate::auth::oauth_client_repository::OAuthClientRepository;
use crate::auth::oauth_entity::{OAuthClient, OAuthClientType};
use crate::session::entity::{Platform, Session};
use crate::session::operations::create::{CreateSessionCommand, CreateSessionUseCase};
use crate::session::operations::events::{SessionCompromised, SessionCreated};
use crate::session::repository::SessionRepository;
use crate::user_account::entity::UserAccount;
use crate::user_account::repository::UserAccountRepository;
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};

use super::rotate::rotate_session_tokens;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizeCommand {
    pub response_type: String,
    pub client_id: String,
    pub redirect_uri: String,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub code_challenge: Option<String>,
    #[serde(default)]
    pub code_challenge_method: Option<String>,
}

#[derive(Debug, Clone)]
pub enum AuthorizeOutcome {
    /// No authenticated session on the request — the caller renders consent
    /// (or its own login page) and re-submits once the user is identified.
    ConsentRequired { client_name: String, scope: Option<String> },
    Redirect { location: String },
}

pub struct AuthorizeUseCase {
    clients: Arc<OAuthClientRepository>,
    codes: Arc<AuthorizationCodeRepository>,
}

impl AuthorizeUseCase {
    pub fn new(clients: Arc<OAuthClientRepository>, codes: Arc<AuthorizationCodeRepository>) -> Self {
        Self { clients, codes }
    }

    /// `authenticated_user_id` is `None` until the caller has an
    /// authenticated session to attach to the grant.
    pub async fn execute(&self, command: AuthorizeCommand, authenticated_user_id: Option<&str>) -> Result<AuthorizeOutcome, UseCaseError> {
        if command.response_type != "code" {
            return Err(UseCaseError::validation("unsupported_response_type", "only response_type=code is supported"));
        }

        let client = match self.clients.find_by_client_id(&command.client_id).await {
            Ok(Some(client)) if client.is_active() => client,
            Ok(_) => return Err(UseCaseError::validation("invalid_client", "unknown or disabled client")),
            Err(e) => return Err(UseCaseError::commit(e.to_string())),
        };

        if !client.is_redirect_uri_allowed(&command.redirect_uri) {
            return Err(UseCaseError::validation("invalid_request", "redirect_uri is not registered for this client"));
        }

        if let Some(scope) = &command.scope {
            for requested in scope.split_whitespace() {
                if !client.is_scope_allowed(requested) {
                    return Err(UseCaseError::validation("invalid_scope", format!("scope not allowed for client: {}", requested)));
                }
            }
        }

        validate_pkce_params(&client, &command.code_challenge, &command.code_challenge_method)?;

        let Some(user_id) = authenticated_user_id else {
            return Ok(AuthorizeOutcome::ConsentRequired { client_name: client.client_name, scope: command.scope });
        };

        let code = AuthorizationCode::new(
            crate::TsidGenerator::generate(),
            &client.client_id,
            user_id,
            &command.redirect_uri,
            command.scope.clone(),
            command.code_challenge.clone(),
            command.code_challenge_method.clone(),
            command.state.clone(),
        );
        self.codes.insert(&code).await.map_err(|e| UseCaseError::commit(e.to_string()))?;

        let separator = if command.redirect_uri.contains('?') { '&' } else { '?' };
        let mut location = format!("{}{}code={}", command.redirect_uri, separator, code.code);
        if let Some(state) = &command.state {
            location.push_str(&format!("&state={}", state));
        }
        Ok(AuthorizeOutcome::Redirect { location })
    }
}

fn validate_pkce_params(client: &OAuthClient, code_challenge: &Option<String>, code_challenge_method: &Option<String>) -> Result<(), UseCaseError> {
    if client.require_pkce && code_challenge.is_none() {
        return Err(UseCaseError::validation("invalid_request", "code_challenge is required for this client"));
    }
    if let Some(method) = code_challenge_method {
        if method != "S256" && method != "plain" {
            return Err(UseCaseError::validation("invalid_request", "code_challenge_method must be S256 or plain"));
        }
        if client.client_type == OAuthClientType::Public && method != "S256" {
            return Err(UseCaseError::validation("invalid_request", "public clients must use code_challenge_method=S256"));
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "grant_type")]
pub enum TokenCommand {
    #[serde(rename = "authorization_code")]
    AuthorizationCode { code: String, redirect_uri: String, client_id: String, #[serde(default)] client_secret: Option<String>, #[serde(default)] code_verifier: Option<String> },
    #[serde(rename = "refresh_token")]
    RefreshToken { refresh_token: String, client_id: String, #[serde(default)] client_secret: Option<String> },
    #[serde(rename = "urn:ietf:params:oauth:grant-type:device_code")]
    DeviceCode { device_code: String, client_id: String },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TokenOutcome {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

pub struct TokenUseCase {
    clients: Arc<OAuthClientRepository>,
    codes: Arc<AuthorizationCodeRepository>,
    sessions: Arc<SessionRepository>,
    user_accounts: Arc<UserAccountRepository>,
    device_codes: Arc<DeviceCodeRepository>,
    create_session: Arc<CreateSessionUseCase>,
    auth_service: Arc<AuthService>,
    unit_of_work: Arc<UnitOfWork>,
}

impl TokenUseCase {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        clients: Arc<OAuthClientRepository>,
        codes: Arc<AuthorizationCodeRepository>,
        sessions: Arc<SessionRepository>,
        user_accounts: Arc<UserAccountRepository>,
        device_codes: Arc<DeviceCodeRepository>,
        create_session: Arc<CreateSessionUseCase>,
        auth_service: Arc<AuthService>,
        unit_of_work: Arc<UnitOfWork>,
    ) -> Self {
        Self { clients, codes, sessions, user_accounts, device_codes, create_session, auth_service, unit_of_work }
    }

    pub async fn execute(&self, command: TokenCommand, ctx: ExecutionContext) -> Result<TokenOutcome, UseCaseError> {
        match command {
            TokenCommand::AuthorizationCode { code, redirect_uri, client_id, client_secret, code_verifier } => {
                self.exchange_authorization_code(code, redirect_uri, client_id, client_secret, code_verifier, ctx).await
            }
            TokenCommand::RefreshToken { refresh_token, client_id, client_secret } => {
                self.exchange_refresh_token(refresh_token, client_id, client_secret, ctx).await
            }
            TokenCommand::DeviceCode { device_code, client_id } => self.poll_device_code(device_code, client_id, ctx).await,
        }
    }

    async fn authenticate_client(&self, client_id: &str, client_secret: Option<&str>) -> Result<OAuthClient, UseCaseError> {
        let client = match self.clients.find_by_client_id(client_id).await {
            Ok(Some(client)) if client.is_active() => client,
            Ok(_) => return Err(UseCaseError::validation("invalid_client", "unknown or disabled client")),
            Err(e) => return Err(UseCaseError::commit(e.to_string())),
        };
        if client.client_type == OAuthClientType::Confidential {
            let secret = client_secret.ok_or_else(|| UseCaseError::validation("invalid_client", "client_secret is required"))?;
            if !client.verify_secret(secret) {
                return Err(UseCaseError::validation("invalid_client", "client authentication failed"));
            }
        }
        Ok(client)
    }

    async fn exchange_authorization_code(
        &self,
        code: String,
        redirect_uri: String,
        client_id: String,
        client_secret: Option<String>,
        code_verifier: Option<String>,
        ctx: ExecutionContext,
    ) -> Result<TokenOutcome, UseCaseError> {
        let client = self.authenticate_client(&client_id, client_secret.as_deref()).await?;

        let auth_code = match self.codes.find_valid(&code).await {
            Ok(Some(auth_code)) => auth_code,
            Ok(None) => return Err(UseCaseError::validation("invalid_grant", "code is unknown, used, or expired")),
            Err(e) => return Err(UseCaseError::commit(e.to_string())),
        };

        if auth_code.client_id != client.client_id || auth_code.redirect_uri != redirect_uri {
            return Err(UseCaseError::validation("invalid_grant", "client_id or redirect_uri does not match the authorization request"));
        }

        if auth_code.code_challenge.is_some() {
            let verifier = code_verifier.as_deref().ok_or_else(|| UseCaseError::validation("invalid_grant", "code_verifier is required"))?;
            if !auth_code.verify_pkce(verifier) {
                return Err(UseCaseError::validation("invalid_grant", "code_verifier does not match code_challenge"));
            }
        }

        match self.codes.mark_used(&auth_code.code).await {
            Ok(true) => {}
            Ok(false) => return Err(UseCaseError::validation("invalid_grant", "code was already redeemed")),
            Err(e) => return Err(UseCaseError::commit(e.to_string())),
        }

        let account = match self.user_accounts.find_by_user_id(&auth_code.user_id).await {
            Ok(Some(account)) => account,
            Ok(None) => return Err(UseCaseError::not_found("USER_NOT_FOUND", "user account not found")),
            Err(e) => return Err(UseCaseError::commit(e.to_string())),
        };

        self.issue_session_tokens(&account, &client, auth_code.scope.as_deref(), Platform::Api, ctx).await
    }

    async fn exchange_refresh_token(&self, refresh_token: String, client_id: String, client_secret: Option<String>, ctx: ExecutionContext) -> Result<TokenOutcome, UseCaseError> {
        let client = self.authenticate_client(&client_id, client_secret.as_deref()).await?;
        let hash = Session::hash_token(&refresh_token);

        let session = match self.sessions.find_by_refresh_token_hash(&hash).await {
            Ok(Some(session)) if session.is_valid() => session,
            Ok(_) => return self.check_refresh_reuse(&hash, &ctx).await,
            Err(e) => return Err(UseCaseError::commit(e.to_string())),
        };

        let account = match self.user_accounts.find_by_user_id(&session.user_id).await {
            Ok(Some(account)) => account,
            Ok(None) => return Err(UseCaseError::not_found("USER_NOT_FOUND", "user account not found")),
            Err(e) => return Err(UseCaseError::commit(e.to_string())),
        };

        let command = RotateCommandMarker { client_id: client.client_id.clone() };
        let (result, tokens) = rotate_session_tokens(&self.auth_service, &self.sessions, &self.unit_of_work, &session, &account, ctx, &command).await;
        match tokens {
            Some(tokens) => Ok(TokenOutcome { access_token: tokens.access_token, refresh_token: tokens.refresh_token, token_type: "bearer", expires_in: tokens.expires_in, scope: None }),
            None => match result {
                UseCaseResult::Failure(e) => Err(e),
                UseCaseResult::Success(_) => Err(UseCaseError::commit("token rotation produced no tokens".to_string())),
            },
        }
    }

    /// A refresh token hash that no longer matches any live session but does
    /// match a session's *previous* hash was valid once and has been rotated
    /// away — presenting it again means the token leaked. Burn the whole chain.
    async fn check_refresh_reuse(&self, hash: &str, ctx: &ExecutionContext) -> Result<TokenOutcome, UseCaseError> {
        let compromised = match self.sessions.find_by_previous_refresh_token_hash(hash).await {
            Ok(Some(session)) => session,
            Ok(None) => return Err(UseCaseError::validation("invalid_grant", "refresh token is invalid or expired")),
            Err(e) => return Err(UseCaseError::commit(e.to_string())),
        };

        let mut tx = self.unit_of_work.begin().await.map_err(|e| UseCaseError::commit(e.to_string()))?;
        let revoked = self.sessions.revoke_all_for_user(tx.connection(), &compromised.user_id).await.map_err(|e| UseCaseError::commit(e.to_string()))?;
        let event = SessionCompromised::new(ctx, &compromised.user_id, revoked);
        let command = RevokeChainCommand { user_id: compromised.user_id.clone() };
        let result: UseCaseResult<SessionCompromised> = tx.commit(event, &command).await;
        if result.is_failure() {
            return Err(UseCaseError::commit("failed to record session compromise".to_string()));
        }
        Err(UseCaseError::validation("invalid_grant", "refresh token reuse detected; all sessions revoked"))
    }

    async fn poll_device_code(&self, device_code: String, client_id: String, ctx: ExecutionContext) -> Result<TokenOutcome, UseCaseError> {
        let client = self.authenticate_client(&client_id, None).await?;

        let code = match self.device_codes.find_by_device_code(&device_code).await {
            Ok(Some(code)) => code,
            Ok(None) => return Err(UseCaseError::validation("invalid_grant", "device_code is unknown")),
            Err(e) => return Err(UseCaseError::commit(e.to_string())),
        };

        if code.client_id != client.client_id {
            return Err(UseCaseError::validation("invalid_grant", "device_code was not issued to this client"));
        }
        if code.is_expired() {
            return Err(UseCaseError::validation("expired_token", "device_code has expired"));
        }
        if code.is_polling_too_fast() {
            let _ = self.device_codes.touch_poll(&device_code).await;
            return Err(UseCaseError::validation("slow_down", "polling too frequently"));
        }

        let _ = self.device_codes.touch_poll(&device_code).await;

        match code.status {
            DeviceCodeStatus::Pending => Err(UseCaseError::validation("authorization_pending", "user has not yet approved this device")),
            DeviceCodeStatus::Denied => Err(UseCaseError::validation("access_denied", "user denied this device")),
            DeviceCodeStatus::Expired => Err(UseCaseError::validation("expired_token", "device_code has expired")),
            DeviceCodeStatus::Approved => {
                let user_id = code.user_id.as_deref().ok_or_else(|| UseCaseError::commit("approved device code missing user_id".to_string()))?;
                let account = match self.user_accounts.find_by_user_id(user_id).await {
                    Ok(Some(account)) => account,
                    Ok(None) => return Err(UseCaseError::not_found("USER_NOT_FOUND", "user account not found")),
                    Err(e) => return Err(UseCaseError::commit(e.to_string())),
                };
                self.issue_session_tokens(&account, &client, code.scope.as_deref(), Platform::Cli, ctx).await
            }
        }
    }

    async fn issue_session_tokens(&self, account: &UserAccount, client: &OAuthClient, scope: Option<&str>, platform: Platform, ctx: ExecutionContext) -> Result<TokenOutcome, UseCaseError> {
        let access_token = self
            .auth_service
            .generate_access_token_for_client(
                &account.user_id,
                Some(&account.email),
                account.role.as_deref().unwrap_or("user"),
                account.plan.as_deref(),
                account.organization_id.as_deref(),
                &platform.to_string(),
                None,
                Some(&client.client_id),
                scope,
            )
            .map_err(|e| UseCaseError::commit(e.to_string()))?;
        let refresh_token = crate::auth::auth_service::generate_refresh_token();
        let expires_at = chrono::Utc::now() + chrono::Duration::seconds(self.auth_service.refresh_token_expiry_secs());

        let command = CreateSessionCommand {
            user_id: account.user_id.clone(),
            platform,
            access_token: access_token.clone(),
            refresh_token: refresh_token.clone(),
            ip_address: None,
            user_agent: None,
            expires_at,
        };
        let result: UseCaseResult<SessionCreated> = self.create_session.execute(command, ctx.with_principal(&account.user_id)).await;
        if result.is_failure() {
            return Err(UseCaseError::commit("failed to create session for oauth grant".to_string()));
        }

        Ok(TokenOutcome { access_token, refresh_token, token_type: "bearer", expires_in: self.auth_service.access_token_expiry_secs(), scope: scope.map(String::from) })
    }
}

/// `rotate_session_tokens` is generic over the audit command it logs; the
/// OAuth grants have no natural "command" struct of their own, so this is a
/// minimal stand-in that records which client drove the rotation.
#[derive(serde::Serialize)]
struct RotateCommandMarker {
    client_id: String,
}

#[derive(serde::Serialize)]
struct RevokeChainCommand {
    user_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectCommand {
    pub token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct IntrospectOutcome {
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<&'static str>,
}

impl IntrospectOutcome {
    fn inactive() -> Self {
        Self { active: false, sub: None, scope: None, client_id: None, exp: None, token_type: None }
    }
}

pub struct IntrospectUseCase {
    sessions: Arc<SessionRepository>,
    auth_service: Arc<AuthService>,
}

impl IntrospectUseCase {
    pub fn new(sessions: Arc<SessionRepository>, auth_service: Arc<AuthService>) -> Self {
        Self { sessions, auth_service }
    }

    /// Never returns an error — an unknown, malformed, expired, or revoked
    /// token is simply `{active: false}` per RFC 7662.
    pub async fn execute(&self, command: IntrospectCommand) -> IntrospectOutcome {
        let Ok(claims) = self.auth_service.validate_token(&command.token) else {
            return IntrospectOutcome::inactive();
        };

        if !claims.bypass_all_checks {
            let hash = Session::hash_token(&command.token);
            match self.sessions.lookup_by_access_token_hash(&hash).await {
                Ok(Some(session)) if session.is_valid() => {}
                _ => return IntrospectOutcome::inactive(),
            }
        }

        IntrospectOutcome {
            active: true,
            sub: Some(claims.sub),
            scope: claims.scope,
            client_id: claims.client_id,
            exp: Some(claims.exp),
            token_type: Some("access_token"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_introspect_outcome_inactive_omits_fields() {
        let outcome = IntrospectOutcome::inactive();
        let json = serde_json::to_string(&outcome).unwrap();
        assert_eq!(json, r#"{"active":false}"#);
    }
}
