//! Local Token Verification
//!
//! `POST /v1/auth/verify-token`. Checks the JWT signature and expiry, then
//! cross-checks the backing session is still live — a valid-looking JWT for
//! a session that was already revoked must not verify.

use std::sync::Arc;

use crate::auth::auth_service::{AccessTokenClaims, AuthService};
use crate::session::entity::Session;
use crate::session::repository::SessionRepository;
use crate::shared::error::{PlatformError, Result};

pub struct VerifyTokenService {
    sessions: Arc<SessionRepository>,
    auth_service: Arc<AuthService>,
}

impl VerifyTokenService {
    pub fn new(sessions: Arc<SessionRepository>, auth_service: Arc<AuthService>) -> Self {
        Self { sessions, auth_service }
    }

    pub async fn verify(&self, token: &str) -> Result<AccessTokenClaims> {
        let claims = self.auth_service.validate_token(token)?;

        // Admin bypass tokens have no session row to cross-check.
        if claims.bypass_all_checks {
            return Ok(claims);
        }

        let hash = Session::hash_token(token);
        match self.sessions.lookup_by_access_token_hash(&hash).await? {
            Some(session) if session.is_valid() => Ok(claims),
            _ => Err(PlatformError::InvalidToken { message: "session has been revoked or expired".to_string() }),
        }
    }
}
