//! Gateway Core
//!
//! Core domain providing:
//! - User account mirroring from the upstream IdP
//! - Session, API key, and UAI identity resolution
//! - The credential state machine (login, OAuth/PKCE, device code, admin bypass)
//! - CQRS event store + outbox, with a Use Case pattern guaranteeing audit logging
//!
//! ## Module Organization (Aggregate-based)
//!
//! Each aggregate contains:
//! - `entity` - Domain entities
//! - `repository` - Data access
//! - `operations` - Use case operations (where applicable)

// Core aggregates
pub mod user_account;
pub mod session;
pub mod api_key;
pub mod uai;
pub mod admin;

// Event platform
pub mod event;

// Authentication & authorization
pub mod auth;
pub mod audit;

// Shared infrastructure
pub mod shared;

// Cross-cutting concerns
pub mod usecase;

// Re-export common types from shared
pub use shared::error::{PlatformError, Result};
pub use shared::tsid::TsidGenerator;

// Re-export use case infrastructure
pub use usecase::{
    UseCaseResult, UseCaseError, DomainEvent, ExecutionContext,
    TracingContext, UnitOfWork, UnitOfWorkTx,
};
// Note: impl_domain_event! macro is automatically exported at crate root via #[macro_export]

// Re-export main entity types for convenience
pub use user_account::entity::UserAccount;
pub use event::entity::Event;
pub use audit::entity::AuditLog;
pub use session::{Platform, Session};
pub use api_key::{AccessLevel, ApiKey};
pub use uai::{CredentialLink, Uai};

// Re-export repositories
pub use user_account::repository::UserAccountRepository;
pub use event::repository::EventRepository;
pub use audit::repository::AuditLogRepository;
pub use session::SessionRepository;
pub use api_key::ApiKeyRepository;
pub use uai::UaiRepository;

// Re-export services
pub use audit::service::AuditService;
pub use auth::password_service::PasswordService;
pub use auth::auth_service::{AuthService, AccessTokenClaims};
pub use shared::middleware::{AuthContext, AuthMethod, Authenticated, require_all_scopes, require_scopes, scope_matches};

// Re-export OAuth/PKCE repositories
pub use auth::oauth_client_repository::OAuthClientRepository;
pub use auth::authorization_code_repository::AuthorizationCodeRepository;

// Re-export OAuth/PKCE entities
pub use auth::oauth_entity::{OAuthClient, OAuthClientStatus, OAuthClientType};
pub use auth::authorization_code::AuthorizationCode;

// Re-export the login hand-off and device-code entities/repositories
pub use auth::one_time_code::OneTimeCode;
pub use auth::one_time_code_repository::OneTimeCodeRepository;
pub use auth::device_code::{DeviceCode, DeviceCodeStatus};
pub use auth::device_code_repository::DeviceCodeRepository;

// Re-export the credential state machine's use cases
pub use auth::operations::{
    ApproveDeviceCodeCommand, ApproveDeviceCodeUseCase, AuthorizeCommand, AuthorizeOutcome, AuthorizeUseCase,
    DeviceAuthorizationCommand, DeviceAuthorizationOutcome, DeviceAuthorizationUseCase,
    ExchangeOneTimeCodeCommand, ExchangeOneTimeCodeUseCase, ExchangeOutcome, ExchangedUser,
    IntrospectCommand, IntrospectOutcome, IntrospectUseCase,
    LoginCommand, LoginOutcome, LoginUseCase, LogoutCommand, LogoutResult, LogoutUseCase,
    RefreshOutcome, RefreshTokenCommand, RefreshTokenUseCase,
    SignupCommand, SignupUseCase, TokenCommand, TokenOutcome, TokenUseCase, VerifyTokenService,
};
