//! Credential State Machine Use Cases
//!
//! Cross-aggregate orchestrations that don't belong to a single entity:
//! password login, signup, one-time-code exchange, refresh, logout, the
//! OAuth 2.1 authorize/token/introspect endpoints, and the device code flow.

mod rotate;

pub mod device;
pub mod exchange;
pub mod login;
pub mod logout;
pub mod oauth;
pub mod refresh;
pub mod signup;
pub mod verify_token;

pub use device::{ApproveDeviceCodeCommand, ApproveDeviceCodeUseCase, DeviceAuthorizationCommand, DeviceAuthorizationOutcome, DeviceAuthorizationUseCase};
pub use exchange::{ExchangeOneTimeCodeCommand, ExchangeOneTimeCodeUseCase, ExchangeOutcome, ExchangedUser};
pub use login::{LoginCommand, LoginOutcome, LoginUseCase};
pub use logout::{LogoutCommand, LogoutResult, LogoutUseCase};
pub use oauth::{AuthorizeCommand, AuthorizeOutcome, AuthorizeUseCase, IntrospectCommand, IntrospectOutcome, IntrospectUseCase, TokenCommand, TokenOutcome, TokenUseCase};
pub use refresh::{RefreshOutcome, RefreshTokenCommand, RefreshTokenUseCase};
pub use signup::{SignupCommand, SignupUseCase};
pub use verify_token::VerifyTokenService;
