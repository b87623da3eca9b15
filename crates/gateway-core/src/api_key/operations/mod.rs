pub mod create;
pub mod events;
pub mod revoke;
pub mod rotate;
pub mod validate;

pub use create::{CreateApiKeyCommand, CreateApiKeyUseCase, CreatedApiKey};
pub use events::{ApiKeyCreated, ApiKeyRevoked, ApiKeyRotated};
pub use revoke::{RevokeApiKeyCommand, RevokeApiKeyUseCase};
pub use rotate::{RotateApiKeyCommand, RotateApiKeyUseCase, RotatedApiKey};
pub use validate::ValidateApiKeyUseCase;
