pub mod create;
pub mod events;
pub mod revoke;

pub use create::{CreateSessionCommand, CreateSessionUseCase};
pub use events::{SessionCompromised, SessionCreated, SessionRefreshed, SessionRevoked};
pub use revoke::{RevokeSessionCommand, RevokeSessionUseCase};
