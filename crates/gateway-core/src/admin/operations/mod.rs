pub mod bypass_login;
pub mod events;
pub mod list_apps;
pub mod register_app;

pub use bypass_login::{BypassLoginCommand, BypassLoginUseCase};
pub use events::{AdminBypassUsed, AppRegistered};
pub use list_apps::ListAppsUseCase;
pub use register_app::{RegisterAppCommand, RegisterAppUseCase};
