pub mod events;
pub mod upsert;

pub use events::UserUpserted;
pub use upsert::{UpsertUserAccountCommand, UpsertUserAccountUseCase};
