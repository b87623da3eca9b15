pub mod events;
pub mod resolve;

pub use events::UaiLinked;
pub use resolve::{ResolveUaiCommand, ResolveUaiUseCase};
