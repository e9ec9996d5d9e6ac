//! Traits at the seams of the runtime

pub mod actor;
pub mod condition;
pub mod director;
pub mod engine;
pub mod handler;
pub mod log;
pub mod store;

pub use actor::*;
pub use condition::*;
pub use director::*;
pub use engine::*;
pub use handler::*;
pub use log::*;
pub use store::*;
