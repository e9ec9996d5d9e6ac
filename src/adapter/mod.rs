//! Implementations of the ports: stores, log sinks, codecs, registries, conditions and the engine

pub mod codec;
pub mod condition;
pub mod engine;
pub mod help;
pub mod log;
pub mod registry;
pub mod serialize;
pub mod store;

pub use codec::*;
pub use condition::*;
pub use engine::*;
pub use help::*;
pub use log::*;
pub use registry::*;
pub use serialize::*;
pub use store::*;
