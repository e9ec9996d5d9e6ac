//! The actor tree runtime
//!
//! Nodes own behaviours and drive them through setup, execution, wrap-up and clean-up. Composites hand the execution
//! of their children to a director.

pub mod builtin;
pub mod callable;
pub mod context;
pub mod control;
pub mod director;
pub mod node;
pub mod scope;

#[cfg(test)]
pub(crate) mod testing;

pub use builtin::*;
pub use callable::*;
pub use context::*;
pub use control::*;
pub use director::*;
pub use node::*;
pub use scope::*;
