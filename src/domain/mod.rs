//! Core domain types: errors, identifiers, option values and descriptors, and the shared environment

pub mod constant;
pub mod engine;
pub mod error;
pub mod identifier;
pub mod option;
pub mod value;

pub use engine::{Environment, RunSummary, add_flow_variables};
pub use error::FlowError;
pub use option::{OptionDef, OptionManager, OptionScope};
pub use value::{OptionValue, ValueType};
