//! Engine configuration persisted as YAML in the platform config directory

pub mod settings;

pub use settings::*;
