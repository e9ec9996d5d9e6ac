//! # Actorflow
//!
//! A hierarchical workflow engine built from actors.
//!
//! This crate provides:
//! - An actor lifecycle (setup, execute, stop, wrap-up, clean-up) driven by a tree runtime
//! - Composite actors whose children are executed by directors, with data pumped from sources to sinks
//! - Typed options that can be bound to variables, with automatic reconfiguration when those variables change
//! - Callable actors resolved by name through the enclosing scopes
//! - Variable and storage stores with change notification and `@{name}` expansion

pub mod actor;
pub mod adapter;
pub mod config;
pub mod domain;
pub mod port;

// Re-export commonly used types
pub use actor::{ActorContext, ActorNode, ActorRef, LifecycleState};
pub use adapter::{ActorRegistry, CodecRegistry, EngineFactory, SequentialEngine, Storage, Variables};
pub use config::EngineSettings;
pub use domain::{Environment, FlowError, OptionValue, RunSummary, ValueType};
pub use port::{Actor, Engine};
