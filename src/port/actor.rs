//! Actor behaviour traits and the capability interfaces actors opt into

use std::{
    any::Any,
    collections::HashMap,
    fmt,
    rc::{Rc, Weak}
};

use crate::{
    actor::{
        context::ActorContext,
        node::{ActorNode, ActorRef}
    },
    domain::{error::FlowError, option::OptionManager},
    port::director::Director
};

/// Token flowing between producing and consuming actors
pub type Data = serde_json::Value;

/// Coarse description of the data an actor generates or accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Unknown,
    Bool,
    Integer,
    Float,
    Text,
    List,
    Object
}

impl DataType {
    /// Type of a concrete token
    pub fn of(data: &Data) -> Self {
        match data {
            Data::Bool(_) => DataType::Bool,
            Data::Number(n) if n.is_i64() || n.is_u64() => DataType::Integer,
            Data::Number(_) => DataType::Float,
            Data::String(_) => DataType::Text,
            Data::Array(_) => DataType::List,
            Data::Object(_) => DataType::Object,
            Data::Null => DataType::Unknown
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Whether data generated as `generates` can be fed to a consumer accepting `accepts`
pub fn is_compatible(generates: &[DataType], accepts: &[DataType]) -> bool {
    generates.contains(&DataType::Unknown)
        || accepts.contains(&DataType::Unknown)
        || generates.iter().any(|g| accepts.contains(g))
}

/// Role derived from the capabilities an actor implements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorRole {
    Standalone,
    Source,
    Transformer,
    Sink
}

impl ActorRole {
    pub fn from_capabilities(produces: bool, consumes: bool) -> Self {
        match (produces, consumes) {
            (false, false) => ActorRole::Standalone,
            (true, false) => ActorRole::Source,
            (true, true) => ActorRole::Transformer,
            (false, true) => ActorRole::Sink
        }
    }

    pub fn is_producer(&self) -> bool {
        matches!(self, ActorRole::Source | ActorRole::Transformer)
    }

    pub fn is_consumer(&self) -> bool {
        matches!(self, ActorRole::Transformer | ActorRole::Sink)
    }
}

/// Capability of actors that generate output
pub trait OutputProducer {
    fn generates(&self) -> Vec<DataType> {
        vec![DataType::Unknown]
    }

    fn has_output(&self) -> bool;

    /// Next pending token, in generation order
    fn output(&mut self) -> Option<Data>;
}

/// Capability of actors that take input
pub trait InputConsumer {
    fn accepts(&self) -> Vec<DataType> {
        vec![DataType::Unknown]
    }

    fn input(&mut self, data: Data);
}

/// Declared capabilities of a composite actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActorHandlerInfo {
    pub can_contain_standalones: bool,
    pub can_contain_source:      bool,
    /// Children get fresh variables and storage instead of the parent's
    pub local_scope:             bool
}

/// Transient state carried across a reconfiguration
#[derive(Default)]
pub struct StateBackup {
    entries: HashMap<&'static str, Box<dyn Any>>
}

impl StateBackup {
    pub fn insert<T: Any>(&mut self, key: &'static str, value: T) {
        self.entries.insert(key, Box::new(value));
    }

    /// Removes and returns the entry if it holds a `T`
    pub fn take<T: Any>(&mut self, key: &'static str) -> Option<T> {
        let value = self.entries.remove(key)?;
        value.downcast::<T>().ok().map(|boxed| *boxed)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Behaviour of one actor type
///
/// The runtime (`ActorNode`) owns the options, the tree links and the lifecycle; implementations supply the hooks
/// and opt into capabilities by returning `Some` from the `as_*` queries. A type must answer those queries the same
/// way for its whole lifetime.
pub trait Actor: Any {
    /// Identifier the factory registry knows the type by, also the default actor name
    fn type_identifier(&self) -> &'static str;

    fn description(&self) -> &'static str {
        "-no description-"
    }

    /// Adds the type's own options on top of the common actor options
    fn define_options(&self, _options: &mut OptionManager) -> Result<(), FlowError> {
        Ok(())
    }

    /// Drops derived state
    fn reset(&mut self) {}

    /// Builds derived state from the current option values
    fn setup(&mut self, _ctx: &ActorContext<'_>) -> Result<(), FlowError> {
        Ok(())
    }

    fn pre_execute(&mut self, _ctx: &ActorContext<'_>) -> Result<(), FlowError> {
        Ok(())
    }

    fn do_execute(&mut self, ctx: &ActorContext<'_>) -> Result<(), FlowError>;

    fn post_execute(&mut self, _ctx: &ActorContext<'_>) {}

    /// Exports transient state that must survive a reconfiguration
    fn backup_state(&mut self) -> StateBackup {
        StateBackup::default()
    }

    /// Re-imports what `backup_state` exported
    fn restore_state(&mut self, _state: StateBackup) {}

    fn stop_execution(&mut self) {}

    fn wrap_up(&mut self, _ctx: &ActorContext<'_>) {}

    fn clean_up(&mut self) {}

    fn as_producer(&self) -> Option<&dyn OutputProducer> {
        None
    }

    fn as_producer_mut(&mut self) -> Option<&mut dyn OutputProducer> {
        None
    }

    fn as_consumer(&self) -> Option<&dyn InputConsumer> {
        None
    }

    fn as_consumer_mut(&mut self) -> Option<&mut dyn InputConsumer> {
        None
    }

    /// Composite capability
    fn as_handler(&self) -> Option<&dyn ActorHandler> {
        None
    }
}

impl dyn Actor {
    /// The concrete behaviour, if it is a `T`
    pub fn downcast_ref<T: Actor>(&self) -> Option<&T> {
        (self as &dyn Any).downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Actor>(&mut self) -> Option<&mut T> {
        (self as &mut dyn Any).downcast_mut::<T>()
    }
}

/// Capability of composite actors
pub trait ActorHandler {
    fn handler_info(&self) -> ActorHandlerInfo;

    /// Shape check run when children are assigned and again at setup
    fn check_actors(&self, _actors: &[ActorRef]) -> Result<(), FlowError> {
        Ok(())
    }

    /// Director that executes the children, created at every setup
    fn new_director(&self, owner: Weak<ActorNode>) -> Rc<dyn Director>;

    /// Whether the children are callable actors looked up by name
    fn is_reference_pool(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles_from_capabilities() {
        assert_eq!(ActorRole::from_capabilities(false, false), ActorRole::Standalone);
        assert_eq!(ActorRole::from_capabilities(true, false), ActorRole::Source);
        assert!(ActorRole::Transformer.is_producer() && ActorRole::Transformer.is_consumer());
        assert!(!ActorRole::Sink.is_producer());
    }

    #[test]
    fn test_compatibility() {
        assert!(is_compatible(&[DataType::Unknown], &[DataType::Text]));
        assert!(is_compatible(&[DataType::Integer, DataType::Float], &[DataType::Float]));
        assert!(!is_compatible(&[DataType::Text], &[DataType::Integer]));
        assert_eq!(DataType::of(&serde_json::json!(2)), DataType::Integer);
        assert_eq!(DataType::of(&serde_json::json!(2.5)), DataType::Float);
    }

    #[test]
    fn test_state_backup_round_trip() {
        let mut backup = StateBackup::default();
        backup.insert("buffer", vec![1, 2, 3]);
        assert!(backup.contains("buffer"));
        assert_eq!(backup.take::<String>("buffer"), None);

        backup.insert("buffer", vec![1, 2, 3]);
        assert_eq!(backup.take::<Vec<i32>>("buffer"), Some(vec![1, 2, 3]));
        assert!(backup.is_empty());
    }
}
