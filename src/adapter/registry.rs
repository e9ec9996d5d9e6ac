use std::collections::HashMap;

use crate::{
    actor::{
        builtin::{Filter, SetStorageValue, SetVariable},
        callable::{CallableSink, CallableSource, CallableStandalone, CallableTransformer},
        control::{CallableActors, Flow, LocalScopeTrigger, Trigger},
        node::{ActorNode, ActorRef}
    },
    domain::{engine::Environment, error::FlowError},
    port::actor::Actor
};

/// Zero-argument constructor of an actor behaviour
pub type ActorFactory = fn() -> Box<dyn Actor>;

fn construct<T: Actor + Default>() -> Box<dyn Actor> {
    Box::new(T::default())
}

/// Factory registry mapping type identifiers to actor constructors
pub struct ActorRegistry {
    factories: HashMap<String, ActorFactory>
}

impl ActorRegistry {
    pub fn new() -> Self {
        Self { factories: HashMap::new() }
    }

    /// Registry knowing every built-in actor
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry
            .register_type::<Flow>()
            .register_type::<Trigger>()
            .register_type::<LocalScopeTrigger>()
            .register_type::<CallableActors>()
            .register_type::<CallableStandalone>()
            .register_type::<CallableSource>()
            .register_type::<CallableTransformer>()
            .register_type::<CallableSink>()
            .register_type::<SetVariable>()
            .register_type::<SetStorageValue>()
            .register_type::<Filter>();
        registry
    }

    pub fn register(&mut self, type_identifier: &str, factory: ActorFactory) -> &mut Self {
        self.factories.insert(type_identifier.to_string(), factory);
        self
    }

    /// Registers `T` under its own type identifier
    pub fn register_type<T: Actor + Default>(&mut self) -> &mut Self {
        let type_identifier = T::default().type_identifier();
        self.register(type_identifier, construct::<T>)
    }

    pub fn has(&self, type_identifier: &str) -> bool {
        self.factories.contains_key(type_identifier)
    }

    /// Sorted identifiers of the registered types
    pub fn types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.factories.keys().cloned().collect();
        types.sort();
        types
    }

    /// Creates a node with default options and a default environment
    pub fn create(&self, type_identifier: &str) -> Result<ActorRef, FlowError> {
        self.create_in(type_identifier, Environment::default())
    }

    /// Creates a node with default options running against `environment`
    pub fn create_in(&self, type_identifier: &str, environment: Environment) -> Result<ActorRef, FlowError> {
        let factory = self
            .factories
            .get(type_identifier)
            .ok_or_else(|| FlowError::Configuration(format!("Unknown actor type: {}", type_identifier)))?;
        ActorNode::with_environment(factory(), environment)
    }
}

impl Default for ActorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
