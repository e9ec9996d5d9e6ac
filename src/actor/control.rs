//! Composite actors: flows, triggers and the pool of callable actors

use std::rc::{Rc, Weak};

use crate::{
    actor::{
        context::ActorContext,
        director::{PassiveDirector, SequentialDirector},
        node::{ActorNode, ActorRef}
    },
    domain::error::FlowError,
    port::{
        actor::{Actor, ActorHandler, ActorHandlerInfo, ActorRole, is_compatible},
        director::Director
    }
};

/// Shape rules shared by the sequential composites
///
/// At most one active source, and every producer directly followed by a consumer must generate something that
/// consumer accepts.
pub fn check_flow_shape(actors: &[ActorRef]) -> Result<(), FlowError> {
    let active: Vec<&ActorRef> = actors.iter().filter(|actor| !actor.is_skipped()).collect();

    let sources = active.iter().filter(|actor| actor.role() == ActorRole::Source).count();
    if sources > 1 {
        return Err(FlowError::Structural(format!("At most one active source is allowed, found {}", sources)));
    }

    for pair in active.windows(2) {
        let (producer, consumer) = (pair[0], pair[1]);
        if producer.role().is_producer()
            && consumer.role().is_consumer()
            && !is_compatible(&producer.generates(), &consumer.accepts())
        {
            return Err(FlowError::Structural(format!(
                "Incompatible actors: {} generates {:?}, {} accepts {:?}",
                producer.name(),
                producer.generates(),
                consumer.name(),
                consumer.accepts()
            )));
        }
    }

    Ok(())
}

const SEQUENTIAL: ActorHandlerInfo =
    ActorHandlerInfo { can_contain_standalones: true, can_contain_source: true, local_scope: false };

/// Top-level container running its children in order
#[derive(Debug, Default, Clone, Copy)]
pub struct Flow;

impl Actor for Flow {
    fn type_identifier(&self) -> &'static str {
        "Flow"
    }

    fn description(&self) -> &'static str {
        "Container for a complete flow of actors, executed in order"
    }

    fn do_execute(&mut self, _ctx: &ActorContext<'_>) -> Result<(), FlowError> {
        Ok(())
    }

    fn as_handler(&self) -> Option<&dyn ActorHandler> {
        Some(self)
    }
}

impl ActorHandler for Flow {
    fn handler_info(&self) -> ActorHandlerInfo {
        SEQUENTIAL
    }

    fn check_actors(&self, actors: &[ActorRef]) -> Result<(), FlowError> {
        check_flow_shape(actors)
    }

    fn new_director(&self, owner: Weak<ActorNode>) -> Rc<dyn Director> {
        Rc::new(SequentialDirector::new(owner))
    }
}

/// Standalone that runs its sub-flow every time it executes
#[derive(Debug, Default, Clone, Copy)]
pub struct Trigger;

impl Actor for Trigger {
    fn type_identifier(&self) -> &'static str {
        "Trigger"
    }

    fn description(&self) -> &'static str {
        "Executes the sub-flow of actors each time it is executed"
    }

    fn do_execute(&mut self, _ctx: &ActorContext<'_>) -> Result<(), FlowError> {
        Ok(())
    }

    fn as_handler(&self) -> Option<&dyn ActorHandler> {
        Some(self)
    }
}

impl ActorHandler for Trigger {
    fn handler_info(&self) -> ActorHandlerInfo {
        SEQUENTIAL
    }

    fn check_actors(&self, actors: &[ActorRef]) -> Result<(), FlowError> {
        check_flow_shape(actors)
    }

    fn new_director(&self, owner: Weak<ActorNode>) -> Rc<dyn Director> {
        Rc::new(SequentialDirector::new(owner))
    }
}

/// Trigger whose sub-flow gets its own variables and storage
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalScopeTrigger;

impl Actor for LocalScopeTrigger {
    fn type_identifier(&self) -> &'static str {
        "LocalScopeTrigger"
    }

    fn description(&self) -> &'static str {
        "Executes the sub-flow of actors with its own variables and storage"
    }

    fn do_execute(&mut self, _ctx: &ActorContext<'_>) -> Result<(), FlowError> {
        Ok(())
    }

    fn as_handler(&self) -> Option<&dyn ActorHandler> {
        Some(self)
    }
}

impl ActorHandler for LocalScopeTrigger {
    fn handler_info(&self) -> ActorHandlerInfo {
        ActorHandlerInfo { local_scope: true, ..SEQUENTIAL }
    }

    fn check_actors(&self, actors: &[ActorRef]) -> Result<(), FlowError> {
        check_flow_shape(actors)
    }

    fn new_director(&self, owner: Weak<ActorNode>) -> Rc<dyn Director> {
        Rc::new(SequentialDirector::new(owner))
    }
}

/// Pool of named actors that only run when a callable actor refers to them
#[derive(Debug, Default, Clone, Copy)]
pub struct CallableActors;

impl Actor for CallableActors {
    fn type_identifier(&self) -> &'static str {
        "CallableActors"
    }

    fn description(&self) -> &'static str {
        "Container for actors that are referenced by name from callable actors"
    }

    fn do_execute(&mut self, _ctx: &ActorContext<'_>) -> Result<(), FlowError> {
        Ok(())
    }

    fn as_handler(&self) -> Option<&dyn ActorHandler> {
        Some(self)
    }
}

impl ActorHandler for CallableActors {
    fn handler_info(&self) -> ActorHandlerInfo {
        SEQUENTIAL
    }

    fn new_director(&self, owner: Weak<ActorNode>) -> Rc<dyn Director> {
        Rc::new(PassiveDirector::new(owner))
    }

    fn is_reference_pool(&self) -> bool {
        true
    }
}
