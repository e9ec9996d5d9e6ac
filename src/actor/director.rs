//! Directors executing the children of composite actors

use std::{
    cell::{Cell, RefCell},
    rc::Weak
};

use tracing::{Level, event};

use crate::{
    actor::node::{ActorNode, ActorRef},
    domain::{constant::director, error::FlowError},
    port::{actor::ActorRole, director::Director}
};

/// Runs the active children in order
///
/// Standalones execute once. A source executes and then its output is pumped token by token through the consumers
/// that follow it, up to and including the first sink. A failing child ends the run unless its `stop_flow_on_error`
/// option is off.
pub struct SequentialDirector {
    owner:   RefCell<Weak<ActorNode>>,
    stopped: Cell<bool>
}

impl SequentialDirector {
    pub fn new(owner: Weak<ActorNode>) -> Self {
        Self { owner: RefCell::new(owner), stopped: Cell::new(false) }
    }

    fn halted(&self) -> bool {
        self.stopped.get() || self.owner().is_some_and(|owner| owner.is_stopped())
    }

    fn owner_name(&self) -> String {
        self.owner().map(|owner| owner.full_name()).unwrap_or_default()
    }

    fn run(&self, actor: &ActorRef) -> Result<(), FlowError> {
        match actor.execute() {
            Ok(()) => Ok(()),
            Err(e) if !actor.stops_flow_on_error() => {
                event!(Level::WARN, event = director::CHILD_FAILURE_IGNORED, actor = %actor.full_name(), error = %e);
                actor.log(&format!("Ignoring failure: {}", e));
                Ok(())
            }
            Err(e) => {
                event!(Level::ERROR, event = director::CHILD_FAILED, actor = %actor.full_name(), error = %e);
                Err(e)
            }
        }
    }

    /// Index one past the last actor fed by the producer at `start - 1`
    fn chain_end(active: &[ActorRef], start: usize) -> usize {
        let mut end = start;
        while end < active.len() && active[end].role().is_consumer() {
            end += 1;
            if active[end - 1].role() == ActorRole::Sink {
                break;
            }
        }
        end
    }

    /// Moves every pending token of the first actor through the rest of the chain
    fn pump(&self, chain: &[ActorRef]) -> Result<(), FlowError> {
        let Some((producer, rest)) = chain.split_first() else {
            return Ok(());
        };

        while !self.halted() && producer.has_output() {
            let Some(data) = producer.output() else {
                break;
            };
            let Some(consumer) = rest.first() else {
                continue;
            };

            consumer.input(data)?;
            self.run(consumer)?;
            if consumer.role().is_producer() {
                self.pump(rest)?;
            }
        }

        Ok(())
    }
}

impl Director for SequentialDirector {
    fn execute(&self, actors: &[ActorRef]) -> Result<(), FlowError> {
        self.stopped.set(false);
        if actors.is_empty() {
            return Err(FlowError::Structural("No actors to execute!".to_string()));
        }

        let active: Vec<ActorRef> = actors.iter().filter(|actor| !actor.is_skipped()).cloned().collect();
        event!(Level::DEBUG, event = director::EXECUTION_STARTED, owner = %self.owner_name(), actors = active.len());

        let mut index = 0;
        while index < active.len() {
            if self.halted() {
                event!(Level::DEBUG, event = director::EXECUTION_HALTED, owner = %self.owner_name(), at = index);
                break;
            }

            let actor = &active[index];
            match actor.role() {
                ActorRole::Standalone => {
                    self.run(actor)?;
                    index += 1;
                }
                ActorRole::Source => {
                    self.run(actor)?;
                    let end = Self::chain_end(&active, index + 1);
                    self.pump(&active[index..end])?;
                    index = end;
                }
                ActorRole::Transformer | ActorRole::Sink => {
                    return Err(FlowError::Structural(format!(
                        "{} expects input, but no producer precedes it",
                        actor.full_name()
                    )));
                }
            }
        }

        Ok(())
    }

    fn stop_execution(&self) {
        self.stopped.set(true);
    }

    fn is_stopped(&self) -> bool {
        self.stopped.get()
    }

    fn clean_up(&self) {
        *self.owner.borrow_mut() = Weak::new();
    }

    fn owner(&self) -> Option<ActorRef> {
        self.owner.borrow().upgrade()
    }
}

/// Director of reference pools, whose children only run when called
pub struct PassiveDirector {
    owner:   RefCell<Weak<ActorNode>>,
    stopped: Cell<bool>
}

impl PassiveDirector {
    pub fn new(owner: Weak<ActorNode>) -> Self {
        Self { owner: RefCell::new(owner), stopped: Cell::new(false) }
    }
}

impl Director for PassiveDirector {
    fn execute(&self, _actors: &[ActorRef]) -> Result<(), FlowError> {
        Ok(())
    }

    fn stop_execution(&self) {
        self.stopped.set(true);
    }

    fn is_stopped(&self) -> bool {
        self.stopped.get()
    }

    fn clean_up(&self) {
        *self.owner.borrow_mut() = Weak::new();
    }

    fn owner(&self) -> Option<ActorRef> {
        self.owner.borrow().upgrade()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        actor::testing::{Collector, Counter, Doubler, Failing, Tick, create_actor, create_flow},
        domain::constant::options
    };

    fn collected(flow: &ActorRef, index: usize) -> Vec<serde_json::Value> {
        flow.child(index).unwrap().with_behavior(|c: &Collector| c.items()).unwrap()
    }

    #[test]
    fn test_source_feeds_chain_in_order() {
        let flow = create_flow(vec![
            create_actor(Counter::default()),
            create_actor(Doubler::default()),
            create_actor(Collector::default())
        ]);
        flow.setup().unwrap();
        flow.execute().unwrap();
        assert_eq!(collected(&flow, 2), vec![json!(2.0), json!(4.0), json!(6.0)]);
    }

    #[test]
    fn test_empty_composite_fails() {
        let flow = create_flow(vec![]);
        flow.setup().unwrap();
        let err = flow.execute().unwrap_err();
        assert_eq!(err, FlowError::Structural("Flow: No actors to execute!".to_string()));
    }

    #[test]
    fn test_skipped_actors_are_ignored() {
        let flow = create_flow(vec![
            create_actor(Counter::default()),
            create_actor(Doubler::default()),
            create_actor(Collector::default())
        ]);
        flow.child(1).unwrap().set_option(options::SKIP, true).unwrap();
        flow.setup().unwrap();
        flow.execute().unwrap();
        assert_eq!(collected(&flow, 2), vec![json!(1), json!(2), json!(3)]);
    }

    #[test]
    fn test_consumer_without_producer() {
        let flow = create_flow(vec![create_actor(Tick::default()), create_actor(Collector::default())]);
        flow.setup().unwrap();
        let err = flow.execute().unwrap_err();
        assert!(matches!(err, FlowError::Structural(_)));
        assert!(err.message().contains("Flow.Collector expects input"));
    }

    #[test]
    fn test_failure_stops_flow() {
        let flow = create_flow(vec![
            create_actor(Tick::default()),
            create_actor(Failing::default()),
            create_actor(Tick::default())
        ]);
        flow.setup().unwrap();
        assert!(flow.execute().is_err());
        assert_eq!(flow.child(0).unwrap().with_behavior(|t: &Tick| t.count()), Some(1));
        assert_eq!(flow.child(2).unwrap().with_behavior(|t: &Tick| t.count()), Some(0));
    }

    #[test]
    fn test_ignored_failure_continues() {
        let flow = create_flow(vec![create_actor(Failing::default()), create_actor(Tick::default())]);
        flow.child(0).unwrap().set_option(options::STOP_FLOW_ON_ERROR, false).unwrap();
        flow.setup().unwrap();
        flow.execute().unwrap();
        assert_eq!(flow.child(1).unwrap().with_behavior(|t: &Tick| t.count()), Some(1));
    }

    #[test]
    fn test_stop_halts_remaining_actors() {
        let flow = create_flow(vec![create_actor(Tick::default()), create_actor(Tick::default())]);
        flow.child(0).unwrap().set_option("stop_root", true).unwrap();
        flow.setup().unwrap();
        flow.execute().unwrap();
        assert_eq!(flow.child(1).unwrap().with_behavior(|t: &Tick| t.count()), Some(0));
        assert!(flow.is_stopped());
    }

    #[test]
    fn test_chain_end_stops_after_sink() {
        let flow = create_flow(vec![
            create_actor(Counter::default()),
            create_actor(Collector::default()),
            create_actor(Tick::default())
        ]);
        flow.setup().unwrap();
        flow.execute().unwrap();
        assert_eq!(collected(&flow, 1).len(), 3);
        assert_eq!(flow.child(2).unwrap().with_behavior(|t: &Tick| t.count()), Some(1));
    }
}
