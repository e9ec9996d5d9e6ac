//! Actors that delegate to a named actor living in a reference pool
//!
//! The callee is looked up at setup, or lazily on first execution when the name comes from a variable, and cached
//! until the next reconfiguration. Variables of the callee are watched by the referencing actor.

use std::{
    collections::VecDeque,
    rc::{Rc, Weak}
};

use tracing::{Level, event};

use crate::{
    actor::{
        context::ActorContext,
        node::{ActorNode, ActorRef}
    },
    domain::{
        constant::{UNKNOWN_CALLABLE, callable},
        error::FlowError,
        option::{OptionDef, OptionManager},
        value::ValueType
    },
    port::actor::{Actor, Data, InputConsumer, OutputProducer, StateBackup}
};

pub const CALLABLE_NAME: &str = "callable_name";
pub const OPTIONAL: &str = "optional";

/// Resolution state of a callable actor reference
#[derive(Debug, Default)]
pub struct CallableLink {
    callee:     Option<Weak<ActorNode>>,
    configured: bool
}

impl CallableLink {
    pub fn define_options(options: &mut OptionManager) -> Result<(), FlowError> {
        options
            .add(OptionDef::new(
                CALLABLE_NAME,
                ValueType::CallableReference,
                UNKNOWN_CALLABLE,
                "The name of the callable actor to use"
            )?)?
            .add(OptionDef::new(OPTIONAL, ValueType::Bool, false, "Whether a missing callable actor is ignored")?)?;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.callee = None;
        self.configured = false;
    }

    /// Resolves right away unless the name is bound to a variable
    pub fn setup(&mut self, ctx: &ActorContext<'_>) -> Result<(), FlowError> {
        if ctx.has_binding(CALLABLE_NAME) {
            return Ok(());
        }
        self.configure(ctx)
    }

    fn configure(&mut self, ctx: &ActorContext<'_>) -> Result<(), FlowError> {
        self.configured = true;
        let name = ctx.get_text(CALLABLE_NAME)?;

        match ctx.resolve_callable(&name) {
            Some(callee) => {
                ctx.watch_variables(&callee.detect_variables());
                event!(Level::DEBUG, event = callable::RESOLVED, actor = %ctx.full_name(), callee = %callee.full_name());
                self.callee = Some(Rc::downgrade(&callee));
                Ok(())
            }
            None if ctx.get_bool(OPTIONAL)? => {
                event!(Level::DEBUG, event = callable::NOT_FOUND, actor = %ctx.full_name(), callee = %name);
                ctx.log(&format!("Callable actor '{}' not found, ignoring.", name));
                Ok(())
            }
            None => Err(FlowError::Resolution(format!("Could not find callable actor '{}'!", name)))
        }
    }

    /// The callee to run, resolving it first if that was deferred
    ///
    /// `None` when it is optional and missing, or when it has been stopped.
    pub fn callee(&mut self, ctx: &ActorContext<'_>) -> Result<Option<ActorRef>, FlowError> {
        if !self.configured {
            self.configure(ctx)?;
        }
        Ok(self.callee.as_ref().and_then(Weak::upgrade).filter(|callee| !callee.is_stopped()))
    }

    /// Passes a stop request on to the callee
    pub fn stop(&self) {
        if let Some(callee) = self.callee.as_ref().and_then(Weak::upgrade) {
            callee.stop_execution();
        }
    }
}

/// Collects every pending output of the callee
fn drain(callee: &ActorNode, queue: &mut VecDeque<Data>) {
    while callee.has_output() {
        match callee.output() {
            Some(data) => queue.push_back(data),
            None => break
        }
    }
}

/// Standalone executing the referenced actor
#[derive(Debug, Default)]
pub struct CallableStandalone {
    link: CallableLink
}

impl Actor for CallableStandalone {
    fn type_identifier(&self) -> &'static str {
        "CallableStandalone"
    }

    fn description(&self) -> &'static str {
        "Executes the referenced callable actor"
    }

    fn define_options(&self, options: &mut OptionManager) -> Result<(), FlowError> {
        CallableLink::define_options(options)
    }

    fn reset(&mut self) {
        self.link.reset();
    }

    fn setup(&mut self, ctx: &ActorContext<'_>) -> Result<(), FlowError> {
        self.link.setup(ctx)
    }

    fn do_execute(&mut self, ctx: &ActorContext<'_>) -> Result<(), FlowError> {
        if let Some(callee) = self.link.callee(ctx)? {
            callee.execute()?;
        }
        Ok(())
    }

    fn stop_execution(&mut self) {
        self.link.stop();
    }
}

/// Source forwarding the output of the referenced actor
#[derive(Debug, Default)]
pub struct CallableSource {
    link:   CallableLink,
    output: VecDeque<Data>
}

impl Actor for CallableSource {
    fn type_identifier(&self) -> &'static str {
        "CallableSource"
    }

    fn description(&self) -> &'static str {
        "Executes the referenced callable source and forwards its output"
    }

    fn define_options(&self, options: &mut OptionManager) -> Result<(), FlowError> {
        CallableLink::define_options(options)
    }

    fn reset(&mut self) {
        self.link.reset();
    }

    fn setup(&mut self, ctx: &ActorContext<'_>) -> Result<(), FlowError> {
        self.link.setup(ctx)
    }

    fn pre_execute(&mut self, _ctx: &ActorContext<'_>) -> Result<(), FlowError> {
        self.output.clear();
        Ok(())
    }

    fn do_execute(&mut self, ctx: &ActorContext<'_>) -> Result<(), FlowError> {
        if let Some(callee) = self.link.callee(ctx)? {
            callee.execute()?;
            drain(&callee, &mut self.output);
        }
        Ok(())
    }

    fn backup_state(&mut self) -> StateBackup {
        let mut backup = StateBackup::default();
        backup.insert("output", std::mem::take(&mut self.output));
        backup
    }

    fn restore_state(&mut self, mut state: StateBackup) {
        if let Some(output) = state.take::<VecDeque<Data>>("output") {
            self.output = output;
        }
    }

    fn stop_execution(&mut self) {
        self.link.stop();
    }

    fn as_producer(&self) -> Option<&dyn OutputProducer> {
        Some(self)
    }

    fn as_producer_mut(&mut self) -> Option<&mut dyn OutputProducer> {
        Some(self)
    }
}

impl OutputProducer for CallableSource {
    fn has_output(&self) -> bool {
        !self.output.is_empty()
    }

    fn output(&mut self) -> Option<Data> {
        self.output.pop_front()
    }
}

/// Transformer passing each token through the referenced actor
#[derive(Debug, Default)]
pub struct CallableTransformer {
    link:   CallableLink,
    input:  Option<Data>,
    output: VecDeque<Data>
}

impl Actor for CallableTransformer {
    fn type_identifier(&self) -> &'static str {
        "CallableTransformer"
    }

    fn description(&self) -> &'static str {
        "Feeds the input to the referenced callable transformer and forwards its output"
    }

    fn define_options(&self, options: &mut OptionManager) -> Result<(), FlowError> {
        CallableLink::define_options(options)
    }

    fn reset(&mut self) {
        self.link.reset();
    }

    fn setup(&mut self, ctx: &ActorContext<'_>) -> Result<(), FlowError> {
        self.link.setup(ctx)
    }

    fn do_execute(&mut self, ctx: &ActorContext<'_>) -> Result<(), FlowError> {
        let Some(data) = self.input.take() else {
            return Ok(());
        };
        if let Some(callee) = self.link.callee(ctx)? {
            callee.input(data)?;
            callee.execute()?;
            drain(&callee, &mut self.output);
        }
        Ok(())
    }

    fn backup_state(&mut self) -> StateBackup {
        let mut backup = StateBackup::default();
        backup.insert("input", self.input.take());
        backup.insert("output", std::mem::take(&mut self.output));
        backup
    }

    fn restore_state(&mut self, mut state: StateBackup) {
        if let Some(input) = state.take::<Option<Data>>("input") {
            self.input = input;
        }
        if let Some(output) = state.take::<VecDeque<Data>>("output") {
            self.output = output;
        }
    }

    fn stop_execution(&mut self) {
        self.link.stop();
    }

    fn as_producer(&self) -> Option<&dyn OutputProducer> {
        Some(self)
    }

    fn as_producer_mut(&mut self) -> Option<&mut dyn OutputProducer> {
        Some(self)
    }

    fn as_consumer(&self) -> Option<&dyn InputConsumer> {
        Some(self)
    }

    fn as_consumer_mut(&mut self) -> Option<&mut dyn InputConsumer> {
        Some(self)
    }
}

impl OutputProducer for CallableTransformer {
    fn has_output(&self) -> bool {
        !self.output.is_empty()
    }

    fn output(&mut self) -> Option<Data> {
        self.output.pop_front()
    }
}

impl InputConsumer for CallableTransformer {
    fn input(&mut self, data: Data) {
        self.input = Some(data);
    }
}

/// Sink handing each token to the referenced actor
#[derive(Debug, Default)]
pub struct CallableSink {
    link:  CallableLink,
    input: Option<Data>
}

impl Actor for CallableSink {
    fn type_identifier(&self) -> &'static str {
        "CallableSink"
    }

    fn description(&self) -> &'static str {
        "Feeds the input to the referenced callable sink"
    }

    fn define_options(&self, options: &mut OptionManager) -> Result<(), FlowError> {
        CallableLink::define_options(options)
    }

    fn reset(&mut self) {
        self.link.reset();
    }

    fn setup(&mut self, ctx: &ActorContext<'_>) -> Result<(), FlowError> {
        self.link.setup(ctx)
    }

    fn do_execute(&mut self, ctx: &ActorContext<'_>) -> Result<(), FlowError> {
        let Some(data) = self.input.take() else {
            return Ok(());
        };
        if let Some(callee) = self.link.callee(ctx)? {
            callee.input(data)?;
            callee.execute()?;
        }
        Ok(())
    }

    fn backup_state(&mut self) -> StateBackup {
        let mut backup = StateBackup::default();
        backup.insert("input", self.input.take());
        backup
    }

    fn restore_state(&mut self, mut state: StateBackup) {
        if let Some(input) = state.take::<Option<Data>>("input") {
            self.input = input;
        }
    }

    fn stop_execution(&mut self) {
        self.link.stop();
    }

    fn as_consumer(&self) -> Option<&dyn InputConsumer> {
        Some(self)
    }

    fn as_consumer_mut(&mut self) -> Option<&mut dyn InputConsumer> {
        Some(self)
    }
}

impl InputConsumer for CallableSink {
    fn input(&mut self, data: Data) {
        self.input = Some(data);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::actor::{
        control::{CallableActors, Flow},
        testing::{Collector, Counter, Doubler, Tick, create_actor, create_flow}
    };

    fn named(actor: ActorRef, name: &str) -> ActorRef {
        actor.set_name(name).unwrap();
        actor
    }

    fn create_pool(actors: Vec<ActorRef>) -> ActorRef {
        let pool = create_actor(CallableActors);
        pool.set_actors(actors).unwrap();
        pool
    }

    fn calling(actor: impl Actor, name: &str) -> ActorRef {
        let node = create_actor(actor);
        node.set_option(CALLABLE_NAME, name).unwrap();
        node
    }

    #[test]
    fn test_standalone_executes_callee() {
        let target = named(create_actor(Tick::default()), "tick");
        let flow = create_flow(vec![
            create_pool(vec![target.clone()]),
            calling(CallableStandalone::default(), "tick"),
            calling(CallableStandalone::default(), "tick")
        ]);
        flow.setup().unwrap();
        flow.execute().unwrap();
        assert_eq!(target.with_behavior(|t: &Tick| t.count()), Some(2));
    }

    #[test]
    fn test_source_transformer_and_sink() {
        let flow = create_flow(vec![
            create_pool(vec![
                named(create_actor(Counter::default()), "numbers"),
                named(create_actor(Doubler::default()), "double"),
                named(create_actor(Collector::default()), "keep")
            ]),
            calling(CallableSource::default(), "numbers"),
            calling(CallableTransformer::default(), "double"),
            calling(CallableSink::default(), "keep")
        ]);
        flow.setup().unwrap();
        flow.execute().unwrap();

        let pool = flow.child(0).unwrap();
        let items = pool.child(2).unwrap().with_behavior(|c: &Collector| c.items()).unwrap();
        assert_eq!(items, vec![json!(2.0), json!(4.0), json!(6.0)]);
    }

    #[test]
    fn test_missing_callee_fails_setup() {
        let flow = create_flow(vec![calling(CallableStandalone::default(), "nowhere")]);
        let err = flow.setup().unwrap_err();
        assert!(matches!(err, FlowError::Resolution(_)));
        assert!(err.message().contains("Could not find callable actor 'nowhere'!"));
    }

    #[test]
    fn test_optional_missing_callee_is_a_no_op() {
        let caller = calling(CallableStandalone::default(), "nowhere");
        caller.set_option(OPTIONAL, true).unwrap();
        let flow = create_flow(vec![caller]);
        flow.setup().unwrap();
        flow.execute().unwrap();
    }

    #[test]
    fn test_variable_name_resolves_lazily() {
        let first = named(create_actor(Tick::default()), "first");
        let second = named(create_actor(Tick::default()), "second");
        let caller = calling(CallableStandalone::default(), "@{target}");
        let flow = create_flow(vec![create_pool(vec![first.clone(), second.clone()]), caller]);

        // not resolvable yet, but setup does not look it up
        flow.setup().unwrap();
        flow.variables().set("target", "first").unwrap();
        flow.execute().unwrap();
        assert_eq!(first.with_behavior(|t: &Tick| t.count()), Some(1));

        flow.variables().set("target", "second").unwrap();
        flow.execute().unwrap();
        assert_eq!(first.with_behavior(|t: &Tick| t.count()), Some(1));
        assert_eq!(second.with_behavior(|t: &Tick| t.count()), Some(1));
    }

    #[test]
    fn test_callee_variables_reconfigure_caller() {
        let target = named(create_actor(Doubler::default()), "double");
        target.set_option("factor", "@{f}").unwrap();
        let caller = calling(CallableTransformer::default(), "double");
        let flow = create_flow(vec![create_pool(vec![target]), create_actor(Counter::default()), caller.clone()]);
        flow.setup().unwrap();

        assert!(caller.watched_variables().contains(&"f".to_string()));
        flow.variables().set("f", "5").unwrap();
        assert!(caller.variables_changed());
    }

    #[test]
    fn test_stop_reaches_callee() {
        let target = named(create_actor(Flow), "sub");
        target.set_actors(vec![create_actor(Tick::default())]).unwrap();
        let caller = calling(CallableStandalone::default(), "sub");
        let flow = create_flow(vec![create_pool(vec![target.clone()]), caller.clone()]);
        flow.setup().unwrap();

        caller.stop_execution();
        assert!(target.is_stopped());
    }

    #[test]
    fn test_stopped_callee_is_not_executed() {
        let target = named(create_actor(Tick::default()), "tick");
        let flow = create_flow(vec![create_pool(vec![target.clone()]), calling(CallableStandalone::default(), "tick")]);
        flow.setup().unwrap();
        flow.execute().unwrap();

        target.stop_execution();
        flow.execute().unwrap();
        assert_eq!(target.with_behavior(|t: &Tick| t.count()), Some(1));
    }

    #[test]
    fn test_stopped_callee_produces_nothing() {
        let target = named(create_actor(Doubler::default()), "double");
        let flow = create_flow(vec![
            create_pool(vec![target.clone()]),
            create_actor(Counter::default()),
            calling(CallableTransformer::default(), "double"),
            create_actor(Collector::default())
        ]);
        flow.setup().unwrap();
        target.stop_execution();
        flow.execute().unwrap();

        let items = flow.child(3).unwrap().with_behavior(|c: &Collector| c.items()).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_variable_name_of_missing_actor_fails_execute() {
        let caller = calling(CallableStandalone::default(), "@{target}");
        let flow = create_flow(vec![create_pool(vec![named(create_actor(Tick::default()), "tick")]), caller]);
        flow.setup().unwrap();

        flow.variables().set("target", "ghost").unwrap();
        let err = flow.execute().unwrap_err();
        assert!(matches!(err, FlowError::Resolution(_)));
        assert!(err.message().contains("Could not find callable actor 'ghost'!"));
    }
}
