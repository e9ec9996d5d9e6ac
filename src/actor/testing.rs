//! Small actors shared by the unit tests

use std::collections::VecDeque;

use serde_json::json;

use crate::{
    actor::{
        context::ActorContext,
        control::Flow,
        node::{ActorNode, ActorRef}
    },
    domain::{
        error::FlowError,
        option::{OptionDef, OptionManager},
        value::ValueType
    },
    port::actor::{Actor, Data, DataType, InputConsumer, OutputProducer, StateBackup}
};

pub fn create_actor(actor: impl Actor) -> ActorRef {
    ActorNode::new(Box::new(actor)).unwrap()
}

pub fn create_flow(actors: Vec<ActorRef>) -> ActorRef {
    let flow = create_actor(Flow);
    flow.set_actors(actors).unwrap();
    flow
}

/// Standalone counting its executions, optionally stopping the whole tree
#[derive(Debug, Default)]
pub struct Tick {
    count: usize
}

impl Tick {
    pub fn count(&self) -> usize {
        self.count
    }
}

impl Actor for Tick {
    fn type_identifier(&self) -> &'static str {
        "Tick"
    }

    fn define_options(&self, options: &mut OptionManager) -> Result<(), FlowError> {
        options.add(OptionDef::new("stop_root", ValueType::Bool, false, "Stops the root after executing")?)?;
        Ok(())
    }

    fn do_execute(&mut self, ctx: &ActorContext<'_>) -> Result<(), FlowError> {
        self.count += 1;
        if ctx.get_bool("stop_root")?
            && let Some(actor) = ctx.actor()
        {
            actor.root().stop_execution();
        }
        Ok(())
    }
}

/// Source emitting the integers from `start` to `end`
#[derive(Debug, Default)]
pub struct Counter {
    queue: VecDeque<Data>
}

impl Actor for Counter {
    fn type_identifier(&self) -> &'static str {
        "Counter"
    }

    fn define_options(&self, options: &mut OptionManager) -> Result<(), FlowError> {
        options
            .add(OptionDef::new("start", ValueType::Int, 1, "First value")?)?
            .add(OptionDef::new("end", ValueType::Int, 3, "Last value")?)?;
        Ok(())
    }

    fn pre_execute(&mut self, _ctx: &ActorContext<'_>) -> Result<(), FlowError> {
        self.queue.clear();
        Ok(())
    }

    fn do_execute(&mut self, ctx: &ActorContext<'_>) -> Result<(), FlowError> {
        for value in ctx.get_int("start")?..=ctx.get_int("end")? {
            self.queue.push_back(json!(value));
        }
        Ok(())
    }

    fn as_producer(&self) -> Option<&dyn OutputProducer> {
        Some(self)
    }

    fn as_producer_mut(&mut self) -> Option<&mut dyn OutputProducer> {
        Some(self)
    }
}

impl OutputProducer for Counter {
    fn generates(&self) -> Vec<DataType> {
        vec![DataType::Integer]
    }

    fn has_output(&self) -> bool {
        !self.queue.is_empty()
    }

    fn output(&mut self) -> Option<Data> {
        self.queue.pop_front()
    }
}

/// Transformer multiplying numbers by `factor`
///
/// `factor` is read at setup, the number of tokens seen survives reconfiguration.
#[derive(Debug, Default)]
pub struct Doubler {
    factor: f64,
    input:  Option<Data>,
    output: VecDeque<Data>,
    seen:   usize,
    setups: usize
}

impl Doubler {
    pub fn seen(&self) -> usize {
        self.seen
    }

    pub fn setups(&self) -> usize {
        self.setups
    }
}

impl Actor for Doubler {
    fn type_identifier(&self) -> &'static str {
        "Doubler"
    }

    fn define_options(&self, options: &mut OptionManager) -> Result<(), FlowError> {
        options.add(OptionDef::new("factor", ValueType::Float, 2.0, "Multiplier")?)?;
        Ok(())
    }

    fn reset(&mut self) {
        self.factor = 0.0;
        self.seen = 0;
    }

    fn setup(&mut self, ctx: &ActorContext<'_>) -> Result<(), FlowError> {
        self.factor = ctx.get_float("factor")?;
        self.setups += 1;
        Ok(())
    }

    fn do_execute(&mut self, _ctx: &ActorContext<'_>) -> Result<(), FlowError> {
        let Some(data) = self.input.take() else {
            return Ok(());
        };
        let number = data.as_f64().ok_or_else(|| FlowError::Execution(format!("Not a number: {}", data)))?;
        self.seen += 1;
        self.output.push_back(json!(number * self.factor));
        Ok(())
    }

    fn backup_state(&mut self) -> StateBackup {
        let mut backup = StateBackup::default();
        backup.insert("seen", self.seen);
        backup
    }

    fn restore_state(&mut self, mut state: StateBackup) {
        if let Some(seen) = state.take::<usize>("seen") {
            self.seen = seen;
        }
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

impl OutputProducer for Doubler {
    fn generates(&self) -> Vec<DataType> {
        vec![DataType::Float]
    }

    fn has_output(&self) -> bool {
        !self.output.is_empty()
    }

    fn output(&mut self) -> Option<Data> {
        self.output.pop_front()
    }
}

impl InputConsumer for Doubler {
    fn accepts(&self) -> Vec<DataType> {
        vec![DataType::Integer, DataType::Float]
    }

    fn input(&mut self, data: Data) {
        self.input = Some(data);
    }
}

/// Sink keeping every token it receives
#[derive(Debug, Default)]
pub struct Collector {
    input: Option<Data>,
    items: Vec<Data>
}

impl Collector {
    pub fn items(&self) -> Vec<Data> {
        self.items.clone()
    }
}

impl Actor for Collector {
    fn type_identifier(&self) -> &'static str {
        "Collector"
    }

    fn do_execute(&mut self, _ctx: &ActorContext<'_>) -> Result<(), FlowError> {
        if let Some(data) = self.input.take() {
            self.items.push(data);
        }
        Ok(())
    }

    fn as_consumer(&self) -> Option<&dyn InputConsumer> {
        Some(self)
    }

    fn as_consumer_mut(&mut self) -> Option<&mut dyn InputConsumer> {
        Some(self)
    }
}

impl InputConsumer for Collector {
    fn input(&mut self, data: Data) {
        self.input = Some(data);
    }
}

/// Standalone that always fails, by error or by panic
#[derive(Debug, Default)]
pub struct Failing;

impl Actor for Failing {
    fn type_identifier(&self) -> &'static str {
        "Failing"
    }

    fn define_options(&self, options: &mut OptionManager) -> Result<(), FlowError> {
        options.add(OptionDef::new("panic", ValueType::Bool, false, "Panic instead of returning an error")?)?;
        Ok(())
    }

    fn do_execute(&mut self, ctx: &ActorContext<'_>) -> Result<(), FlowError> {
        if ctx.get_bool("panic")? {
            panic!("deliberate panic");
        }
        Err(FlowError::Execution("deliberate failure".to_string()))
    }
}
