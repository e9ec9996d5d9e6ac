use std::rc::Rc;

use crate::{
    actor::{
        node::{ActorNode, ActorRef},
        scope::find_callable_actor_recursive
    },
    adapter::{
        codec::CodecRegistry,
        store::{Storage, Variables}
    },
    domain::{error::FlowError, value::OptionValue},
    port::handler::OptionHandler
};

/// View of the running actor handed to behaviour hooks
///
/// Gives access to the resolved options and the shared environment without exposing the behaviour itself, which is
/// borrowed while a hook runs.
pub struct ActorContext<'a> {
    node: &'a ActorNode
}

fn wrong_type(name: &str, expected: &str, value: &OptionValue) -> FlowError {
    FlowError::Configuration(format!("Option {} is not {}: {}", name, expected, value))
}

impl<'a> ActorContext<'a> {
    pub(crate) fn new(node: &'a ActorNode) -> Self {
        Self { node }
    }

    pub fn node(&self) -> &ActorNode {
        self.node
    }

    /// Shared handle to the running actor
    pub fn actor(&self) -> Option<ActorRef> {
        self.node.handle()
    }

    pub fn name(&self) -> String {
        self.node.name()
    }

    pub fn full_name(&self) -> String {
        self.node.full_name()
    }

    pub fn get(&self, name: &str) -> Result<OptionValue, FlowError> {
        self.node.get_option(name)
    }

    pub fn get_bool(&self, name: &str) -> Result<bool, FlowError> {
        let value = self.get(name)?;
        value.as_bool().ok_or_else(|| wrong_type(name, "a boolean", &value))
    }

    pub fn get_int(&self, name: &str) -> Result<i64, FlowError> {
        let value = self.get(name)?;
        value.as_int().ok_or_else(|| wrong_type(name, "an integer", &value))
    }

    pub fn get_float(&self, name: &str) -> Result<f64, FlowError> {
        let value = self.get(name)?;
        value.as_float().ok_or_else(|| wrong_type(name, "a number", &value))
    }

    pub fn get_text(&self, name: &str) -> Result<String, FlowError> {
        let value = self.get(name)?;
        value.as_text().map(str::to_string).ok_or_else(|| wrong_type(name, "text", &value))
    }

    pub fn get_list(&self, name: &str) -> Result<Vec<OptionValue>, FlowError> {
        match self.get(name)? {
            OptionValue::List(items) => Ok(items),
            other => Err(wrong_type(name, "a list", &other))
        }
    }

    pub fn get_object(&self, name: &str) -> Result<Box<dyn OptionHandler>, FlowError> {
        match self.get(name)? {
            OptionValue::Object(handler) => Ok(handler),
            other => Err(wrong_type(name, "an object", &other))
        }
    }

    /// Whether the option is bound to a variable
    pub fn has_binding(&self, name: &str) -> bool {
        self.node.options().has_binding(name)
    }

    pub fn variables(&self) -> Rc<Variables> {
        self.node.variables()
    }

    pub fn storage(&self) -> Rc<Storage> {
        self.node.storage()
    }

    pub fn codecs(&self) -> Rc<CodecRegistry> {
        self.node.environment().codecs
    }

    /// Replaces `@{name}` references with variable values
    pub fn expand(&self, text: &str) -> String {
        let environment = self.node.environment();
        environment.variables.expand(text, environment.log.as_ref())
    }

    pub fn log(&self, message: &str) {
        self.node.log(message);
    }

    pub fn debug(&self, message: &str) {
        self.node.debug(message);
    }

    pub fn is_debug(&self) -> bool {
        self.node.is_debug()
    }

    pub fn is_stopped(&self) -> bool {
        self.node.is_stopped()
    }

    /// Looks up a callable actor by name in the reference pools visible from this actor
    pub fn resolve_callable(&self, name: &str) -> Option<ActorRef> {
        find_callable_actor_recursive(self.node, name)
    }

    /// Adds variables whose change must reconfigure this actor
    pub fn watch_variables(&self, names: &[String]) {
        self.node.watch_variables(names);
    }
}
