//! General purpose leaf actors working on variables, storage and conditions

use std::collections::VecDeque;

use crate::{
    actor::context::ActorContext,
    adapter::condition::Comparison,
    domain::{
        constant::CONDITION_FAMILY,
        error::FlowError,
        option::{OptionDef, OptionManager},
        value::{OptionValue, ValueType}
    },
    port::{
        actor::{Actor, Data, InputConsumer, OutputProducer, StateBackup},
        handler::OptionHandler
    }
};

/// Standalone setting a variable
#[derive(Debug, Default)]
pub struct SetVariable;

impl Actor for SetVariable {
    fn type_identifier(&self) -> &'static str {
        "SetVariable"
    }

    fn description(&self) -> &'static str {
        "Sets a variable to the given value, optionally expanding variables in it first"
    }

    fn define_options(&self, options: &mut OptionManager) -> Result<(), FlowError> {
        options
            .add(OptionDef::new("var_name", ValueType::VariableName, "variable", "The name of the variable to set")?)?
            .add(OptionDef::new("var_value", ValueType::Text, "value", "The value of the variable")?)?
            .add(OptionDef::new("expand", ValueType::Bool, false, "Whether to expand variables in the value")?)?;
        Ok(())
    }

    fn do_execute(&mut self, ctx: &ActorContext<'_>) -> Result<(), FlowError> {
        let name = ctx.get_text("var_name")?;
        let mut value = ctx.get_text("var_value")?;
        if ctx.get_bool("expand")? {
            value = ctx.expand(&value);
        }
        ctx.debug(&format!("Setting variable '{}' to: {}", name, value));
        ctx.variables().set(&name, value)
    }
}

/// Sink storing each token under a storage name
#[derive(Debug, Default)]
pub struct SetStorageValue {
    input: Option<Data>
}

impl Actor for SetStorageValue {
    fn type_identifier(&self) -> &'static str {
        "SetStorageValue"
    }

    fn description(&self) -> &'static str {
        "Stores the incoming data in storage under the given name"
    }

    fn define_options(&self, options: &mut OptionManager) -> Result<(), FlowError> {
        options.add(OptionDef::new(
            "storage_name",
            ValueType::StorageName,
            "storage",
            "The name to store the data under"
        )?)?;
        Ok(())
    }

    fn do_execute(&mut self, ctx: &ActorContext<'_>) -> Result<(), FlowError> {
        let Some(data) = self.input.take() else {
            return Ok(());
        };
        let name = ctx.get_text("storage_name")?;
        ctx.storage().set(&name, data)
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

    fn as_consumer(&self) -> Option<&dyn InputConsumer> {
        Some(self)
    }

    fn as_consumer_mut(&mut self) -> Option<&mut dyn InputConsumer> {
        Some(self)
    }
}

impl InputConsumer for SetStorageValue {
    fn input(&mut self, data: Data) {
        self.input = Some(data);
    }
}

/// Transformer forwarding only the tokens its condition accepts
#[derive(Debug, Default)]
pub struct Filter {
    condition: Option<Box<dyn OptionHandler>>,
    input:     Option<Data>,
    output:    VecDeque<Data>
}

impl Actor for Filter {
    fn type_identifier(&self) -> &'static str {
        "Filter"
    }

    fn description(&self) -> &'static str {
        "Forwards only the data that satisfies the condition"
    }

    fn define_options(&self, options: &mut OptionManager) -> Result<(), FlowError> {
        let condition: Box<dyn OptionHandler> = Box::new(Comparison::new()?);
        options.add(OptionDef::new(
            "condition",
            ValueType::Object(CONDITION_FAMILY),
            OptionValue::Object(condition),
            "The condition the data must satisfy"
        )?)?;
        Ok(())
    }

    fn reset(&mut self) {
        self.condition = None;
    }

    fn setup(&mut self, ctx: &ActorContext<'_>) -> Result<(), FlowError> {
        let condition = ctx.get_object("condition")?;
        let Some(check) = condition.as_condition().map(|c| c.check()) else {
            return Err(FlowError::Configuration(format!("{} is not a condition", condition.type_identifier())));
        };
        check?;
        self.condition = Some(condition);
        Ok(())
    }

    fn pre_execute(&mut self, _ctx: &ActorContext<'_>) -> Result<(), FlowError> {
        self.output.clear();
        Ok(())
    }

    fn do_execute(&mut self, _ctx: &ActorContext<'_>) -> Result<(), FlowError> {
        let Some(data) = self.input.take() else {
            return Ok(());
        };
        let condition = self
            .condition
            .as_ref()
            .and_then(|handler| handler.as_condition())
            .ok_or_else(|| FlowError::Execution("No condition set up".to_string()))?;

        if condition.evaluate(&data)? {
            self.output.push_back(data);
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

impl OutputProducer for Filter {
    fn has_output(&self) -> bool {
        !self.output.is_empty()
    }

    fn output(&mut self) -> Option<Data> {
        self.output.pop_front()
    }
}

impl InputConsumer for Filter {
    fn input(&mut self, data: Data) {
        self.input = Some(data);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::actor::testing::{Collector, Counter, create_actor, create_flow};

    #[test]
    fn test_set_variable_expands() {
        let setter = create_actor(SetVariable);
        setter.set_option("var_name", "greeting").unwrap();
        setter.set_option("var_value", "hello @{who}").unwrap();
        setter.set_option("expand", true).unwrap();
        let flow = create_flow(vec![setter]);
        flow.variables().set("who", "world").unwrap();

        flow.setup().unwrap();
        flow.execute().unwrap();
        assert_eq!(flow.variables().get("greeting").unwrap(), Some("hello world".to_string()));
    }

    #[test]
    fn test_set_variable_rejects_invalid_name() {
        let setter = create_actor(SetVariable);
        assert!(setter.set_option("var_name", "not valid").is_err());

        setter.set_option("var_name", "@{target}").unwrap();
        setter.variables().set("target", "not valid").unwrap();
        setter.setup().unwrap();
        assert!(setter.execute().is_err());
    }

    #[test]
    fn test_storage_keeps_last_token() {
        let store = create_actor(SetStorageValue::default());
        store.set_option("storage_name", "last").unwrap();
        let flow = create_flow(vec![create_actor(Counter::default()), store]);
        flow.setup().unwrap();
        flow.execute().unwrap();
        assert_eq!(flow.storage().get("last").unwrap(), Some(json!(3)));
    }

    #[test]
    fn test_filter_with_comparison() {
        let mut condition = Comparison::new().unwrap();
        condition.option_manager_mut().set("operator", "ge").unwrap();
        condition.option_manager_mut().set("operand", 2.0).unwrap();

        let filter = create_actor(Filter::default());
        let condition: Box<dyn OptionHandler> = Box::new(condition);
        filter.set_option("condition", condition).unwrap();
        let flow = create_flow(vec![create_actor(Counter::default()), filter, create_actor(Collector::default())]);
        flow.setup().unwrap();
        flow.execute().unwrap();

        let items = flow.child(2).unwrap().with_behavior(|c: &Collector| c.items()).unwrap();
        assert_eq!(items, vec![json!(2), json!(3)]);
    }

    #[test]
    fn test_filter_operand_from_variable_reconfigures() {
        let mut condition = Comparison::new().unwrap();
        condition.option_manager_mut().set("operator", "gt").unwrap();
        condition.option_manager_mut().set("operand", "@{limit}").unwrap();

        let filter = create_actor(Filter::default());
        let condition: Box<dyn OptionHandler> = Box::new(condition);
        filter.set_option("condition", condition).unwrap();
        let flow = create_flow(vec![create_actor(Counter::default()), filter.clone(), create_actor(Collector::default())]);
        flow.variables().set("limit", "2").unwrap();
        flow.setup().unwrap();
        assert_eq!(filter.watched_variables(), vec!["limit".to_string()]);

        flow.execute().unwrap();
        flow.variables().set("limit", "0").unwrap();
        flow.execute().unwrap();

        let items = flow.child(2).unwrap().with_behavior(|c: &Collector| c.items()).unwrap();
        assert_eq!(items, vec![json!(3), json!(1), json!(2), json!(3)]);
    }

    #[test]
    fn test_set_variable_expands_template() {
        let setter = create_actor(SetVariable);
        setter.set_option("var_name", "joined").unwrap();
        setter.set_option("var_value", "@{a}-@{b}").unwrap();
        setter.set_option("expand", true).unwrap();
        assert!(!setter.options().has_binding("var_value"));
        let flow = create_flow(vec![setter]);
        flow.variables().set("a", "x").unwrap();
        flow.variables().set("b", "y").unwrap();

        flow.setup().unwrap();
        flow.execute().unwrap();
        assert_eq!(flow.variables().get("joined").unwrap(), Some("x-y".to_string()));
    }

    #[test]
    fn test_filter_bad_operator_fails_setup() {
        let mut condition = Comparison::new().unwrap();
        condition.option_manager_mut().set("operator", "@{op}").unwrap();

        let filter = create_actor(Filter::default());
        let condition: Box<dyn OptionHandler> = Box::new(condition);
        filter.set_option("condition", condition).unwrap();
        let flow = create_flow(vec![create_actor(Counter::default()), filter, create_actor(Collector::default())]);
        flow.variables().set("op", "between").unwrap();

        let err = flow.setup().unwrap_err();
        assert!(matches!(err, FlowError::Configuration(_)));
        assert!(err.message().contains("'between' is not one of"));
    }
}
