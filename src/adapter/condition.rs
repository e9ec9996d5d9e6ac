//! Built-in boolean conditions

use crate::{
    domain::{
        constant::CONDITION_FAMILY,
        error::FlowError,
        option::{OptionDef, OptionManager},
        value::ValueType
    },
    port::{actor::Data, condition::BooleanCondition, handler::OptionHandler}
};

const OPERATOR: &str = "operator";
const OPERAND: &str = "operand";
const OPERATORS: [&str; 6] = ["lt", "le", "eq", "ne", "ge", "gt"];

/// Compares numeric tokens against a fixed operand
#[derive(Debug, Clone)]
pub struct Comparison {
    options: OptionManager
}

impl Comparison {
    pub const TYPE_IDENTIFIER: &'static str = "Comparison";

    pub fn new() -> Result<Self, FlowError> {
        let operator = OptionDef::new(OPERATOR, ValueType::Text, "eq", "How the token compares to the operand")?;
        let mut options = OptionManager::new();
        options
            .add(operator.with_choices(&OPERATORS)?)?
            .add(OptionDef::new(OPERAND, ValueType::Float, 0.0, "The value to compare the token against")?)?;
        Ok(Self { options })
    }
}

impl OptionHandler for Comparison {
    fn type_identifier(&self) -> &'static str {
        Self::TYPE_IDENTIFIER
    }

    fn family(&self) -> &'static str {
        CONDITION_FAMILY
    }

    fn option_manager(&self) -> &OptionManager {
        &self.options
    }

    fn option_manager_mut(&mut self) -> &mut OptionManager {
        &mut self.options
    }

    fn clone_box(&self) -> Box<dyn OptionHandler> {
        Box::new(self.clone())
    }

    fn as_condition(&self) -> Option<&dyn BooleanCondition> {
        Some(self)
    }
}

impl BooleanCondition for Comparison {
    fn check(&self) -> Result<(), FlowError> {
        self.options.get(OPERATOR)?;
        self.options.get(OPERAND)?;
        Ok(())
    }

    fn evaluate(&self, data: &Data) -> Result<bool, FlowError> {
        let value = data
            .as_f64()
            .ok_or_else(|| FlowError::Execution(format!("Comparison requires numeric data, received: {}", data)))?;
        let operand = self.options.get(OPERAND)?.as_float().unwrap_or_default();
        let operator = self.options.get(OPERATOR)?;

        match operator.as_text().unwrap_or_default() {
            "lt" => Ok(value < operand),
            "le" => Ok(value <= operand),
            "eq" => Ok(value == operand),
            "ne" => Ok(value != operand),
            "ge" => Ok(value >= operand),
            "gt" => Ok(value > operand),
            other => Err(FlowError::Configuration(format!("Unknown comparison operator: {}", other)))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use serde_json::json;

    use super::*;
    use crate::{
        adapter::{codec::CodecRegistry, store::Variables},
        domain::option::OptionScope
    };

    #[test]
    fn test_operators() {
        let mut comparison = Comparison::new().unwrap();
        comparison.option_manager_mut().set(OPERAND, 3.0).unwrap();

        for (operator, expected) in [("lt", false), ("le", true), ("eq", true), ("ne", false), ("ge", true), ("gt", false)]
        {
            comparison.option_manager_mut().set(OPERATOR, operator).unwrap();
            assert_eq!(comparison.evaluate(&json!(3)).unwrap(), expected, "operator {}", operator);
        }
    }

    #[test]
    fn test_non_numeric_data_fails() {
        let comparison = Comparison::new().unwrap();
        let result = comparison.evaluate(&json!("three"));
        assert!(matches!(result, Err(FlowError::Execution(_))));
    }

    #[test]
    fn test_unknown_operator_rejected_at_assignment() {
        let mut comparison = Comparison::new().unwrap();
        let err = comparison.option_manager_mut().set(OPERATOR, "between").unwrap_err();
        assert!(matches!(err, FlowError::Configuration(_)));
        assert_eq!(comparison.option_manager().get(OPERATOR).unwrap().as_text(), Some("eq"));
    }

    #[test]
    fn test_operand_from_variable() {
        let mut comparison = Comparison::new().unwrap();
        let variables = Rc::new(Variables::new());
        comparison
            .option_manager_mut()
            .attach(OptionScope { variables: variables.clone(), codecs: Rc::new(CodecRegistry::with_defaults()) });
        comparison.option_manager_mut().set(OPERATOR, "gt").unwrap();
        comparison.option_manager_mut().set(OPERAND, "@{limit}").unwrap();

        variables.set("limit", "10").unwrap();
        assert!(!comparison.evaluate(&json!(5)).unwrap());

        variables.set("limit", "2").unwrap();
        assert!(comparison.evaluate(&json!(5)).unwrap());
    }
}
