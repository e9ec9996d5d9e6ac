//! Option descriptors and the option manager
//!
//! An option resolves to, in order of precedence: the value of its bound variable (when that variable is currently
//! defined), its literal override, its declared default.

use std::{collections::HashMap, fmt, rc::Rc};

use serde_json::{Map, Value as JsonValue};
use tracing::{Level, event};

use crate::{
    adapter::{codec::CodecRegistry, store::Variables},
    domain::{
        constant::{TYPE_KEY, store},
        error::FlowError,
        identifier::{is_var, pad_var, unpad_var, validate_name},
        value::{OptionValue, ValueType}
    }
};

/// Descriptor of a named, typed, optionally bounded configuration slot
#[derive(Debug, Clone)]
pub struct OptionDef {
    pub name:       String,
    pub value_type: ValueType,
    pub default:    OptionValue,
    pub help:       String,
    /// Inclusive lower bound for numeric options
    pub lower:      Option<f64>,
    /// Inclusive upper bound for numeric options
    pub upper:      Option<f64>,
    /// Allowed values for text options, any text when empty
    pub choices:    Vec<String>
}

impl OptionDef {
    pub fn new(
        name: &str,
        value_type: ValueType,
        default: impl Into<OptionValue>,
        help: &str
    ) -> Result<Self, FlowError> {
        if name == TYPE_KEY {
            return Err(FlowError::Configuration(format!("Option name '{}' is reserved", TYPE_KEY)));
        }

        let default = default.into();
        if !value_type.accepts(&default) {
            return Err(FlowError::Configuration(format!(
                "Invalid default for {}: expected={}, received={}",
                name,
                value_type,
                default.kind_name()
            )));
        }

        Ok(Self {
            name: name.to_string(),
            value_type,
            default,
            help: help.to_string(),
            lower: None,
            upper: None,
            choices: Vec::new()
        })
    }

    pub fn with_lower(mut self, lower: f64) -> Self {
        self.lower = Some(lower);
        self
    }

    pub fn with_upper(mut self, upper: f64) -> Self {
        self.upper = Some(upper);
        self
    }

    /// Restricts a text option to the given values, the default must be one of them
    pub fn with_choices(mut self, choices: &[&str]) -> Result<Self, FlowError> {
        self.choices = choices.iter().map(|c| c.to_string()).collect();
        self.check_choice(&self.default)
            .map_err(|reason| FlowError::Configuration(format!("Invalid default for {}: {}", self.name, reason)))?;
        Ok(self)
    }

    fn check_choice(&self, value: &OptionValue) -> Result<(), String> {
        match value.as_text() {
            Some(text) if !self.choices.is_empty() && !self.choices.iter().any(|c| c == text) => {
                Err(format!("'{}' is not one of {}", text, self.choices.join(", ")))
            }
            _ => Ok(())
        }
    }

    /// Checks numeric bounds, returning the reason when the value falls outside them
    pub fn check_range(&self, value: &OptionValue) -> Result<(), String> {
        let Some(number) = value.as_float().filter(|_| self.value_type.is_numeric()) else {
            return Ok(());
        };
        if (self.lower.is_some() || self.upper.is_some()) && !number.is_finite() {
            return Err(format!("Not a finite number: {}", value));
        }

        if let Some(lower) = self.lower
            && number < lower
        {
            return Err(format!("Below lower bound: {} < {}", value, lower));
        }
        if let Some(upper) = self.upper
            && number > upper
        {
            return Err(format!("Above upper bound: {} > {}", value, upper));
        }

        Ok(())
    }

    /// Type and range check applied to every value before it becomes effective
    pub fn check(&self, value: &OptionValue) -> Result<(), FlowError> {
        if !self.value_type.accepts(value) {
            return Err(FlowError::Configuration(format!(
                "Invalid config type for {}: expected={}, received={} ({})",
                self.name,
                self.value_type,
                value.kind_name(),
                value
            )));
        }

        self.check_range(value)
            .and_then(|()| self.check_choice(value))
            .map_err(|reason| FlowError::Configuration(format!("Invalid value for {}: {}", self.name, reason)))
    }

    /// Human-readable bounds, empty when unbounded
    pub fn bounds_description(&self) -> String {
        match (self.lower, self.upper) {
            (Some(lower), Some(upper)) => format!("[{}, {}]", lower, upper),
            (Some(lower), None) => format!(">= {}", lower),
            (None, Some(upper)) => format!("<= {}", upper),
            (None, None) if !self.choices.is_empty() => self.choices.join(" | "),
            (None, None) => String::new()
        }
    }
}

/// Variable store and codecs an option manager resolves bound variables against
#[derive(Clone)]
pub struct OptionScope {
    pub variables: Rc<Variables>,
    pub codecs:    Rc<CodecRegistry>
}

/// Holds the option descriptors of one configurable object plus its literal overrides and variable bindings
///
/// Setting a literal removes a binding. Binding a variable leaves an earlier literal in place as the fallback used
/// while the variable is undefined.
#[derive(Clone, Default)]
pub struct OptionManager {
    options:  Vec<OptionDef>,
    values:   HashMap<String, OptionValue>,
    bindings: HashMap<String, String>,
    scope:    Option<OptionScope>
}

impl OptionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an option, rejecting duplicates
    pub fn add(&mut self, option: OptionDef) -> Result<&mut Self, FlowError> {
        if self.has(&option.name) {
            return Err(FlowError::Configuration(format!("Option '{}' is already defined", option.name)));
        }
        self.options.push(option);
        Ok(self)
    }

    pub fn has(&self, name: &str) -> bool {
        self.options.iter().any(|o| o.name == name)
    }

    pub fn option(&self, name: &str) -> Option<&OptionDef> {
        self.options.iter().find(|o| o.name == name)
    }

    /// Option descriptors in insertion order
    pub fn options(&self) -> &[OptionDef] {
        &self.options
    }

    fn require(&self, name: &str) -> Result<&OptionDef, FlowError> {
        self.option(name).ok_or_else(|| FlowError::Configuration(format!("Unknown option: {}", name)))
    }

    /// Sets a literal value, or binds a variable when given a padded reference like `@{name}`
    pub fn set(&mut self, name: &str, value: impl Into<OptionValue>) -> Result<(), FlowError> {
        let value = value.into();
        if let OptionValue::Text(text) = &value
            && is_var(text)
        {
            return self.bind(name, unpad_var(text));
        }

        let option = self.require(name)?;
        option.check(&value)?;

        self.bindings.remove(name);
        self.values.insert(name.to_string(), value);
        Ok(())
    }

    /// Binds the option to the named variable
    pub fn bind(&mut self, name: &str, variable: &str) -> Result<(), FlowError> {
        self.require(name)?;
        validate_name("variable", variable)?;
        self.bindings.insert(name.to_string(), variable.to_string());
        Ok(())
    }

    /// Removes a binding, returning the variable name it pointed to
    pub fn unbind(&mut self, name: &str) -> Option<String> {
        self.bindings.remove(name)
    }

    /// The variable the option is bound to
    pub fn binding(&self, name: &str) -> Option<&str> {
        self.bindings.get(name).map(String::as_str)
    }

    pub fn has_binding(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// The literal override, if one was set
    pub fn literal(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    /// Resolves the effective value of an option
    pub fn get(&self, name: &str) -> Result<OptionValue, FlowError> {
        let option = self.require(name)?;

        if let Some(variable) = self.bindings.get(name)
            && let Some(scope) = &self.scope
            && let Some(text) = scope.variables.get(variable)?
        {
            let value = scope.codecs.read(&text, &option.value_type).map_err(|e| {
                FlowError::Configuration(format!(
                    "Failed to convert variable '{}' for option {}: {}",
                    variable,
                    name,
                    e.message()
                ))
            })?;
            option.check(&value)?;
            return Ok(self.attach_value(value));
        }

        let value = self.values.get(name).unwrap_or(&option.default).clone();
        Ok(self.attach_value(value))
    }

    /// Drops every literal override and binding
    pub fn reset(&mut self) {
        self.values.clear();
        self.bindings.clear();
    }

    /// Attaches the variable store used to resolve bindings
    pub fn attach(&mut self, scope: OptionScope) {
        self.scope = Some(scope);
    }

    pub fn scope(&self) -> Option<&OptionScope> {
        self.scope.as_ref()
    }

    fn attach_value(&self, value: OptionValue) -> OptionValue {
        let Some(scope) = &self.scope else {
            return value;
        };

        match value {
            OptionValue::Object(mut handler) => {
                handler.option_manager_mut().attach(scope.clone());
                OptionValue::Object(handler)
            }
            OptionValue::List(items) => OptionValue::List(items.into_iter().map(|v| self.attach_value(v)).collect()),
            other => other
        }
    }

    /// Variables bound anywhere in this manager and in nested objects, skipping options of the given kinds
    pub fn detect_vars(&self, skip: &[&str]) -> Vec<String> {
        let mut result = Vec::new();
        self.collect_vars(skip, &mut result);
        result
    }

    fn collect_vars(&self, skip: &[&str], result: &mut Vec<String>) {
        for option in &self.options {
            let skipped = skip.contains(&option.value_type.kind())
                || option.value_type.element_type().is_some_and(|element| skip.contains(&element.kind()));
            if skipped {
                continue;
            }

            if let Some(variable) = self.bindings.get(&option.name) {
                if !result.contains(variable) {
                    result.push(variable.clone());
                }
                continue;
            }

            match self.values.get(&option.name) {
                Some(OptionValue::Object(handler)) => handler.option_manager().collect_vars(skip, result),
                Some(OptionValue::List(items)) => {
                    for item in items {
                        if let OptionValue::Object(handler) = item {
                            handler.option_manager().collect_vars(skip, result);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    /// Whether both managers hold the same overrides and bindings
    pub fn same_configuration(&self, other: &OptionManager) -> bool {
        self.values == other.values && self.bindings == other.bindings
    }

    /// Encodes the options into a plain map, bound variables as their padded reference
    pub fn to_map(&self, codecs: &CodecRegistry, skip_default: bool) -> Result<Map<String, JsonValue>, FlowError> {
        let mut map = Map::new();

        for option in &self.options {
            if let Some(variable) = self.bindings.get(&option.name) {
                map.insert(option.name.clone(), JsonValue::String(pad_var(variable)));
                continue;
            }

            let value = self.values.get(&option.name).unwrap_or(&option.default);
            if skip_default && *value == option.default {
                continue;
            }
            map.insert(option.name.clone(), codecs.encode(value, &option.value_type)?);
        }

        Ok(map)
    }

    /// Applies a plain map, binding padded references and logging and skipping unknown keys
    pub fn from_map(
        &mut self,
        owner: &str,
        map: &Map<String, JsonValue>,
        codecs: &CodecRegistry
    ) -> Result<(), FlowError> {
        for (key, json) in map {
            let Some(value_type) = self.option(key).map(|o| o.value_type.clone()) else {
                event!(Level::WARN, event = store::UNKNOWN_OPTION, owner = %owner, option = %key);
                codecs.log(owner, &format!("Unknown option: {}/{}", owner, key));
                continue;
            };

            if let JsonValue::String(text) = json
                && is_var(text)
            {
                self.bind(key, unpad_var(text))?;
                continue;
            }

            let value = codecs.decode(json, &value_type)?;
            self.set(key, value)?;
        }

        Ok(())
    }
}

impl fmt::Debug for OptionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionManager")
            .field("options", &self.options.iter().map(|o| &o.name).collect::<Vec<_>>())
            .field("values", &self.values)
            .field("bindings", &self.bindings)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{codec::CodecRegistry, log::MemoryLogSink, store::Variables};

    fn create_test_manager() -> OptionManager {
        let mut options = OptionManager::new();
        options
            .add(OptionDef::new("factor", ValueType::Float, 1.0, "multiplier").unwrap().with_lower(0.0).with_upper(10.0))
            .unwrap()
            .add(OptionDef::new("label", ValueType::Text, "", "label").unwrap())
            .unwrap()
            .add(OptionDef::new("sizes", ValueType::list(ValueType::Int), OptionValue::List(vec![]), "sizes").unwrap())
            .unwrap();
        options
    }

    fn attach(options: &mut OptionManager) -> Rc<Variables> {
        let variables = Rc::new(Variables::new());
        options.attach(OptionScope { variables: variables.clone(), codecs: Rc::new(CodecRegistry::with_defaults()) });
        variables
    }

    #[test]
    fn test_reserved_name_rejected() {
        let result = OptionDef::new("class", ValueType::Text, "", "");
        assert!(matches!(result, Err(FlowError::Configuration(_))));
    }

    #[test]
    fn test_duplicate_option_rejected() {
        let mut options = create_test_manager();
        let result = options.add(OptionDef::new("label", ValueType::Text, "", "").unwrap());
        assert!(result.is_err());
    }

    #[test]
    fn test_get_precedence() {
        let mut options = create_test_manager();
        let variables = attach(&mut options);

        assert_eq!(options.get("factor").unwrap(), OptionValue::Float(1.0));

        options.set("factor", 2.5).unwrap();
        assert_eq!(options.get("factor").unwrap(), OptionValue::Float(2.5));

        options.set("factor", "@{f}").unwrap();
        assert_eq!(options.binding("factor"), Some("f"));
        // bound but undefined: falls back to the literal
        assert_eq!(options.get("factor").unwrap(), OptionValue::Float(2.5));

        variables.set("f", "4").unwrap();
        assert_eq!(options.get("factor").unwrap(), OptionValue::Float(4.0));

        variables.remove("f").unwrap();
        assert_eq!(options.get("factor").unwrap(), OptionValue::Float(2.5));
    }

    #[test]
    fn test_binding_without_literal_falls_back_to_default() {
        let mut options = create_test_manager();
        let variables = attach(&mut options);

        options.set("label", "@{who}").unwrap();
        variables.set("who", "me").unwrap();
        assert_eq!(options.get("label").unwrap(), OptionValue::Text("me".to_string()));

        variables.clear();
        assert_eq!(options.get("label").unwrap(), OptionValue::Text(String::new()));
    }

    #[test]
    fn test_literal_clears_binding() {
        let mut options = create_test_manager();
        options.set("label", "@{who}").unwrap();
        options.set("label", "fixed").unwrap();
        assert!(!options.has_binding("label"));
        assert!(options.detect_vars(&[]).is_empty());
    }

    #[test]
    fn test_type_and_bounds_rejected_at_assignment() {
        let mut options = create_test_manager();

        let err = options.set("factor", "abc").unwrap_err();
        assert!(err.message().starts_with("Invalid config type for factor"));

        let err = options.set("factor", 11.0).unwrap_err();
        assert_eq!(err.message(), "Invalid value for factor: Above upper bound: 11 > 10");

        let err = options.set("factor", -1.0).unwrap_err();
        assert_eq!(err.message(), "Invalid value for factor: Below lower bound: -1 < 0");

        // rejected values never replace the current one
        assert_eq!(options.get("factor").unwrap(), OptionValue::Float(1.0));
    }

    #[test]
    fn test_variable_value_checked_against_bounds() {
        let mut options = create_test_manager();
        let variables = attach(&mut options);

        options.set("factor", "@{f}").unwrap();
        variables.set("f", "42").unwrap();
        assert!(options.get("factor").is_err());
    }

    #[test]
    fn test_detect_vars_skips_kinds() {
        let mut options = create_test_manager();
        options.set("factor", "@{f}").unwrap();
        options.set("sizes", "@{s}").unwrap();

        assert_eq!(options.detect_vars(&[]), vec!["f".to_string(), "s".to_string()]);
        assert_eq!(options.detect_vars(&["int"]), vec!["f".to_string()]);
    }

    #[test]
    fn test_to_map_skips_defaults_but_keeps_bindings() {
        let codecs = CodecRegistry::with_defaults();
        let mut options = create_test_manager();
        options.set("label", "@{who}").unwrap();
        options.set("sizes", vec![OptionValue::Int(1), OptionValue::Int(2)]).unwrap();

        let map = options.to_map(&codecs, true).unwrap();
        assert!(!map.contains_key("factor"));
        assert_eq!(map["label"], JsonValue::String("@{who}".to_string()));
        assert_eq!(map["sizes"], serde_json::json!([1, 2]));

        let full = options.to_map(&codecs, false).unwrap();
        assert_eq!(full["factor"], serde_json::json!(1.0));
    }

    #[test]
    fn test_from_map_binds_and_skips_unknown() {
        let log = Rc::new(MemoryLogSink::new());
        let codecs = CodecRegistry::with_defaults().with_log_sink(log.clone());
        let mut options = create_test_manager();

        let map = serde_json::json!({"factor": "@{f}", "sizes": [1, "2", 3], "colour": "red"});
        options.from_map("Test", map.as_object().unwrap(), &codecs).unwrap();

        assert_eq!(options.binding("factor"), Some("f"));
        assert_eq!(
            options.get("sizes").unwrap(),
            OptionValue::List(vec![OptionValue::Int(1), OptionValue::Int(2), OptionValue::Int(3)])
        );
        assert!(log.contains("Unknown option: Test/colour"));
    }

    #[test]
    fn test_template_stays_literal() {
        let mut options = create_test_manager();
        options.set("label", "@{a}-@{b}").unwrap();
        assert!(!options.has_binding("label"));
        assert_eq!(options.get("label").unwrap(), OptionValue::Text("@{a}-@{b}".to_string()));

        let mut decoded = create_test_manager();
        let map = serde_json::json!({"label": "@{a}-@{b}"});
        decoded.from_map("Test", map.as_object().unwrap(), &CodecRegistry::with_defaults()).unwrap();
        assert!(!decoded.has_binding("label"));
        assert_eq!(decoded.get("label").unwrap(), OptionValue::Text("@{a}-@{b}".to_string()));
    }

    #[test]
    fn test_non_finite_rejected_when_bounded() {
        let mut options = create_test_manager();
        let variables = attach(&mut options);

        let err = options.set("factor", f64::NAN).unwrap_err();
        assert!(err.message().contains("Not a finite number"));

        options.set("factor", "@{f}").unwrap();
        variables.set("f", "NaN").unwrap();
        assert!(options.get("factor").is_err());
    }

    #[test]
    fn test_choices_checked_at_assignment() {
        let mut options = OptionManager::new();
        let mode = OptionDef::new("mode", ValueType::Text, "fast", "mode").unwrap();
        options.add(mode.with_choices(&["fast", "slow"]).unwrap()).unwrap();
        let variables = attach(&mut options);

        options.set("mode", "slow").unwrap();
        let err = options.set("mode", "medium").unwrap_err();
        assert_eq!(err.message(), "Invalid value for mode: 'medium' is not one of fast, slow");
        assert_eq!(options.option("mode").unwrap().bounds_description(), "fast | slow");

        options.set("mode", "@{m}").unwrap();
        variables.set("m", "medium").unwrap();
        assert!(options.get("mode").is_err());

        assert!(OptionDef::new("mode", ValueType::Text, "other", "mode").unwrap().with_choices(&["fast"]).is_err());
    }
}
