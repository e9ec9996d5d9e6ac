//! Per-type codecs converting option values to and from plain maps and variable strings
//!
//! The registry is populated once and then only read. Nested configurable objects are encoded as
//! `{"class": <type identifier>, "options": {...}}`.

use std::{collections::HashMap, rc::Rc};

use serde_json::{Map, Number, Value as JsonValue};

use crate::{
    adapter::{condition::Comparison, log::TracingLogSink},
    domain::{
        constant::{OPTIONS_KEY, TYPE_KEY},
        error::FlowError,
        value::{OptionValue, ValueType}
    },
    port::{handler::OptionHandler, log::LogSink}
};

/// Encoder/decoder for the values of one declared type
pub trait ValueCodec {
    /// Value to plain-map form
    fn encode(&self, value: &OptionValue, value_type: &ValueType, codecs: &CodecRegistry)
    -> Result<JsonValue, FlowError>;

    /// Plain-map form to value
    fn decode(&self, json: &JsonValue, value_type: &ValueType, codecs: &CodecRegistry)
    -> Result<OptionValue, FlowError>;

    /// String reader used for values coming from variables
    fn read(&self, text: &str, value_type: &ValueType, codecs: &CodecRegistry) -> Result<OptionValue, FlowError>;

    /// String writer, the inverse of `read`
    fn write(&self, value: &OptionValue, value_type: &ValueType, codecs: &CodecRegistry) -> Result<String, FlowError> {
        match self.encode(value, value_type, codecs)? {
            JsonValue::String(text) => Ok(text),
            other => Ok(other.to_string())
        }
    }
}

/// Zero-argument constructor of a nested configurable object
pub type ObjectFactory = fn() -> Result<Box<dyn OptionHandler>, FlowError>;

/// Registry of value codecs keyed by type tag and of nested object factories keyed by type identifier
pub struct CodecRegistry {
    codecs:  HashMap<&'static str, Box<dyn ValueCodec>>,
    objects: HashMap<String, ObjectFactory>,
    log:     Rc<dyn LogSink>
}

impl CodecRegistry {
    /// Empty registry logging through `tracing`
    pub fn new() -> Self {
        Self { codecs: HashMap::new(), objects: HashMap::new(), log: Rc::new(TracingLogSink) }
    }

    /// Registry with codecs for every built-in value type and the built-in conditions
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_codec("bool", Box::new(BoolCodec));
        registry.register_codec("int", Box::new(IntCodec));
        registry.register_codec("float", Box::new(FloatCodec));
        for tag in ["text", "file", "directory", "variable_name", "storage_name", "callable_reference"] {
            registry.register_codec(tag, Box::new(TextCodec));
        }
        registry.register_codec("list", Box::new(ListCodec));
        registry.register_codec("object", Box::new(ObjectCodec));
        registry.register_object(Comparison::TYPE_IDENTIFIER, || Ok(Box::new(Comparison::new()?)));
        registry
    }

    /// Replaces the sink unknown option keys are reported to
    pub fn with_log_sink(mut self, log: Rc<dyn LogSink>) -> Self {
        self.log = log;
        self
    }

    pub fn register_codec(&mut self, tag: &'static str, codec: Box<dyn ValueCodec>) -> &mut Self {
        self.codecs.insert(tag, codec);
        self
    }

    pub fn register_object(&mut self, type_identifier: &str, factory: ObjectFactory) -> &mut Self {
        self.objects.insert(type_identifier.to_string(), factory);
        self
    }

    /// Sorted identifiers of the registered object types
    pub fn object_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.objects.keys().cloned().collect();
        types.sort();
        types
    }

    /// Creates a nested object with default options
    pub fn create_object(&self, type_identifier: &str) -> Result<Box<dyn OptionHandler>, FlowError> {
        let factory = self
            .objects
            .get(type_identifier)
            .ok_or_else(|| FlowError::Configuration(format!("Unknown object type: {}", type_identifier)))?;
        factory()
    }

    fn codec(&self, value_type: &ValueType) -> Result<&dyn ValueCodec, FlowError> {
        self.codecs
            .get(value_type.tag())
            .map(|codec| codec.as_ref())
            .ok_or_else(|| FlowError::Serialization(format!("No codec registered for type {}", value_type)))
    }

    pub fn encode(&self, value: &OptionValue, value_type: &ValueType) -> Result<JsonValue, FlowError> {
        self.codec(value_type)?.encode(value, value_type, self)
    }

    pub fn decode(&self, json: &JsonValue, value_type: &ValueType) -> Result<OptionValue, FlowError> {
        self.codec(value_type)?.decode(json, value_type, self)
    }

    pub fn read(&self, text: &str, value_type: &ValueType) -> Result<OptionValue, FlowError> {
        self.codec(value_type)?.read(text, value_type, self)
    }

    pub fn write(&self, value: &OptionValue, value_type: &ValueType) -> Result<String, FlowError> {
        self.codec(value_type)?.write(value, value_type, self)
    }

    pub fn log(&self, prefix: &str, message: &str) {
        self.log.log(prefix, message);
    }

    pub fn log_sink(&self) -> Rc<dyn LogSink> {
        self.log.clone()
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn cannot_encode(value: &OptionValue, value_type: &ValueType) -> FlowError {
    FlowError::Serialization(format!("Cannot encode {} value as {}", value.kind_name(), value_type))
}

fn cannot_decode(json: &JsonValue, value_type: &ValueType) -> FlowError {
    FlowError::Serialization(format!("Cannot decode {} from {}", value_type, json))
}

fn cannot_read(text: &str, value_type: &ValueType) -> FlowError {
    FlowError::Serialization(format!("Cannot read {} from '{}'", value_type, text))
}

struct BoolCodec;

impl ValueCodec for BoolCodec {
    fn encode(&self, value: &OptionValue, value_type: &ValueType, _: &CodecRegistry) -> Result<JsonValue, FlowError> {
        value.as_bool().map(JsonValue::Bool).ok_or_else(|| cannot_encode(value, value_type))
    }

    fn decode(&self, json: &JsonValue, value_type: &ValueType, codecs: &CodecRegistry) -> Result<OptionValue, FlowError> {
        match json {
            JsonValue::Bool(b) => Ok(OptionValue::Bool(*b)),
            JsonValue::String(text) => self.read(text, value_type, codecs),
            _ => Err(cannot_decode(json, value_type))
        }
    }

    fn read(&self, text: &str, value_type: &ValueType, _: &CodecRegistry) -> Result<OptionValue, FlowError> {
        match text.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(OptionValue::Bool(true)),
            "false" | "no" | "off" | "0" => Ok(OptionValue::Bool(false)),
            _ => Err(cannot_read(text, value_type))
        }
    }
}

struct IntCodec;

impl ValueCodec for IntCodec {
    fn encode(&self, value: &OptionValue, value_type: &ValueType, _: &CodecRegistry) -> Result<JsonValue, FlowError> {
        value.as_int().map(JsonValue::from).ok_or_else(|| cannot_encode(value, value_type))
    }

    fn decode(&self, json: &JsonValue, value_type: &ValueType, codecs: &CodecRegistry) -> Result<OptionValue, FlowError> {
        match json {
            JsonValue::Number(number) => {
                number.as_i64().map(OptionValue::Int).ok_or_else(|| cannot_decode(json, value_type))
            }
            JsonValue::String(text) => self.read(text, value_type, codecs),
            _ => Err(cannot_decode(json, value_type))
        }
    }

    fn read(&self, text: &str, value_type: &ValueType, _: &CodecRegistry) -> Result<OptionValue, FlowError> {
        text.trim().parse::<i64>().map(OptionValue::Int).map_err(|_| cannot_read(text, value_type))
    }
}

struct FloatCodec;

impl ValueCodec for FloatCodec {
    fn encode(&self, value: &OptionValue, value_type: &ValueType, _: &CodecRegistry) -> Result<JsonValue, FlowError> {
        match value {
            OptionValue::Float(v) => {
                Number::from_f64(*v).map(JsonValue::Number).ok_or_else(|| cannot_encode(value, value_type))
            }
            _ => Err(cannot_encode(value, value_type))
        }
    }

    fn decode(&self, json: &JsonValue, value_type: &ValueType, codecs: &CodecRegistry) -> Result<OptionValue, FlowError> {
        match json {
            JsonValue::Number(number) => {
                number.as_f64().map(OptionValue::Float).ok_or_else(|| cannot_decode(json, value_type))
            }
            JsonValue::String(text) => self.read(text, value_type, codecs),
            _ => Err(cannot_decode(json, value_type))
        }
    }

    fn read(&self, text: &str, value_type: &ValueType, _: &CodecRegistry) -> Result<OptionValue, FlowError> {
        text.trim().parse::<f64>().map(OptionValue::Float).map_err(|_| cannot_read(text, value_type))
    }
}

/// Plain text and every text-derived type
struct TextCodec;

impl ValueCodec for TextCodec {
    fn encode(&self, value: &OptionValue, value_type: &ValueType, _: &CodecRegistry) -> Result<JsonValue, FlowError> {
        value.as_text().map(|text| JsonValue::String(text.to_string())).ok_or_else(|| cannot_encode(value, value_type))
    }

    fn decode(&self, json: &JsonValue, value_type: &ValueType, _: &CodecRegistry) -> Result<OptionValue, FlowError> {
        match json {
            JsonValue::String(text) => Ok(OptionValue::Text(text.clone())),
            JsonValue::Number(number) => Ok(OptionValue::Text(number.to_string())),
            JsonValue::Bool(b) => Ok(OptionValue::Text(b.to_string())),
            _ => Err(cannot_decode(json, value_type))
        }
    }

    fn read(&self, text: &str, _: &ValueType, _: &CodecRegistry) -> Result<OptionValue, FlowError> {
        Ok(OptionValue::Text(text.to_string()))
    }
}

/// Homogeneous lists, elements handled by the codec of the element type
struct ListCodec;

impl ListCodec {
    fn element_type(value_type: &ValueType) -> Result<&ValueType, FlowError> {
        value_type
            .element_type()
            .ok_or_else(|| FlowError::Serialization(format!("Type {} has no element type", value_type)))
    }
}

impl ValueCodec for ListCodec {
    fn encode(
        &self,
        value: &OptionValue,
        value_type: &ValueType,
        codecs: &CodecRegistry
    ) -> Result<JsonValue, FlowError> {
        let element = Self::element_type(value_type)?;
        let items = value.as_list().ok_or_else(|| cannot_encode(value, value_type))?;
        let encoded = items.iter().map(|item| codecs.encode(item, element)).collect::<Result<Vec<_>, _>>()?;
        Ok(JsonValue::Array(encoded))
    }

    fn decode(
        &self,
        json: &JsonValue,
        value_type: &ValueType,
        codecs: &CodecRegistry
    ) -> Result<OptionValue, FlowError> {
        let element = Self::element_type(value_type)?;
        match json {
            JsonValue::Array(items) => {
                let decoded = items.iter().map(|item| codecs.decode(item, element)).collect::<Result<Vec<_>, _>>()?;
                Ok(OptionValue::List(decoded))
            }
            JsonValue::String(text) => self.read(text, value_type, codecs),
            _ => Err(cannot_decode(json, value_type))
        }
    }

    fn read(&self, text: &str, value_type: &ValueType, codecs: &CodecRegistry) -> Result<OptionValue, FlowError> {
        let json: JsonValue = serde_json::from_str(text).map_err(|_| cannot_read(text, value_type))?;
        if !json.is_array() {
            return Err(cannot_read(text, value_type));
        }
        self.decode(&json, value_type, codecs)
    }
}

/// Nested configurable objects
struct ObjectCodec;

impl ValueCodec for ObjectCodec {
    fn encode(
        &self,
        value: &OptionValue,
        value_type: &ValueType,
        codecs: &CodecRegistry
    ) -> Result<JsonValue, FlowError> {
        let handler = value.as_object().ok_or_else(|| cannot_encode(value, value_type))?;

        let mut map = Map::new();
        map.insert(TYPE_KEY.to_string(), JsonValue::String(handler.type_identifier().to_string()));
        let options = handler.option_manager().to_map(codecs, true)?;
        if !options.is_empty() {
            map.insert(OPTIONS_KEY.to_string(), JsonValue::Object(options));
        }
        Ok(JsonValue::Object(map))
    }

    fn decode(
        &self,
        json: &JsonValue,
        value_type: &ValueType,
        codecs: &CodecRegistry
    ) -> Result<OptionValue, FlowError> {
        let map = match json {
            JsonValue::Object(map) => map,
            JsonValue::String(text) => return self.read(text, value_type, codecs),
            _ => return Err(cannot_decode(json, value_type))
        };

        let type_identifier = map
            .get(TYPE_KEY)
            .and_then(JsonValue::as_str)
            .ok_or_else(|| FlowError::Serialization(format!("Missing '{}' in {}", TYPE_KEY, json)))?;

        let mut handler = codecs.create_object(type_identifier)?;
        if let ValueType::Object(family) = value_type
            && handler.family() != *family
        {
            return Err(FlowError::Configuration(format!(
                "Object type {} is not a {} (family {})",
                type_identifier,
                family,
                handler.family()
            )));
        }

        if let Some(JsonValue::Object(options)) = map.get(OPTIONS_KEY) {
            handler.option_manager_mut().from_map(type_identifier, options, codecs)?;
        }
        Ok(OptionValue::Object(handler))
    }

    fn read(&self, text: &str, value_type: &ValueType, codecs: &CodecRegistry) -> Result<OptionValue, FlowError> {
        let json: JsonValue = serde_json::from_str(text).map_err(|_| cannot_read(text, value_type))?;
        self.decode(&json, value_type, codecs)
    }
}
