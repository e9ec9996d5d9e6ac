//! Closed value model for option values and their declared types

use std::fmt;

use crate::{domain::identifier::is_valid_name, port::handler::OptionHandler};

/// Declared type of an option
///
/// Text-derived types (`File`, `Directory`, the identifier types) hold `OptionValue::Text`; the identifier types are
/// additionally checked against the identifier syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueType {
    Bool,
    Int,
    Float,
    Text,
    File,
    Directory,
    VariableName,
    StorageName,
    CallableReference,
    /// Homogeneous list of the element type
    List(Box<ValueType>),
    /// Nested configurable object of the given family
    Object(&'static str)
}

impl ValueType {
    /// List type with the given element type
    pub fn list(element: ValueType) -> Self {
        ValueType::List(Box::new(element))
    }

    /// Key of the codec handling this type
    pub fn tag(&self) -> &'static str {
        match self {
            ValueType::Bool => "bool",
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::Text => "text",
            ValueType::File => "file",
            ValueType::Directory => "directory",
            ValueType::VariableName => "variable_name",
            ValueType::StorageName => "storage_name",
            ValueType::CallableReference => "callable_reference",
            ValueType::List(_) => "list",
            ValueType::Object(_) => "object"
        }
    }

    /// The tag, or the family for object types
    pub fn kind(&self) -> &'static str {
        match self {
            ValueType::Object(family) => *family,
            other => other.tag()
        }
    }

    /// Element type of list types
    pub fn element_type(&self) -> Option<&ValueType> {
        match self {
            ValueType::List(element) => Some(element),
            _ => None
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ValueType::Int | ValueType::Float)
    }

    /// Whether values of this type are stored as text
    pub fn is_textual(&self) -> bool {
        matches!(
            self,
            ValueType::Text
                | ValueType::File
                | ValueType::Directory
                | ValueType::VariableName
                | ValueType::StorageName
                | ValueType::CallableReference
        )
    }

    /// Whether text values of this type must follow the identifier syntax
    pub fn is_identifier(&self) -> bool {
        matches!(self, ValueType::VariableName | ValueType::StorageName | ValueType::CallableReference)
    }

    /// Whether the value is acceptable for this type
    pub fn accepts(&self, value: &OptionValue) -> bool {
        match (self, value) {
            (ValueType::Bool, OptionValue::Bool(_)) => true,
            (ValueType::Int, OptionValue::Int(_)) => true,
            (ValueType::Float, OptionValue::Float(_)) => true,
            (t, OptionValue::Text(s)) if t.is_textual() => !t.is_identifier() || is_valid_name(s),
            (ValueType::List(element), OptionValue::List(items)) => items.iter().all(|item| element.accepts(item)),
            (ValueType::Object(family), OptionValue::Object(handler)) => handler.family() == *family,
            _ => false
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::List(element) => write!(f, "list<{}>", element),
            ValueType::Object(family) => write!(f, "object<{}>", family),
            other => write!(f, "{}", other.tag())
        }
    }
}

/// A concrete option value
#[derive(Debug, Clone)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<OptionValue>),
    Object(Box<dyn OptionHandler>)
}

impl OptionValue {
    /// Short name of the variant, used in type mismatch messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            OptionValue::Bool(_) => "bool",
            OptionValue::Int(_) => "int",
            OptionValue::Float(_) => "float",
            OptionValue::Text(_) => "text",
            OptionValue::List(_) => "list",
            OptionValue::Object(_) => "object"
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            _ => None
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            OptionValue::Int(i) => Some(*i),
            _ => None
        }
    }

    /// Numeric view of int and float values
    pub fn as_float(&self) -> Option<f64> {
        match self {
            OptionValue::Float(v) => Some(*v),
            OptionValue::Int(i) => Some(*i as f64),
            _ => None
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            OptionValue::Text(s) => Some(s),
            _ => None
        }
    }

    pub fn as_list(&self) -> Option<&[OptionValue]> {
        match self {
            OptionValue::List(items) => Some(items),
            _ => None
        }
    }

    pub fn as_object(&self) -> Option<&dyn OptionHandler> {
        match self {
            OptionValue::Object(handler) => Some(handler.as_ref()),
            _ => None
        }
    }

    pub fn into_object(self) -> Option<Box<dyn OptionHandler>> {
        match self {
            OptionValue::Object(handler) => Some(handler),
            _ => None
        }
    }
}

impl PartialEq for OptionValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (OptionValue::Bool(a), OptionValue::Bool(b)) => a == b,
            (OptionValue::Int(a), OptionValue::Int(b)) => a == b,
            (OptionValue::Float(a), OptionValue::Float(b)) => a == b,
            (OptionValue::Text(a), OptionValue::Text(b)) => a == b,
            (OptionValue::List(a), OptionValue::List(b)) => a == b,
            (OptionValue::Object(a), OptionValue::Object(b)) => {
                a.type_identifier() == b.type_identifier() && a.option_manager().same_configuration(b.option_manager())
            }
            _ => false
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{}", b),
            OptionValue::Int(i) => write!(f, "{}", i),
            OptionValue::Float(v) => write!(f, "{}", v),
            OptionValue::Text(s) => write!(f, "{}", s),
            OptionValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            OptionValue::Object(handler) => write!(f, "{}", handler.type_identifier())
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Int(value)
    }
}

impl From<i32> for OptionValue {
    fn from(value: i32) -> Self {
        OptionValue::Int(value as i64)
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        OptionValue::Float(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Text(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Text(value)
    }
}

impl From<Vec<OptionValue>> for OptionValue {
    fn from(value: Vec<OptionValue>) -> Self {
        OptionValue::List(value)
    }
}

impl From<Box<dyn OptionHandler>> for OptionValue {
    fn from(value: Box<dyn OptionHandler>) -> Self {
        OptionValue::Object(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_checks_variant_and_identifiers() {
        assert!(ValueType::Int.accepts(&OptionValue::Int(3)));
        assert!(!ValueType::Int.accepts(&OptionValue::Float(3.0)));
        assert!(ValueType::File.accepts(&"some file.txt".into()));
        assert!(ValueType::VariableName.accepts(&"count".into()));
        assert!(!ValueType::VariableName.accepts(&"not valid".into()));
    }

    #[test]
    fn test_list_acceptance_is_homogeneous() {
        let ints = ValueType::list(ValueType::Int);
        assert!(ints.accepts(&OptionValue::List(vec![1.into(), 2.into()])));
        assert!(!ints.accepts(&OptionValue::List(vec![1.into(), "2".into()])));
        assert_eq!(ints.to_string(), "list<int>");
        assert_eq!(ints.kind(), "list");
    }

    #[test]
    fn test_display_of_values() {
        let list = OptionValue::List(vec![1.into(), true.into(), "x".into()]);
        assert_eq!(list.to_string(), "[1, true, x]");
        assert_eq!(OptionValue::Int(3).as_float(), Some(3.0));
    }
}
