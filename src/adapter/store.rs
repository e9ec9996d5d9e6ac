//! Change-notifying key/value stores for variables and storage
//!
//! Listeners are notified synchronously after the entry map has been updated and released, so a listener may read
//! the store it is being notified by.

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use tracing::{Level, event};

use crate::{
    domain::{
        constant::store,
        error::FlowError,
        identifier::{VAR_END, VAR_START, validate_name}
    },
    port::{
        actor::Data,
        log::LogSink,
        store::{StoreEvent, StoreEventType, StoreListener}
    }
};

/// Key/value store over validated identifiers that notifies listeners of every change
pub struct KeyValueStore<V> {
    kind:      &'static str,
    entries:   RefCell<HashMap<String, V>>,
    listeners: RefCell<Vec<Rc<dyn StoreListener>>>
}

/// Named string values options can be bound to
pub type Variables = KeyValueStore<String>;

/// Runtime artifacts exchanged between actors
pub type Storage = KeyValueStore<Data>;

impl<V: Clone> KeyValueStore<V> {
    /// Creates an empty store, `kind` names it in error messages
    pub fn with_kind(kind: &'static str) -> Self {
        Self { kind, entries: RefCell::new(HashMap::new()), listeners: RefCell::new(Vec::new()) }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Registers a listener, ignoring one that is already registered
    pub fn add_listener(&self, listener: Rc<dyn StoreListener>) {
        let mut listeners = self.listeners.borrow_mut();
        if !listeners.iter().any(|l| Rc::ptr_eq(l, &listener)) {
            listeners.push(listener);
        }
    }

    pub fn remove_listener(&self, listener: &Rc<dyn StoreListener>) {
        self.listeners.borrow_mut().retain(|l| !Rc::ptr_eq(l, listener));
    }

    pub fn has_listener(&self, listener: &Rc<dyn StoreListener>) -> bool {
        self.listeners.borrow().iter().any(|l| Rc::ptr_eq(l, listener))
    }

    pub fn clear_listeners(&self) {
        self.listeners.borrow_mut().clear();
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    fn notify(&self, event_type: StoreEventType, key: Option<&str>) {
        let event = StoreEvent::new(event_type, key);
        let listeners = self.listeners.borrow().clone();
        for listener in listeners {
            listener.store_changed(&event);
        }
    }

    pub fn has(&self, key: &str) -> Result<bool, FlowError> {
        validate_name(self.kind, key)?;
        Ok(self.entries.borrow().contains_key(key))
    }

    pub fn get(&self, key: &str) -> Result<Option<V>, FlowError> {
        validate_name(self.kind, key)?;
        Ok(self.entries.borrow().get(key).cloned())
    }

    /// Stores the value, emitting `added` for a new key and `updated` otherwise
    pub fn set(&self, key: &str, value: impl Into<V>) -> Result<(), FlowError> {
        validate_name(self.kind, key)?;
        let previous = self.entries.borrow_mut().insert(key.to_string(), value.into());
        let event_type = if previous.is_some() { StoreEventType::Updated } else { StoreEventType::Added };
        self.notify(event_type, Some(key));
        Ok(())
    }

    /// Removes the key, emitting `deleted` only if it was present
    pub fn remove(&self, key: &str) -> Result<(), FlowError> {
        validate_name(self.kind, key)?;
        let previous = self.entries.borrow_mut().remove(key);
        if previous.is_some() {
            self.notify(StoreEventType::Deleted, Some(key));
        }
        Ok(())
    }

    /// Removes every entry and always emits `cleared`
    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
        self.notify(StoreEventType::Cleared, None);
    }

    /// Sorted keys
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.borrow().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Sets every entry of `other` in key order, one event per key
    pub fn merge(&self, other: &KeyValueStore<V>) -> Result<(), FlowError> {
        let mut entries: Vec<(String, V)> =
            other.entries.borrow().iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        for (key, value) in entries {
            self.set(&key, value)?;
        }
        Ok(())
    }
}

impl Variables {
    pub fn new() -> Self {
        Self::with_kind("variable")
    }

    /// Replaces `@{name}` references with variable values
    ///
    /// Undefined variables expand to an empty string and are reported through the log sink. The number of passes is
    /// bounded by the number of references in the input.
    pub fn expand(&self, text: &str, log: &dyn LogSink) -> String {
        let references = text.matches(VAR_START).count();
        let mut result = text.to_string();

        for _ in 0..references {
            let (expanded, missing) = self.expand_once(&result);
            for name in missing {
                event!(Level::DEBUG, event = store::EXPANSION_INCOMPLETE, variable = %name, text = %text);
                log.log(self.kind, &format!("Variable '{}' is not defined, could not fully expand: {}", name, text));
            }

            let changed = expanded != result;
            result = expanded;
            if !changed || !result.contains(VAR_START) {
                break;
            }
        }

        result
    }

    fn expand_once(&self, text: &str) -> (String, Vec<String>) {
        let entries = self.entries.borrow();
        let mut output = String::with_capacity(text.len());
        let mut missing = Vec::new();
        let mut rest = text;

        while let Some(start) = rest.find(VAR_START) {
            let after = &rest[start + VAR_START.len()..];
            let Some(end) = after.find(VAR_END) else {
                break;
            };

            let name = &after[..end];
            output.push_str(&rest[..start]);
            match entries.get(name) {
                Some(value) => output.push_str(value),
                None => missing.push(name.to_string())
            }
            rest = &after[end + VAR_END.len()..];
        }
        output.push_str(rest);

        (output, missing)
    }
}

impl Default for Variables {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage {
    pub fn new() -> Self {
        Self::with_kind("storage")
    }
}

impl Default for Storage {
    fn default() -> Self {
        Self::new()
    }
}
