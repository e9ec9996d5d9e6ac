use std::{any::Any, fmt};

use crate::{domain::option::OptionManager, port::condition::BooleanCondition};

/// A configurable object that is not an actor, held as the value of an option
///
/// Nested objects serialize as `{class, options}` and take part in variable detection, so a variable bound inside
/// them triggers reconfiguration of the owning actor.
pub trait OptionHandler: fmt::Debug + Any {
    /// Identifier used by the object factory registry
    fn type_identifier(&self) -> &'static str;

    /// Family the object belongs to, matched against `ValueType::Object`
    fn family(&self) -> &'static str;

    fn option_manager(&self) -> &OptionManager;

    fn option_manager_mut(&mut self) -> &mut OptionManager;

    fn clone_box(&self) -> Box<dyn OptionHandler>;

    /// Capability query for members of the condition family
    fn as_condition(&self) -> Option<&dyn BooleanCondition> {
        None
    }
}

impl dyn OptionHandler {
    /// The concrete object, if it is a `T`
    pub fn downcast_ref<T: OptionHandler>(&self) -> Option<&T> {
        (self as &dyn Any).downcast_ref::<T>()
    }
}

impl Clone for Box<dyn OptionHandler> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
