use crate::{domain::error::FlowError, port::actor::Data};

/// A condition evaluated against a data token
pub trait BooleanCondition {
    /// Validates the configuration before any data is evaluated
    fn check(&self) -> Result<(), FlowError> {
        Ok(())
    }

    fn evaluate(&self, data: &Data) -> Result<bool, FlowError>;
}
