use crate::{actor::node::ActorRef, domain::error::FlowError};

/// Execution strategy a composite delegates the control flow of its children to
///
/// A director is created by every setup of its owner, receives the children per `execute` call and drops the owner
/// reference in `clean_up`. Stopping a director only flips its own flag; the owner stops the children itself.
pub trait Director {
    fn execute(&self, actors: &[ActorRef]) -> Result<(), FlowError>;

    fn stop_execution(&self);

    fn is_stopped(&self) -> bool;

    fn wrap_up(&self) {}

    /// Releases the owner
    fn clean_up(&self);

    fn owner(&self) -> Option<ActorRef>;
}
