use crate::{
    actor::node::ActorRef,
    domain::{engine::RunSummary, error::FlowError}
};

/// Core engine trait for running actor trees
///
/// An engine owns the full lifecycle of one run: it prepares the root, sets it up, executes it and always finishes
/// with wrap-up and clean-up, whatever happened before.
pub trait Engine {
    /// Runs the tree below `root` once per configured cycle
    fn run(&self, root: &ActorRef) -> Result<RunSummary, FlowError>;

    /// Get the engine name for identification
    fn engine_name(&self) -> &'static str;

    /// Get the engine version
    fn engine_version(&self) -> &'static str;
}
