//! Domain constants - reserved names and structured event names for internal monitoring and debugging

/// Variable holding the path a flow was loaded from
pub const FLOW_PATH: &str = "flow_path";

/// Variable holding the directory a flow was loaded from
pub const FLOW_DIR: &str = "flow_dir";

/// Key of the type discriminator in the nested-map form, never usable as an option name
pub const TYPE_KEY: &str = "class";

/// Key of the option map in the nested-map form
pub const OPTIONS_KEY: &str = "options";

/// Key under which a composite's children are stored in its option map
pub const ACTORS_KEY: &str = "actors";

/// Family tag of actor-shaped values, skipped when detecting variables
pub const ACTOR_FAMILY: &str = "actor";

/// Family tag of boolean conditions
pub const CONDITION_FAMILY: &str = "condition";

/// Default name of an unconfigured callable actor reference
pub const UNKNOWN_CALLABLE: &str = "unknown";

/// Actor lifecycle events
pub mod actor {
    pub const SETUP_COMPLETED: &str = "actor.setup_completed";
    pub const SETUP_FAILED: &str = "actor.setup_failed";
    pub const VARIABLES_DETECTED: &str = "actor.variables_detected";
    pub const VARIABLE_CHANGED: &str = "actor.variable_changed";
    pub const RECONFIGURED: &str = "actor.reconfigured";
    pub const EXECUTE_FAILED: &str = "actor.execute_failed";
    pub const EXECUTE_PANICKED: &str = "actor.execute_panicked";
    pub const STOPPED: &str = "actor.stopped";
    pub const WRAPPED_UP: &str = "actor.wrapped_up";
    pub const CLEANED_UP: &str = "actor.cleaned_up";
}

/// Director events
pub mod director {
    pub const EXECUTION_STARTED: &str = "director.execution_started";
    pub const EXECUTION_HALTED: &str = "director.execution_halted";
    pub const CHILD_FAILED: &str = "director.child_failed";
    pub const CHILD_FAILURE_IGNORED: &str = "director.child_failure_ignored";
}

/// Callable actor resolution events
pub mod callable {
    pub const RESOLVED: &str = "callable.resolved";
    pub const NOT_FOUND: &str = "callable.not_found";
}

/// Variable store and storage events
pub mod store {
    pub const EXPANSION_INCOMPLETE: &str = "store.expansion_incomplete";
    pub const UNKNOWN_OPTION: &str = "store.unknown_option";
}

/// Engine run events
pub mod engine {
    pub const RUN_STARTED: &str = "engine.run_started";
    pub const CYCLE_COMPLETED: &str = "engine.cycle_completed";
    pub const RUN_COMPLETED: &str = "engine.run_completed";
    pub const RUN_FAILED: &str = "engine.run_failed";
    pub const RUN_STOPPED: &str = "engine.run_stopped";
}

/// Log sink events
pub mod log {
    pub const ACTOR_MESSAGE: &str = "log.actor_message";
}

/// Options every actor carries
pub mod options {
    pub const DEBUG: &str = "debug";
    pub const SKIP: &str = "skip";
    pub const ANNOTATION: &str = "annotation";
    pub const NAME: &str = "name";
    pub const STOP_FLOW_ON_ERROR: &str = "stop_flow_on_error";
}
