use std::{path::Path, rc::Rc};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    adapter::{
        codec::CodecRegistry,
        log::TracingLogSink,
        store::{Storage, Variables}
    },
    config::settings::EngineSettings,
    domain::{
        constant::{FLOW_DIR, FLOW_PATH},
        error::FlowError,
        option::OptionScope
    },
    port::log::LogSink
};

/// Shared services an actor subtree runs against
///
/// Children inherit their parent's environment when they are assigned, except below a local-scope composite, which
/// keeps its own stores.
#[derive(Clone)]
pub struct Environment {
    pub variables: Rc<Variables>,
    pub storage:   Rc<Storage>,
    pub codecs:    Rc<CodecRegistry>,
    pub log:       Rc<dyn LogSink>
}

impl Environment {
    /// Environment with empty stores
    pub fn new(codecs: Rc<CodecRegistry>, log: Rc<dyn LogSink>) -> Self {
        Self { variables: Rc::new(Variables::new()), storage: Rc::new(Storage::new()), codecs, log }
    }

    /// Same codecs and log sink, fresh stores
    pub fn with_fresh_stores(&self) -> Self {
        Self::new(self.codecs.clone(), self.log.clone())
    }

    /// Environment seeded from engine settings
    pub fn from_settings(
        settings: &EngineSettings,
        codecs: Rc<CodecRegistry>,
        log: Rc<dyn LogSink>
    ) -> Result<Self, FlowError> {
        let environment = Self::new(codecs, log);
        environment.apply_settings(settings)?;
        Ok(environment)
    }

    /// Seeds the variable store with the settings' variables and flow location
    pub fn apply_settings(&self, settings: &EngineSettings) -> Result<(), FlowError> {
        for (name, value) in &settings.variables {
            self.variables.set(name, value.as_str())?;
        }
        if let Some(path) = &settings.flow_path {
            add_flow_variables(&self.variables, path)?;
        }
        Ok(())
    }

    pub fn option_scope(&self) -> OptionScope {
        OptionScope { variables: self.variables.clone(), codecs: self.codecs.clone() }
    }

    /// Whether both environments share the same variable store
    pub fn shares_variables(&self, other: &Environment) -> bool {
        Rc::ptr_eq(&self.variables, &other.variables)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(Rc::new(CodecRegistry::with_defaults()), Rc::new(TracingLogSink))
    }
}

/// Outcome of one engine run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub run_id:           String,
    pub started_at:       DateTime<Utc>,
    pub finished_at:      DateTime<Utc>,
    pub cycles_completed: u32,
    /// Whether the run ended because the root was stopped
    pub stopped:          bool
}

/// Sets the flow path and the directory containing it
pub fn add_flow_variables(variables: &Variables, path: &Path) -> Result<(), FlowError> {
    variables.set(FLOW_PATH, path.display().to_string())?;
    let directory = path.parent().map(|p| p.display().to_string()).unwrap_or_default();
    variables.set(FLOW_DIR, directory)?;
    Ok(())
}
