use chrono::Utc;
use tracing::{Level, event};
use uuid::Uuid;

use crate::{
    actor::node::ActorRef,
    config::settings::EngineSettings,
    domain::{
        constant::{engine, options},
        engine::RunSummary,
        error::FlowError
    },
    port::engine::Engine
};

pub struct EngineFactory;

impl EngineFactory {
    /// Create the engine for the given settings
    pub fn init(settings: EngineSettings) -> Box<dyn Engine> {
        Box::new(SequentialEngine::new(settings))
    }
}

/// Single-threaded engine executing the root depth-first, one cycle after the other
pub struct SequentialEngine {
    settings: EngineSettings
}

impl SequentialEngine {
    pub fn new(settings: EngineSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    fn prepare(&self, root: &ActorRef) -> Result<(), FlowError> {
        root.environment().apply_settings(&self.settings)?;
        if self.settings.debug {
            root.set_option(options::DEBUG, true)?;
        }
        Ok(())
    }

    fn execute_cycles(&self, root: &ActorRef) -> Result<u32, FlowError> {
        let mut completed = 0;
        for cycle in 0..self.settings.cycles {
            if root.is_stopped() {
                event!(Level::INFO, event = engine::RUN_STOPPED, actor = %root.full_name(), cycle = cycle);
                break;
            }
            root.execute()?;
            completed += 1;
            event!(Level::DEBUG, event = engine::CYCLE_COMPLETED, actor = %root.full_name(), cycle = cycle);
        }
        Ok(completed)
    }
}

impl Engine for SequentialEngine {
    fn run(&self, root: &ActorRef) -> Result<RunSummary, FlowError> {
        let run_id = Uuid::new_v4().to_string();
        let started_at = Utc::now();
        event!(Level::INFO, event = engine::RUN_STARTED, run_id = %run_id, actor = %root.full_name());

        let outcome = self.prepare(root).and_then(|()| root.setup()).and_then(|()| self.execute_cycles(root));
        let stopped = root.is_stopped();
        root.wrap_up();
        root.clean_up();

        match outcome {
            Ok(cycles_completed) => {
                event!(
                    Level::INFO,
                    event = engine::RUN_COMPLETED,
                    run_id = %run_id,
                    cycles = cycles_completed,
                    stopped = stopped
                );
                Ok(RunSummary { run_id, started_at, finished_at: Utc::now(), cycles_completed, stopped })
            }
            Err(e) => {
                event!(Level::ERROR, event = engine::RUN_FAILED, run_id = %run_id, error = %e);
                Err(e)
            }
        }
    }

    fn engine_name(&self) -> &'static str {
        "sequential"
    }

    fn engine_version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}
