use std::io::Write;

use pilesim_controllers::{metrics, Engine, PauseReason, Stage, StageController, Transition};
use pilesim_viz::FieldSource;
use tracing::{info, warn};

use crate::{IoResult, TelemetryExporter};

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSummary {
    pub steps: u64,
    pub rows: usize,
    pub stage: Stage,
    /// Set when the insertion finished; `None` when the step limit hit first.
    pub pause: Option<PauseReason>,
}

/// Drives engine, exporter and controller in lockstep: advance, export on the interval, then
/// let the controller act on the fresh state.
pub struct Session<E, W: Write> {
    engine: E,
    controller: StageController,
    exporter: TelemetryExporter<W>,
    export_interval: u64,
    max_steps: Option<u64>,
}

impl<E, W> Session<E, W>
where
    E: Engine + FieldSource,
    W: Write,
{
    pub fn new(engine: E, controller: StageController, exporter: TelemetryExporter<W>, export_interval: u64) -> Self {
        Self { engine, controller, exporter, export_interval: export_interval.max(1), max_steps: None }
    }

    pub fn with_max_steps(mut self, n: Option<u64>) -> Self { self.max_steps = n; self }

    pub fn engine(&self) -> &E { &self.engine }
    pub fn controller(&self) -> &StageController { &self.controller }
    pub fn exporter(&self) -> &TelemetryExporter<W> { &self.exporter }

    /// Step until the controller pauses the engine or the step limit is reached. The first
    /// metric, controller or write error ends the run.
    pub fn run(&mut self) -> IoResult<SessionSummary> {
        let mut pause = None;
        while !self.engine.is_paused() {
            if self.max_steps.is_some_and(|n| self.engine.iter() >= n) {
                warn!(steps = self.engine.iter(), stage = %self.controller.stage(), "step limit reached");
                break;
            }
            let stats = self.engine.advance();
            let step = stats.iter;

            if step % self.export_interval == 0 {
                let m = metrics::sample(&self.engine, self.controller.pile())?;
                self.exporter.export(step, self.controller.stage(), &m, &self.engine)?;
            }

            if let Transition::Paused(reason) = self.controller.check(&mut self.engine)? {
                pause = Some(reason);
            }
        }

        let summary = SessionSummary {
            steps: self.engine.iter(),
            rows: self.exporter.rows(),
            stage: self.controller.stage(),
            pause,
        };
        info!(steps = summary.steps, rows = summary.rows, stage = %summary.stage, "run finished");
        Ok(summary)
    }
}
