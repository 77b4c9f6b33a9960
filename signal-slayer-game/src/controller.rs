//! External-facing controller: turns intents and frame ticks into engine calls.
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;
use thiserror::Error;

use crate::catalog::{CatalogError, CatalogLoader, LineId, SignalCatalog, validate_line};
use crate::config::{ConfigError, GameConfig};
use crate::engine::{ProgressionEngine, StepEvent};
use crate::numbers::{duration_to_secs_f32, step_count, u32_to_f32};
use crate::row::RowError;
use crate::snapshot::RunSnapshot;
use crate::state::{Outcome, RunPhase, RunState};

/// Direction of a lane change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaneShift {
    Left,
    Right,
}

impl LaneShift {
    #[must_use]
    pub const fn step(self) -> isize {
        match self {
            Self::Left => -1,
            Self::Right => 1,
        }
    }
}

/// Input delivered by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    SelectLine { line: LineId },
    ShiftLane { direction: LaneShift },
    Restart,
    Tick { elapsed_ms: u32 },
}

/// Events produced by one call to [`GameController::tick`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Engine steps the elapsed time was split into.
    pub steps: u32,
    pub events: Vec<StepEvent>,
}

impl TickReport {
    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        self.events.iter().find_map(|event| match event {
            StepEvent::Completed { .. } => Some(Outcome::Completed),
            StepEvent::Failed { .. } => Some(Outcome::Failed),
            _ => None,
        })
    }

    #[must_use]
    pub fn cleared(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, StepEvent::Cleared { .. }))
            .count()
    }
}

/// Raised when a line cannot be selected. Nothing about the run changes.
#[derive(Debug, Error)]
pub enum SelectError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("could not lay out the first row: {0}")]
    Row(#[from] RowError),
}

/// Raised while building a controller.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to load signal catalog: {0}")]
    Load(Box<dyn std::error::Error + Send + Sync>),
}

/// Owns the run state and the engine; the only way to mutate a run.
#[derive(Debug, Clone)]
pub struct GameController<C: SignalCatalog> {
    catalog: C,
    engine: ProgressionEngine,
    state: RunState,
    pending: VecDeque<Intent>,
}

impl<C: SignalCatalog> GameController<C> {
    /// Create a controller awaiting line selection.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation.
    pub fn new(catalog: C, config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let state = RunState::new(config.start_lane());
        Ok(Self {
            catalog,
            engine: ProgressionEngine::new(config, seed),
            state,
            pending: VecDeque::new(),
        })
    }

    /// Create a controller from a platform catalog loader.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded or the configuration is invalid.
    pub fn from_loader<L>(loader: &L, config: GameConfig, seed: u64) -> Result<Self, SetupError>
    where
        L: CatalogLoader<Catalog = C>,
    {
        let catalog = loader
            .load_catalog()
            .map_err(|err| SetupError::Load(Box::new(err)))?;
        Ok(Self::new(catalog, config, seed)?)
    }

    #[must_use]
    pub const fn catalog(&self) -> &C {
        &self.catalog
    }

    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        self.engine.config()
    }

    /// Lines available for selection.
    #[must_use]
    pub fn lines(&self) -> Vec<LineId> {
        self.catalog.lines()
    }

    #[must_use]
    pub const fn state(&self) -> &RunState {
        &self.state
    }

    #[must_use]
    pub const fn phase(&self) -> RunPhase {
        self.state.phase()
    }

    #[must_use]
    pub const fn outcome(&self) -> Option<Outcome> {
        self.state.outcome()
    }

    #[must_use]
    pub const fn rng_draws(&self) -> u64 {
        self.engine.rng_draws()
    }

    /// Deterministically reseed row generation. Rows already in flight are kept.
    pub fn reseed(&mut self, seed: u64) {
        self.engine.reseed(seed);
    }

    /// Choose the line for the first run. Returns `Ok(false)` once a line is already chosen.
    ///
    /// # Errors
    ///
    /// Returns [`SelectError`] if the line is unknown or cannot fill its rows.
    pub fn select_line(&mut self, line: impl Into<LineId>) -> Result<bool, SelectError> {
        if self.phase() != RunPhase::AwaitingSelection {
            return Ok(false);
        }
        self.begin_run(line.into())?;
        Ok(true)
    }

    /// Start over on the current line. A no-op before a line is chosen.
    pub fn restart(&mut self) -> bool {
        let Some(line) = self.state.selected_line().cloned() else {
            return false;
        };
        log::info!("restarting on line `{line}`");
        let mut events = Vec::new();
        if let Err(err) = self
            .engine
            .start(&mut self.state, &self.catalog, line, &mut events)
        {
            log::warn!("restart could not lay out the first row: {err}");
        }
        true
    }

    /// Start over on a possibly different line. A no-op before a line is chosen.
    ///
    /// # Errors
    ///
    /// Returns [`SelectError`] if the new line is unusable; the current run is left untouched.
    pub fn restart_with_line(&mut self, line: impl Into<LineId>) -> Result<bool, SelectError> {
        if self.phase() == RunPhase::AwaitingSelection {
            return Ok(false);
        }
        self.begin_run(line.into())?;
        Ok(true)
    }

    fn begin_run(&mut self, line: LineId) -> Result<(), SelectError> {
        validate_line(&self.catalog, &line, self.config().lane_count)?;
        let mut events = Vec::new();
        self.engine
            .start(&mut self.state, &self.catalog, line, &mut events)?;
        Ok(())
    }

    /// Move the player one lane, clamped at the edges. Only accepted while playing.
    pub fn shift_lane(&mut self, direction: LaneShift) -> bool {
        if self.phase() != RunPhase::Playing {
            return false;
        }
        let lane_count = self.config().lane_count;
        self.state.shift_lane(direction.step(), lane_count)
    }

    /// Queue an intent to be applied at the start of the next tick.
    pub fn submit(&mut self, intent: Intent) {
        self.pending.push_back(intent);
    }

    #[must_use]
    pub fn pending_intents(&self) -> usize {
        self.pending.len()
    }

    /// Apply an intent immediately.
    ///
    /// # Errors
    ///
    /// Returns [`SelectError`] when a line selection is rejected.
    pub fn apply(&mut self, intent: Intent) -> Result<TickReport, SelectError> {
        match intent {
            Intent::SelectLine { line } => {
                self.select_line(line)?;
            }
            Intent::ShiftLane { direction } => {
                self.shift_lane(direction);
            }
            Intent::Restart => {
                self.restart();
            }
            Intent::Tick { elapsed_ms } => {
                return Ok(self.tick(Duration::from_millis(u64::from(elapsed_ms))));
            }
        }
        Ok(TickReport::default())
    }

    fn drain_pending(&mut self) {
        while let Some(intent) = self.pending.pop_front() {
            match intent {
                Intent::Tick { .. } => {
                    log::debug!("ignoring queued tick intent; ticks are driven directly");
                }
                other => {
                    if let Err(err) = self.apply(other) {
                        log::warn!("queued intent rejected: {err}");
                    }
                }
            }
        }
    }

    /// Advance the run by `elapsed` wall time.
    ///
    /// Queued intents are applied first. The elapsed time is split into
    /// engine steps no longer than the configured maximum so rows cannot
    /// jump past the train.
    pub fn tick(&mut self, elapsed: Duration) -> TickReport {
        self.drain_pending();
        let mut report = TickReport::default();
        if self.phase() != RunPhase::Playing {
            return report;
        }
        let steps = step_count(elapsed, self.config().max_step());
        if steps == 0 {
            return report;
        }
        let delta = self
            .config()
            .scroll_delta(duration_to_secs_f32(elapsed) / u32_to_f32(steps));
        for _ in 0..steps {
            self.engine
                .step(&mut self.state, &self.catalog, delta, &mut report.events);
            report.steps += 1;
            if self.state.is_over() {
                break;
            }
        }
        report
    }

    /// Immutable view of the run for rendering.
    #[must_use]
    pub fn snapshot(&self) -> RunSnapshot {
        let sequence_len = self
            .state
            .selected_line()
            .and_then(|line| self.catalog.sequence_len(line));
        RunSnapshot::capture(&self.state, self.config().lane_count, sequence_len)
    }
}
