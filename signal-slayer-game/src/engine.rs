//! Per-step round progression: scroll, cull, spawn, and resolve arrivals at the train.
use serde::{Deserialize, Serialize};

use crate::catalog::{LineId, SignalCatalog};
use crate::config::{GameConfig, SequenceMode};
use crate::rng::RowRng;
use crate::row::{RowError, RowGenerator};
use crate::state::{Outcome, RunPhase, RunState};

/// Something observable that happened during an engine step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepEvent {
    /// A row entered the board for sequence position `index`.
    RowSpawned { index: usize, correct_lane: usize },
    /// An unclaimed row scrolled off the far edge.
    RowCulled,
    /// The player met the correct signal.
    Cleared {
        signal: String,
        lane: usize,
        score: u32,
    },
    /// The last signal of an ordered line was cleared.
    Completed { score: u32 },
    /// The player met a decoy, or a lane with no signal.
    Failed { signal: Option<String>, lane: usize },
}

/// Drives a [`RunState`] forward. Owns the row RNG stream.
#[derive(Debug, Clone)]
pub struct ProgressionEngine {
    config: GameConfig,
    generator: RowGenerator,
    rng: RowRng,
}

impl ProgressionEngine {
    /// The config is assumed to have passed [`GameConfig::validate`].
    #[must_use]
    pub fn new(config: GameConfig, seed: u64) -> Self {
        let generator = RowGenerator::new(config.lane_count, config.board.spawn_position());
        Self {
            config,
            generator,
            rng: RowRng::from_user_seed(seed),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Deterministically reseed the row stream.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = RowRng::from_user_seed(seed);
    }

    #[must_use]
    pub const fn rng_draws(&self) -> u64 {
        self.rng.draws()
    }

    /// Sequence position the next row should draw its correct signal from.
    #[must_use]
    pub fn sequence_slot(&self, progress_index: usize, sequence_len: usize) -> Option<usize> {
        match self.config.mode {
            SequenceMode::Ordered => (progress_index < sequence_len).then_some(progress_index),
            SequenceMode::Endless => (sequence_len > 0).then(|| progress_index % sequence_len),
        }
    }

    /// Begin a fresh run on `line` and spawn its first row.
    ///
    /// # Errors
    ///
    /// Returns [`RowError`] if the first row cannot be generated. The state is
    /// still reset and the next step retries the spawn.
    pub fn start<C>(
        &mut self,
        state: &mut RunState,
        catalog: &C,
        line: LineId,
        events: &mut Vec<StepEvent>,
    ) -> Result<(), RowError>
    where
        C: SignalCatalog + ?Sized,
    {
        log::info!("run started on line `{line}`");
        let len = catalog.sequence_len(&line).unwrap_or(0);
        state.begin(line, self.config.start_lane());
        self.spawn_row(state, catalog, len, events)
    }

    /// Advance the run by `delta` board units. A no-op unless the run is playing.
    pub fn step<C>(
        &mut self,
        state: &mut RunState,
        catalog: &C,
        delta: f32,
        events: &mut Vec<StepEvent>,
    ) where
        C: SignalCatalog + ?Sized,
    {
        if state.phase() != RunPhase::Playing {
            return;
        }
        let Some(line) = state.selected_line.clone() else {
            return;
        };
        let Some(len) = catalog.sequence_len(&line) else {
            log::warn!("line `{line}` vanished from the catalog mid-run");
            return;
        };

        for row in &mut state.rows {
            row.advance(delta);
        }
        self.cull(state, events);
        if state.rows.is_empty() {
            self.spawn_or_warn(state, catalog, len, events);
        }
        self.resolve_arrival(state, catalog, len, events);
    }

    fn cull(&self, state: &mut RunState, events: &mut Vec<StepEvent>) {
        while state
            .rows
            .front()
            .is_some_and(|row| self.config.board.is_past_board(row.position()))
        {
            state.rows.pop_front();
            events.push(StepEvent::RowCulled);
        }
    }

    fn spawn_row<C>(
        &mut self,
        state: &mut RunState,
        catalog: &C,
        len: usize,
        events: &mut Vec<StepEvent>,
    ) -> Result<(), RowError>
    where
        C: SignalCatalog + ?Sized,
    {
        let Some(line) = state.selected_line.as_ref() else {
            return Ok(());
        };
        let Some(index) = self.sequence_slot(state.progress_index, len) else {
            return Ok(());
        };
        let row = self
            .generator
            .generate(catalog, line, index, &mut self.rng)?;
        let correct_lane = row.correct_lane().unwrap_or_default();
        log::debug!("spawned row for `{line}` position {index}, correct lane {correct_lane}");
        state.rows.push_back(row);
        events.push(StepEvent::RowSpawned {
            index,
            correct_lane,
        });
        Ok(())
    }

    fn spawn_or_warn<C>(
        &mut self,
        state: &mut RunState,
        catalog: &C,
        len: usize,
        events: &mut Vec<StepEvent>,
    ) where
        C: SignalCatalog + ?Sized,
    {
        if let Err(err) = self.spawn_row(state, catalog, len, events) {
            log::warn!("row generation failed mid-run: {err}");
        }
    }

    fn resolve_arrival<C>(
        &mut self,
        state: &mut RunState,
        catalog: &C,
        len: usize,
        events: &mut Vec<StepEvent>,
    ) where
        C: SignalCatalog + ?Sized,
    {
        let board = self.config.board;
        let mut arriving = state
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| board.overlaps_train(row.position()))
            .map(|(idx, _)| idx);
        let Some(idx) = arriving.next() else {
            return;
        };
        if arriving.next().is_some() {
            log::warn!("more than one row overlaps the train; resolving the oldest only");
        }

        let lane = state.player_lane;
        let row = &state.rows[idx];
        if !row.is_well_formed(self.config.lane_count) {
            log::warn!("malformed row reached the train; missing signals count as decoys");
        }
        let hit = row.signal_in_lane(lane).cloned();

        match hit {
            Some(signal) if signal.is_correct => {
                state.rows.remove(idx);
                state.score = state.score.saturating_add(1);
                state.progress_index += 1;
                log::debug!(
                    "cleared `{}` in lane {lane}; score {}",
                    signal.name,
                    state.score
                );
                events.push(StepEvent::Cleared {
                    signal: signal.name,
                    lane,
                    score: state.score,
                });
                let finished = self.config.mode == SequenceMode::Ordered
                    && state.progress_index >= len;
                if finished {
                    state.finish(Outcome::Completed);
                    log::info!("run completed with score {}", state.score);
                    events.push(StepEvent::Completed { score: state.score });
                } else {
                    self.spawn_or_warn(state, catalog, len, events);
                }
            }
            other => {
                let signal = other.map(|signal| signal.name);
                state.finish(Outcome::Failed);
                log::info!(
                    "run failed in lane {lane} on {}; score {}",
                    signal.as_deref().unwrap_or("an empty lane"),
                    state.score
                );
                events.push(StepEvent::Failed { signal, lane });
            }
        }
    }
}
