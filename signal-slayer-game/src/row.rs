//! Signal rows and the generator that lays them out across lanes.
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::catalog::{LineId, SignalCatalog, usable_decoys};

/// Signals stored inline for the common lane counts.
pub type SignalSet = SmallVec<[Signal; 4]>;

/// One placard on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    pub name: String,
    pub is_correct: bool,
    pub lane: usize,
}

impl Signal {
    #[must_use]
    pub fn correct(name: &str, lane: usize) -> Self {
        Self {
            name: name.to_string(),
            is_correct: true,
            lane,
        }
    }

    #[must_use]
    pub fn decoy(name: &str, lane: usize) -> Self {
        Self {
            name: name.to_string(),
            is_correct: false,
            lane,
        }
    }
}

/// A horizontal set of signals scrolling toward the train as a unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    signals: SignalSet,
    position: f32,
}

impl Row {
    /// Build a row, ordering its signals by lane.
    #[must_use]
    pub fn new(signals: impl IntoIterator<Item = Signal>, position: f32) -> Self {
        let mut signals: SignalSet = signals.into_iter().collect();
        signals.sort_by_key(|signal| signal.lane);
        Self { signals, position }
    }

    #[must_use]
    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }

    /// Vertical position of the row's top edge.
    #[must_use]
    pub const fn position(&self) -> f32 {
        self.position
    }

    /// Direct lane lookup. `None` when the row has no signal for that lane.
    #[must_use]
    pub fn signal_in_lane(&self, lane: usize) -> Option<&Signal> {
        self.signals.get(lane).filter(|signal| signal.lane == lane)
    }

    #[must_use]
    pub fn correct_signal(&self) -> Option<&Signal> {
        self.signals.iter().find(|signal| signal.is_correct)
    }

    #[must_use]
    pub fn correct_lane(&self) -> Option<usize> {
        self.correct_signal().map(|signal| signal.lane)
    }

    /// One signal per lane, exactly one correct, names pairwise distinct.
    #[must_use]
    pub fn is_well_formed(&self, lane_count: usize) -> bool {
        if self.signals.len() != lane_count {
            return false;
        }
        let lanes_match = self
            .signals
            .iter()
            .enumerate()
            .all(|(lane, signal)| signal.lane == lane);
        let correct_count = self.signals.iter().filter(|s| s.is_correct).count();
        let distinct_names = self.signals.iter().enumerate().all(|(idx, signal)| {
            self.signals[..idx]
                .iter()
                .all(|earlier| earlier.name != signal.name)
        });
        lanes_match && correct_count == 1 && distinct_names
    }

    pub(crate) fn advance(&mut self, delta: f32) {
        self.position += delta;
    }
}

/// Errors raised when a row cannot be produced.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RowError {
    #[error("rail line `{0}` is not in the signal catalog")]
    UnknownLine(LineId),
    #[error("sequence position {index} is past the end of a {len}-signal line")]
    SequenceExhausted { index: usize, len: usize },
    #[error("no decoys are available to stand beside `{correct}`")]
    NoDecoys { correct: String },
    #[error("a row needs at least one lane")]
    NoLanes,
}

/// Produces rows holding the current correct signal plus distinct decoys.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowGenerator {
    lane_count: usize,
    spawn_position: f32,
}

impl RowGenerator {
    #[must_use]
    pub const fn new(lane_count: usize, spawn_position: f32) -> Self {
        Self {
            lane_count,
            spawn_position,
        }
    }

    #[must_use]
    pub const fn lane_count(&self) -> usize {
        self.lane_count
    }

    /// Generate the row for position `index` of `line`'s ordered sequence.
    ///
    /// # Errors
    ///
    /// Returns [`RowError`] when the line is unknown, `index` is past the end of
    /// the sequence, or the pool has no usable decoys.
    pub fn generate<C, R>(
        &self,
        catalog: &C,
        line: &LineId,
        index: usize,
        rng: &mut R,
    ) -> Result<Row, RowError>
    where
        C: SignalCatalog + ?Sized,
        R: Rng + ?Sized,
    {
        let (Some(sequence), Some(pool)) =
            (catalog.correct_sequence(line), catalog.incorrect_pool(line))
        else {
            return Err(RowError::UnknownLine(line.clone()));
        };
        self.generate_from(sequence, pool, index, rng)
    }

    /// Generate from raw sequence and pool slices.
    ///
    /// When the pool holds fewer than `lane_count - 1` usable names, the
    /// remaining lanes repeat names drawn from the usable pool.
    ///
    /// # Errors
    ///
    /// See [`RowGenerator::generate`].
    pub fn generate_from<R>(
        &self,
        sequence: &[String],
        pool: &[String],
        index: usize,
        rng: &mut R,
    ) -> Result<Row, RowError>
    where
        R: Rng + ?Sized,
    {
        if self.lane_count == 0 {
            return Err(RowError::NoLanes);
        }
        let Some(correct) = sequence.get(index) else {
            return Err(RowError::SequenceExhausted {
                index,
                len: sequence.len(),
            });
        };
        let decoys = self.sample_decoys(pool, correct, rng)?;
        let correct_lane = rng.gen_range(0..self.lane_count);

        let mut decoys = decoys.into_iter();
        let mut signals = SignalSet::with_capacity(self.lane_count);
        for lane in 0..self.lane_count {
            if lane == correct_lane {
                signals.push(Signal::correct(correct, lane));
                continue;
            }
            let Some(name) = decoys.next() else {
                return Err(RowError::NoDecoys {
                    correct: correct.clone(),
                });
            };
            signals.push(Signal::decoy(name, lane));
        }
        Ok(Row {
            signals,
            position: self.spawn_position,
        })
    }

    fn sample_decoys<'a, R>(
        &self,
        pool: &'a [String],
        correct: &str,
        rng: &mut R,
    ) -> Result<Vec<&'a str>, RowError>
    where
        R: Rng + ?Sized,
    {
        let needed = self.lane_count - 1;
        let usable = usable_decoys(pool, correct);
        if usable.len() >= needed {
            return Ok(usable.choose_multiple(rng, needed).copied().collect());
        }
        if usable.is_empty() {
            return Err(RowError::NoDecoys {
                correct: correct.to_string(),
            });
        }
        log::warn!(
            "decoy pool for `{correct}` has {} names for {needed} lanes; repeating names",
            usable.len()
        );
        let mut picks = usable.clone();
        picks.shuffle(rng);
        let shortfall = needed - picks.len();
        picks.extend((0..shortfall).filter_map(|_| usable.choose(rng).copied()));
        Ok(picks)
    }
}
