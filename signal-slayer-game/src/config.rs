//! Round configuration: lanes, board geometry, scroll timing, and sequence mode.
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::constants::{
    DEFAULT_BOARD_LENGTH, DEFAULT_LANE_COUNT, DEFAULT_MAX_STEP_MS, DEFAULT_ROW_HEIGHT,
    DEFAULT_SCROLL_SPEED, DEFAULT_TRAIN_HEIGHT, DEFAULT_TRAIN_TOP, MIN_LANE_COUNT,
};

/// How the correct-signal pointer walks the line's sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceMode {
    /// Each correct signal appears once in order; the last one completes the run.
    #[default]
    Ordered,
    /// The sequence repeats forever; the run only ends on a wrong signal.
    Endless,
}

/// Vertical layout of the board in abstract units. Rows travel toward larger values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoardGeometry {
    #[serde(default = "BoardGeometry::default_length")]
    pub length: f32,
    #[serde(default = "BoardGeometry::default_row_height")]
    pub row_height: f32,
    #[serde(default = "BoardGeometry::default_train_top")]
    pub train_top: f32,
    #[serde(default = "BoardGeometry::default_train_height")]
    pub train_height: f32,
}

impl BoardGeometry {
    const fn default_length() -> f32 {
        DEFAULT_BOARD_LENGTH
    }

    const fn default_row_height() -> f32 {
        DEFAULT_ROW_HEIGHT
    }

    const fn default_train_top() -> f32 {
        DEFAULT_TRAIN_TOP
    }

    const fn default_train_height() -> f32 {
        DEFAULT_TRAIN_HEIGHT
    }

    /// Position a freshly generated row starts at, just above the visible board.
    #[must_use]
    pub fn spawn_position(&self) -> f32 {
        -self.row_height
    }

    #[must_use]
    pub fn train_bottom(&self) -> f32 {
        self.train_top + self.train_height
    }

    /// Whether a row whose top edge sits at `position` overlaps the train band.
    #[must_use]
    pub fn overlaps_train(&self, position: f32) -> bool {
        position + self.row_height >= self.train_top && position < self.train_bottom()
    }

    #[must_use]
    pub fn is_past_board(&self, position: f32) -> bool {
        position > self.length
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("board.length", self.length),
            ("board.row_height", self.row_height),
            ("board.train_height", self.train_height),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        if !self.train_top.is_finite() || self.train_top < 0.0 || self.train_bottom() > self.length
        {
            return Err(ConfigError::TrainOutsideBoard {
                top: self.train_top,
                bottom: self.train_bottom(),
                length: self.length,
            });
        }
        Ok(())
    }
}

impl Default for BoardGeometry {
    fn default() -> Self {
        Self {
            length: Self::default_length(),
            row_height: Self::default_row_height(),
            train_top: Self::default_train_top(),
            train_height: Self::default_train_height(),
        }
    }
}

/// Errors raised when round configuration invariants are violated.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("lane count must be at least {min} (got {value})")]
    TooFewLanes { min: usize, value: usize },
    #[error("start lane {lane} is outside 0..{lane_count}")]
    StartLaneOutOfRange { lane: usize, lane_count: usize },
    #[error("{field} must be finite and positive (got {value:.2})")]
    NotPositive { field: &'static str, value: f32 },
    #[error("train band {top:.2}..{bottom:.2} does not fit inside board length {length:.2}")]
    TrainOutsideBoard { top: f32, bottom: f32, length: f32 },
    #[error("max step must be at least 1ms")]
    ZeroStep,
    #[error(
        "a {step_ms}ms step scrolls {travel:.2} units, which can skip the {window:.2}-unit arrival window"
    )]
    StepSkipsTrain {
        step_ms: u32,
        travel: f32,
        window: f32,
    },
    #[error("config data is malformed: {0}")]
    Parse(String),
}

/// Tunable parameters for a round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default = "GameConfig::default_lane_count")]
    pub lane_count: usize,
    #[serde(default)]
    pub board: BoardGeometry,
    /// Board units per second.
    #[serde(default = "GameConfig::default_scroll_speed")]
    pub scroll_speed: f32,
    #[serde(default = "GameConfig::default_max_step_ms")]
    pub max_step_ms: u32,
    #[serde(default)]
    pub mode: SequenceMode,
    #[serde(default)]
    pub start_lane: Option<usize>,
}

impl GameConfig {
    const fn default_lane_count() -> usize {
        DEFAULT_LANE_COUNT
    }

    const fn default_scroll_speed() -> f32 {
        DEFAULT_SCROLL_SPEED
    }

    const fn default_max_step_ms() -> u32 {
        DEFAULT_MAX_STEP_MS
    }

    /// Parse and validate a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the result fails validation.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self =
            serde_json::from_str(json).map_err(|err| ConfigError::Parse(err.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    #[must_use]
    pub fn with_mode(mut self, mode: SequenceMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_lane_count(mut self, lane_count: usize) -> Self {
        self.lane_count = lane_count;
        self
    }

    /// Lane the player occupies at the start of every run.
    #[must_use]
    pub fn start_lane(&self) -> usize {
        self.start_lane.unwrap_or(self.lane_count / 2)
    }

    #[must_use]
    pub fn max_step(&self) -> Duration {
        Duration::from_millis(u64::from(self.max_step_ms))
    }

    /// Distance rows travel over `secs` seconds.
    #[must_use]
    pub fn scroll_delta(&self, secs: f32) -> f32 {
        self.scroll_speed * secs
    }

    /// Check every invariant the engine relies on.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lane_count < MIN_LANE_COUNT {
            return Err(ConfigError::TooFewLanes {
                min: MIN_LANE_COUNT,
                value: self.lane_count,
            });
        }
        if self.start_lane() >= self.lane_count {
            return Err(ConfigError::StartLaneOutOfRange {
                lane: self.start_lane(),
                lane_count: self.lane_count,
            });
        }
        self.board.validate()?;
        if !self.scroll_speed.is_finite() || self.scroll_speed <= 0.0 {
            return Err(ConfigError::NotPositive {
                field: "scroll_speed",
                value: self.scroll_speed,
            });
        }
        if self.max_step_ms == 0 {
            return Err(ConfigError::ZeroStep);
        }
        let travel = self.scroll_delta(self.max_step().as_secs_f32());
        let window = self.board.row_height + self.board.train_height;
        if travel >= window {
            return Err(ConfigError::StepSkipsTrain {
                step_ms: self.max_step_ms,
                travel,
                window,
            });
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            lane_count: Self::default_lane_count(),
            board: BoardGeometry::default(),
            scroll_speed: Self::default_scroll_speed(),
            max_step_ms: Self::default_max_step_ms(),
            mode: SequenceMode::default(),
            start_lane: None,
        }
    }
}
