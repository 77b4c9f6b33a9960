//! Signal Slayer Game Engine
//!
//! Platform-agnostic round logic for the Signal Slayer lane game: signal rows
//! scroll toward a train and the player must meet each rail line's correct
//! signals in order while dodging decoys. Rendering and input capture live in
//! the presentation layer; this crate only sees intents and frame ticks.

pub mod catalog;
pub mod config;
pub mod constants;
pub mod controller;
pub mod engine;
pub mod input;
pub mod numbers;
pub mod rng;
pub mod row;
pub mod snapshot;
pub mod state;

// Re-export commonly used types
pub use catalog::{
    BundledLoader, CatalogError, CatalogLoader, LineId, LineSignals, SignalCatalog,
    StaticCatalog, validate_line,
};
pub use config::{BoardGeometry, ConfigError, GameConfig, SequenceMode};
pub use controller::{GameController, Intent, LaneShift, SelectError, SetupError, TickReport};
pub use engine::{ProgressionEngine, StepEvent};
pub use input::{classify_swipe, key_to_intent, line_choice_from_code, tap_intent};
pub use rng::{CountingRng, RowRng, derive_stream_seed};
pub use row::{Row, RowError, RowGenerator, Signal};
pub use snapshot::{RunSnapshot, SignalView};
pub use state::{Outcome, RunPhase, RunState};
