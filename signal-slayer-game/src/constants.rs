//! Centralized tuning constants for Signal Slayer round logic.
//!
//! Geometry is expressed in abstract board units, not pixels. Presentation
//! layers scale these to whatever surface they draw on.

// Message keys -------------------------------------------------------------
pub(crate) const MSG_SELECT_LINE: &str = "msg.select-line";
pub(crate) const MSG_PLAYING: &str = "msg.playing";
pub(crate) const MSG_COMPLETED: &str = "msg.run.completed";
pub(crate) const MSG_FAILED: &str = "msg.run.failed";

// Lanes ---------------------------------------------------------------------
pub(crate) const DEFAULT_LANE_COUNT: usize = 3;
pub(crate) const MIN_LANE_COUNT: usize = 2;

// Board geometry --------------------------------------------------------------
pub(crate) const DEFAULT_BOARD_LENGTH: f32 = 600.0;
pub(crate) const DEFAULT_ROW_HEIGHT: f32 = 60.0;
pub(crate) const DEFAULT_TRAIN_TOP: f32 = 500.0;
pub(crate) const DEFAULT_TRAIN_HEIGHT: f32 = 50.0;

// Timing ----------------------------------------------------------------------
/// Two board units per frame at sixty frames per second.
pub(crate) const DEFAULT_SCROLL_SPEED: f32 = 120.0;
pub(crate) const DEFAULT_MAX_STEP_MS: u32 = 50;

// Input -----------------------------------------------------------------------
/// Horizontal travel below this is treated as a tap rather than a swipe.
pub const SWIPE_DEAD_ZONE: f32 = 30.0;

// Randomness ------------------------------------------------------------------
pub(crate) const ROW_STREAM_TAG: &[u8] = b"rows";
