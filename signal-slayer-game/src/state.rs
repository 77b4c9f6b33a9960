use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::catalog::LineId;
use crate::row::Row;

/// How a finished run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Completed,
    Failed,
}

/// Where the round sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    #[default]
    AwaitingSelection,
    Playing,
    Completed,
    Failed,
}

impl RunPhase {
    #[must_use]
    pub const fn is_over(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    #[must_use]
    pub const fn outcome(self) -> Option<Outcome> {
        match self {
            Self::Completed => Some(Outcome::Completed),
            Self::Failed => Some(Outcome::Failed),
            Self::AwaitingSelection | Self::Playing => None,
        }
    }
}

/// Authoritative mutable state for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    pub(crate) selected_line: Option<LineId>,
    pub(crate) progress_index: usize,
    pub(crate) player_lane: usize,
    /// Oldest first.
    pub(crate) rows: VecDeque<Row>,
    pub(crate) score: u32,
    pub(crate) is_over: bool,
    pub(crate) outcome: Option<Outcome>,
}

impl RunState {
    /// Empty state with no line selected.
    #[must_use]
    pub fn new(player_lane: usize) -> Self {
        Self {
            selected_line: None,
            progress_index: 0,
            player_lane,
            rows: VecDeque::new(),
            score: 0,
            is_over: false,
            outcome: None,
        }
    }

    #[must_use]
    pub const fn selected_line(&self) -> Option<&LineId> {
        self.selected_line.as_ref()
    }

    #[must_use]
    pub const fn progress_index(&self) -> usize {
        self.progress_index
    }

    #[must_use]
    pub const fn player_lane(&self) -> usize {
        self.player_lane
    }

    #[must_use]
    pub const fn rows(&self) -> &VecDeque<Row> {
        &self.rows
    }

    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.is_over
    }

    #[must_use]
    pub const fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    #[must_use]
    pub const fn phase(&self) -> RunPhase {
        match (&self.selected_line, self.outcome) {
            (None, _) => RunPhase::AwaitingSelection,
            (Some(_), None) => RunPhase::Playing,
            (Some(_), Some(Outcome::Completed)) => RunPhase::Completed,
            (Some(_), Some(Outcome::Failed)) => RunPhase::Failed,
        }
    }

    /// Reset to a fresh active run on `line`, keeping nothing from the previous run.
    pub(crate) fn begin(&mut self, line: LineId, start_lane: usize) {
        self.selected_line = Some(line);
        self.progress_index = 0;
        self.player_lane = start_lane;
        self.rows.clear();
        self.score = 0;
        self.is_over = false;
        self.outcome = None;
    }

    pub(crate) fn finish(&mut self, outcome: Outcome) {
        self.is_over = true;
        self.outcome = Some(outcome);
        if outcome == Outcome::Failed {
            self.progress_index = 0;
        }
    }

    /// Move one lane in `step` (-1 or +1), clamped to `0..lane_count`. Returns whether the lane changed.
    pub(crate) fn shift_lane(&mut self, step: isize, lane_count: usize) -> bool {
        let max_lane = lane_count.saturating_sub(1);
        let target = self.player_lane.saturating_add_signed(step).min(max_lane);
        let moved = target != self.player_lane;
        self.player_lane = target;
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_awaits_selection() {
        let state = RunState::new(1);
        assert_eq!(state.phase(), RunPhase::AwaitingSelection);
        assert!(!state.is_over());
        assert!(state.rows().is_empty());
        assert_eq!(state.outcome(), None);
    }

    #[test]
    fn failure_resets_progress_but_completion_keeps_it() {
        let mut state = RunState::new(1);
        state.begin(LineId::new("Central"), 1);
        state.progress_index = 2;
        state.score = 2;
        state.finish(Outcome::Failed);
        assert_eq!(state.phase(), RunPhase::Failed);
        assert_eq!(state.progress_index(), 0);
        assert_eq!(state.score(), 2);

        state.begin(LineId::new("Central"), 1);
        state.progress_index = 3;
        state.finish(Outcome::Completed);
        assert_eq!(state.phase(), RunPhase::Completed);
        assert_eq!(state.progress_index(), 3);
        assert!(state.phase().is_over());
        assert_eq!(state.phase().outcome(), Some(Outcome::Completed));
    }

    #[test]
    fn lane_shifts_clamp_without_wrapping() {
        let mut state = RunState::new(1);
        assert!(state.shift_lane(-1, 3));
        assert_eq!(state.player_lane(), 0);
        assert!(!state.shift_lane(-1, 3));
        assert_eq!(state.player_lane(), 0);
        assert!(state.shift_lane(1, 3));
        assert!(state.shift_lane(1, 3));
        assert!(!state.shift_lane(1, 3));
        assert_eq!(state.player_lane(), 2);
    }
}
