//! Read-only view of a run for presentation layers.
use serde::{Deserialize, Serialize};

use crate::catalog::LineId;
use crate::constants::{MSG_COMPLETED, MSG_FAILED, MSG_PLAYING, MSG_SELECT_LINE};
use crate::state::{Outcome, RunPhase, RunState};

/// One signal placard as a renderer sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalView {
    pub lane: usize,
    pub name: String,
    pub is_correct: bool,
    pub vertical_position: f32,
}

/// Immutable copy of everything a frame needs to draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSnapshot {
    pub selected_line: Option<LineId>,
    pub phase: RunPhase,
    pub lane_count: usize,
    pub player_lane: usize,
    pub score: u32,
    pub progress_index: usize,
    /// Length of the selected line's sequence, when one is selected.
    pub sequence_len: Option<usize>,
    /// Every signal in flight, oldest row first.
    pub rows: Vec<SignalView>,
    pub is_over: bool,
    pub outcome: Option<Outcome>,
    /// Message key for the banner a renderer should show.
    pub message_key: String,
}

impl RunSnapshot {
    #[must_use]
    pub fn capture(state: &RunState, lane_count: usize, sequence_len: Option<usize>) -> Self {
        let rows = state
            .rows()
            .iter()
            .flat_map(|row| {
                row.signals().iter().map(move |signal| SignalView {
                    lane: signal.lane,
                    name: signal.name.clone(),
                    is_correct: signal.is_correct,
                    vertical_position: row.position(),
                })
            })
            .collect();
        let phase = state.phase();
        let message_key = match phase {
            RunPhase::AwaitingSelection => MSG_SELECT_LINE,
            RunPhase::Playing => MSG_PLAYING,
            RunPhase::Completed => MSG_COMPLETED,
            RunPhase::Failed => MSG_FAILED,
        };
        Self {
            selected_line: state.selected_line().cloned(),
            phase,
            lane_count,
            player_lane: state.player_lane(),
            score: state.score(),
            progress_index: state.progress_index(),
            sequence_len,
            rows,
            is_over: state.is_over(),
            outcome: state.outcome(),
            message_key: message_key.to_string(),
        }
    }

    /// The correct signal closest to the train, if any row is in flight.
    #[must_use]
    pub fn approaching_correct(&self) -> Option<&SignalView> {
        self.rows
            .iter()
            .filter(|signal| signal.is_correct)
            .max_by(|a, b| a.vertical_position.total_cmp(&b.vertical_position))
    }

    /// Signals sharing a row with `anchor`.
    pub fn row_of<'a>(&'a self, anchor: &'a SignalView) -> impl Iterator<Item = &'a SignalView> {
        self.rows.iter().filter(move |signal| {
            signal.vertical_position.total_cmp(&anchor.vertical_position).is_eq()
        })
    }

    /// Serialize for a presentation bridge.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::{Row, Signal};

    fn playing_state() -> RunState {
        let mut state = RunState::new(1);
        state.begin(LineId::new("Central"), 1);
        state.rows.push_back(Row::new(
            [
                Signal::decoy("Stop", 0),
                Signal::correct("Clear", 1),
                Signal::decoy("Caution", 2),
            ],
            120.0,
        ));
        state.rows.push_back(Row::new(
            [
                Signal::correct("Approach", 0),
                Signal::decoy("Stop", 1),
                Signal::decoy("Caution", 2),
            ],
            -60.0,
        ));
        state
    }

    #[test]
    fn snapshot_flattens_rows_in_order() {
        let snapshot = RunSnapshot::capture(&playing_state(), 3, Some(3));
        assert_eq!(snapshot.rows.len(), 6);
        assert_eq!(snapshot.rows[1].name, "Clear");
        assert!((snapshot.rows[3].vertical_position + 60.0).abs() < f32::EPSILON);
        assert_eq!(snapshot.phase, RunPhase::Playing);
        assert_eq!(snapshot.message_key, "msg.playing");
        assert_eq!(snapshot.outcome, None);
    }

    #[test]
    fn approaching_correct_picks_the_row_nearest_the_train() {
        let snapshot = RunSnapshot::capture(&playing_state(), 3, Some(3));
        let target = snapshot.approaching_correct().unwrap();
        assert_eq!(target.name, "Clear");
        assert_eq!(target.lane, 1);
        let decoys: Vec<&str> = snapshot
            .row_of(target)
            .filter(|s| !s.is_correct)
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(decoys, vec!["Stop", "Caution"]);
    }

    #[test]
    fn finished_runs_carry_outcome_messaging() {
        let mut state = playing_state();
        state.finish(Outcome::Failed);
        let snapshot = RunSnapshot::capture(&state, 3, Some(3));
        assert!(snapshot.is_over);
        assert_eq!(snapshot.outcome, Some(Outcome::Failed));
        assert_eq!(snapshot.message_key, "msg.run.failed");

        let json = snapshot.to_json().unwrap();
        assert!(json.contains("\"outcome\":\"failed\""));
        assert!(json.contains("\"selected_line\":\"Central\""));
    }

    #[test]
    fn empty_state_awaits_selection() {
        let snapshot = RunSnapshot::capture(&RunState::new(1), 3, None);
        assert!(snapshot.rows.is_empty());
        assert_eq!(snapshot.message_key, "msg.select-line");
        assert!(snapshot.approaching_correct().is_none());
    }
}
