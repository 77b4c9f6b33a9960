use std::fmt;
use std::str::FromStr;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use signal_slayer_game::{LaneShift, RunSnapshot};

/// Policy interface for automated play.
pub trait PilotPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Pick a lane change for the current frame, or hold the lane.
    fn choose(&mut self, snapshot: &RunSnapshot) -> Option<LaneShift>;
}

/// Built-in pilots for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PilotKind {
    /// Always steers to the correct signal.
    Perfect,
    /// Wanders between lanes at random.
    Random,
    /// Plays perfectly, then steers into a decoy at the given arrival.
    Blunder { at: u32 },
}

impl PilotKind {
    #[must_use]
    pub fn label(self) -> String {
        match self {
            Self::Perfect => "perfect".to_string(),
            Self::Random => "random".to_string(),
            Self::Blunder { at } => format!("blunder@{at}"),
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn PilotPolicy + Send> {
        match self {
            Self::Perfect => Box::new(PerfectPilot),
            Self::Random => Box::new(RandomPilot::new(seed)),
            Self::Blunder { at } => Box::new(BlunderPilot { at }),
        }
    }
}

impl fmt::Display for PilotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl FromStr for PilotKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        match lowered.as_str() {
            "perfect" => Ok(Self::Perfect),
            "random" => Ok(Self::Random),
            "blunder" => Ok(Self::Blunder { at: 0 }),
            other => other
                .strip_prefix("blunder@")
                .and_then(|at| at.parse().ok())
                .map(|at| Self::Blunder { at })
                .ok_or_else(|| format!("unknown pilot `{s}`")),
        }
    }
}

struct PerfectPilot;

struct BlunderPilot {
    at: u32,
}

struct RandomPilot {
    rng: ChaCha20Rng,
}

impl RandomPilot {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

fn steer(from: usize, to: usize) -> Option<LaneShift> {
    match to.cmp(&from) {
        std::cmp::Ordering::Less => Some(LaneShift::Left),
        std::cmp::Ordering::Greater => Some(LaneShift::Right),
        std::cmp::Ordering::Equal => None,
    }
}

fn decoy_lane(snapshot: &RunSnapshot) -> Option<usize> {
    let target = snapshot.approaching_correct()?;
    snapshot
        .row_of(target)
        .filter(|signal| !signal.is_correct)
        .min_by_key(|signal| signal.lane.abs_diff(snapshot.player_lane))
        .map(|signal| signal.lane)
}

impl PilotPolicy for PerfectPilot {
    fn name(&self) -> &'static str {
        "Perfect"
    }

    fn choose(&mut self, snapshot: &RunSnapshot) -> Option<LaneShift> {
        let target = snapshot.approaching_correct()?;
        steer(snapshot.player_lane, target.lane)
    }
}

impl PilotPolicy for BlunderPilot {
    fn name(&self) -> &'static str {
        "Blunder"
    }

    fn choose(&mut self, snapshot: &RunSnapshot) -> Option<LaneShift> {
        let lane = if snapshot.score == self.at {
            decoy_lane(snapshot)?
        } else {
            snapshot.approaching_correct()?.lane
        };
        steer(snapshot.player_lane, lane)
    }
}

impl PilotPolicy for RandomPilot {
    fn name(&self) -> &'static str {
        "Random"
    }

    fn choose(&mut self, _snapshot: &RunSnapshot) -> Option<LaneShift> {
        // Roughly one lane change every twenty frames.
        match self.rng.gen_range(0..40) {
            0 => Some(LaneShift::Left),
            1 => Some(LaneShift::Right),
            _ => None,
        }
    }
}
