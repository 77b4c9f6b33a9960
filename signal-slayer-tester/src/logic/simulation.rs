use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use signal_slayer_game::{
    GameConfig, GameController, Intent, LineId, Outcome, SignalCatalog, StaticCatalog,
};

use super::policy::PilotKind;

const DEFAULT_FRAME: Duration = Duration::from_millis(16);
const DEFAULT_MAX_TICKS: u32 = 20_000;

/// Everything a batch of autopilot runs needs.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub lines: Vec<LineId>,
    pub seeds: Vec<u64>,
    pub pilots: Vec<PilotKind>,
    pub iterations: usize,
    pub frame: Duration,
    pub max_ticks: u32,
    pub game: GameConfig,
    pub verbose: bool,
}

impl SimulationConfig {
    #[must_use]
    pub fn new(lines: Vec<LineId>, seeds: Vec<u64>, pilots: Vec<PilotKind>) -> Self {
        Self {
            lines,
            seeds,
            pilots,
            iterations: 1,
            frame: DEFAULT_FRAME,
            max_ticks: DEFAULT_MAX_TICKS,
            game: GameConfig::default(),
            verbose: false,
        }
    }

    #[must_use]
    pub const fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    #[must_use]
    pub const fn with_frame(mut self, frame: Duration) -> Self {
        self.frame = frame;
        self
    }

    #[must_use]
    pub const fn with_max_ticks(mut self, max_ticks: u32) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    #[must_use]
    pub const fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Number of runs this configuration will produce.
    #[must_use]
    pub fn planned_runs(&self) -> usize {
        self.lines.len() * self.seeds.len() * self.pilots.len() * self.iterations
    }
}

/// Result of one autopilot run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub line: LineId,
    pub pilot: PilotKind,
    pub seed: u64,
    pub score: u32,
    pub sequence_len: usize,
    pub progress_index: usize,
    pub outcome: Option<Outcome>,
    pub ticks: u32,
    pub rng_draws: u64,
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    pub passed: bool,
    pub failures: Vec<String>,
}

impl RunRecord {
    #[must_use]
    pub fn outcome_label(&self) -> &'static str {
        match self.outcome {
            Some(Outcome::Completed) => "completed",
            Some(Outcome::Failed) => "failed",
            None => "unfinished",
        }
    }
}

/// Run every line, seed, pilot, and iteration combination.
///
/// # Errors
///
/// Returns an error if the game configuration is invalid or a line cannot be played.
pub fn run_simulation(catalog: &StaticCatalog, config: &SimulationConfig) -> Result<Vec<RunRecord>> {
    if config.frame.is_zero() {
        bail!("frame duration must be positive");
    }
    let mut records = Vec::with_capacity(config.planned_runs());
    for line in &config.lines {
        for &seed in &config.seeds {
            for &pilot in &config.pilots {
                for i in 0..config.iterations {
                    let iteration_seed =
                        seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));
                    let record = run_once(catalog, config, line, pilot, iteration_seed)?;
                    if config.verbose {
                        print_record(&record);
                    }
                    records.push(record);
                }
            }
        }
    }
    Ok(records)
}

fn run_once(
    catalog: &StaticCatalog,
    config: &SimulationConfig,
    line: &LineId,
    pilot: PilotKind,
    seed: u64,
) -> Result<RunRecord> {
    let started = Instant::now();
    let mut game = GameController::new(catalog.clone(), config.game.clone(), seed)
        .context("invalid game configuration")?;
    game.select_line(line.clone())
        .with_context(|| format!("line `{line}` cannot be played"))?;
    let sequence_len = catalog.sequence_len(line).unwrap_or(0);

    let mut policy = pilot.create_policy(seed);
    log::debug!("{} pilot flying `{line}` with seed {seed}", policy.name());
    let mut ticks = 0;
    while ticks < config.max_ticks && !game.phase().is_over() {
        if let Some(direction) = policy.choose(&game.snapshot()) {
            game.submit(Intent::ShiftLane { direction });
        }
        game.tick(config.frame);
        ticks += 1;
    }

    let snapshot = game.snapshot();
    let mut record = RunRecord {
        line: line.clone(),
        pilot,
        seed,
        score: snapshot.score,
        sequence_len,
        progress_index: snapshot.progress_index,
        outcome: snapshot.outcome,
        ticks,
        rng_draws: game.rng_draws(),
        duration: started.elapsed(),
        passed: true,
        failures: Vec::new(),
    };
    record.failures = check_expectations(&record, config.max_ticks);
    record.passed = record.failures.is_empty();
    Ok(record)
}

/// Compare a finished run against what its pilot should achieve.
#[must_use]
pub fn check_expectations(record: &RunRecord, max_ticks: u32) -> Vec<String> {
    let mut failures = Vec::new();
    let Some(outcome) = record.outcome else {
        failures.push(format!("run did not finish within {max_ticks} ticks"));
        return failures;
    };
    if outcome == Outcome::Failed && record.progress_index != 0 {
        failures.push(format!(
            "failed run kept progress index {}",
            record.progress_index
        ));
    }
    let len = u32::try_from(record.sequence_len).unwrap_or(u32::MAX);
    match record.pilot {
        PilotKind::Perfect => {
            if outcome != Outcome::Completed {
                failures.push("perfect pilot did not complete the line".to_string());
            }
            if record.score != len {
                failures.push(format!("perfect pilot scored {} of {len}", record.score));
            }
        }
        PilotKind::Blunder { at } if at < len => {
            if outcome != Outcome::Failed {
                failures.push(format!("blunder at arrival {at} did not fail the run"));
            }
            if record.score != at {
                failures.push(format!("blunder at arrival {at} scored {}", record.score));
            }
        }
        PilotKind::Blunder { .. } => {
            if outcome != Outcome::Completed {
                failures.push("blunder past the last arrival should complete".to_string());
            }
        }
        PilotKind::Random => {
            if record.score > len {
                failures.push(format!("random pilot scored {} of {len}", record.score));
            }
        }
    }
    failures
}

fn print_record(record: &RunRecord) {
    let status = if record.passed {
        "✅".green()
    } else {
        "❌".red()
    };
    println!(
        "{status} [{} seed {}] {}: {} {}/{} in {} ticks ({} draws)",
        record.pilot,
        record.seed,
        record.line,
        record.outcome_label(),
        record.score,
        record.sequence_len,
        record.ticks,
        record.rng_draws
    );
    for failure in &record.failures {
        println!("     • {}", failure.red());
    }
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
