use anyhow::Result;
use colored::Colorize;
use std::collections::BTreeMap;
use std::io::Write;
use std::time::Duration;

use super::RunRecord;
use signal_slayer_game::Outcome;

/// Per-pilot tallies across every run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PilotSummary {
    pub runs: usize,
    pub passed: usize,
    pub completed: usize,
    pub failed: usize,
    pub total_score: u64,
    pub total_ticks: u64,
}

impl PilotSummary {
    #[must_use]
    pub fn mean_score(&self) -> f64 {
        if self.runs == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let mean = self.total_score as f64 / self.runs as f64;
        mean
    }
}

#[must_use]
pub fn summarize(records: &[RunRecord]) -> BTreeMap<String, PilotSummary> {
    let mut summaries: BTreeMap<String, PilotSummary> = BTreeMap::new();
    for record in records {
        let entry = summaries.entry(record.pilot.label()).or_default();
        entry.runs += 1;
        entry.passed += usize::from(record.passed);
        match record.outcome {
            Some(Outcome::Completed) => entry.completed += 1,
            Some(Outcome::Failed) => entry.failed += 1,
            None => {}
        }
        entry.total_score += u64::from(record.score);
        entry.total_ticks += u64::from(record.ticks);
    }
    summaries
}

fn pass_rate(passed: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let rate = (passed as f64 / total as f64) * 100.0;
    rate
}

/// Generate a human-readable report with colored status markers.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn generate_console_report(
    out: &mut dyn Write,
    records: &[RunRecord],
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Autopilot Results Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "============================".cyan())?;

    let total = records.len();
    let passed = records.iter().filter(|r| r.passed).count();
    writeln!(out, "Total runs: {total}")?;
    writeln!(out, "Passed: {}", passed.to_string().green())?;
    writeln!(out, "Failed: {}", (total - passed).to_string().red())?;
    writeln!(out, "Success rate: {:.1}%", pass_rate(passed, total))?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    writeln!(out, "{}", "🧭 Pilots".bright_yellow().bold())?;
    writeln!(out, "{}", "=========".yellow())?;
    for (pilot, summary) in summarize(records) {
        writeln!(
            out,
            "{} runs {} | completed {} | failed {} | mean score {:.2} | passed {}/{}",
            pilot.bold(),
            summary.runs,
            summary.completed,
            summary.failed,
            summary.mean_score(),
            summary.passed,
            summary.runs
        )?;
    }

    let failures: Vec<&RunRecord> = records.iter().filter(|r| !r.passed).collect();
    if !failures.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", "❌ Failed expectations".bright_red().bold())?;
        for record in failures {
            writeln!(
                out,
                "{} [{} seed {}]",
                record.line, record.pilot, record.seed
            )?;
            for failure in &record.failures {
                writeln!(out, "     • {}", failure.red())?;
            }
        }
    }
    Ok(())
}

/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn generate_json_report(out: &mut dyn Write, records: &[RunRecord]) -> Result<()> {
    let json_output = serde_json::to_string_pretty(records)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn generate_markdown_report(out: &mut dyn Write, records: &[RunRecord]) -> Result<()> {
    writeln!(out, "# Signal Slayer Autopilot Results\n")?;

    let total = records.len();
    let passed = records.iter().filter(|r| r.passed).count();
    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Total runs**: {total}")?;
    writeln!(out, "- **Passed**: {passed}")?;
    writeln!(out, "- **Failed**: {}", total - passed)?;
    writeln!(out, "- **Success rate**: {:.1}%\n", pass_rate(passed, total))?;

    writeln!(out, "## Runs\n")?;
    writeln!(
        out,
        "| Status | Line | Pilot | Seed | Outcome | Score | Ticks | RNG draws |"
    )?;
    writeln!(out, "|---|---|---|---|---|---|---|---|")?;
    for record in records {
        let status = if record.passed { "✅" } else { "❌" };
        writeln!(
            out,
            "| {status} | {} | {} | {} | {} | {}/{} | {} | {} |",
            record.line,
            record.pilot,
            record.seed,
            record.outcome_label(),
            record.score,
            record.sequence_len,
            record.ticks,
            record.rng_draws
        )?;
    }

    let failing: Vec<&RunRecord> = records.iter().filter(|r| !r.passed).collect();
    if !failing.is_empty() {
        writeln!(out, "\n## Failures\n")?;
        for record in failing {
            writeln!(out, "### {} / {} / seed {}\n", record.line, record.pilot, record.seed)?;
            for failure in &record.failures {
                writeln!(out, "- {failure}")?;
            }
            writeln!(out)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::PilotKind;
    use signal_slayer_game::LineId;

    fn record(pilot: PilotKind, outcome: Option<Outcome>, score: u32, passed: bool) -> RunRecord {
        RunRecord {
            line: LineId::new("Central"),
            pilot,
            seed: 1337,
            score,
            sequence_len: 3,
            progress_index: 0,
            outcome,
            ticks: 800,
            rng_draws: 9,
            duration: Duration::from_millis(3),
            passed,
            failures: if passed {
                Vec::new()
            } else {
                vec!["perfect pilot did not complete the line".to_string()]
            },
        }
    }

    fn sample() -> Vec<RunRecord> {
        vec![
            record(PilotKind::Perfect, Some(Outcome::Completed), 3, true),
            record(PilotKind::Perfect, Some(Outcome::Failed), 1, false),
            record(PilotKind::Random, Some(Outcome::Failed), 0, true),
        ]
    }

    #[test]
    fn summaries_group_by_pilot() {
        let summaries = summarize(&sample());
        let perfect = &summaries["perfect"];
        assert_eq!(perfect.runs, 2);
        assert_eq!(perfect.passed, 1);
        assert_eq!(perfect.completed, 1);
        assert_eq!(perfect.failed, 1);
        assert!((perfect.mean_score() - 2.0).abs() < f64::EPSILON);
        assert_eq!(summaries["random"].failed, 1);
        assert!(PilotSummary::default().mean_score().abs() < f64::EPSILON);
    }

    #[test]
    fn console_report_lists_failures() {
        let mut buf = Vec::new();
        generate_console_report(&mut buf, &sample(), Duration::from_millis(5)).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Autopilot Results Summary"));
        assert!(text.contains("Total runs: 3"));
        assert!(text.contains("perfect pilot did not complete the line"));
    }

    #[test]
    fn json_report_is_an_array_of_runs() {
        let mut buf = Vec::new();
        generate_json_report(&mut buf, &sample()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        let runs = value.as_array().unwrap();
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0]["pilot"], "perfect");
        assert_eq!(runs[0]["outcome"], "completed");
    }

    #[test]
    fn markdown_report_has_a_row_per_run() {
        let mut buf = Vec::new();
        generate_markdown_report(&mut buf, &sample()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("# Signal Slayer Autopilot Results"));
        assert_eq!(text.matches("| Central |").count(), 3);
        assert!(text.contains("## Failures"));
    }
}
