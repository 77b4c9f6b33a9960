mod logic;
mod util;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use signal_slayer_game::{LineId, SignalCatalog, StaticCatalog};
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use logic::{PilotKind, RunRecord, SimulationConfig, resolve_seed_inputs, run_simulation};
use util::split_csv;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Colored human-readable summary
    Console,
    /// Pretty-printed JSON array of runs
    Json,
    /// Markdown tables
    Markdown,
}

#[derive(Debug, Parser)]
#[command(name = "signal-slayer-tester", version)]
#[command(about = "Autopilot QA harness for Signal Slayer round logic")]
struct Args {
    /// Lines to fly (comma-separated, or `all`)
    #[arg(long, default_value = "all")]
    lines: String,

    /// List the bundled lines and exit
    #[arg(long)]
    list_lines: bool,

    /// Seeds to run (comma-separated, decimal or 0x-hex)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Pilots to run (comma-separated: perfect, random, blunder, blunder@N)
    #[arg(long, default_value = "perfect,random,blunder")]
    pilots: String,

    /// Number of iterations per line, seed, and pilot
    #[arg(long, default_value_t = 1)]
    iterations: usize,

    /// Simulated frame length in milliseconds
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,

    /// Give up on a run after this many frames
    #[arg(long, default_value_t = 20_000)]
    max_ticks: u32,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let catalog = StaticCatalog::bundled().context("bundled line catalog is invalid")?;

    if maybe_list_lines(&args, &catalog)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let config = build_config(&args, &catalog)?;
    log::info!(
        "planning {} runs across {} lines",
        config.planned_runs(),
        config.lines.len()
    );
    let records = run_simulation(&catalog, &config)?;

    write_reports(&args, &records, start_time)?;

    if records.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_lines(args: &Args, catalog: &StaticCatalog) -> Result<bool> {
    if !args.list_lines {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available lines:")?;
    for line in catalog.lines() {
        let len = catalog.sequence_len(&line).unwrap_or(0);
        writeln!(output_target.writer(), "  {:20} - {len} signals", line.as_str())?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🚦 Signal Slayer Autopilot Tester".bright_cyan().bold());
    println!("{}", "=================================".cyan());
}

fn expand_lines(lines_arg: &str, catalog: &StaticCatalog) -> Result<Vec<LineId>> {
    let requested = split_csv(lines_arg);
    if requested.is_empty() || requested.iter().any(|l| l.eq_ignore_ascii_case("all")) {
        return Ok(catalog.lines());
    }
    let known = catalog.lines();
    let mut lines = Vec::with_capacity(requested.len());
    for name in requested {
        let Some(line) = known.iter().find(|l| l.as_str().eq_ignore_ascii_case(&name)) else {
            bail!("Unknown line: {name}");
        };
        if !lines.contains(line) {
            lines.push(line.clone());
        }
    }
    Ok(lines)
}

fn parse_pilots(pilots_arg: &str) -> Result<Vec<PilotKind>> {
    let mut pilots = Vec::new();
    for token in split_csv(pilots_arg) {
        let pilot: PilotKind = token.parse().map_err(anyhow::Error::msg)?;
        if !pilots.contains(&pilot) {
            pilots.push(pilot);
        }
    }
    if pilots.is_empty() {
        bail!("no pilots requested");
    }
    Ok(pilots)
}

fn build_config(args: &Args, catalog: &StaticCatalog) -> Result<SimulationConfig> {
    let lines = expand_lines(&args.lines, catalog)?;
    let seeds = resolve_seed_inputs(&split_csv(&args.seeds))?;
    let pilots = parse_pilots(&args.pilots)?;
    Ok(SimulationConfig::new(lines, seeds, pilots)
        .with_iterations(args.iterations)
        .with_frame(Duration::from_millis(args.frame_ms))
        .with_max_ticks(args.max_ticks)
        .with_verbose(args.verbose))
}

fn write_reports(args: &Args, records: &[RunRecord], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report {
        ReportFormat::Json => {
            logic::reports::generate_json_report(&mut output_target, records)?;
        }
        ReportFormat::Markdown => {
            if records.is_empty() {
                writeln!(
                    &mut output_target,
                    "# Signal Slayer Autopilot Results\n\n_No runs executed._"
                )?;
            } else {
                logic::reports::generate_markdown_report(&mut output_target, records)?;
            }
        }
        ReportFormat::Console => {
            let duration = start_time.elapsed();
            if records.is_empty() {
                writeln!(&mut output_target, "No runs executed.")?;
            } else {
                logic::reports::generate_console_report(&mut output_target, records, duration)?;
            }
            writeln!(&mut output_target)?;
            writeln!(&mut output_target, "🏁 Total time: {duration:?}")?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signal_slayer_game::Outcome;

    fn base_args() -> Args {
        Args {
            lines: "all".to_string(),
            list_lines: false,
            seeds: "1337".to_string(),
            pilots: "perfect".to_string(),
            iterations: 1,
            frame_ms: 16,
            max_ticks: 20_000,
            report: ReportFormat::Json,
            verbose: false,
            output: None,
        }
    }

    fn catalog() -> StaticCatalog {
        StaticCatalog::bundled().unwrap()
    }

    fn temp(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "signal-slayer-main-{label}-{}",
            std::process::id()
        ))
    }

    #[test]
    fn expands_all_lines_keyword() {
        let lines = expand_lines("all", &catalog()).unwrap();
        assert_eq!(lines, catalog().lines());
        assert_eq!(expand_lines("", &catalog()).unwrap(), catalog().lines());
    }

    #[test]
    fn expand_lines_matches_case_insensitively_and_dedups() {
        let lines = expand_lines("harbour, Central,HARBOUR", &catalog()).unwrap();
        assert_eq!(lines, vec![LineId::new("Harbour"), LineId::new("Central")]);
        assert!(expand_lines("Atlantis", &catalog()).is_err());
    }

    #[test]
    fn parses_pilot_list() {
        let pilots = parse_pilots("perfect, blunder@1,perfect").unwrap();
        assert_eq!(pilots, vec![PilotKind::Perfect, PilotKind::Blunder { at: 1 }]);
        assert!(parse_pilots("").is_err());
        assert!(parse_pilots("wizard").is_err());
    }

    #[test]
    fn build_config_carries_cli_knobs() {
        let args = Args {
            lines: "Central".to_string(),
            seeds: "1,0x2".to_string(),
            iterations: 2,
            frame_ms: 33,
            max_ticks: 500,
            ..base_args()
        };
        let config = build_config(&args, &catalog()).unwrap();
        assert_eq!(config.lines, vec![LineId::new("Central")]);
        assert_eq!(config.seeds, vec![1, 2]);
        assert_eq!(config.iterations, 2);
        assert_eq!(config.frame, Duration::from_millis(33));
        assert_eq!(config.max_ticks, 500);
        assert_eq!(config.planned_runs(), 4);
    }

    #[test]
    fn maybe_list_lines_writes_output() {
        let path = temp("lines.txt");
        let args = Args {
            list_lines: true,
            output: Some(path.clone()),
            ..base_args()
        };
        assert!(maybe_list_lines(&args, &catalog()).unwrap());
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("Available lines"));
        assert!(content.contains("Northern"));
    }

    #[test]
    fn maybe_list_lines_returns_false_when_disabled() {
        assert!(!maybe_list_lines(&base_args(), &catalog()).unwrap());
    }

    #[test]
    fn write_reports_emits_json_for_a_real_run() {
        let path = temp("report.json");
        let args = Args {
            lines: "Central".to_string(),
            output: Some(path.clone()),
            ..base_args()
        };
        let config = build_config(&args, &catalog()).unwrap();
        let records = run_simulation(&catalog(), &config).unwrap();
        write_reports(&args, &records, Instant::now()).unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        let parsed: Vec<RunRecord> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].outcome, Some(Outcome::Completed));
        assert!(parsed[0].passed);
    }

    #[test]
    fn write_reports_markdown_empty_results() {
        let path = temp("empty.md");
        let args = Args {
            report: ReportFormat::Markdown,
            output: Some(path.clone()),
            ..base_args()
        };
        write_reports(&args, &[], Instant::now()).unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("No runs executed"));
    }

    #[test]
    fn write_reports_console_includes_total_time() {
        let path = temp("console.txt");
        let args = Args {
            report: ReportFormat::Console,
            output: Some(path.clone()),
            ..base_args()
        };
        write_reports(&args, &[], Instant::now()).unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("No runs executed."));
        assert!(content.contains("Total time"));
    }

    #[test]
    fn output_target_stdout_writes() {
        let mut target = OutputTarget::new(None).unwrap();
        target.write_all(b"ok").unwrap();
        target.flush().unwrap();
    }
}
