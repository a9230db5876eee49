#![warn(missing_docs)]
//! Veribench CLI Library
//!
//! CLI infrastructure for benchmark binaries. Build your suite as a list of
//! [`CaseDef`]s and hand it to [`run`] from your main function.
//!
//! # Example
//!
//! ```ignore
//! use veribench::prelude::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     let cases = vec![CaseDef::new(
//!         "count/ints",
//!         "count",
//!         std::fs::read("data/ints.txt")?,
//!         || Box::new(FastCounter::default()) as Box<dyn Workload>,
//!         || Box::new(NaiveCounter::default()) as Box<dyn Workload>,
//!     )];
//!     veribench_cli::run(cases)
//! }
//! ```

mod config;
mod driver;

pub use config::*;
pub use driver::{
    build_report, run_case, run_suite, CaseDef, CaseOutcome, TrialPlan, WorkloadFactory,
};

use clap::{Parser, Subcommand};
use rayon::ThreadPoolBuilder;
use regex::Regex;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;
use veribench_report::{format_human_output, generate_json_report, OutputFormat};

/// Veribench CLI arguments
#[derive(Parser, Debug)]
#[command(name = "veribench")]
#[command(author, version, about = "Veribench - verified micro-benchmark harness")]
pub struct Cli {
    /// Optional subcommand (List, Run); defaults to Run
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Filter cases by regex pattern
    #[arg(default_value = ".*")]
    pub filter: String,

    /// Output format: json, human (defaults to veribench.toml, then human)
    #[arg(long)]
    pub format: Option<String>,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Measurement time budget per case (e.g., "5s", "500ms")
    #[arg(long)]
    pub measurement: Option<String>,

    /// Fixed sample count mode: run exactly N timed iterations per case
    #[arg(long, short = 'n')]
    pub samples: Option<u64>,

    /// Minimum number of timed iterations
    #[arg(long)]
    pub min_iterations: Option<u64>,

    /// Maximum number of timed iterations
    #[arg(long)]
    pub max_iterations: Option<u64>,

    /// Number of threads for parallel case execution
    /// 0 = use all available cores (default), 1 = single-threaded
    #[arg(long, short = 'j', default_value = "0")]
    pub threads: usize,

    /// Pin the run to a single CPU
    #[arg(long)]
    pub pin_cpu: Option<usize>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Internal: Absorb cargo bench's --bench flag
    #[arg(long, hide = true)]
    pub bench: bool,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List all cases in the suite
    List,
    /// Run cases (default)
    Run,
}

/// Run the Veribench CLI with the given suite.
/// This is the main entry point for benchmark binaries.
pub fn run(cases: Vec<CaseDef>) -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli, cases)
}

/// Run the Veribench CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli, cases: Vec<CaseDef>) -> anyhow::Result<()> {
    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("veribench=debug")
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("veribench=info")
            .init();
    }

    // Discover veribench.toml configuration (CLI flags override)
    let config = VeriConfig::discover().unwrap_or_default();

    let format = resolve_format(&cli, &config);

    match cli.command {
        Some(Commands::List) => {
            list_cases(&cli, &cases);
            Ok(())
        }
        Some(Commands::Run) | None => run_cases(&cli, &config, format, cases),
    }
}

/// Resolve the output format: CLI flag wins, then veribench.toml, then human.
fn resolve_format(cli: &Cli, config: &VeriConfig) -> OutputFormat {
    cli.format
        .as_deref()
        .unwrap_or(&config.output.format)
        .parse()
        .unwrap_or(OutputFormat::Human)
}

/// Filter cases by the CLI regex, keeping suite order.
fn filter_cases(cli: &Cli, cases: Vec<CaseDef>) -> Vec<CaseDef> {
    let filter_re = Regex::new(&cli.filter).ok();
    cases
        .into_iter()
        .filter(|case| {
            filter_re
                .as_ref()
                .map(|re| re.is_match(&case.id))
                .unwrap_or(true)
        })
        .collect()
}

fn list_cases(cli: &Cli, cases: &[CaseDef]) {
    println!("Veribench Plan:");

    let filter_re = Regex::new(&cli.filter).ok();
    let mut groups: std::collections::BTreeMap<&str, Vec<&CaseDef>> =
        std::collections::BTreeMap::new();
    for case in cases {
        let matches = filter_re
            .as_ref()
            .map(|re| re.is_match(&case.id))
            .unwrap_or(true);
        if matches {
            groups.entry(&case.group).or_default().push(case);
        }
    }

    let mut total = 0;
    for (group, group_cases) in &groups {
        println!("├── group: {}", group);
        for case in group_cases {
            println!("│   ├── {} ({} bytes)", case.id, case.input.len());
            total += 1;
        }
    }

    println!("{} cases found.", total);
}

/// Build a TrialPlan by layering: veribench.toml defaults → CLI overrides.
fn build_trial_plan(cli: &Cli, config: &VeriConfig) -> TrialPlan {
    let measurement = cli
        .measurement
        .as_deref()
        .unwrap_or(&config.runner.measurement_time);
    let measurement_time_ns = VeriConfig::parse_duration(measurement).unwrap_or(5_000_000_000);

    TrialPlan {
        samples: cli.samples.or(config.runner.samples),
        min_iterations: cli
            .min_iterations
            .or(config.runner.min_iterations)
            .unwrap_or(1),
        max_iterations: cli.max_iterations.or(config.runner.max_iterations),
        measurement_time_ns,
    }
}

fn run_cases(
    cli: &Cli,
    config: &VeriConfig,
    format: OutputFormat,
    cases: Vec<CaseDef>,
) -> anyhow::Result<()> {
    let cases = filter_cases(cli, cases);
    if cases.is_empty() {
        println!("No cases found.");
        return Ok(());
    }

    // Pin before the worker pool spawns: affinity is inherited by threads
    // created afterwards, so the timed loops run on the pinned CPU.
    if let Some(cpu) = cli.pin_cpu.or(config.runner.pin_cpu) {
        if let Err(e) = veribench_core::pin_to_cpu(cpu) {
            eprintln!("Warning: failed to pin to CPU {}: {}", cpu, e);
        }
    }

    // Configure Rayon thread pool for case execution
    let threads = if cli.threads > 0 {
        cli.threads
    } else {
        config.runner.threads.unwrap_or(0)
    };
    if threads > 0 {
        ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .ok();
    }

    let threads_str = if threads == 0 {
        "all".to_string()
    } else {
        threads.to_string()
    };
    println!("Running {} cases, {} threads...\n", cases.len(), threads_str);

    let start_time = Instant::now();
    let plan = build_trial_plan(cli, config);
    let show_progress = format == OutputFormat::Human && cli.output.is_none();
    let outcomes = run_suite(&cases, &plan, show_progress);

    let total_duration_ms = start_time.elapsed().as_secs_f64() * 1000.0;
    let report = build_report(&outcomes, total_duration_ms);

    // Generate output
    let output = match format {
        OutputFormat::Json => generate_json_report(&report)?,
        OutputFormat::Human => format_human_output(&report),
    };

    // Write output
    if let Some(ref path) = cli.output {
        let mut file = std::fs::File::create(path)?;
        file.write_all(output.as_bytes())?;
        println!("Report written to: {}", path.display());
    } else {
        print!("{}", output);
    }

    // Exit with appropriate code
    if report.summary.skipped > 0 {
        eprintln!("\n{} case(s) skipped", report.summary.skipped);
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(args)
    }

    #[test]
    fn test_cli_defaults() {
        let cli = parse(&["veribench"]);
        assert_eq!(cli.filter, ".*");
        assert!(cli.format.is_none());
        assert_eq!(cli.threads, 0);
        assert!(cli.samples.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_config_format_applies_when_cli_silent() {
        let cli = parse(&["veribench"]);
        let config = VeriConfig {
            output: OutputConfig {
                format: "json".to_string(),
            },
            ..Default::default()
        };
        assert_eq!(resolve_format(&cli, &config), OutputFormat::Json);
    }

    #[test]
    fn test_cli_format_overrides_config() {
        let cli = parse(&["veribench", "--format", "human"]);
        let config = VeriConfig {
            output: OutputConfig {
                format: "json".to_string(),
            },
            ..Default::default()
        };
        assert_eq!(resolve_format(&cli, &config), OutputFormat::Human);
    }

    #[test]
    fn test_unknown_format_falls_back_to_human() {
        let cli = parse(&["veribench", "--format", "yaml"]);
        let config = VeriConfig::default();
        assert_eq!(resolve_format(&cli, &config), OutputFormat::Human);
    }

    #[test]
    fn test_cli_overrides_config_in_trial_plan() {
        let cli = parse(&["veribench", "--samples", "8", "--measurement", "2s"]);
        let config = VeriConfig {
            runner: RunnerConfig {
                measurement_time: "9s".to_string(),
                samples: Some(3),
                ..Default::default()
            },
            ..Default::default()
        };

        let plan = build_trial_plan(&cli, &config);
        assert_eq!(plan.samples, Some(8));
        assert_eq!(plan.measurement_time_ns, 2_000_000_000);
    }

    #[test]
    fn test_config_fills_in_when_cli_silent() {
        let cli = parse(&["veribench"]);
        let config = VeriConfig {
            runner: RunnerConfig {
                measurement_time: "250ms".to_string(),
                min_iterations: Some(10),
                max_iterations: Some(100),
                ..Default::default()
            },
            ..Default::default()
        };

        let plan = build_trial_plan(&cli, &config);
        assert_eq!(plan.samples, None);
        assert_eq!(plan.min_iterations, 10);
        assert_eq!(plan.max_iterations, Some(100));
        assert_eq!(plan.measurement_time_ns, 250_000_000);
    }

    #[test]
    fn test_filter_cases_by_regex() {
        let cli = parse(&["veribench", "minify/.*"]);

        struct Never;
        impl veribench_logic::Workload for Never {
            fn run(&mut self, _input: &[u8]) -> bool {
                true
            }
            fn result(&self) -> veribench_logic::DocValue {
                veribench_logic::DocValue::from(1u64)
            }
            fn item_count(&self) -> u64 {
                1
            }
        }

        let mk = |id: &str, group: &str| {
            CaseDef::new(
                id,
                group,
                &b"x"[..],
                || Box::new(Never) as Box<dyn veribench_logic::Workload>,
                || Box::new(Never) as Box<dyn veribench_logic::Workload>,
            )
        };

        let cases = vec![mk("minify/twitter", "minify"), mk("find/github", "find")];
        let kept = filter_cases(&cli, cases);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "minify/twitter");
    }
}
