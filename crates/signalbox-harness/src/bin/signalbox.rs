//! CLI entrypoint for the signalbox controller and its verification tools.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use signalbox_core::{
    Driver, DriverConfig, InputSource, ReportMode, SignalError, ViolationPolicy,
};
use signalbox_harness::{
    ConsoleDisplay, ConsoleInput, ConsoleReporter, Explorer, LogEmitter, LogEntry, LogLevel,
    LogReporter, Outcome, RunReport, RunStatus, ScriptedInput, SharedLog, Tee, format_record,
    parse_bits, replay,
};

/// Four-way intersection signal controller with runtime safety checks.
#[derive(Debug, Parser)]
#[command(name = "signalbox")]
#[command(about = "Traffic light controller with safety monitoring")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Drive the controller from the console or a script.
    Run {
        /// Power samples such as "110111". Reads stdin interactively if absent.
        #[arg(long)]
        script: Option<String>,
        /// Violation report mode (`silent` or `verbose`). Overrides SIGNALBOX_REPORT.
        #[arg(long)]
        report_mode: Option<String>,
        /// Shorthand for `--report-mode verbose`.
        #[arg(long)]
        verbose: bool,
        /// Reaction to a violation (`halt` or `continue`). Overrides SIGNALBOX_POLICY.
        #[arg(long)]
        policy: Option<String>,
        /// Stop after this many steps.
        #[arg(long)]
        max_steps: Option<u64>,
        /// Write a structured JSONL log of every step and violation.
        #[arg(long)]
        log: Option<PathBuf>,
        /// Output report path (markdown).
        #[arg(long)]
        report: Option<PathBuf>,
        /// Output report path (JSON).
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Enumerate every reachable state over both power inputs.
    Explore {
        /// Maximum number of steps per path. Unbounded if absent.
        #[arg(long)]
        depth: Option<usize>,
        /// Output report path (markdown). Printed to stdout if absent.
        #[arg(long)]
        report: Option<PathBuf>,
        /// Output report path (JSON).
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Replay a power sequence from power-up with the halting policy.
    Replay {
        /// Power samples such as "1111".
        #[arg(long)]
        inputs: String,
    },
    /// Validate a structured JSONL log file.
    ValidateLog {
        /// Path to the log file.
        #[arg(long)]
        path: PathBuf,
    },
}

struct RunArgs {
    script: Option<String>,
    config: DriverConfig,
    log: Option<PathBuf>,
    report: Option<PathBuf>,
    json: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            script,
            report_mode,
            verbose,
            policy,
            max_steps,
            log,
            report,
            json,
        } => {
            let mut config = DriverConfig::from_env().with_max_steps(max_steps);
            if let Some(mode) = report_mode {
                config = config.with_report_mode(ReportMode::from_str_loose(&mode));
            }
            if verbose {
                config = config.with_report_mode(ReportMode::Verbose);
            }
            if let Some(policy) = policy {
                config = config.with_policy(ViolationPolicy::from_str_loose(&policy));
            }
            run(RunArgs {
                script,
                config,
                log,
                report,
                json,
            })?;
        }
        Command::Explore {
            depth,
            report,
            json,
        } => {
            eprintln!(
                "Exploring reachable states (depth bound: {})",
                depth.map_or_else(|| String::from("none"), |d| d.to_string())
            );
            let result = Explorer::new().with_depth_bound(depth)?.run();
            let md = result.to_markdown();
            match &report {
                Some(path) => {
                    write_file(path, &md)?;
                    eprintln!("Report written to {}", path.display());
                }
                None => print!("{md}"),
            }
            if let Some(path) = &json {
                write_file(path, &result.to_json())?;
                eprintln!("JSON report written to {}", path.display());
            }
            eprintln!(
                "States: {}, Transitions: {}, Max depth: {}, Complete: {}",
                result.states, result.transitions, result.max_depth, result.complete
            );
            if let Some(cex) = &result.counterexample {
                return Err(format!(
                    "bad state reachable at step {} with inputs '{}'",
                    cex.step,
                    cex.script()
                )
                .into());
            }
        }
        Command::Replay { inputs } => {
            let samples = parse_bits(&inputs)?;
            eprintln!("Replaying {} samples", samples.len());
            let outcome = replay(&samples)?;
            for record in &outcome.records {
                println!("{}", format_record(record));
            }
            for violation in &outcome.violations {
                eprintln!("{violation}");
            }
            if let Some(step) = outcome.halted_at {
                return Err(format!("replay halted at step {step}").into());
            }
            eprintln!("Replay clean");
        }
        Command::ValidateLog { path } => {
            eprintln!("Validating {}", path.display());
            let (valid, errors) = signalbox_harness::structured_log::validate_log_file(&path)?;
            for err in &errors {
                eprintln!("{err}");
            }
            println!("{valid} valid line(s), {} error(s)", errors.len());
            if !errors.is_empty() {
                return Err(format!("{} invalid log line(s)", errors.len()).into());
            }
        }
    }

    Ok(())
}

fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.config;
    eprintln!(
        "Running controller (report: {}, policy: {})",
        config.report_mode.as_str(),
        config.policy.as_str()
    );

    let input: Box<dyn InputSource> = match &args.script {
        Some(script) => Box::new(ScriptedInput::parse(script)?),
        None => Box::new(ConsoleInput::new(std::io::stdin().lock(), std::io::stdout())),
    };

    let run_id = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_default();
    let log = match &args.log {
        Some(path) => Some(SharedLog::new(LogReporter::new(LogEmitter::to_file(
            path, &run_id,
        )?))),
        None => None,
    };

    let observer = Tee(ConsoleDisplay::new(std::io::stdout()), log.clone());
    let reporter = Tee(ConsoleReporter::new(std::io::stderr()), log.clone());
    let mut driver = Driver::new(input, observer, reporter, config);

    let (status, last, violations, halt) = match driver.run() {
        Ok(summary) => {
            let status = if summary.violations.is_empty() {
                RunStatus::Clean
            } else {
                RunStatus::ViolationsReported
            };
            (status, summary.last, summary.violations, None)
        }
        Err(SignalError::InvariantViolation { step, violations }) => {
            let mut seen = driver.reported().to_vec();
            seen.extend_from_slice(&violations);
            (
                RunStatus::Halted,
                driver.automaton().record(),
                seen,
                Some(SignalError::InvariantViolation { step, violations }),
            )
        }
        Err(err) => return Err(err.into()),
    };
    let metrics = driver.metrics().snapshot();
    let config = *driver.config();
    let (_, _, Tee(console, _)) = driver.into_parts();
    if console.failed_checks() > 0 && !config.report_mode.is_verbose() {
        eprintln!(
            "{} failed check(s) suppressed; rerun with --verbose for details",
            console.failed_checks()
        );
    }

    if let Some(log) = &log {
        let outcome = if status == RunStatus::Clean {
            Outcome::Pass
        } else {
            Outcome::Fail
        };
        log.emit_entry(
            LogEntry::new(String::new(), LogLevel::Info, "run_end")
                .with_record(&last)
                .with_outcome(outcome)
                .with_details(serde_json::json!({ "metrics": metrics })),
        )?;
        log.flush()?;
        if let Some(path) = &args.log {
            eprintln!("Log written to {} ({} entries)", path.display(), log.emitted());
        }
    }

    let report = RunReport::new(&config, status, Some(last), violations, metrics);
    if let Some(path) = &args.report {
        write_file(path, &report.to_markdown())?;
        eprintln!("Report written to {}", path.display());
    }
    if let Some(path) = &args.json {
        write_file(path, &report.to_json())?;
        eprintln!("JSON report written to {}", path.display());
    }

    eprintln!(
        "Steps: {}, Checks: {}, Failed: {}",
        metrics.steps, metrics.checks, metrics.failed_checks
    );
    match halt {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

fn write_file(path: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)
}
