//! apicase CLI - Compose, run and report HTTP API test cases

mod compose;
mod session;
mod storage;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use chrono::Utc;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use apicase_core::generator::request_to_http;
use apicase_core::summary::{format_distribution, format_pct};
use apicase_core::validate::to_terminal;
use apicase_core::{
    CaseStatus, CaseStore, Config, JsonFileStore, Outcome, TestCase, VerdictPolicy,
    VerdictStatus, build_snapshot, summarize, to_http_file, validate_test_case,
};
use apicase_runner::{BlockingTransport, Runner};

use compose::{CaseArgs, find_case, select_cases};

#[derive(Parser)]
#[command(name = "apicase")]
#[command(about = "Compose, run and report HTTP API test cases")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, global = true, default_value = "terminal")]
    output: OutputFormat,

    /// Strict mode (warnings fail the run). Use --strict false to disable.
    #[arg(long, global = true, default_value_t = true, action = ArgAction::Set)]
    strict: bool,

    /// Verbose output (debug logging unless RUST_LOG is set)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: .apicase.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config file
    Init,

    /// Compose a test case and save it
    Add {
        #[command(flatten)]
        case: CaseArgs,
    },

    /// Compose a test case and send it once
    Send {
        #[command(flatten)]
        case: CaseArgs,

        /// Save the test case (with its result) if it passes
        #[arg(long)]
        save: bool,
    },

    /// List saved test cases
    List,

    /// Show the request a saved test case sends
    Show {
        /// Test case id (or unique prefix)
        id: String,

        /// Print secrets instead of ***
        #[arg(long)]
        reveal: bool,
    },

    /// Delete a saved test case
    Remove {
        /// Test case id (or unique prefix)
        id: String,
    },

    /// Copy a saved test case
    Duplicate {
        /// Test case id (or unique prefix)
        id: String,
    },

    /// Run saved test cases and write reports
    Run {
        /// Test case ids (default: all, in stored order)
        ids: Vec<String>,

        /// Report directory (default: output_dir from config)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Export saved test cases as a .http file
    Export {
        /// Test case ids (default: all)
        ids: Vec<String>,

        /// Destination file (default: stdout)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Export JSON Schema for the test case store
    Schema,
}

#[derive(Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OutputFormat {
    Terminal,
    Json,
    Silent,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(3)
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(p) => Config::load(p)?,
        None => Config::load_default()?,
    };
    tracing::debug!(store = %config.store.display(), "config loaded");
    Ok(config)
}

fn open_store(config: &Config) -> JsonFileStore {
    let mut store = JsonFileStore::open(&config.store);
    store.on_external_change(Box::new(|cases| {
        tracing::info!(count = cases.len(), "test case store changed on disk; reloaded");
    }));
    store
}

fn run(cli: Cli) -> Result<i32> {
    let policy = VerdictPolicy { strict: cli.strict };

    match cli.command {
        Commands::Init => {
            let config_path = ".apicase.toml";
            if Path::new(config_path).exists() {
                eprintln!("{config_path} already exists");
                return Ok(1);
            }

            std::fs::write(config_path, Config::example())?;
            println!("Created {config_path}");
            println!("\nEdit the file to configure:");
            println!("  - store: where test cases are kept");
            println!("  - output_dir: where run reports go");
            println!("  - [executor]: CI metadata for Allure");
            Ok(0)
        }

        Commands::Add { case } => {
            let cfg = load_config(cli.config.as_deref())?;
            let case = case.to_test_case()?;
            print_findings(&case, cli.output);
            let mut store = open_store(&cfg);
            session::add_case(&mut store, case.clone())?;

            match cli.output {
                OutputFormat::Terminal => println!("Added {} ({})", case.case_name, case.id),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&case)?),
                OutputFormat::Silent => {}
            }
            Ok(0)
        }

        Commands::Send { case, save } => {
            let cfg = load_config(cli.config.as_deref())?;
            let mut case = case.to_test_case()?;
            print_findings(&case, cli.output);

            let runner = Runner::new(BlockingTransport::new()?);
            let outcome = runner.run_test_case(&case)?;

            match cli.output {
                OutputFormat::Terminal => println!("{}", outcome_line(&outcome)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
                OutputFormat::Silent => {}
            }

            if save {
                if outcome.ok {
                    case.last_run = Some((&outcome).into());
                    let mut store = open_store(&cfg);
                    session::add_case(&mut store, case.clone())?;
                    if cli.output == OutputFormat::Terminal {
                        println!("Saved {} ({})", case.case_name, case.id);
                    }
                } else if cli.output != OutputFormat::Silent {
                    eprintln!("Not saved: the request did not pass");
                }
            }

            Ok(policy.exit_code(std::slice::from_ref(&outcome)))
        }

        Commands::List => {
            let cfg = load_config(cli.config.as_deref())?;
            let cases = open_store(&cfg).load()?;
            match cli.output {
                OutputFormat::Terminal => {
                    if cases.is_empty() {
                        println!("No test cases in {}", cfg.store.display());
                    }
                    for case in &cases {
                        println!("{}", list_line(case));
                    }
                }
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&cases)?),
                OutputFormat::Silent => {}
            }
            Ok(0)
        }

        Commands::Show { id, reveal } => {
            let cfg = load_config(cli.config.as_deref())?;
            let cases = open_store(&cfg).load()?;
            let case = find_case(&cases, &id)?;
            match cli.output {
                OutputFormat::Terminal => {
                    println!("### {} ({})", case.case_name, case.id);
                    println!("{}", request_to_http(&build_snapshot(case, !reveal)));
                    if let Some(last) = &case.last_run {
                        println!("\n# Last run: {}", outcome_summary(
                            last.ok,
                            last.warning.is_some(),
                            last.status,
                            last.time_ms,
                            last.error.as_deref(),
                        ));
                    }
                }
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(case)?),
                OutputFormat::Silent => {}
            }
            Ok(0)
        }

        Commands::Remove { id } => {
            let cfg = load_config(cli.config.as_deref())?;
            let removed = session::remove_case(&mut open_store(&cfg), &id)?;
            if cli.output != OutputFormat::Silent {
                println!("Removed {} ({})", removed.case_name, removed.id);
            }
            Ok(0)
        }

        Commands::Duplicate { id } => {
            let cfg = load_config(cli.config.as_deref())?;
            let copy = session::duplicate_case(&mut open_store(&cfg), &id)?;
            if cli.output != OutputFormat::Silent {
                println!("Created {} ({})", copy.case_name, copy.id);
            }
            Ok(0)
        }

        Commands::Run { ids, output_dir } => {
            let mut cfg = load_config(cli.config.as_deref())?;
            if let Some(dir) = output_dir {
                cfg.output_dir = dir;
            }
            let mut store = open_store(&cfg);
            let runner = Runner::new(BlockingTransport::new()?);
            let terminal = cli.output == OutputFormat::Terminal;

            let started_at = Utc::now();
            let (cases, outcomes) = session::execute(&store, &runner, &ids, |idx, outcome| {
                if terminal {
                    println!("[{}] {}", idx + 1, outcome_line(outcome));
                }
            })?;
            let finished_at = Utc::now();

            store.poll_external_change()?;
            session::record(&mut store, &outcomes)?;

            let summary = summarize(&outcomes);
            let verdict = policy.verdict(&outcomes);

            let saved = storage::save_report(&storage::ReportData {
                config: &cfg,
                cases: &cases,
                outcomes: &outcomes,
                summary: &summary,
                verdict: &verdict,
                started_at,
                finished_at,
            });

            match cli.output {
                OutputFormat::Terminal => {
                    let icon = if verdict.status == VerdictStatus::Pass {
                        "PASS"
                    } else {
                        "FAIL"
                    };
                    println!("\n{icon}: {}", verdict.reason);
                    println!(
                        "  Cases: {} total, {} passed, {} failed ({} pass rate)",
                        summary.total,
                        summary.passed,
                        summary.failed,
                        format_pct(summary.pass_rate())
                    );
                    if !summary.status_distribution.is_empty() {
                        println!(
                            "  Status: {}",
                            format_distribution(&summary.status_distribution)
                        );
                    }
                    println!("  Exit code: {}", verdict.exit_code);
                }
                OutputFormat::Json => {
                    let json_output = serde_json::json!({
                        "verdict": {
                            "status": verdict.status.to_string(),
                            "exit_code": verdict.exit_code,
                            "reason": verdict.reason,
                        },
                        "stats": summary,
                        "outcomes": outcomes,
                        "report_dir": saved.as_ref().ok().map(|s| s.dir.display().to_string()),
                    });
                    println!("{}", serde_json::to_string_pretty(&json_output)?);
                }
                OutputFormat::Silent => {}
            }

            match saved {
                Ok(saved) => {
                    for w in &saved.warnings {
                        eprintln!("Warning: report artifact not written: {w}");
                    }
                    if cli.output != OutputFormat::Silent {
                        eprintln!("Report saved: {}", saved.dir.display());
                        if let Some(html) = saved.html() {
                            eprintln!("Open in a browser: {}", html.display());
                        }
                    }
                }
                Err(e) => eprintln!("Warning: failed to save report: {e}"),
            }

            Ok(verdict.exit_code)
        }

        Commands::Export { ids, out } => {
            let cfg = load_config(cli.config.as_deref())?;
            let cases = select_cases(&open_store(&cfg).load()?, &ids)?;
            let content = to_http_file(&cases, cfg.mask_headers);
            match out {
                Some(path) => {
                    std::fs::write(&path, content)?;
                    if cli.output != OutputFormat::Silent {
                        println!("Exported {} test cases to {}", cases.len(), path.display());
                    }
                }
                None => println!("{content}"),
            }
            Ok(0)
        }

        Commands::Schema => {
            let schema = apicase_core::schema::generate_schema();
            println!("{schema}");
            Ok(0)
        }
    }
}

/// Print validation findings for a freshly composed case.
fn print_findings(case: &TestCase, output: OutputFormat) {
    let checks = validate_test_case(case);
    if !checks.is_empty() && output != OutputFormat::Silent {
        eprintln!("Validation:\n{}", to_terminal(&checks));
    }
}

fn outcome_line(outcome: &Outcome) -> String {
    format!(
        "{} {}",
        outcome.case_name,
        outcome_summary(
            outcome.ok,
            outcome.warning.is_some(),
            outcome.status,
            outcome.time_ms,
            outcome.error.as_deref(),
        )
    )
}

fn outcome_summary(
    ok: bool,
    warned: bool,
    status: Option<u16>,
    time_ms: u64,
    error: Option<&str>,
) -> String {
    let badge = match (ok, warned) {
        (false, _) => CaseStatus::Failed,
        (true, true) => CaseStatus::Warning,
        (true, false) => CaseStatus::Passed,
    };
    let status = status.map_or_else(|| "---".to_string(), |s| s.to_string());
    let mut line = format!("[{}] {status} in {time_ms} ms", badge.as_str().to_uppercase());
    if let Some(error) = error {
        line.push_str(&format!(" ({error})"));
    }
    line
}

fn list_line(case: &TestCase) -> String {
    let badge = case.last_run.as_ref().map_or("-", |last| {
        if !last.ok {
            "FAIL"
        } else if last.warning.is_some() {
            "WARN"
        } else {
            "PASS"
        }
    });
    let short_id: String = case.id.chars().take(8).collect();
    format!(
        "{badge:<4} {short_id}  {:<6} {}  {}",
        case.method.as_str(),
        case.case_name,
        case.url
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use apicase_core::LastRun;
    use chrono::TimeZone;

    #[test]
    fn cli_parses_run_with_ids() {
        let cli = Cli::try_parse_from(["apicase", "run", "a", "b", "--strict", "false"]).unwrap();
        assert!(!cli.strict);
        match cli.command {
            Commands::Run { ids, output_dir } => {
                assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);
                assert!(output_dir.is_none());
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn cli_parses_send_with_save() {
        let cli = Cli::try_parse_from([
            "apicase",
            "send",
            "https://api.example.com/ok",
            "-e",
            "200",
            "--save",
            "--output",
            "json",
        ])
        .unwrap();
        assert!(cli.output == OutputFormat::Json);
        assert!(matches!(cli.command, Commands::Send { save: true, .. }));
    }

    #[test]
    fn outcome_summary_badges() {
        assert_eq!(
            outcome_summary(true, false, Some(200), 12, None),
            "[PASSED] 200 in 12 ms"
        );
        assert_eq!(
            outcome_summary(false, false, None, 3000, Some("timeout of 3000ms exceeded")),
            "[FAILED] --- in 3000 ms (timeout of 3000ms exceeded)"
        );
        assert_eq!(
            outcome_summary(true, true, Some(201), 5, None),
            "[WARNING] 201 in 5 ms"
        );
    }

    #[test]
    fn list_line_shows_last_run_badge() {
        let mut case = TestCase::new("Health", "https://api.example.com/health");
        case.id = "0123456789abcdef".into();
        assert!(list_line(&case).starts_with("-    01234567  GET"));

        case.last_run = Some(LastRun {
            ok: false,
            status: Some(500),
            status_text: None,
            time_ms: 1,
            warning: None,
            error: None,
            executed_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        });
        assert!(list_line(&case).starts_with("FAIL 01234567"));
    }
}
