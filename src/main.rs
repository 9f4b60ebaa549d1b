mod compare;
mod error;
mod invoker;
mod loader;
mod logging;
mod report;
mod runner;
mod sandbox;
mod schema;

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Subject executable used when neither the CLI nor the suite config names one.
const DEFAULT_EXECUTABLE: &str = "./fs";

#[derive(Parser)]
#[command(name = "fsconform")]
#[command(about = "A conformance test runner for filesystem simulator executables")]
#[command(version)]
struct Cli {
    /// Show verbose output (exit statuses, debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run every test case against the subject executable
    Run {
        /// Directory holding the test cases
        #[arg(default_value = "tests")]
        tests: PathBuf,
        /// Executable under test (overrides suite config; default ./fs)
        #[arg(short, long)]
        executable: Option<PathBuf>,
        /// Filter test cases by name (substring match)
        #[arg(short, long)]
        filter: Option<String>,
        /// Kill the subject after this many seconds (default: wait forever)
        #[arg(short, long)]
        timeout: Option<u64>,
        /// Stop at the first test case that cannot be evaluated
        #[arg(long)]
        fail_fast: bool,
        /// Leave sandboxes on disk for inspection
        #[arg(long)]
        keep_sandbox: bool,
    },
    /// List test cases and check their fixture layout
    List {
        /// Directory holding the test cases
        #[arg(default_value = "tests")]
        tests: PathBuf,
    },
    /// Scaffold a new test case directory
    Init {
        /// Path of the new test case (its name should start with "test")
        path: PathBuf,
    },
    /// Output the suite config schema
    Schema,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Command::Run {
            tests,
            executable,
            filter,
            timeout,
            fail_fast,
            keep_sandbox,
        } => {
            let suite_config = match loader::load_suite_config(&tests) {
                Ok(config) => config.unwrap_or_default(),
                Err(e) => {
                    eprintln!("Error loading suite config: {e}");
                    std::process::exit(1);
                }
            };

            let cases = match loader::find_cases(&tests, filter.as_deref()) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("Error finding test cases: {e}");
                    std::process::exit(1);
                }
            };

            if cases.is_empty() {
                eprintln!("No test cases found in: {}", tests.display());
                std::process::exit(1);
            }

            // CLI flags override suite config
            let executable = executable
                .or(suite_config.executable)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_EXECUTABLE));
            let timeout = timeout.or(suite_config.timeout).map(Duration::from_secs);
            let sandbox_root = match suite_config.sandbox_root.as_deref().map(std::path::absolute) {
                Some(Err(e)) => {
                    eprintln!("Error resolving sandbox root: {e}");
                    std::process::exit(1);
                }
                Some(Ok(p)) => Some(p),
                None => None,
            };
            let executable = match std::path::absolute(&executable) {
                Ok(p) => p,
                Err(e) => {
                    eprintln!("Error resolving executable {}: {e}", executable.display());
                    std::process::exit(1);
                }
            };

            let config = runner::RunConfig {
                invoker: invoker::Invoker::new(executable, timeout),
                sandbox: sandbox::SandboxOptions {
                    root: sandbox_root,
                    keep: keep_sandbox,
                },
                fail_fast: fail_fast || suite_config.fail_fast,
            };
            tracing::info!(
                executable = %config.invoker.executable().display(),
                cases = cases.len(),
                "running suite"
            );

            let mut reporter = report::Reporter::new(std::io::stdout().lock(), cli.verbose);
            match runner::run_suite(&cases, &config, &mut reporter) {
                Ok(runner::SuiteOutcome::Completed) => {}
                Ok(runner::SuiteOutcome::Aborted { case }) => {
                    eprintln!("Aborting suite: test case {case} could not be evaluated");
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("Error writing report: {e}");
                    std::process::exit(1);
                }
            }
        }
        Command::List { tests } => {
            let cases = match loader::find_cases(&tests, None) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("Error finding test cases: {e}");
                    std::process::exit(1);
                }
            };

            if cases.is_empty() {
                eprintln!("No test cases found in: {}", tests.display());
                std::process::exit(1);
            }

            let mut incomplete = 0;
            for case in &cases {
                let missing: Vec<&str> = [
                    invoker::INPUT_NAME,
                    compare::Channel::Stdout.expected_file(),
                    compare::Channel::Stderr.expected_file(),
                ]
                .into_iter()
                .filter(|name| !case.dir.join(name).exists())
                .collect();

                if missing.is_empty() {
                    println!("✓ {}", case.name);
                } else {
                    eprintln!("✗ {}: missing {}", case.name, missing.join(", "));
                    incomplete += 1;
                }
                for disk in expected_disks(&case.dir) {
                    println!("    expects {disk}");
                }
            }

            if incomplete > 0 {
                eprintln!("\n{incomplete} test case(s) incomplete");
                std::process::exit(1);
            }
            println!("\nAll {} test case(s) complete", cases.len());
        }
        Command::Init { path } => {
            if path.exists() {
                eprintln!("Error: already exists: {}", path.display());
                std::process::exit(1);
            }
            let is_case_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(loader::CASE_PREFIX));
            if !is_case_name {
                eprintln!(
                    "Warning: {} does not start with \"{}\" and will not be discovered",
                    path.display(),
                    loader::CASE_PREFIX
                );
            }

            if let Err(e) = scaffold_case(&path) {
                eprintln!("Error creating test case: {e}");
                std::process::exit(1);
            }
            println!("Created: {}", path.display());
        }
        Command::Schema => {
            let schema = schema::generate_schema();
            match serde_json::to_string_pretty(&schema) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    eprintln!("Error serializing schema: {e}");
                    std::process::exit(1);
                }
            }
        }
    }
}

/// Names of disk artifacts that carry an expected image in `fixture`.
fn expected_disks(fixture: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(fixture) else {
        return Vec::new();
    };
    let mut disks: Vec<String> = entries
        .flatten()
        .filter_map(|e| e.file_name().into_string().ok())
        .filter_map(|name| {
            name.strip_suffix(compare::disk::EXPECTED_SUFFIX)
                .filter(|stem| compare::disk::is_disk_name(stem))
                .map(str::to_string)
        })
        .collect();
    disks.sort();
    disks
}

/// Create an empty test case fixture at `path`.
fn scaffold_case(path: &Path) -> std::io::Result<()> {
    fs::create_dir_all(path)?;
    for name in [
        invoker::INPUT_NAME,
        compare::Channel::Stdout.expected_file(),
        compare::Channel::Stderr.expected_file(),
    ] {
        fs::write(path.join(name), "")?;
    }
    Ok(())
}
