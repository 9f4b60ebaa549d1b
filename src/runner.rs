//! Test execution engine.
//!
//! Runs each test case in its own sandbox, one after another, and hands the
//! verdicts to the reporter as soon as a case finishes.

use crate::compare::{
    Channel, DiskVerdict, TextVerdict, compare_disk, compare_text, discover_disks,
};
use crate::error::CaseError;
use crate::invoker::Invoker;
use crate::loader::TestCase;
use crate::report::Reporter;
use crate::sandbox::{Sandbox, SandboxOptions};
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitStatus;

/// Everything needed to run a suite.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub invoker: Invoker,
    pub sandbox: SandboxOptions,
    /// Stop at the first case that cannot be evaluated.
    pub fail_fast: bool,
}

/// Verdicts for one fully evaluated test case.
#[derive(Debug)]
pub struct CaseReport {
    pub status: ExitStatus,
    pub disks: Vec<DiskVerdict>,
    pub stdout: TextVerdict,
    pub stderr: TextVerdict,
}

impl CaseReport {
    pub fn passed(&self) -> bool {
        self.disks.iter().all(DiskVerdict::passed) && self.stdout.passed() && self.stderr.passed()
    }
}

/// How a suite run ended.
#[derive(Debug, PartialEq, Eq)]
pub enum SuiteOutcome {
    /// Every discovered case was attempted.
    Completed,
    /// `fail_fast` stopped the run at the named case.
    Aborted { case: String },
}

/// Run `cases` in order, reporting each as it completes.
///
/// Mismatches never stop the run. A case that cannot be evaluated is reported
/// and skipped, unless `fail_fast` is set.
pub fn run_suite<W: Write>(
    cases: &[TestCase],
    config: &RunConfig,
    reporter: &mut Reporter<W>,
) -> io::Result<SuiteOutcome> {
    for case in cases {
        let _span = tracing::info_span!("case", name = %case.name).entered();

        reporter.banner(&case.name)?;
        let result = run_case(case, config);
        reporter.case(&case.name, &result)?;

        match &result {
            Ok(report) => tracing::debug!(passed = report.passed(), "case finished"),
            Err(e) => {
                tracing::warn!(error = %e, "case could not be evaluated");
                if config.fail_fast {
                    return Ok(SuiteOutcome::Aborted {
                        case: case.name.clone(),
                    });
                }
            }
        }
    }
    Ok(SuiteOutcome::Completed)
}

/// Run a single case: sandbox, invoke, compare disks, compare text channels.
///
/// The sandbox is dropped (and removed) before this returns, on every path.
pub fn run_case(case: &TestCase, config: &RunConfig) -> Result<CaseReport, CaseError> {
    let sandbox =
        Sandbox::from_fixture(&case.dir, &config.sandbox).map_err(|source| CaseError::Sandbox {
            fixture: case.dir.clone(),
            source,
        })?;

    let expected_stdout = read_expected(&case.dir, Channel::Stdout)?;
    let expected_stderr = read_expected(&case.dir, Channel::Stderr)?;

    let output = config.invoker.run(sandbox.path())?;

    let disks = discover_disks(sandbox.path())?
        .iter()
        .map(|disk| compare_disk(disk))
        .collect::<Result<Vec<_>, _>>()?;

    let stdout = compare_text(Channel::Stdout, &expected_stdout, &output.stdout);
    let stderr = compare_text(Channel::Stderr, &expected_stderr, &output.stderr);
    tracing::debug!(
        disks = disks.len(),
        stdout_mismatches = stdout.mismatches(),
        stderr_mismatches = stderr.mismatches(),
        "compared outputs"
    );

    Ok(CaseReport {
        status: output.status,
        disks,
        stdout,
        stderr,
    })
}

fn read_expected(fixture: &Path, channel: Channel) -> Result<String, CaseError> {
    let path = fixture.join(channel.expected_file());
    let bytes = std::fs::read(&path).map_err(|source| CaseError::MissingExpectation {
        path: path.clone(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
