//! Console report.
//!
//! Human-readable, one block per test case: a banner, one line per disk
//! artifact, then a confirmation line or a diff block for each text channel.
//! No totals are printed.

use crate::compare::{DiskOutcome, DiskVerdict, TextVerdict};
use crate::error::CaseError;
use crate::runner::CaseReport;
use std::io::{self, Write};

const PASS: &str = "✅";
const FAIL: &str = "❌";
const BANNER_WIDTH: usize = 36;
const DIFF_RULE_WIDTH: usize = 78;

/// Writes per-case verdicts to an output stream.
pub struct Reporter<W: Write> {
    out: W,
    verbose: bool,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, verbose: bool) -> Self {
        Self { out, verbose }
    }

    /// Print the banner that opens a test case.
    pub fn banner(&mut self, name: &str) -> io::Result<()> {
        writeln!(
            self.out,
            "{} {name} {}",
            ">".repeat(BANNER_WIDTH),
            "<".repeat(BANNER_WIDTH)
        )?;
        self.out.flush()
    }

    /// Print the verdicts (or the error) for a finished test case.
    pub fn case(&mut self, name: &str, result: &Result<CaseReport, CaseError>) -> io::Result<()> {
        match result {
            Ok(report) => {
                for disk in &report.disks {
                    self.disk(disk)?;
                }
                self.text(&report.stdout)?;
                self.text(&report.stderr)?;
                if self.verbose {
                    match report.status.code() {
                        Some(code) => writeln!(self.out, "   exit status: {code}")?,
                        None => writeln!(self.out, "   exit status: {}", report.status)?,
                    }
                }
            }
            Err(e) => writeln!(self.out, "{FAIL} {name}: {e}")?,
        }
        self.out.flush()
    }

    fn disk(&mut self, verdict: &DiskVerdict) -> io::Result<()> {
        let name = &verdict.name;
        match verdict.outcome {
            DiskOutcome::Match => writeln!(self.out, "{PASS} {name}: Matches expected disk"),
            DiskOutcome::NoExpectation if self.verbose => writeln!(
                self.out,
                "{PASS} {name}: Matches expected disk (no {name}_expected present)"
            ),
            DiskOutcome::NoExpectation => {
                writeln!(self.out, "{PASS} {name}: Matches expected disk")
            }
            DiskOutcome::Mismatch => {
                writeln!(self.out, "{FAIL} {name}: DOES NOT MATCH expected disk")
            }
        }
    }

    fn text(&mut self, verdict: &TextVerdict) -> io::Result<()> {
        let channel = verdict.channel;
        if verdict.passed() {
            return writeln!(self.out, "{PASS} {channel} is correct");
        }

        writeln!(
            self.out,
            "{FAIL} ===== {channel} DIFF, (+) extra line, (-) missing line, ( ) is correct ====="
        )?;
        for line in &verdict.diff {
            writeln!(self.out, "{line}")?;
        }
        writeln!(self.out, "{}", "=".repeat(DIFF_RULE_WIDTH))
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
