//! Whitespace-insensitive line diffing for stdout and stderr.

use similar::{Algorithm, ChangeTag, TextDiff};
use std::fmt;

/// Which captured stream a verdict refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Stdout,
    Stderr,
}

impl Channel {
    /// Name of the fixture file holding this channel's expected text.
    pub fn expected_file(self) -> &'static str {
        match self {
            Channel::Stdout => "stdout_expected",
            Channel::Stderr => "stderr_expected",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Stdout => f.write_str("STDOUT"),
            Channel::Stderr => f.write_str("STDERR"),
        }
    }
}

/// Classification of one diff entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffTag {
    /// Present in both expected and actual.
    Unchanged,
    /// Present only in actual: an extra line.
    Inserted,
    /// Present only in expected: a missing line.
    Removed,
}

impl DiffTag {
    pub fn marker(self) -> char {
        match self {
            DiffTag::Unchanged => ' ',
            DiffTag::Inserted => '+',
            DiffTag::Removed => '-',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub tag: DiffTag,
    pub text: String,
}

impl fmt::Display for DiffLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.tag.marker(), self.text)
    }
}

/// Result of comparing one text channel.
#[derive(Debug, Clone)]
pub struct TextVerdict {
    pub channel: Channel,
    pub diff: Vec<DiffLine>,
}

impl TextVerdict {
    /// True when every diff entry is unchanged.
    pub fn passed(&self) -> bool {
        self.diff.iter().all(|line| line.tag == DiffTag::Unchanged)
    }

    /// Number of inserted or removed entries.
    pub fn mismatches(&self) -> usize {
        self.diff
            .iter()
            .filter(|line| line.tag != DiffTag::Unchanged)
            .count()
    }
}

/// Split `text` into lines, trim each, and drop the ones left empty.
///
/// A lone `\r` ends a line just like `\n` does.
pub fn normalize_lines(text: &str) -> Vec<&str> {
    text.split(['\n', '\r'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Diff normalized `expected` against normalized `actual`.
pub fn compare_text(channel: Channel, expected: &str, actual: &str) -> TextVerdict {
    let expected = normalize_lines(expected);
    let actual = normalize_lines(actual);

    let diff = TextDiff::configure()
        .algorithm(Algorithm::Lcs)
        .diff_slices(expected.as_slice(), actual.as_slice());

    let diff = diff
        .iter_all_changes()
        .map(|change| DiffLine {
            tag: match change.tag() {
                ChangeTag::Equal => DiffTag::Unchanged,
                ChangeTag::Insert => DiffTag::Inserted,
                ChangeTag::Delete => DiffTag::Removed,
            },
            text: change.value().to_string(),
        })
        .collect();

    TextVerdict { channel, diff }
}
