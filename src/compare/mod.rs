//! Output comparators.
//!
//! Text channels are normalized and line-diffed; disk images are compared
//! byte for byte. Neither comparator returns an error for a mismatch.

pub mod disk;
pub mod text;

pub use disk::{DiskOutcome, DiskVerdict, compare_disk, discover_disks};
pub use text::{Channel, TextVerdict, compare_text};
