//! Contiguous run blocks.
//!
//! A block is a maximal ascending stretch of run numbers with step 1. Blocks
//! drive both the compact range notation and the panel split of a
//! broken-axis plot.

use crate::error::RangeParseError;
use crate::RunNumber;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An inclusive, contiguous span of run numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "RawRunBlock")
)]
pub struct RunBlock {
    /// First run of the block.
    pub first: RunNumber,
    /// Last run of the block (inclusive).
    pub last: RunNumber,
}

impl RunBlock {
    /// Creates a block spanning `first..=last`.
    #[must_use]
    pub fn new(first: RunNumber, last: RunNumber) -> Self {
        debug_assert!(first <= last, "block {first}:{last} is descending");
        Self { first, last }
    }

    /// Creates a block holding one run.
    #[must_use]
    pub fn single(run: RunNumber) -> Self {
        Self {
            first: run,
            last: run,
        }
    }

    /// Number of runs covered by the block, saturating at `u64::MAX`.
    #[must_use]
    pub fn span(&self) -> u64 {
        self.last.saturating_sub(self.first).saturating_add(1)
    }

    /// Returns true if the block holds exactly one run.
    #[must_use]
    pub fn is_single(&self) -> bool {
        self.first == self.last
    }

    /// Returns true if `run` lies inside the block.
    #[must_use]
    pub fn contains(&self, run: RunNumber) -> bool {
        (self.first..=self.last).contains(&run)
    }

    /// Iterates over every run of the block.
    pub fn runs(&self) -> impl Iterator<Item = RunNumber> {
        self.first..=self.last
    }
}

/// Checked constructor for blocks read back from serialized data.
impl TryFrom<(RunNumber, RunNumber)> for RunBlock {
    type Error = RangeParseError;

    fn try_from((first, last): (RunNumber, RunNumber)) -> Result<Self, Self::Error> {
        if first > last {
            return Err(RangeParseError::DescendingRange { first, last });
        }
        Ok(Self { first, last })
    }
}

#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawRunBlock {
    first: RunNumber,
    last: RunNumber,
}

#[cfg(feature = "serde")]
impl TryFrom<RawRunBlock> for RunBlock {
    type Error = RangeParseError;

    fn try_from(raw: RawRunBlock) -> Result<Self, Self::Error> {
        Self::try_from((raw.first, raw.last))
    }
}

/// Formats as a run range token: `first` or `first:last`.
impl fmt::Display for RunBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single() {
            write!(f, "{}", self.first)
        } else {
            write!(f, "{}:{}", self.first, self.last)
        }
    }
}

/// Splits an ascending run sequence into contiguous blocks.
///
/// A new block starts wherever two neighbours differ by more than one.
/// Repeated values stay in the current block. An empty input gives no
/// blocks.
#[must_use]
pub fn partition(runs: &[RunNumber]) -> Vec<RunBlock> {
    let Some((&head, rest)) = runs.split_first() else {
        return Vec::new();
    };

    let mut blocks = Vec::new();
    let mut first = head;
    let mut prev = head;

    for &run in rest {
        debug_assert!(run >= prev, "partition input must be ascending");
        if run - prev > 1 {
            blocks.push(RunBlock::new(first, prev));
            first = run;
        }
        prev = run;
    }
    blocks.push(RunBlock::new(first, prev));

    blocks
}

/// Like [`partition`], for input in any order.
///
/// Sorts a copy of `runs` before partitioning; the input is untouched.
#[must_use]
pub fn partition_unsorted(runs: &[RunNumber]) -> Vec<RunBlock> {
    let mut sorted = runs.to_vec();
    sorted.sort_unstable();
    partition(&sorted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(blocks: &[RunBlock]) -> Vec<(RunNumber, RunNumber)> {
        blocks.iter().map(|b| (b.first, b.last)).collect()
    }

    #[test]
    fn test_partition_without_gaps() {
        let blocks = partition(&[10, 11, 12, 13]);
        assert_eq!(pairs(&blocks), vec![(10, 13)]);
    }

    #[test]
    fn test_partition_with_gaps() {
        let blocks = partition(&[1, 2, 5, 6, 7, 20]);
        assert_eq!(pairs(&blocks), vec![(1, 2), (5, 7), (20, 20)]);
    }

    #[test]
    fn test_partition_single_run() {
        assert_eq!(pairs(&partition(&[42])), vec![(42, 42)]);
    }

    #[test]
    fn test_partition_empty() {
        assert!(partition(&[]).is_empty());
    }

    #[test]
    fn test_partition_keeps_duplicates_in_block() {
        assert_eq!(pairs(&partition(&[3, 3, 4, 8, 8])), vec![(3, 4), (8, 8)]);
    }

    #[test]
    fn test_partition_unsorted_does_not_mutate() {
        let runs = vec![20, 1, 6, 2, 5, 7];
        let blocks = partition_unsorted(&runs);
        assert_eq!(pairs(&blocks), vec![(1, 2), (5, 7), (20, 20)]);
        assert_eq!(runs, vec![20, 1, 6, 2, 5, 7]);
    }

    #[test]
    fn test_blocks_are_separated_by_gaps() {
        let blocks = partition(&[1, 2, 3, 9, 10, 12, 30, 31, 32]);
        for pair in blocks.windows(2) {
            assert!(pair[1].first - pair[0].last > 1);
            assert!(pair[0].first < pair[1].first);
        }
    }

    #[test]
    fn test_block_display() {
        assert_eq!(RunBlock::single(7).to_string(), "7");
        assert_eq!(RunBlock::new(5, 8).to_string(), "5:8");
    }

    #[test]
    fn test_block_accessors() {
        let block = RunBlock::new(100, 104);
        assert_eq!(block.span(), 5);
        assert!(!block.is_single());
        assert!(block.contains(100));
        assert!(block.contains(104));
        assert!(!block.contains(105));
        assert_eq!(block.runs().collect::<Vec<_>>(), vec![100, 101, 102, 103, 104]);
    }

    #[test]
    fn test_block_try_from_rejects_descending() {
        assert_eq!(RunBlock::try_from((3, 9)), Ok(RunBlock::new(3, 9)));
        assert_eq!(
            RunBlock::try_from((5, 2)),
            Err(RangeParseError::DescendingRange { first: 5, last: 2 })
        );
    }

    #[test]
    fn test_descending_fields_do_not_underflow() {
        let block = RunBlock { first: 5, last: 2 };
        assert_eq!(block.span(), 1);
        assert_eq!(block.runs().count(), 0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_validates_order() {
        let block: RunBlock = serde_json::from_str(r#"{"first":2,"last":5}"#).unwrap();
        assert_eq!(block.span(), 4);

        let err = serde_json::from_str::<RunBlock>(r#"{"first":5,"last":2}"#).unwrap_err();
        assert!(err.to_string().contains("descending run range 5:2"));
    }
}
