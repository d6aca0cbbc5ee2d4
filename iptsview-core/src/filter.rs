//! Run selection by membership.
//!
//! Selecting runs never reorders the underlying data: the result lists the
//! matching records in the order they were loaded, together with their data
//! indices and the contiguous blocks they form.

use crate::blocks::{partition_unsorted, RunBlock};
use crate::error::Result;
use crate::range::expand;
use crate::RunNumber;
use std::collections::HashSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Runs picked out of an experiment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Selection {
    /// Selected run numbers, in data order.
    pub runs: Vec<RunNumber>,
    /// Data index of each selected run.
    pub indices: Vec<usize>,
    /// Contiguous blocks of the selected runs, ascending.
    pub blocks: Vec<RunBlock>,
}

impl Selection {
    /// Number of selected records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    /// Returns true if nothing was selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Iterates over `(run, data_index)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (RunNumber, usize)> + '_ {
        self.runs.iter().copied().zip(self.indices.iter().copied())
    }
}

/// Selects the records whose run number appears in a run range string.
///
/// `run_numbers[i]` is the run number of data record `i`.
///
/// # Errors
/// Returns [`crate::Error::Parse`] if `range` is malformed; nothing is
/// selected in that case.
pub fn select(run_numbers: &[RunNumber], range: &str) -> Result<Selection> {
    let wanted = expand(range)?;
    Ok(select_runs(run_numbers, &wanted))
}

/// Selects the records whose run number appears in `wanted`.
#[must_use]
pub fn select_runs(run_numbers: &[RunNumber], wanted: &[RunNumber]) -> Selection {
    let wanted: HashSet<RunNumber> = wanted.iter().copied().collect();

    let (runs, indices): (Vec<_>, Vec<_>) = run_numbers
        .iter()
        .enumerate()
        .filter(|(_, run)| wanted.contains(*run))
        .map(|(index, &run)| (run, index))
        .unzip();

    let blocks = partition_unsorted(&runs);
    log::debug!(
        "selected {} of {} records in {} block(s)",
        runs.len(),
        run_numbers.len(),
        blocks.len()
    );

    Selection {
        runs,
        indices,
        blocks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, RangeParseError};

    #[test]
    fn test_select_preserves_data_order() {
        let run_numbers = [105, 101, 102, 110, 103, 104];
        let selection = select(&run_numbers, "101:104").unwrap();

        assert_eq!(selection.runs, vec![101, 102, 103, 104]);
        assert_eq!(selection.indices, vec![1, 2, 4, 5]);
        assert_eq!(selection.blocks, vec![RunBlock::new(101, 104)]);
    }

    #[test]
    fn test_select_with_gaps() {
        let run_numbers = [1, 2, 3, 5, 6, 7, 20, 21];
        let selection = select(&run_numbers, "1:2,5:7,20").unwrap();

        assert_eq!(selection.runs, vec![1, 2, 5, 6, 7, 20]);
        assert_eq!(selection.indices, vec![0, 1, 3, 4, 5, 6]);
        assert_eq!(
            selection.blocks,
            vec![
                RunBlock::new(1, 2),
                RunBlock::new(5, 7),
                RunBlock::single(20)
            ]
        );
    }

    #[test]
    fn test_select_ignores_unknown_runs() {
        let selection = select(&[10, 11, 12], "11,500:502").unwrap();
        assert_eq!(selection.runs, vec![11]);
        assert_eq!(selection.indices, vec![1]);
    }

    #[test]
    fn test_select_nothing() {
        let selection = select(&[10, 11, 12], "40").unwrap();
        assert!(selection.is_empty());
        assert!(selection.blocks.is_empty());
    }

    #[test]
    fn test_select_repeated_run_numbers() {
        // The same run can appear in several datafiles.
        let selection = select(&[7, 8, 7], "7").unwrap();
        assert_eq!(selection.indices, vec![0, 2]);
        assert_eq!(selection.blocks, vec![RunBlock::single(7)]);
    }

    #[test]
    fn test_select_rejects_bad_input() {
        let err = select(&[1, 2, 3], "1:2:3").unwrap_err();
        assert!(matches!(
            err,
            Error::Parse(RangeParseError::MalformedToken { .. })
        ));
    }

    #[test]
    fn test_selection_iter() {
        let selection = select_runs(&[4, 5, 6], &[6, 4]);
        let pairs: Vec<_> = selection.iter().collect();
        assert_eq!(pairs, vec![(4, 0), (6, 2)]);
        assert_eq!(selection.len(), 2);
    }
}
