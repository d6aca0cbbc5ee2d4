//! Run range strings.
//!
//! A run range string lists run numbers as comma-separated tokens, each a
//! single run (`105`) or an inclusive range (`100:104`). [`compact`] builds
//! the shortest such string for a set of runs and [`expand`] turns one back
//! into run numbers.

use crate::blocks::{partition, RunBlock};
use crate::error::{Error, RangeParseError, Result};
use crate::RunNumber;

/// Upper bound on the number of runs a single string may expand to.
pub const MAX_EXPANDED_RUNS: usize = 1_000_000;

const TOKEN_SEPARATOR: char = ',';
const RANGE_SEPARATOR: char = ':';

/// Compacts run numbers into a run range string.
///
/// Input may be unsorted and contain duplicates. Contiguous runs collapse
/// into `first:last`, isolated runs stay as bare numbers.
///
/// # Errors
/// Returns [`Error::EmptyRunSet`] if `runs` yields nothing.
pub fn compact<I>(runs: I) -> Result<String>
where
    I: IntoIterator<Item = RunNumber>,
{
    let mut runs: Vec<RunNumber> = runs.into_iter().collect();
    if runs.is_empty() {
        return Err(Error::EmptyRunSet);
    }
    runs.sort_unstable();
    runs.dedup();

    Ok(join_blocks(&partition(&runs)))
}

/// Joins blocks into a run range string.
#[must_use]
pub fn join_blocks(blocks: &[RunBlock]) -> String {
    blocks
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Parses a run range string into its blocks, in token order.
///
/// Surrounding whitespace on tokens and range bounds is ignored. A range
/// with equal bounds (`7:7`) is a single run.
///
/// # Errors
/// Returns a [`RangeParseError`] for empty tokens, tokens with more than
/// one `:`, non-integer parts, and descending ranges.
pub fn parse_blocks(s: &str) -> std::result::Result<Vec<RunBlock>, RangeParseError> {
    s.split(TOKEN_SEPARATOR)
        .enumerate()
        .map(|(position, token)| parse_token(position, token.trim()))
        .collect()
}

fn parse_token(position: usize, token: &str) -> std::result::Result<RunBlock, RangeParseError> {
    if token.is_empty() {
        return Err(RangeParseError::EmptyToken { position });
    }

    let parts: Vec<&str> = token.split(RANGE_SEPARATOR).collect();
    match parts.as_slice() {
        [single] => Ok(RunBlock::single(parse_run(token, single)?)),
        [first, last] => {
            let first = parse_run(token, first)?;
            let last = parse_run(token, last)?;
            if first > last {
                return Err(RangeParseError::DescendingRange { first, last });
            }
            Ok(RunBlock::new(first, last))
        }
        _ => Err(RangeParseError::MalformedToken {
            token: token.to_string(),
        }),
    }
}

fn parse_run(token: &str, value: &str) -> std::result::Result<RunNumber, RangeParseError> {
    value
        .trim()
        .parse()
        .map_err(|_| RangeParseError::InvalidRunNumber {
            token: token.to_string(),
            value: value.trim().to_string(),
        })
}

/// Expands a run range string into run numbers.
///
/// Tokens are expanded in the order written; the result is neither sorted
/// nor deduplicated.
///
/// At most [`MAX_EXPANDED_RUNS`] (one million) runs are produced. A longer
/// range, even a well-formed one such as `1:2000000`, is rejected with
/// [`RangeParseError::TooManyRuns`].
///
/// # Errors
/// Returns a [`RangeParseError`] if the string is malformed or would
/// expand to more than [`MAX_EXPANDED_RUNS`] runs.
pub fn expand(s: &str) -> std::result::Result<Vec<RunNumber>, RangeParseError> {
    let blocks = parse_blocks(s)?;

    let total = blocks
        .iter()
        .try_fold(0usize, |acc, block| {
            usize::try_from(block.span())
                .ok()
                .and_then(|span| acc.checked_add(span))
                .filter(|&sum| sum <= MAX_EXPANDED_RUNS)
        })
        .ok_or(RangeParseError::TooManyRuns {
            limit: MAX_EXPANDED_RUNS,
        })?;

    let mut runs = Vec::with_capacity(total);
    for block in &blocks {
        runs.extend(block.runs());
    }
    Ok(runs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compact_single() {
        assert_eq!(compact([7]).unwrap(), "7");
    }

    #[test]
    fn test_compact_contiguous() {
        assert_eq!(compact([5, 6, 7, 8]).unwrap(), "5:8");
    }

    #[test]
    fn test_compact_mixed() {
        assert_eq!(compact([1, 2, 3, 10, 15, 16]).unwrap(), "1:3,10,15:16");
    }

    #[test]
    fn test_compact_unsorted_with_duplicates() {
        assert_eq!(compact([16, 3, 1, 10, 2, 15, 3, 1]).unwrap(), "1:3,10,15:16");
    }

    #[test]
    fn test_compact_empty_fails() {
        assert_eq!(compact(Vec::new()), Err(Error::EmptyRunSet));
    }

    #[test]
    fn test_expand_single() {
        assert_eq!(expand("7").unwrap(), vec![7]);
    }

    #[test]
    fn test_expand_range() {
        assert_eq!(expand("5:8").unwrap(), vec![5, 6, 7, 8]);
    }

    #[test]
    fn test_expand_mixed() {
        assert_eq!(expand("1:3,10,15:16").unwrap(), vec![1, 2, 3, 10, 15, 16]);
    }

    #[test]
    fn test_expand_keeps_token_order() {
        assert_eq!(expand("20,3:4,1").unwrap(), vec![20, 3, 4, 1]);
        assert_eq!(expand("4,4").unwrap(), vec![4, 4]);
    }

    #[test]
    fn test_expand_equal_bounds() {
        assert_eq!(expand("9:9").unwrap(), vec![9]);
    }

    #[test]
    fn test_expand_tolerates_whitespace() {
        assert_eq!(expand(" 1 : 3 , 10 ").unwrap(), vec![1, 2, 3, 10]);
    }

    #[test]
    fn test_expand_rejects_garbage() {
        assert!(matches!(
            expand("abc"),
            Err(RangeParseError::InvalidRunNumber { .. })
        ));
        assert!(matches!(
            expand("1:x"),
            Err(RangeParseError::InvalidRunNumber { .. })
        ));
        assert!(matches!(
            expand("-4"),
            Err(RangeParseError::InvalidRunNumber { .. })
        ));
    }

    #[test]
    fn test_expand_rejects_three_parts() {
        assert_eq!(
            expand("1:2:3"),
            Err(RangeParseError::MalformedToken {
                token: "1:2:3".to_string()
            })
        );
    }

    #[test]
    fn test_expand_rejects_descending() {
        assert_eq!(
            expand("5:2"),
            Err(RangeParseError::DescendingRange { first: 5, last: 2 })
        );
    }

    #[test]
    fn test_expand_rejects_empty_tokens() {
        assert_eq!(expand(""), Err(RangeParseError::EmptyToken { position: 0 }));
        assert_eq!(
            expand("1,,2"),
            Err(RangeParseError::EmptyToken { position: 1 })
        );
        assert_eq!(
            expand("1,2,"),
            Err(RangeParseError::EmptyToken { position: 2 })
        );
    }

    #[test]
    fn test_expand_rejects_huge_ranges() {
        assert_eq!(
            expand("1:99999999999"),
            Err(RangeParseError::TooManyRuns {
                limit: MAX_EXPANDED_RUNS
            })
        );
        assert!(expand(&format!("0:{}", u64::MAX)).is_err());
    }

    #[test]
    fn test_expand_limit_is_inclusive() {
        let runs = expand(&format!("1:{MAX_EXPANDED_RUNS}")).unwrap();
        assert_eq!(runs.len(), MAX_EXPANDED_RUNS);

        let err = expand(&format!("1:{MAX_EXPANDED_RUNS},0")).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("run range expands to more than {MAX_EXPANDED_RUNS} runs")
        );
    }

    #[test]
    fn test_parse_blocks() {
        let blocks = parse_blocks("1:3,10").unwrap();
        assert_eq!(blocks, vec![RunBlock::new(1, 3), RunBlock::single(10)]);
        assert_eq!(join_blocks(&blocks), "1:3,10");
    }
}
