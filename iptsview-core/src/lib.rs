//! iptsview-core: Run ranges and run selection for experiment browsing.
//!
//! This crate provides the compact run range notation (`1:3,10,15:16`),
//! the split of run lists into contiguous blocks, selection of catalog
//! records by run range, and the plot-ready series and broken-axis layout
//! built from a selection.
//!

pub mod blocks;
pub mod error;
pub mod experiment;
pub mod filter;
pub mod layout;
pub mod range;
pub mod series;
pub mod session;

/// Run number of a datafile.
pub type RunNumber = u64;

pub use blocks::{partition, partition_unsorted, RunBlock};
pub use error::{Error, RangeParseError, Result};
pub use experiment::{Experiment, RunRecord};
pub use filter::{select, select_runs, Selection};
pub use layout::{BrokenAxisLayout, Panel, Ticks};
pub use range::{compact, expand, MAX_EXPANDED_RUNS};
pub use series::{AxisSeries, Series};
pub use session::{BrowserSession, PlotView};
