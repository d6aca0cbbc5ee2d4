//! Broken-axis plot layout.
//!
//! When the selected runs fall into several contiguous blocks, the plot is
//! split into side-by-side panels that share the y-axis, one per block.
//! This module computes the geometry of those panels; drawing them is left
//! to the plotting front end.
#![allow(clippy::cast_precision_loss)]

use crate::blocks::RunBlock;
use crate::filter::Selection;
use crate::series::Series;
use crate::RunNumber;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Label of the shared x-axis.
pub const RUN_AXIS_LABEL: &str = "Run Number";

/// Label of the goniometer y-axis.
pub const GONIOMETER_AXIS_LABEL: &str = "Goniometer Values (degrees)";

/// Padding added on both sides of each panel's run range.
const X_PADDING: f64 = 1.0;

/// Padding added above and below the goniometer values (degrees).
const Y_PADDING: f64 = 10.0;

/// Rough number of ticks across all panels.
const TICKS_PER_PLOT: usize = 6;

/// Tick placement along a panel's x-axis.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Ticks {
    /// Let the plotting library pick integer ticks.
    Auto,
    /// Ticks at these runs.
    Fixed(Vec<RunNumber>),
}

/// One panel of a broken-axis plot.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Panel {
    /// Runs shown by the panel.
    pub block: RunBlock,
    /// x-axis limits.
    pub x_limits: (f64, f64),
    /// Relative panel width.
    pub width_ratio: u64,
    /// x-axis ticks.
    pub ticks: Ticks,
    /// Draw a break marker on the left edge.
    pub break_left: bool,
    /// Draw a break marker on the right edge.
    pub break_right: bool,
}

/// Panel geometry for a selection.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BrokenAxisLayout {
    /// Panels from left to right.
    pub panels: Vec<Panel>,
    /// Shared goniometer y-limits. `None` lets the plotting library
    /// autoscale, which is what a single panel does.
    pub y_limits: Option<(f64, f64)>,
    /// Label of the secondary (scale) y-axis.
    pub scale_label: String,
}

impl BrokenAxisLayout {
    /// Lays out one panel per block of `selection`.
    ///
    /// `scale_name` is the name of the scale value, shown in the secondary
    /// axis label.
    #[must_use]
    pub fn new(selection: &Selection, series: &Series, scale_name: &str) -> Self {
        let scale_label = format!("Scale ({scale_name})");
        let blocks = &selection.blocks;

        if let [block] = blocks.as_slice() {
            return Self {
                panels: vec![Panel {
                    block: *block,
                    x_limits: x_limits(block),
                    width_ratio: width_ratio(block),
                    ticks: Ticks::Auto,
                    break_left: false,
                    break_right: false,
                }],
                y_limits: None,
                scale_label,
            };
        }

        let spacing = (selection.len() / TICKS_PER_PLOT).max(1) as u64;
        let last = blocks.len().saturating_sub(1);

        let panels = blocks
            .iter()
            .enumerate()
            .map(|(i, block)| Panel {
                block: *block,
                x_limits: x_limits(block),
                width_ratio: width_ratio(block),
                ticks: Ticks::Fixed(block_ticks(block, spacing)),
                break_left: i > 0,
                break_right: i < last,
            })
            .collect();

        Self {
            panels,
            y_limits: series
                .goniometer_bounds()
                .map(|(lo, hi)| (lo - Y_PADDING, hi + Y_PADDING)),
            scale_label,
        }
    }

    /// Returns true if the plot needs more than one panel.
    #[must_use]
    pub fn is_broken(&self) -> bool {
        self.panels.len() > 1
    }
}

fn x_limits(block: &RunBlock) -> (f64, f64) {
    (block.first as f64 - X_PADDING, block.last as f64 + X_PADDING)
}

fn width_ratio(block: &RunBlock) -> u64 {
    block.last.saturating_sub(block.first).saturating_add(2)
}

fn block_ticks(block: &RunBlock, spacing: u64) -> Vec<RunNumber> {
    if block.is_single() {
        return vec![block.first];
    }
    let ticks: Vec<RunNumber> = block.runs().filter(|run| run % spacing == 0).collect();
    if ticks.is_empty() {
        vec![block.first]
    } else {
        ticks
    }
}
