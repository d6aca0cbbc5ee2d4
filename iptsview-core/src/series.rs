//! Plot series for a selection.

use crate::error::{Error, Result};
use crate::experiment::Experiment;
use crate::filter::Selection;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Values of one goniometer axis across a selection.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AxisSeries {
    /// Lower-cased axis name, used as the legend label.
    pub name: String,
    /// One value per selected run.
    pub values: Vec<f64>,
}

/// Goniometer and scale values indexed like [`Selection::runs`].
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Series {
    /// One series per goniometer axis.
    pub goniometer: Vec<AxisSeries>,
    /// Scale value per selected run.
    pub scale: Vec<f64>,
}

impl Series {
    /// Gathers the values of the selected records.
    ///
    /// # Errors
    /// Returns [`Error::IndexOutOfRange`] if the selection was built against
    /// a different experiment.
    pub fn extract(experiment: &Experiment, selection: &Selection) -> Result<Self> {
        let records = experiment.records();
        let picked = selection
            .indices
            .iter()
            .map(|&index| {
                records.get(index).ok_or(Error::IndexOutOfRange {
                    index,
                    len: records.len(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let goniometer = experiment
            .goniometer_axes()
            .iter()
            .enumerate()
            .map(|(axis, name)| AxisSeries {
                name: name.to_lowercase(),
                values: picked.iter().map(|r| r.goniometer[axis]).collect(),
            })
            .collect();

        Ok(Self {
            goniometer,
            scale: picked.iter().map(|r| r.scale).collect(),
        })
    }

    /// Smallest and largest goniometer value over every axis.
    ///
    /// Returns `None` when there are no values.
    #[must_use]
    pub fn goniometer_bounds(&self) -> Option<(f64, f64)> {
        self.goniometer
            .iter()
            .flat_map(|axis| axis.values.iter().copied())
            .fold(None, |bounds, v| match bounds {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}
