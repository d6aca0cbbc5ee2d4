//! Experiment metadata as loaded from the catalog.

use crate::error::{Error, Result};
use crate::range::compact;
use crate::RunNumber;
use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Metadata of one raw datafile.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RunRecord {
    /// Run number of the datafile.
    pub run_number: RunNumber,
    /// Run title entered by the experimenters.
    pub title: String,
    /// Scale (monitor or proton charge) value.
    pub scale: f64,
    /// Average goniometer angle per axis, in the experiment's axis order.
    pub goniometer: Vec<f64>,
}

impl RunRecord {
    /// Creates a new record.
    pub fn new(
        run_number: RunNumber,
        title: impl Into<String>,
        scale: f64,
        goniometer: Vec<f64>,
    ) -> Self {
        Self {
            run_number,
            title: title.into(),
            scale,
            goniometer,
        }
    }
}

/// All datafile records of one experiment.
///
/// The position of a record in [`Experiment::records`] is its data index.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "RawExperiment")
)]
pub struct Experiment {
    records: Vec<RunRecord>,
    goniometer_axes: Vec<String>,
    scale_label: String,
}

#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawExperiment {
    records: Vec<RunRecord>,
    goniometer_axes: Vec<String>,
    scale_label: String,
}

#[cfg(feature = "serde")]
impl TryFrom<RawExperiment> for Experiment {
    type Error = Error;

    fn try_from(raw: RawExperiment) -> Result<Self> {
        Self::new(raw.records, raw.goniometer_axes, raw.scale_label)
    }
}

impl Experiment {
    /// Creates an experiment from its records.
    ///
    /// # Errors
    /// Returns [`Error::GoniometerMismatch`] if a record does not carry one
    /// value per goniometer axis.
    pub fn new(
        records: Vec<RunRecord>,
        goniometer_axes: Vec<String>,
        scale_label: impl Into<String>,
    ) -> Result<Self> {
        let expected = goniometer_axes.len();
        if let Some((index, record)) = records
            .iter()
            .enumerate()
            .find(|(_, r)| r.goniometer.len() != expected)
        {
            return Err(Error::GoniometerMismatch {
                index,
                found: record.goniometer.len(),
                expected,
            });
        }

        Ok(Self {
            records,
            goniometer_axes,
            scale_label: scale_label.into(),
        })
    }

    /// Records in data order.
    #[must_use]
    pub fn records(&self) -> &[RunRecord] {
        &self.records
    }

    /// Names of the goniometer axes.
    #[must_use]
    pub fn goniometer_axes(&self) -> &[String] {
        &self.goniometer_axes
    }

    /// Label of the scale value (e.g. `proton_charge`).
    #[must_use]
    pub fn scale_label(&self) -> &str {
        &self.scale_label
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the experiment has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Run number of each record, indexed by data index.
    #[must_use]
    pub fn run_numbers(&self) -> Vec<RunNumber> {
        self.records.iter().map(|r| r.run_number).collect()
    }

    /// Maps each distinct title to the compacted range of its runs.
    ///
    /// Titles come out in sorted order.
    #[must_use]
    pub fn titles(&self) -> BTreeMap<String, String> {
        let mut grouped: BTreeMap<&str, Vec<RunNumber>> = BTreeMap::new();
        for record in &self.records {
            grouped
                .entry(record.title.as_str())
                .or_default()
                .push(record.run_number);
        }

        grouped
            .into_iter()
            .filter_map(|(title, runs)| {
                // Every group holds at least one run, so compaction succeeds.
                compact(runs).ok().map(|range| (title.to_string(), range))
            })
            .collect()
    }

    /// Compacted run range of the runs sharing `title`.
    ///
    /// # Errors
    /// Returns [`Error::UnknownTitle`] if no record has that title.
    pub fn runs_for_title(&self, title: &str) -> Result<String> {
        compact(
            self.records
                .iter()
                .filter(|r| r.title == title)
                .map(|r| r.run_number),
        )
        .map_err(|_| Error::UnknownTitle(title.to_string()))
    }
}
