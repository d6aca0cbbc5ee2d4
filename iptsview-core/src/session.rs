//! Browser session state.
//!
//! A [`BrowserSession`] holds what the experiment browser shows: the loaded
//! experiment, its title list, the run range text and the current plot.
//! Selecting by title and typing a run range both go through the same pure
//! [`select`] call; a failed update leaves the session as it was.

use crate::error::{Error, Result};
use crate::experiment::Experiment;
use crate::filter::{select, Selection};
use crate::layout::BrokenAxisLayout;
use crate::series::Series;
use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Everything needed to draw the current plot.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlotView {
    /// Runs shown.
    pub selection: Selection,
    /// Values plotted against the runs.
    pub series: Series,
    /// Panel geometry.
    pub layout: BrokenAxisLayout,
}

impl PlotView {
    /// Builds the view of `range` within `experiment`.
    ///
    /// # Errors
    /// Returns [`Error::Parse`] for malformed range text.
    pub fn build(experiment: &Experiment, range: &str) -> Result<Self> {
        let selection = select(&experiment.run_numbers(), range)?;
        let series = Series::extract(experiment, &selection)?;
        let layout = BrokenAxisLayout::new(&selection, &series, experiment.scale_label());
        Ok(Self {
            selection,
            series,
            layout,
        })
    }
}

/// State of one experiment browser.
#[derive(Debug, Default)]
pub struct BrowserSession {
    experiment: Option<Experiment>,
    titles: BTreeMap<String, String>,
    runs_text: String,
    view: Option<PlotView>,
}

impl BrowserSession {
    /// Creates an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the experiment and resets the plot.
    pub fn load(&mut self, experiment: Experiment) {
        self.clear();
        self.titles = experiment.titles();
        log::info!(
            "loaded {} records with {} titles",
            experiment.len(),
            self.titles.len()
        );
        self.experiment = Some(experiment);
    }

    /// Drops the experiment, the titles, the run text and the plot.
    pub fn clear(&mut self) {
        self.experiment = None;
        self.titles.clear();
        self.runs_text.clear();
        self.view = None;
    }

    /// The loaded experiment, if any.
    #[must_use]
    pub fn experiment(&self) -> Option<&Experiment> {
        self.experiment.as_ref()
    }

    /// Titles of the loaded experiment with their run ranges.
    #[must_use]
    pub fn titles(&self) -> &BTreeMap<String, String> {
        &self.titles
    }

    /// Current run range text.
    #[must_use]
    pub fn runs_text(&self) -> &str {
        &self.runs_text
    }

    /// Current plot, if one has been built.
    #[must_use]
    pub fn view(&self) -> Option<&PlotView> {
        self.view.as_ref()
    }

    /// Shows the runs sharing `title`.
    ///
    /// The run text becomes the title's range.
    ///
    /// # Errors
    /// Returns [`Error::NoExperiment`] or [`Error::UnknownTitle`]; the
    /// session is unchanged on error.
    pub fn select_title(&mut self, title: &str) -> Result<&PlotView> {
        let experiment = self.experiment.as_ref().ok_or(Error::NoExperiment)?;
        let range = self
            .titles
            .get(title)
            .ok_or_else(|| Error::UnknownTitle(title.to_string()))?;

        let view = PlotView::build(experiment, range)?;
        self.runs_text = range.clone();
        Ok(self.view.insert(view))
    }

    /// Shows the runs listed in user-entered range text.
    ///
    /// # Errors
    /// Returns [`Error::NoExperiment`] or [`Error::Parse`]; the previous
    /// plot and run text are kept on error.
    pub fn apply_runs(&mut self, text: &str) -> Result<&PlotView> {
        let experiment = self.experiment.as_ref().ok_or(Error::NoExperiment)?;
        let view = PlotView::build(experiment, text).inspect_err(|err| {
            log::warn!("rejected run range '{text}': {err}");
        })?;

        self.runs_text = text.to_string();
        Ok(self.view.insert(view))
    }
}
