//! iptsview-io: Instrument tables, catalog listings and output files.
//!
//! This crate turns catalog datafile listings into
//! [`iptsview_core::Experiment`]s using per-instrument field tables, and
//! writes selected run data out as CSV or JSON.
//!

pub mod catalog;
mod error;
pub mod instrument;
mod writer;

pub use catalog::{
    experiment_from_datafiles, load_experiment, CatalogDirectory, DatafileSource, Ipts,
};
pub use error::{Error, Result};
pub use instrument::{Instrument, InstrumentTable};
pub use writer::SelectionWriter;
