//! Catalog datafile listings.
//!
//! A listing is what the catalog returns for one experiment: a JSON array
//! of datafile objects carrying the projected fields. Fields are addressed
//! by dotted paths such as `metadata.entry.title`; a path resolves either
//! through nested objects or as a literal key.

use crate::instrument::Instrument;
use crate::{Error, Result};
use iptsview_core::{Experiment, RunNumber, RunRecord};
use serde_json::Value;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Largest accepted IPTS number.
pub const MAX_IPTS: u32 = 1_000_000_000;

/// Field holding a datafile's path in catalog listings.
const LOCATION_KEY: &str = "location";

/// Experiment (proposal) number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ipts(u32);

impl Ipts {
    /// Creates an IPTS number.
    ///
    /// # Errors
    /// Returns [`Error::InvalidIpts`] above [`MAX_IPTS`].
    pub fn new(number: u32) -> Result<Self> {
        if number > MAX_IPTS {
            return Err(Error::InvalidIpts(number.to_string()));
        }
        Ok(Self(number))
    }

    /// The bare number.
    #[must_use]
    pub fn number(self) -> u32 {
        self.0
    }
}

/// Formats as the catalog's experiment name, `IPTS-<n>`.
impl fmt::Display for Ipts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IPTS-{}", self.0)
    }
}

/// Parses `1234` or `IPTS-1234`.
impl FromStr for Ipts {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix("IPTS-").unwrap_or(trimmed);
        let number = digits
            .parse()
            .map_err(|_| Error::InvalidIpts(s.to_string()))?;
        Self::new(number)
    }
}

/// Source of datafile listings.
pub trait DatafileSource {
    /// Lists the raw datafiles of one experiment.
    ///
    /// # Errors
    /// Returns an error if the listing cannot be fetched or decoded.
    fn datafiles(&self, instrument: &Instrument, ipts: Ipts) -> Result<Vec<Value>>;
}

/// Listings exported to disk as `<root>/<instrument>/IPTS-<n>.json`.
#[derive(Debug, Clone)]
pub struct CatalogDirectory {
    root: PathBuf,
}

impl CatalogDirectory {
    /// Creates a source rooted at `root`.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Path of the listing for one experiment.
    #[must_use]
    pub fn listing_path(&self, instrument: &Instrument, ipts: Ipts) -> PathBuf {
        self.root.join(&instrument.name).join(format!("{ipts}.json"))
    }
}

impl DatafileSource for CatalogDirectory {
    fn datafiles(&self, instrument: &Instrument, ipts: Ipts) -> Result<Vec<Value>> {
        let path = self.listing_path(instrument, ipts);
        log::debug!("reading listing {}", path.display());
        let file = File::open(&path)?;
        let reader = BufReader::new(file);
        let listing: Value = serde_json::from_reader(reader)?;
        match listing {
            Value::Array(datafiles) => Ok(datafiles),
            _ => Err(Error::InvalidFormat(format!(
                "{}: expected a JSON array of datafiles",
                path.display()
            ))),
        }
    }
}

/// Fetches an experiment's listing and builds the experiment.
///
/// Datafiles whose location does not end with the instrument's raw
/// extension are skipped.
///
/// # Errors
/// Returns an error if the listing cannot be fetched or a datafile lacks a
/// projected field.
pub fn load_experiment<S: DatafileSource + ?Sized>(
    source: &S,
    instrument: &Instrument,
    ipts: Ipts,
) -> Result<Experiment> {
    let mut datafiles = source.datafiles(instrument, ipts)?;
    let listed = datafiles.len();
    datafiles.retain(|datafile| is_raw(datafile, &instrument.extension));
    if datafiles.len() < listed {
        log::debug!(
            "skipped {} non-raw datafiles in {ipts}",
            listed - datafiles.len()
        );
    }

    let experiment = experiment_from_datafiles(&datafiles, instrument)?;
    log::info!(
        "{} {ipts}: {} datafiles",
        instrument.name,
        experiment.len()
    );
    Ok(experiment)
}

fn is_raw(datafile: &Value, extension: &str) -> bool {
    match lookup(datafile, LOCATION_KEY) {
        Some(Value::String(location)) => location.ends_with(extension),
        _ => true,
    }
}

/// Builds an experiment from datafile objects.
///
/// # Errors
/// Returns [`Error::MissingField`] or [`Error::InvalidField`] for the first
/// datafile that lacks or garbles a projected field.
pub fn experiment_from_datafiles(
    datafiles: &[Value],
    instrument: &Instrument,
) -> Result<Experiment> {
    let goniometer_keys: Vec<String> = instrument
        .goniometer
        .iter()
        .map(|axis| instrument.goniometer_key(axis))
        .collect();

    let records = datafiles
        .iter()
        .enumerate()
        .map(|(index, datafile)| {
            let field = FieldReader { datafile, index };
            Ok(RunRecord {
                run_number: field.run_number(&instrument.run_number)?,
                title: field.text(&instrument.title)?,
                scale: field.number(&instrument.scale)?,
                goniometer: goniometer_keys
                    .iter()
                    .map(|key| field.number(key))
                    .collect::<Result<_>>()?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Experiment::new(
        records,
        instrument.goniometer.clone(),
        instrument.scale_name(),
    )?)
}

/// Resolves a dotted path in a JSON object.
fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if let Some(direct) = value.get(path) {
        return Some(direct);
    }
    path.split('.')
        .try_fold(value, |node, segment| node.get(segment))
}

/// Run number written as a float, e.g. `5000.0`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn whole_run(value: f64) -> Option<RunNumber> {
    (value.fract() == 0.0 && value >= 0.0 && value < RunNumber::MAX as f64)
        .then_some(value as RunNumber)
}

struct FieldReader<'a> {
    datafile: &'a Value,
    index: usize,
}

impl FieldReader<'_> {
    fn get(&self, key: &str) -> Result<&Value> {
        match lookup(self.datafile, key) {
            Some(Value::Null) | None => Err(Error::MissingField {
                index: self.index,
                field: key.to_string(),
            }),
            Some(value) => Ok(value),
        }
    }

    fn invalid(&self, key: &str, value: &Value) -> Error {
        Error::InvalidField {
            index: self.index,
            field: key.to_string(),
            value: value.to_string(),
        }
    }

    fn run_number(&self, key: &str) -> Result<RunNumber> {
        let value = self.get(key)?;
        let run = match value {
            Value::Number(n) => n.as_u64().or_else(|| n.as_f64().and_then(whole_run)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        run.ok_or_else(|| self.invalid(key, value))
    }

    fn number(&self, key: &str) -> Result<f64> {
        let value = self.get(key)?;
        let number = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        number.ok_or_else(|| self.invalid(key, value))
    }

    fn text(&self, key: &str) -> Result<String> {
        let value = self.get(key)?;
        match value {
            Value::String(s) => Ok(s.clone()),
            Value::Number(_) | Value::Bool(_) => Ok(value.to_string()),
            _ => Err(self.invalid(key, value)),
        }
    }
}
