//! Instrument parameters for catalog queries.
//!
//! Each instrument names the catalog fields holding the run number, title,
//! scale and goniometer angles of its raw datafiles. A built-in table covers
//! the single-crystal instruments at SNS and HFIR; a JSON file can override
//! or extend it.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

const SNS: &str = "SNS";
const HFIR: &str = "HFIR";
const RAW_EXTENSION: &str = ".nxs.h5";
const RUN_NUMBER_KEY: &str = "indexed.run_number";
const TITLE_KEY: &str = "metadata.entry.title";
const PROTON_CHARGE_KEY: &str = "metadata.entry.proton_charge";
const MONITOR_KEY: &str = "metadata.entry.monitor1.total_counts";
const DASLOGS_KEY: &str = "metadata.entry.daslogs";

/// Catalog parameters of one instrument.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    /// Instrument name as known to the catalog (e.g. `TOPAZ`, `HB2C`).
    pub name: String,
    /// Facility (`SNS` or `HFIR`).
    pub facility: String,
    /// Raw datafile extension.
    pub extension: String,
    /// Field holding the run number.
    pub run_number: String,
    /// Field holding the run title.
    pub title: String,
    /// Field holding the scale value.
    pub scale: String,
    /// Parent field of the goniometer logs.
    pub goniometer_entry: String,
    /// Goniometer motor names.
    pub goniometer: Vec<String>,
}

impl Instrument {
    fn new(name: &str, facility: &str, scale: &str, goniometer: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            facility: facility.to_string(),
            extension: RAW_EXTENSION.to_string(),
            run_number: RUN_NUMBER_KEY.to_string(),
            title: TITLE_KEY.to_string(),
            scale: scale.to_string(),
            goniometer_entry: DASLOGS_KEY.to_string(),
            goniometer: goniometer.iter().map(ToString::to_string).collect(),
        }
    }

    /// Field holding the average value of a goniometer motor.
    #[must_use]
    pub fn goniometer_key(&self, axis: &str) -> String {
        format!(
            "{}.{}.average_value",
            self.goniometer_entry,
            axis.to_lowercase()
        )
    }

    /// Fields to request from the catalog, in record order: run number,
    /// title, scale, then one per goniometer motor.
    #[must_use]
    pub fn projection(&self) -> Vec<String> {
        let mut fields = vec![
            self.run_number.clone(),
            self.title.clone(),
            self.scale.clone(),
        ];
        fields.extend(self.goniometer.iter().map(|axis| self.goniometer_key(axis)));
        fields
    }

    /// Short name of the scale value (last segment of its field).
    #[must_use]
    pub fn scale_name(&self) -> &str {
        self.scale.rsplit('.').next().unwrap_or(&self.scale)
    }
}

/// Named instrument parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstrumentTable {
    instruments: BTreeMap<String, Instrument>,
}

impl Default for InstrumentTable {
    fn default() -> Self {
        Self::builtin()
    }
}

// Override entries: any field left out keeps the built-in value of the
// instrument with the same label.
#[derive(Deserialize, Default)]
#[serde(default)]
struct JsonInstrument {
    name: Option<String>,
    facility: Option<String>,
    extension: Option<String>,
    run_number: Option<String>,
    title: Option<String>,
    scale: Option<String>,
    goniometer_entry: Option<String>,
    goniometer: Option<Vec<String>>,
}

impl JsonInstrument {
    fn merge(self, label: &str, base: Option<Instrument>) -> Result<Instrument> {
        let missing = |field: &str| {
            Error::InvalidFormat(format!("instrument '{label}' is missing '{field}'"))
        };

        let base = match base {
            Some(base) => base,
            None => Instrument {
                name: self.name.clone().unwrap_or_else(|| label.to_string()),
                facility: self.facility.clone().ok_or_else(|| missing("facility"))?,
                extension: RAW_EXTENSION.to_string(),
                run_number: RUN_NUMBER_KEY.to_string(),
                title: TITLE_KEY.to_string(),
                scale: self.scale.clone().ok_or_else(|| missing("scale"))?,
                goniometer_entry: DASLOGS_KEY.to_string(),
                goniometer: self.goniometer.clone().ok_or_else(|| missing("goniometer"))?,
            },
        };

        Ok(Instrument {
            name: self.name.unwrap_or(base.name),
            facility: self.facility.unwrap_or(base.facility),
            extension: self.extension.unwrap_or(base.extension),
            run_number: self.run_number.unwrap_or(base.run_number),
            title: self.title.unwrap_or(base.title),
            scale: self.scale.unwrap_or(base.scale),
            goniometer_entry: self.goniometer_entry.unwrap_or(base.goniometer_entry),
            goniometer: self.goniometer.unwrap_or(base.goniometer),
        })
    }
}

impl InstrumentTable {
    /// The built-in SNS and HFIR single-crystal instruments.
    #[must_use]
    pub fn builtin() -> Self {
        let entries = [
            (
                "SNAP",
                Instrument::new("SNAP", SNS, PROTON_CHARGE_KEY, &["BL3:Mot:OmegaMot"]),
            ),
            (
                "CORELLI",
                Instrument::new(
                    "CORELLI",
                    SNS,
                    PROTON_CHARGE_KEY,
                    &[
                        "BL9:Mot:Sample:Axis1",
                        "BL9:Mot:Sample:Axis2",
                        "BL9:Mot:Sample:Axis3",
                    ],
                ),
            ),
            (
                "TOPAZ",
                Instrument::new(
                    "TOPAZ",
                    SNS,
                    PROTON_CHARGE_KEY,
                    &[
                        "BL12:Mot:goniokm:omega",
                        "BL12:Mot:goniokm:chi",
                        "BL12:Mot:goniokm:phi",
                    ],
                ),
            ),
            (
                "MANDI",
                Instrument::new(
                    "MANDI",
                    SNS,
                    PROTON_CHARGE_KEY,
                    &["BL11B:Mot:omega", "BL11B:Mot:chi", "BL11B:Mot:phi"],
                ),
            ),
            (
                "WAND²",
                Instrument::new("HB2C", HFIR, MONITOR_KEY, &["HB2C:Mot:s1"]),
            ),
            (
                "DEMAND",
                Instrument::new(
                    "HB3A",
                    HFIR,
                    MONITOR_KEY,
                    &["HB3A:Mot:omega", "HB3A:Mot:chi", "HB3A:Mot:phi"],
                ),
            ),
        ];

        Self {
            instruments: entries
                .into_iter()
                .map(|(label, instrument)| (label.to_string(), instrument))
                .collect(),
        }
    }

    /// Loads the built-in table with overrides from a JSON file.
    ///
    /// The file maps instrument labels to (partial) parameter sets.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if a new
    /// instrument lacks a required field.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let overrides: BTreeMap<String, JsonInstrument> = serde_json::from_reader(reader)?;
        Self::builtin().with_overrides(overrides)
    }

    /// Loads the built-in table with overrides from a JSON string.
    ///
    /// # Errors
    /// Returns an error if the JSON cannot be parsed or a new instrument
    /// lacks a required field.
    pub fn from_json(json: &str) -> Result<Self> {
        let overrides: BTreeMap<String, JsonInstrument> = serde_json::from_str(json)?;
        Self::builtin().with_overrides(overrides)
    }

    fn with_overrides(mut self, overrides: BTreeMap<String, JsonInstrument>) -> Result<Self> {
        for (label, entry) in overrides {
            let base = self.instruments.remove(&label);
            let instrument = entry.merge(&label, base)?;
            log::debug!("instrument '{label}' configured as {}", instrument.name);
            self.instruments.insert(label, instrument);
        }
        Ok(self)
    }

    /// Instrument labels in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.instruments.keys().map(String::as_str)
    }

    /// Iterates over `(label, instrument)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Instrument)> {
        self.instruments.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Looks up an instrument by label.
    ///
    /// Matching ignores case and accepts `2` for `²`, so `wand2` finds
    /// `WAND²`.
    ///
    /// # Errors
    /// Returns [`Error::UnknownInstrument`] if nothing matches.
    pub fn get(&self, label: &str) -> Result<&Instrument> {
        if let Some(instrument) = self.instruments.get(label) {
            return Ok(instrument);
        }
        let wanted = normalize(label);
        self.instruments
            .iter()
            .find(|(key, _)| normalize(key) == wanted)
            .map(|(_, instrument)| instrument)
            .ok_or_else(|| Error::UnknownInstrument(label.to_string()))
    }
}

fn normalize(label: &str) -> String {
    label.trim().to_uppercase().replace('²', "2")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table() {
        let table = InstrumentTable::builtin();
        let names: Vec<_> = table.names().collect();
        assert_eq!(
            names,
            vec!["CORELLI", "DEMAND", "MANDI", "SNAP", "TOPAZ", "WAND²"]
        );
    }

    #[test]
    fn test_lookup_is_forgiving() {
        let table = InstrumentTable::default();
        assert_eq!(table.get("topaz").unwrap().name, "TOPAZ");
        assert_eq!(table.get("wand2").unwrap().name, "HB2C");
        assert_eq!(table.get("WAND²").unwrap().facility, "HFIR");
        assert!(matches!(
            table.get("VENUS"),
            Err(Error::UnknownInstrument(_))
        ));
    }

    #[test]
    fn test_projection() {
        let table = InstrumentTable::builtin();
        let topaz = table.get("TOPAZ").unwrap();
        let projection = topaz.projection();

        assert_eq!(projection.len(), 6);
        assert_eq!(projection[0], "indexed.run_number");
        assert_eq!(projection[1], "metadata.entry.title");
        assert_eq!(projection[2], "metadata.entry.proton_charge");
        assert_eq!(
            projection[3],
            "metadata.entry.daslogs.bl12:mot:goniokm:omega.average_value"
        );
        assert_eq!(topaz.scale_name(), "proton_charge");
    }

    #[test]
    fn test_json_partial_override() {
        let json = r#"{
            "TOPAZ": { "scale": "metadata.entry.monitor2.total_counts" }
        }"#;
        let table = InstrumentTable::from_json(json).expect("Should parse override");
        let topaz = table.get("TOPAZ").unwrap();

        assert_eq!(topaz.scale_name(), "total_counts");
        assert_eq!(topaz.goniometer.len(), 3); // Built-in motors kept
        assert_eq!(topaz.facility, "SNS");
    }

    #[test]
    fn test_json_new_instrument() {
        let json = r#"{
            "IMAGINE": {
                "name": "IMAGINE",
                "facility": "HFIR",
                "scale": "metadata.entry.monitor1.total_counts",
                "goniometer": ["CG4D:Mot:omega"]
            }
        }"#;
        let table = InstrumentTable::from_json(json).expect("Should parse new instrument");
        let imagine = table.get("imagine").unwrap();

        assert_eq!(imagine.extension, ".nxs.h5");
        assert_eq!(imagine.goniometer, vec!["CG4D:Mot:omega".to_string()]);
        assert_eq!(table.names().count(), 7);
    }

    #[test]
    fn test_json_new_instrument_missing_fields() {
        let json = r#"{ "IMAGINE": { "facility": "HFIR" } }"#;
        let err = InstrumentTable::from_json(json).unwrap_err().to_string();
        assert!(err.contains("missing 'scale'"), "unexpected error: {err}");
    }
}
