//! Writers for selected run data.

use crate::{Error, Result};
use iptsview_core::{BrokenAxisLayout, PlotView};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writer for the values of a selection.
///
/// One CSV row per selected datafile:
/// `run_number,data_index,<goniometer axes...>,scale`.
pub struct SelectionWriter<W: Write = BufWriter<File>> {
    writer: W,
}

impl SelectionWriter {
    /// Creates a new file writer.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> SelectionWriter<W> {
    /// Wraps any writer.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Writes the selected runs of a view as CSV, header included.
    ///
    /// # Errors
    /// Returns [`Error::SeriesMismatch`] if the series do not hold one value
    /// per selected run, or an error if writing fails.
    pub fn write_csv(&mut self, view: &PlotView) -> Result<()> {
        let (selection, series) = (&view.selection, &view.series);
        let rows = selection.len();
        if series.scale.len() != rows
            || series.goniometer.iter().any(|axis| axis.values.len() != rows)
        {
            return Err(Error::SeriesMismatch { rows });
        }

        let mut header = vec!["run_number".to_string(), "data_index".to_string()];
        header.extend(series.goniometer.iter().map(|axis| axis.name.clone()));
        header.push("scale".to_string());
        writeln!(self.writer, "{}", header.join(","))?;

        for (row, (run, index)) in selection.iter().enumerate() {
            write!(self.writer, "{run},{index}")?;
            for axis in &series.goniometer {
                write!(self.writer, ",{}", axis.values[row])?;
            }
            writeln!(self.writer, ",{}", series.scale[row])?;
        }

        self.writer.flush()?;
        Ok(())
    }

    /// Writes a broken-axis layout as pretty JSON.
    ///
    /// # Errors
    /// Returns an error if encoding or writing fails.
    pub fn write_layout_json(&mut self, layout: &BrokenAxisLayout) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, layout)?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Flushes the writer.
    ///
    /// # Errors
    /// Returns an error if flushing fails.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Returns the inner writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iptsview_core::{Experiment, RunRecord};
    use tempfile::NamedTempFile;

    fn view() -> PlotView {
        let records = vec![
            RunRecord::new(30, "a", 1.5, vec![10.0, -5.0]),
            RunRecord::new(31, "b", 1.0, vec![0.0, 0.0]),
            RunRecord::new(33, "a", 2.5, vec![20.0, -5.0]),
        ];
        let experiment = Experiment::new(
            records,
            vec!["Omega".into(), "Phi".into()],
            "proton_charge",
        )
        .unwrap();
        PlotView::build(&experiment, "30,33").unwrap()
    }

    #[test]
    fn test_write_csv() {
        let file = NamedTempFile::new().unwrap();
        let mut writer = SelectionWriter::create(file.path()).unwrap();

        writer.write_csv(&view()).unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines[0], "run_number,data_index,omega,phi,scale");
        assert_eq!(lines[1], "30,0,10,-5,1.5");
        assert_eq!(lines[2], "33,2,20,-5,2.5");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_write_csv_rejects_short_series() {
        let mut view = view();
        view.series.goniometer[1].values.pop();

        let mut writer = SelectionWriter::new(Vec::new());
        assert!(matches!(
            writer.write_csv(&view),
            Err(Error::SeriesMismatch { rows: 2 })
        ));
        assert!(writer.into_inner().is_empty());
    }

    #[test]
    fn test_write_layout_json() {
        let mut writer = SelectionWriter::new(Vec::new());
        writer.write_layout_json(&view().layout).unwrap();

        let json: serde_json::Value = serde_json::from_slice(&writer.into_inner()).unwrap();
        let panels = json["panels"].as_array().unwrap();
        assert_eq!(panels.len(), 2);
        assert_eq!(panels[0]["block"], serde_json::json!({"first": 30, "last": 30}));
        assert_eq!(json["scale_label"], "Scale (proton_charge)");
    }
}
