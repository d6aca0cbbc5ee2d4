//!
//! Command-line front end for browsing experiment runs and run ranges.
#![allow(clippy::uninlined_format_args)]

use clap::{Args, Parser, Subcommand};

use iptsview_core::{compact, expand, partition, BrowserSession, PlotView, RunNumber, Ticks};
use iptsview_io::{load_experiment, CatalogDirectory, InstrumentTable, Ipts, SelectionWriter};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    IptsviewIo(#[from] iptsview_io::Error),

    #[error("Core error: {0}")]
    Core(#[from] iptsview_core::Error),

    #[error("Invalid run numbers '{text}': {source}")]
    InvalidRuns {
        text: String,
        source: iptsview_core::RangeParseError,
    },
}

/// Browse neutron scattering experiment runs.
#[derive(Parser)]
#[command(name = "iptsview")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Where an experiment's listing comes from.
#[derive(Args)]
struct ExperimentArgs {
    /// Directory of exported catalog listings
    #[arg(long)]
    catalog: PathBuf,

    /// Instrument name (e.g. TOPAZ, WAND2)
    #[arg(short, long)]
    instrument: String,

    /// Experiment number (1234 or IPTS-1234)
    #[arg(long)]
    ipts: Ipts,

    /// JSON file overriding the instrument table
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Which runs to select.
#[derive(Args)]
#[group(required = true, multiple = false)]
struct RunsArgs {
    /// Select the runs sharing this title
    #[arg(long)]
    title: Option<String>,

    /// Select these runs (e.g. 1:3,10,15:16), at most 1000000 runs
    #[arg(long)]
    runs: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compact run numbers into a run range string
    Compact {
        /// Run numbers
        #[arg(required = true)]
        runs: Vec<RunNumber>,
    },

    /// Expand a run range string into run numbers
    Expand {
        /// Run range (e.g. 1:3,10,15:16), at most 1000000 runs
        range: String,
    },

    /// Split a run range into contiguous blocks
    Blocks {
        /// Run range (e.g. 1:3,10,15:16), at most 1000000 runs
        range: String,
    },

    /// List the known instruments
    Instruments {
        /// JSON file overriding the instrument table
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List the run titles of an experiment
    Titles {
        #[command(flatten)]
        experiment: ExperimentArgs,
    },

    /// Select runs of an experiment and describe the plot
    Select {
        #[command(flatten)]
        experiment: ExperimentArgs,

        #[command(flatten)]
        runs: RunsArgs,

        /// Write the selected values as CSV
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the broken-axis layout as JSON
        #[arg(long)]
        layout: Option<PathBuf>,
    },
}

fn parse_runs(text: &str) -> Result<Vec<RunNumber>> {
    expand(text).map_err(|source| CliError::InvalidRuns {
        text: text.to_string(),
        source,
    })
}

fn instrument_table(config: Option<&Path>) -> Result<InstrumentTable> {
    Ok(match config {
        Some(path) => InstrumentTable::from_file(path)?,
        None => InstrumentTable::builtin(),
    })
}

fn open_session(args: &ExperimentArgs) -> Result<BrowserSession> {
    let table = instrument_table(args.config.as_deref())?;
    let instrument = table.get(&args.instrument)?;
    let catalog = CatalogDirectory::new(&args.catalog);
    let experiment = load_experiment(&catalog, instrument, args.ipts)?;

    let mut session = BrowserSession::new();
    session.load(experiment);
    Ok(session)
}

fn print_view(view: &PlotView) {
    let selection = &view.selection;
    println!(
        "Selected {} datafiles in {} block(s)",
        selection.len(),
        selection.blocks.len()
    );
    for (i, panel) in view.layout.panels.iter().enumerate() {
        let ticks = match &panel.ticks {
            Ticks::Auto => "auto".to_string(),
            Ticks::Fixed(runs) => runs
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" "),
        };
        println!(
            "Panel {}: runs {} (width {}, ticks {})",
            i, panel.block, panel.width_ratio, ticks
        );
    }
    if let Some((lo, hi)) = view.layout.y_limits {
        println!("Goniometer range: {:.2} - {:.2}", lo, hi);
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Compact { runs } => {
            println!("{}", compact(runs)?);
        }

        Commands::Expand { range } => {
            let runs = parse_runs(&range)?;
            let runs: Vec<String> = runs.iter().map(ToString::to_string).collect();
            println!("{}", runs.join(","));
        }

        Commands::Blocks { range } => {
            let mut runs = parse_runs(&range)?;
            runs.sort_unstable();
            runs.dedup();
            for block in partition(&runs) {
                println!("{} {}", block.first, block.last);
            }
        }

        Commands::Instruments { config } => {
            let table = instrument_table(config.as_deref())?;
            println!("{:<10} | {:<8} | {:<8} | Goniometer", "Label", "Name", "Facility");
            println!("{:-<65}", "");
            for (label, instrument) in table.iter() {
                println!(
                    "{:<10} | {:<8} | {:<8} | {}",
                    label,
                    instrument.name,
                    instrument.facility,
                    instrument.goniometer.join(", ")
                );
            }
        }

        Commands::Titles { experiment } => {
            let session = open_session(&experiment)?;
            for (title, runs) in session.titles() {
                println!("{}\t{}", title, runs);
            }
        }

        Commands::Select {
            experiment,
            runs,
            output,
            layout,
        } => {
            let mut session = open_session(&experiment)?;

            if let Some(title) = &runs.title {
                session.select_title(title)?;
            } else if let Some(text) = &runs.runs {
                parse_runs(text)?;
                session.apply_runs(text)?;
            }

            let Some(view) = session.view() else {
                return Ok(());
            };
            println!("Runs: {}", session.runs_text());
            print_view(view);

            if let Some(path) = output {
                let mut writer = SelectionWriter::create(&path)?;
                writer.write_csv(view)?;
                log::info!("wrote {}", path.display());
            }
            if let Some(path) = layout {
                let mut writer = SelectionWriter::create(&path)?;
                writer.write_layout_json(&view.layout)?;
                log::info!("wrote {}", path.display());
            }
        }
    }

    Ok(())
}
