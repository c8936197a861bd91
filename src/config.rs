//! Configuration management for the companion generator.
//!
//! The CLI exposes two subcommands:
//!
//! - `plate` — infer a plate layout from a list of TIFF filenames and a
//!   sample file, and write `<name>.ome.xml`
//! - `zarr` — read the attribute sidecars of an OME-Zarr (NGFF) store and
//!   write `<store-name>.ome.xml`
//!
//! Every per-dimension numbering toggle defaults to one-based, which is
//! what most acquisition software writes.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::pattern::{IndexBase, IndexBases, RowMode};

/// Default dimension order for the Pixels element.
pub const DEFAULT_DIMENSION_ORDER: &str = "XYCZT";

/// Dimension orders the OME schema allows.
const VALID_DIMENSION_ORDERS: &[&str] =
    &["XYZCT", "XYZTC", "XYCTZ", "XYCZT", "XYTCZ", "XYTZC"];

// =============================================================================
// CLI Arguments
// =============================================================================

/// Generate OME-XML companion files for microscopy plates.
#[derive(Parser, Debug)]
#[command(name = "ome-companion")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn into_command(self) -> Command {
        self.command
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a plate companion file from a list of TIFF filenames
    Plate(PlateConfig),

    /// Generate a companion file from an OME-Zarr (NGFF) store
    Zarr(ZarrConfig),
}

// =============================================================================
// Plate Subcommand
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct PlateConfig {
    /// Name of the plate (also names the output file)
    pub name: String,

    /// Sample tif file, probed for pixel geometry
    pub sample: PathBuf,

    /// Input file containing the list of image filenames, one per line
    pub input_file: PathBuf,

    /// File with the regex for parsing the file names.
    ///
    /// The pattern may use the named groups 'row', 'col', 'field',
    /// 'channel_index', 'channel_name', 'z' and 't'. For file names like
    /// B12_2-z1-t2-ch1-DAPI.tiff use:
    /// (?P<row>[a-zA-Z]+)(?P<col>\d+)_(?P<field>\d+)-z(?P<z>\d+)-t(?P<t>\d+)-ch(?P<channel_index>\d+)-(?P<channel_name>.+)\.
    pub regex_file: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// If the sample file has several images they will be considered as
    /// timepoints, otherwise it is assumed they are z-planes
    #[arg(long)]
    pub timepoints: bool,

    /// Dimension order written to the Pixels element
    #[arg(long, default_value = DEFAULT_DIMENSION_ORDER)]
    pub order: String,

    /// Rows are numbers (0, 1, ...) instead of letters (A, B, ...)
    #[arg(long)]
    pub row_num: bool,

    /// Numeric rows are zero-based (first -> 0); otherwise one-based
    #[arg(long)]
    pub row_zero: bool,

    /// Columns are zero-based (first -> 0); otherwise one-based
    #[arg(long)]
    pub col_zero: bool,

    /// Fields are zero-based (first -> 0); otherwise one-based
    #[arg(long)]
    pub field_zero: bool,

    /// Channel indices are zero-based; otherwise one-based
    #[arg(long)]
    pub channel_zero: bool,

    /// Z plane indices are zero-based; otherwise one-based
    #[arg(long)]
    pub z_zero: bool,

    /// T indices are zero-based; otherwise one-based
    #[arg(long)]
    pub t_zero: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

impl PlateConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if !self.sample.exists() {
            return Err(format!("Sample file '{}' does not exist", self.sample.display()));
        }
        if !self.input_file.exists() {
            return Err(format!(
                "Input file '{}' does not exist",
                self.input_file.display()
            ));
        }
        if !self.regex_file.exists() {
            return Err(format!(
                "Regex file '{}' does not exist",
                self.regex_file.display()
            ));
        }
        if !VALID_DIMENSION_ORDERS.contains(&self.order.as_str()) {
            return Err(format!(
                "Invalid dimension order '{}': expected one of {}",
                self.order,
                VALID_DIMENSION_ORDERS.join(", ")
            ));
        }
        Ok(())
    }

    /// Row interpretation derived from the row flags.
    pub fn row_mode(&self) -> RowMode {
        if self.row_num {
            RowMode::Numeric(IndexBase::from_zero_flag(self.row_zero))
        } else {
            RowMode::Alphabetic
        }
    }

    /// Per-dimension index bases derived from the `--*-zero` flags.
    pub fn bases(&self) -> IndexBases {
        IndexBases {
            col: IndexBase::from_zero_flag(self.col_zero),
            field: IndexBase::from_zero_flag(self.field_zero),
            channel: IndexBase::from_zero_flag(self.channel_zero),
            z: IndexBase::from_zero_flag(self.z_zero),
            t: IndexBase::from_zero_flag(self.t_zero),
        }
    }

    /// File name of the sample image, matched against the pattern.
    pub fn sample_name(&self) -> String {
        self.sample
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

// =============================================================================
// Zarr Subcommand
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct ZarrConfig {
    /// Path to the Zarr store (the directory holding the root .zattrs)
    pub store: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl ZarrConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if !self.store.exists() {
            return Err(format!("Zarr store '{}' does not exist", self.store.display()));
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
