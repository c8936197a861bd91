//! OME Companion - generate OME-XML companion files.
//!
//! This binary wires the pipeline together: configuration, logging, the
//! filename or Zarr front end, the confirmation prompt, and the output file.

use std::fs;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ome_companion::{
    build_plate_companion, prompt, to_xml, zarr_companion, Cli, Command, CompanionError,
    NamingPattern, PatternError, PlateConfig, PlateScan, PlateSpec, SampleInfo, ZarrConfig,
};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Plate(config) => run_plate(config),
        Command::Zarr(config) => run_zarr(config),
    }
}

// =============================================================================
// Plate Command
// =============================================================================

fn run_plate(config: PlateConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    match plate_pipeline(&config) {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn plate_pipeline(config: &PlateConfig) -> Result<ExitCode, CompanionError> {
    let pattern =
        NamingPattern::from_file(&config.regex_file, config.row_mode(), config.bases())?;

    // The sample must match; a pattern that cannot parse its own sample
    // would silently drop every line.
    let sample_name = config.sample_name();
    if !pattern.matches(&sample_name) {
        return Err(PatternError::SampleMismatch { name: sample_name }.into());
    }
    if config.verbose {
        info!("Regex matches:");
        for (group, value) in pattern.group_values(&sample_name) {
            info!("  {}: {:?}", group, value);
        }
    }

    let sample = SampleInfo::probe_path(&config.sample)?;

    let input = fs::read_to_string(&config.input_file)?;
    let scan = PlateScan::run(&pattern, input.lines())?;

    let (spec, buckets) = PlateSpec::reconcile(&sample, scan, &config.order, config.timepoints)?;

    println!("{}", spec.summary());

    if !config.yes && !prompt::confirm() {
        info!("Aborted, no file written");
        return Ok(ExitCode::SUCCESS);
    }

    let ome = build_plate_companion(&config.name, &spec, &buckets);
    let xml = to_xml(&ome)?;

    let out_file = format!("{}.ome.xml", config.name);
    fs::write(&out_file, xml)?;
    println!("Wrote OME-XML to {out_file}");

    Ok(ExitCode::SUCCESS)
}

// =============================================================================
// Zarr Command
// =============================================================================

fn run_zarr(config: ZarrConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    match zarr_pipeline(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn zarr_pipeline(config: &ZarrConfig) -> Result<(), CompanionError> {
    let companion = zarr_companion(&config.store)?;
    let xml = to_xml(&companion.ome)?;

    let out_file = format!("{}.ome.xml", companion.name);
    fs::write(&out_file, xml)?;
    println!("Wrote OME-XML to {out_file}");

    Ok(())
}

// =============================================================================
// Logging
// =============================================================================

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "ome_companion=debug"
    } else {
        "ome_companion=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
