//! garment-sim - CLI tool to build a garment pattern and simulate it on a body.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use pattern_core::config::{DEFAULT_GARMENT_PATH, DEFAULT_OUTPUT_FOLDER, DEFAULT_SIM_CONFIG};
use pattern_core::sim::program_exists;
use pattern_core::validation::quick_validate;
use pattern_core::{
    build_pattern, generate_garment_specification, run_simulation, ExternalBackend,
    PatternError, PatternSpec,
};

/// Build a parametric garment pattern and drape it on a body model.
#[derive(Parser, Debug)]
#[command(name = "garment-sim")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Folder with the body model mesh (.obj) and measurements (.yaml)
    #[arg(short = 'p', long)]
    model_path: PathBuf,

    /// Body model identifier (file name without extension)
    #[arg(short = 'm', long)]
    model_id: String,

    /// Garment design parameters file (.yaml)
    #[arg(short, long, default_value = DEFAULT_GARMENT_PATH)]
    garment_path: PathBuf,

    /// Simulation config file (.yaml)
    #[arg(short, long, default_value = DEFAULT_SIM_CONFIG)]
    sim_config: PathBuf,

    /// Output folder
    #[arg(short, long, default_value = DEFAULT_OUTPUT_FOLDER)]
    output_folder: PathBuf,

    /// Simulator program
    #[arg(long, default_value = "garment-simulator")]
    simulator: PathBuf,

    /// Write the pattern specification only
    #[arg(long)]
    skip_sim: bool,

    /// Validate the pattern only, don't write output
    #[arg(long)]
    validate: bool,

    /// Print the pattern specification as JSON
    #[arg(long)]
    debug: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:#}", err);
            ExitCode::from(exit_code(&err))
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let body_params = args.model_path.join(format!("{}.yaml", args.model_id));
    let body_mesh = args.model_path.join(format!("{}.obj", args.model_id));

    info!("Model path: {}", args.model_path.display());
    info!("Model ID: {}", args.model_id);
    info!("Garment path: {}", args.garment_path.display());
    info!("Simulation config path: {}", args.sim_config.display());

    // Debug output
    if args.debug || args.validate {
        let pattern = build_pattern(&body_params, &args.garment_path)
            .with_context(|| format!("Failed to build {}", args.garment_path.display()))?;

        if args.debug {
            println!("{}", PatternSpec::from_pattern(&pattern).to_json_string()?);
        }

        // Validate-only mode
        if args.validate {
            quick_validate(&pattern).context("Validation failed")?;
            info!("Validation passed");
        }
        return Ok(());
    }

    let spec_path =
        generate_garment_specification(&body_params, &args.garment_path, &args.output_folder)
            .with_context(|| format!("Failed to build {}", args.garment_path.display()))?;
    info!("Generated: {}", spec_path.display());

    if args.skip_sim {
        return Ok(());
    }

    if !program_exists(&args.simulator) {
        warn!(
            "Simulator {} not found on PATH",
            args.simulator.display()
        );
    }
    let backend = ExternalBackend::new(&args.simulator);
    let stats = run_simulation(
        &body_mesh,
        &spec_path,
        &args.sim_config,
        &args.output_folder,
        &backend,
    )
    .with_context(|| format!("Simulation of {} failed", spec_path.display()))?;

    if !stats.fails.is_empty() {
        warn!("Simulation failures: {}", stats.fails.join(", "));
    }
    info!("Simulated {} frames", stats.fin_frame);

    Ok(())
}

/// Exit code of the underlying pattern error, 1 otherwise.
fn exit_code(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<PatternError>())
        .and_then(|e| u8::try_from(e.code_value()).ok())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["garment-sim", "-p", "bodies", "-m", "mean_all"]).unwrap();
        assert_eq!(args.model_id, "mean_all");
        assert_eq!(args.garment_path, PathBuf::from(DEFAULT_GARMENT_PATH));
        assert_eq!(args.sim_config, PathBuf::from(DEFAULT_SIM_CONFIG));
        assert_eq!(args.output_folder, PathBuf::from(DEFAULT_OUTPUT_FOLDER));
        assert!(!args.skip_sim);
    }

    #[test]
    fn test_long_flags() {
        let args = Args::try_parse_from([
            "garment-sim",
            "--model-path",
            "bodies",
            "--model-id",
            "b",
            "--garment-path",
            "pants.yaml",
            "--skip-sim",
        ])
        .unwrap();
        assert_eq!(args.garment_path, PathBuf::from("pants.yaml"));
        assert!(args.skip_sim);
    }

    #[test]
    fn test_exit_code_from_pattern_error() {
        let err = anyhow::Error::new(PatternError::FileNotFound {
            path: "x.yaml".into(),
        })
        .context("Failed to build");
        assert_eq!(exit_code(&err), 2);
        assert_eq!(exit_code(&anyhow::anyhow!("other")), 1);
    }
}
