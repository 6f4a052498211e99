//! chemenv command-line interface.
//!
//! Analyse points against a plane described in a TOML job file:
//! ```sh
//! chemenv-cli run job.toml
//! chemenv-cli validate job.toml
//! chemenv-cli strategies
//! ```

mod config;
mod runner;
mod xyz;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use chemenv_geometry::FitStrategy;

#[derive(Parser)]
#[command(name = "chemenv-cli")]
#[command(about = "chemenv: plane fitting and point classification for coordination environments")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a plane analysis from a TOML configuration file.
    Run {
        /// Path to the job configuration file.
        config: PathBuf,
        /// Output directory (overrides config file setting).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file without running the analysis.
    Validate {
        /// Path to the job configuration file.
        config: PathBuf,
    },
    /// List the available plane-fitting strategies.
    Strategies,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, output } => {
            println!("chemenv plane analysis");
            println!("======================");
            let job = config::load_config(&config)?;
            println!("Configuration: {}", config.display());
            println!();

            // Relative point files are looked up next to the job file
            let base_dir = config.parent().unwrap_or_else(|| Path::new("."));
            let report = runner::run_analysis(&job, base_dir)?;
            runner::print_report(&report);

            if job.output.save_json || output.is_some() {
                let out_dir = output.unwrap_or_else(|| PathBuf::from(&job.output.directory));
                println!();
                runner::write_report_json(&report, &out_dir.join("report.json"))?;
            }

            println!("Analysis complete.");
            Ok(())
        }
        Commands::Validate { config } => {
            let _job = config::load_config(&config)?;
            println!("Configuration is valid: {}", config.display());
            Ok(())
        }
        Commands::Strategies => {
            println!("Available fit strategies:");
            println!();
            for strategy in FitStrategy::ALL {
                let description = match strategy {
                    FitStrategy::LeastSquareDistance => {
                        "minimise the sum of squared distances (default)"
                    }
                    FitStrategy::MaximumDistance => "minimise the largest distance",
                };
                println!("  {:<24} {}", strategy.name(), description);
            }
            Ok(())
        }
    }
}
