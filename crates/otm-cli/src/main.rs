//! OTM CLI: deck validation and a uniaxial stretch driver.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "otm")]
#[command(version, about = "Optimal-transport meshfree solid mechanics core")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate an input deck and print the resolved configuration.
    Validate {
        /// Path to the input deck (TOML).
        path: PathBuf,
    },

    /// Stretch a tetrahedral block along x and report every step.
    Demo {
        /// Input deck (TOML). Without one, the run defaults are used.
        #[arg(short, long)]
        deck: Option<PathBuf>,

        /// Material preset used when no deck is given.
        #[arg(short, long, default_value = "steel_j2")]
        preset: String,

        /// Override the number of steps.
        #[arg(short, long)]
        steps: Option<u32>,

        /// Worker threads (0 runs serially).
        #[arg(short, long, default_value_t = 0)]
        threads: usize,

        /// Write every event as a JSON line to this file.
        #[arg(short, long)]
        events: Option<PathBuf>,
    },

    /// List the built-in material presets.
    Presets,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { path } => commands::validate(&path),
        Commands::Demo {
            deck,
            preset,
            steps,
            threads,
            events,
        } => commands::demo(&commands::DemoOptions {
            deck,
            preset,
            steps,
            threads,
            events,
        }),
        Commands::Presets => {
            commands::presets();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
