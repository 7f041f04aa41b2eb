use clap::{Parser, Subcommand};
use nipopow_spv::chain::BlockId;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

pub mod config;
pub mod init_config;
pub mod inspect;
pub mod verify;
pub mod version;

use config::LoggingConfig;

#[derive(Parser)]
#[command(name = "nipopow-spv")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "NiPoPoW light client: verify transaction inclusion from superblock proofs", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Verify that a transaction is included in the best proven chain
    Verify(verify::VerifyArgs),

    /// Parse and validate a proof file, printing the level of every block
    Inspect {
        /// Path to a proof JSON file
        #[arg(long)]
        proof: PathBuf,

        /// Genesis block id (hex)
        #[arg(long)]
        genesis: BlockId,

        /// Security parameter
        #[arg(short = 'm', long, default_value_t = nipopow_spv::nipopow::DEFAULT_M)]
        m: u32,

        /// Suffix length
        #[arg(short = 'k', long, default_value_t = nipopow_spv::nipopow::DEFAULT_K)]
        k: u32,
    },

    /// Write a commented default configuration file
    InitConfig {
        /// Output path (default: ~/.config/nipopow-spv/config.toml)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Display version information
    Version,
}

/// Install the global tracing subscriber. `RUST_LOG` wins over the config.
pub fn init_logging(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match &config.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| format!("Failed to open log file '{}': {}", path.display(), e))?;
            builder
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .try_init()
                .map_err(|e| format!("Failed to initialize logging: {}", e))?;
        }
        None => builder
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| format!("Failed to initialize logging: {}", e))?,
    }
    Ok(())
}

pub async fn execute(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Verify(args) => {
            let config = verify::resolve_config(args.config.as_deref())?;
            init_logging(&config.logging)?;
            verify::execute(args, config).await
        }
        Commands::Inspect { proof, genesis, m, k } => {
            init_logging(&LoggingConfig::default())?;
            inspect::execute(&proof, genesis, m, k).await
        }
        Commands::InitConfig { output, force } => init_config::execute(output, force),
        Commands::Version => {
            version::execute();
            Ok(())
        }
    }
}
