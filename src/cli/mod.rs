use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod config;
mod decode;
mod info;
mod masses;
mod output;
mod spectra;
mod verify;
mod workspace;

pub use config::Config;

/// flashview - FLASHDeconv mzML reader and experiment workspace
#[derive(Parser)]
#[command(name = "flashview")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Load settings from a TOML config file
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display run metadata of an mzML file
    Info {
        /// Input mzML file path
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// List the spectra of an mzML file
    Spectra {
        /// Input mzML file path
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print the peaks of one spectrum
    Decode {
        /// Input mzML file path
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Native spectrum id
        #[arg(long)]
        id: String,
    },

    /// Check arrays, index offsets and checksum
    Verify {
        /// Input mzML file path
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Export the mass table of a deconvolved mzML file as TSV
    Masses {
        /// Deconvolved mzML file path
        #[arg(value_name = "DECONV")]
        deconvolved: PathBuf,

        /// Annotated mzML file; also writes the annotated peak table
        #[arg(long, value_name = "FILE")]
        annotated: Option<PathBuf>,

        /// Output TSV path (stdout when omitted)
        #[arg(short, long, value_name = "TSV")]
        output: Option<PathBuf>,

        /// Drop masses below this qscore
        #[arg(long, value_name = "Q")]
        min_qscore: Option<f64>,
    },

    /// Manage experiment workspaces
    Workspace {
        /// Workspace name (default: per configured location)
        #[arg(long)]
        name: Option<String>,

        #[command(subcommand)]
        action: workspace::Action,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Info { file } => info::run(file, &config),
        Commands::Spectra { file, json } => spectra::run(file, json, &config),
        Commands::Decode { file, id } => decode::run(file, &id, &config),
        Commands::Verify { file } => verify::run(file),
        Commands::Masses {
            deconvolved,
            annotated,
            output,
            min_qscore,
        } => masses::run(
            deconvolved,
            annotated,
            output,
            min_qscore.or(config.export.min_qscore),
            &config,
        ),
        Commands::Workspace { name, action } => workspace::run(name, action, &config),
    }
}
