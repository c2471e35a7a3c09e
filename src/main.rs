//! # flashview
//!
//! Command-line access to FLASHDeconv mzML output.
//!
//! ## Usage
//!
//! ```bash
//! # Run metadata and index presence
//! flashview info run_deconv.mzML
//!
//! # Check arrays, offsets and checksum
//! flashview verify run_deconv.mzML
//!
//! # Mass table as TSV
//! flashview masses run_deconv.mzML --annotated run_annotated.mzML -o run.tsv
//!
//! # Workspace handling
//! flashview workspace load-example
//! flashview workspace list
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
