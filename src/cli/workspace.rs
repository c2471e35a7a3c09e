use anyhow::{Context, Result};
use clap::Subcommand;
use std::path::PathBuf;

use flashview::workspace::{
    delete_workspace, list_workspaces, ExperimentCache, ExperimentListing, Location, ParseReport,
    Workspace,
};

use super::output::{heading, label, success, warning};
use super::Config;

#[derive(Subcommand)]
pub enum Action {
    /// Create the workspace directories
    Init,

    /// Copy *_deconv.mzML / *_annotated.mzML files into the workspace
    Add {
        /// Files to add
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,
    },

    /// Show the experiments of the workspace
    List,

    /// Parse every experiment of the workspace
    Parse,

    /// Remove experiments by name
    Remove {
        /// Experiment names
        #[arg(value_name = "NAMES", required = true)]
        names: Vec<String>,
    },

    /// Remove all input files
    Reset,

    /// Copy the example FLASHDeconv output into the workspace
    LoadExample {
        /// Example directory (default from config)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Delete a workspace
    Delete {
        /// Workspace to delete
        name: String,
    },

    /// List all workspaces
    ListAll,
}

fn open(name: Option<String>, config: &Config) -> Result<Workspace> {
    let root = config.workspace_root();
    let workspace = match name {
        Some(name) => Workspace::open(&root, &name)?,
        None => Workspace::for_location(&root, config.workspace.location.unwrap_or_default())?,
    };
    if config.workspace.location == Some(Location::Online) {
        println!("{}: {}", label("Workspace"), workspace.name());
    }
    Ok(workspace)
}

fn print_listing(listing: &ExperimentListing) {
    match listing {
        ExperimentListing::Empty => println!("No mzML added yet"),
        ExperimentListing::MissingDeconvolved => {
            println!("{}", warning("FLASHDeconv deconvolved mzML file is not added yet"))
        }
        ExperimentListing::MissingAnnotated => {
            println!("{}", warning("FLASHDeconv annotated mzML file is not added yet"))
        }
        ExperimentListing::CountMismatch {
            deconvolved,
            annotated,
        } => println!(
            "{}",
            warning(&format!(
                "The same number of deconvolved and annotated mzML files is needed \
                 ({deconvolved} deconvolved, {annotated} annotated)"
            ))
        ),
        ExperimentListing::Paired(experiments) => {
            println!("{}", heading("Experiment Name\tDeconvolved Files\tAnnotated Files"));
            for e in experiments {
                println!("{}\t{}\t{}", e.name, e.deconvolved, e.annotated);
            }
        }
    }
}

/// Run a workspace subcommand
pub fn run(name: Option<String>, action: Action, config: &Config) -> Result<()> {
    let root = config.workspace_root();

    match action {
        Action::Init => {
            let workspace = open(name, config)?;
            let mut params = workspace.load_params(false)?;
            workspace.save_params(&mut params, &Default::default())?;
            println!("{} {}", success("Initialized"), workspace.path().display());
        }
        Action::Add { files } => {
            let workspace = open(name, config)?;
            let report = workspace.add_files(&files)?;
            for file in &report.added {
                println!("{} {file}", success("added"));
            }
            for file in &report.skipped {
                println!("{} {file} (already present)", warning("skipped"));
            }
            for path in &report.ignored {
                println!("{} {}", warning("ignored"), path.display());
            }
        }
        Action::List => {
            let workspace = open(name, config)?;
            print_listing(&workspace.experiments()?);
        }
        Action::Parse => {
            let workspace = open(name, config)?;
            let mut cache = ExperimentCache::new();
            match workspace.parse_new(&mut cache, &config.parse_options())? {
                ParseReport::UpToDate => println!("Nothing to parse"),
                ParseReport::Unpaired(files) => {
                    println!(
                        "{}",
                        warning("Added files are not in pairs, so not parsed:")
                    );
                    for file in files {
                        println!("  - {file}");
                    }
                }
                ParseReport::Parsed(names) => {
                    for name in names {
                        if let Some(parsed) = cache.get(&name) {
                            println!(
                                "{} {name}: {} spectra, {} masses, {} raw peaks",
                                success("parsed"),
                                parsed.mass_table.len(),
                                parsed.mass_table.mass_count(),
                                parsed.annotated.peak_count()
                            );
                        }
                    }
                }
            }
        }
        Action::Remove { names } => {
            let workspace = open(name, config)?;
            let mut cache = ExperimentCache::new();
            workspace.remove_experiments(names.as_slice(), &mut cache)?;
            println!("{}", success("Selected mzML files removed"));
        }
        Action::Reset => {
            let workspace = open(name, config)?;
            workspace.reset(&mut ExperimentCache::new())?;
            println!("{}", success("All mzML files removed"));
        }
        Action::LoadExample { dir } => {
            let workspace = open(name, config)?;
            let dir = dir.unwrap_or_else(|| config.example_dir());
            let report = workspace
                .load_example_data(&dir)
                .with_context(|| format!("Failed to load examples from {}", dir.display()))?;
            println!(
                "{} ({} added, {} already present)",
                success("Example mzML files loaded"),
                report.added.len(),
                report.skipped.len()
            );
        }
        Action::Delete { name: target } => {
            let current = delete_workspace(&root, &target)?;
            println!(
                "{} {target}, now in {}",
                success("Deleted"),
                current.name()
            );
        }
        Action::ListAll => {
            for workspace in list_workspaces(&root)? {
                println!("{workspace}");
            }
        }
    }
    Ok(())
}
