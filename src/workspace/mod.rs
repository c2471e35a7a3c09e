//! # Experiment workspace
//!
//! A workspace is a directory holding one session's FLASHDeconv inputs:
//!
//! ```text
//! <workspaces_dir>/<name>/
//! ├── deconv-mzMLs/     *_deconv.mzML
//! ├── anno-mzMLs/       *_annotated.mzML
//! └── params.json
//! ```
//!
//! Local sessions share the `default` workspace; online sessions each get a
//! workspace named by a fresh UUID.

mod error;
pub mod experiment;
pub mod params;

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::deconv::{parse_flashdeconv_output_with, ParseOptions, ParsedExperiment};

pub use error::WorkspaceError;
pub use experiment::{
    experiment_name, AddReport, Experiment, ExperimentCache, ExperimentListing, InputKind,
    ParseReport,
};
pub use params::{Params, PARAMS_FILE};

/// Name of the shared local workspace
pub const DEFAULT_WORKSPACE: &str = "default";

/// How workspaces are allocated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    /// One shared `default` workspace
    #[default]
    Local,
    /// A new workspace per session
    Online,
}

/// An opened workspace directory
#[derive(Debug, Clone)]
pub struct Workspace {
    name: String,
    path: PathBuf,
}

impl Workspace {
    /// Open (creating if missing) the named workspace under `workspaces_dir`
    pub fn open<P: AsRef<Path>>(workspaces_dir: P, name: &str) -> Result<Self, WorkspaceError> {
        check_name(name)?;
        let path = workspaces_dir.as_ref().join(name);
        for kind in InputKind::all() {
            fs::create_dir_all(path.join(kind.dir_name()))?;
        }
        debug!("Opened workspace {}", path.display());
        Ok(Self {
            name: name.to_string(),
            path,
        })
    }

    /// Open the workspace for a new session
    pub fn for_location<P: AsRef<Path>>(
        workspaces_dir: P,
        location: Location,
    ) -> Result<Self, WorkspaceError> {
        match location {
            Location::Local => Self::open(workspaces_dir, DEFAULT_WORKSPACE),
            Location::Online => {
                let name = uuid::Uuid::new_v4().to_string();
                Self::open(workspaces_dir, &name)
            }
        }
    }

    /// Open an existing workspace, failing if it does not exist
    pub fn open_existing<P: AsRef<Path>>(
        workspaces_dir: P,
        name: &str,
    ) -> Result<Self, WorkspaceError> {
        check_name(name)?;
        if !workspaces_dir.as_ref().join(name).is_dir() {
            return Err(WorkspaceError::NotFound(name.to_string()));
        }
        Self::open(workspaces_dir, name)
    }

    /// Workspace name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Workspace directory
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding inputs of `kind`
    pub fn input_dir(&self, kind: InputKind) -> PathBuf {
        self.path.join(kind.dir_name())
    }

    /// Sorted file names of `kind`
    pub fn files(&self, kind: InputKind) -> Result<Vec<String>, WorkspaceError> {
        let mut names = Vec::new();
        for entry in fs::read_dir(self.input_dir(kind))? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Copy FLASHDeconv outputs into the workspace.
    ///
    /// Files already present by name are skipped, other files ignored.
    pub fn add_files<I, P>(&self, paths: I) -> Result<AddReport, WorkspaceError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut report = AddReport::default();
        for path in paths {
            let path = path.as_ref();
            let Some(file_name) = path.file_name().map(|n| n.to_string_lossy().into_owned())
            else {
                report.ignored.push(path.to_path_buf());
                continue;
            };
            let Some(kind) = InputKind::classify(&file_name) else {
                debug!("Ignoring {}", path.display());
                report.ignored.push(path.to_path_buf());
                continue;
            };

            let target = self.input_dir(kind).join(&file_name);
            if target.exists() {
                report.skipped.push(file_name);
                continue;
            }
            fs::copy(path, &target)?;
            info!("Added {} to workspace {}", file_name, self.name);
            report.added.push(file_name);
        }
        Ok(report)
    }

    /// Copy `*deconv.mzML` and `*annotated.mzML` files from an example directory
    pub fn load_example_data<P: AsRef<Path>>(&self, dir: P) -> Result<AddReport, WorkspaceError> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir.as_ref())? {
            let path = entry?.path();
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            if name.ends_with("deconv.mzML") || name.ends_with("annotated.mzML") {
                paths.push(path);
            }
        }
        paths.sort();

        let report = self.add_files(&paths)?;
        info!("Loaded {} example files", report.added.len());
        Ok(report)
    }

    /// Current pairing of the workspace inputs
    pub fn experiments(&self) -> Result<ExperimentListing, WorkspaceError> {
        let deconvolved = self.files(InputKind::Deconvolved)?;
        let annotated = self.files(InputKind::Annotated)?;
        Ok(ExperimentListing::pair(&deconvolved, &annotated))
    }

    /// Parse every input pair not yet in `cache`.
    ///
    /// New inputs that do not pair up are reported and left unparsed.
    pub fn parse_new(
        &self,
        cache: &mut ExperimentCache,
        options: &ParseOptions,
    ) -> Result<ParseReport, WorkspaceError> {
        let deconvolved = self.unparsed_files(InputKind::Deconvolved, cache)?;
        let annotated = self.unparsed_files(InputKind::Annotated, cache)?;

        if deconvolved.is_empty() && annotated.is_empty() {
            return Ok(ParseReport::UpToDate);
        }
        if deconvolved.len() != annotated.len() {
            warn!(
                "New files are not in pairs ({} deconvolved, {} annotated), not parsing",
                deconvolved.len(),
                annotated.len()
            );
            return Ok(ParseReport::Unpaired(
                deconvolved.into_iter().chain(annotated).collect(),
            ));
        }

        let pending = ExperimentListing::pair(&deconvolved, &annotated);
        let parsed = self.parse_experiments(pending.experiments(), options)?;

        let mut names = Vec::with_capacity(parsed.len());
        for (experiment, tables) in pending.experiments().iter().zip(parsed) {
            cache.insert(experiment, tables);
            names.push(experiment.name.clone());
        }
        Ok(ParseReport::Parsed(names))
    }

    fn unparsed_files(
        &self,
        kind: InputKind,
        cache: &ExperimentCache,
    ) -> Result<Vec<String>, WorkspaceError> {
        let mut files = self.files(kind)?;
        files.retain(|f| !cache.contains_file(kind, f));
        Ok(files)
    }

    #[cfg(feature = "parallel")]
    fn parse_experiments(
        &self,
        experiments: &[Experiment],
        options: &ParseOptions,
    ) -> Result<Vec<ParsedExperiment>, WorkspaceError> {
        use rayon::prelude::*;

        experiments
            .par_iter()
            .map(|experiment| self.parse_experiment(experiment, options))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn parse_experiments(
        &self,
        experiments: &[Experiment],
        options: &ParseOptions,
    ) -> Result<Vec<ParsedExperiment>, WorkspaceError> {
        experiments
            .iter()
            .map(|experiment| self.parse_experiment(experiment, options))
            .collect()
    }

    /// Parse one experiment of this workspace
    pub fn parse_experiment(
        &self,
        experiment: &Experiment,
        options: &ParseOptions,
    ) -> Result<ParsedExperiment, WorkspaceError> {
        info!("Parsing experiment {}", experiment.name);
        let parsed = parse_flashdeconv_output_with(
            self.input_dir(InputKind::Annotated).join(&experiment.annotated),
            self.input_dir(InputKind::Deconvolved).join(&experiment.deconvolved),
            options,
        )?;
        Ok(parsed)
    }

    /// Delete the input files of the named experiments.
    ///
    /// Nothing is deleted unless every file of every named experiment exists.
    pub fn remove_experiments<S: AsRef<str>>(
        &self,
        names: &[S],
        cache: &mut ExperimentCache,
    ) -> Result<(), WorkspaceError> {
        let experiments: Vec<(&str, [PathBuf; 2])> = names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                let paths = InputKind::all()
                    .map(|kind| self.input_dir(kind).join(format!("{name}{}", kind.suffix())));
                (name, paths)
            })
            .collect();

        if let Some(missing) = experiments
            .iter()
            .flat_map(|(_, paths)| paths.iter())
            .find(|p| !p.is_file())
        {
            return Err(WorkspaceError::MissingFile(missing.clone()));
        }

        for (name, paths) in &experiments {
            for path in paths {
                fs::remove_file(path)?;
            }
            cache.remove(name);
            info!("Removed experiment {name}");
        }
        Ok(())
    }

    /// Remove every input file
    pub fn reset(&self, cache: &mut ExperimentCache) -> Result<(), WorkspaceError> {
        for kind in InputKind::all() {
            let dir = self.input_dir(kind);
            if dir.exists() {
                fs::remove_dir_all(&dir)?;
            }
            fs::create_dir_all(&dir)?;
        }
        cache.clear();
        info!("Removed all inputs from workspace {}", self.name);
        Ok(())
    }

    /// Path of `params.json`
    pub fn params_path(&self) -> PathBuf {
        self.path.join(PARAMS_FILE)
    }

    /// Load `params.json`, or the defaults if it is missing or `default` is set
    pub fn load_params(&self, default: bool) -> Result<Params, WorkspaceError> {
        let path = self.params_path();
        if path.is_file() && !default {
            return Params::read(&path);
        }

        let mut params = Params::defaults();
        for kind in InputKind::all() {
            params.insert(kind.dir_name(), Value::from(self.files(kind)?));
        }
        Ok(params)
    }

    /// Apply `overrides` to keys already in `params` and write `params.json`
    pub fn save_params(
        &self,
        params: &mut Params,
        overrides: &Params,
    ) -> Result<(), WorkspaceError> {
        params.merge_existing(overrides);
        params.write(&self.params_path())?;
        debug!("Saved {}", self.params_path().display());
        Ok(())
    }
}

fn check_name(name: &str) -> Result<(), WorkspaceError> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(std::path::Component::Normal(_)), None) => Ok(()),
        _ => Err(WorkspaceError::InvalidName(name.to_string())),
    }
}

/// Sorted names of the workspaces under `workspaces_dir`
pub fn list_workspaces<P: AsRef<Path>>(workspaces_dir: P) -> Result<Vec<String>, WorkspaceError> {
    let dir = workspaces_dir.as_ref();
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// Delete a workspace and return the `default` workspace to continue in
pub fn delete_workspace<P: AsRef<Path>>(
    workspaces_dir: P,
    name: &str,
) -> Result<Workspace, WorkspaceError> {
    check_name(name)?;
    let dir = workspaces_dir.as_ref();
    let path = dir.join(name);
    if !path.is_dir() {
        return Err(WorkspaceError::NotFound(name.to_string()));
    }
    fs::remove_dir_all(&path)?;
    info!("Deleted workspace {name}");
    Workspace::open(dir, DEFAULT_WORKSPACE)
}
