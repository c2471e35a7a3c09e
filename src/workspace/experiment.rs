//! Input classification and experiment pairing

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::deconv::ParsedExperiment;

/// Suffix of FLASHDeconv deconvolved output
pub const DECONV_SUFFIX: &str = "_deconv.mzML";

/// Suffix of FLASHDeconv annotated output
pub const ANNOTATED_SUFFIX: &str = "_annotated.mzML";

/// Kind of an input file, decided by its name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputKind {
    /// `*_deconv.mzML`
    Deconvolved,
    /// `*_annotated.mzML`
    Annotated,
}

impl InputKind {
    /// Classify a file name, `None` for files the workspace does not take
    pub fn classify(file_name: &str) -> Option<Self> {
        if file_name.ends_with(DECONV_SUFFIX) {
            Some(InputKind::Deconvolved)
        } else if file_name.ends_with(ANNOTATED_SUFFIX) {
            Some(InputKind::Annotated)
        } else {
            None
        }
    }

    /// Workspace subdirectory holding this kind
    pub fn dir_name(&self) -> &'static str {
        match self {
            InputKind::Deconvolved => "deconv-mzMLs",
            InputKind::Annotated => "anno-mzMLs",
        }
    }

    /// File name suffix
    pub fn suffix(&self) -> &'static str {
        match self {
            InputKind::Deconvolved => DECONV_SUFFIX,
            InputKind::Annotated => ANNOTATED_SUFFIX,
        }
    }

    /// Both kinds
    pub fn all() -> [InputKind; 2] {
        [InputKind::Deconvolved, InputKind::Annotated]
    }
}

/// Experiment name: the file name up to its last `_`
pub fn experiment_name(file_name: &str) -> &str {
    match file_name.rfind('_') {
        Some(pos) => &file_name[..pos],
        None => file_name,
    }
}

/// One deconvolved/annotated file pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experiment {
    /// Experiment name, taken from the annotated file
    pub name: String,
    /// Deconvolved file name
    pub deconvolved: String,
    /// Annotated file name
    pub annotated: String,
}

/// State of the workspace inputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExperimentListing {
    /// No inputs at all
    Empty,
    /// Only annotated files
    MissingDeconvolved,
    /// Only deconvolved files
    MissingAnnotated,
    /// Both kinds present in different numbers
    CountMismatch {
        /// Deconvolved files
        deconvolved: usize,
        /// Annotated files
        annotated: usize,
    },
    /// Files paired by sorted position
    Paired(Vec<Experiment>),
}

impl ExperimentListing {
    /// Pair sorted file name lists
    pub fn pair(deconvolved: &[String], annotated: &[String]) -> Self {
        match (deconvolved.len(), annotated.len()) {
            (0, 0) => ExperimentListing::Empty,
            (0, _) => ExperimentListing::MissingDeconvolved,
            (_, 0) => ExperimentListing::MissingAnnotated,
            (d, a) if d != a => ExperimentListing::CountMismatch {
                deconvolved: d,
                annotated: a,
            },
            _ => ExperimentListing::Paired(
                deconvolved
                    .iter()
                    .zip(annotated)
                    .map(|(deconvolved, annotated)| Experiment {
                        name: experiment_name(annotated).to_string(),
                        deconvolved: deconvolved.clone(),
                        annotated: annotated.clone(),
                    })
                    .collect(),
            ),
        }
    }

    /// Paired experiments, empty for every other state
    pub fn experiments(&self) -> &[Experiment] {
        match self {
            ExperimentListing::Paired(experiments) => experiments,
            _ => &[],
        }
    }
}

/// Outcome of copying files into a workspace
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddReport {
    /// Copied file names
    pub added: Vec<String>,
    /// Names already present in the workspace
    pub skipped: Vec<String>,
    /// Inputs that are not FLASHDeconv output
    pub ignored: Vec<PathBuf>,
}

/// Outcome of parsing new inputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseReport {
    /// Every input is already parsed
    UpToDate,
    /// The new inputs do not pair up and were left unparsed
    Unpaired(Vec<String>),
    /// Names of the experiments parsed
    Parsed(Vec<String>),
}

/// Parsed experiments keyed by their input file names
#[derive(Debug, Clone, Default)]
pub struct ExperimentCache {
    experiments: BTreeMap<String, ParsedExperiment>,
    deconvolved: BTreeMap<String, String>,
    annotated: BTreeMap<String, String>,
}

impl ExperimentCache {
    /// Empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a parsed experiment
    pub fn insert(&mut self, experiment: &Experiment, parsed: ParsedExperiment) {
        self.deconvolved
            .insert(experiment.deconvolved.clone(), experiment.name.clone());
        self.annotated
            .insert(experiment.annotated.clone(), experiment.name.clone());
        self.experiments.insert(experiment.name.clone(), parsed);
    }

    /// Whether a file of the given kind is parsed
    pub fn contains_file(&self, kind: InputKind, file_name: &str) -> bool {
        match kind {
            InputKind::Deconvolved => self.deconvolved.contains_key(file_name),
            InputKind::Annotated => self.annotated.contains_key(file_name),
        }
    }

    /// Parsed tables of an experiment
    pub fn get(&self, name: &str) -> Option<&ParsedExperiment> {
        self.experiments.get(name)
    }

    /// Drop the entries of an experiment
    pub fn remove(&mut self, name: &str) -> Option<ParsedExperiment> {
        self.deconvolved.retain(|_, n| n != name);
        self.annotated.retain(|_, n| n != name);
        self.experiments.remove(name)
    }

    /// Drop everything
    pub fn clear(&mut self) {
        self.experiments.clear();
        self.deconvolved.clear();
        self.annotated.clear();
    }

    /// Names of parsed experiments
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.experiments.keys().map(String::as_str)
    }

    /// Number of parsed experiments
    pub fn len(&self) -> usize {
        self.experiments.len()
    }

    /// Whether nothing is parsed
    pub fn is_empty(&self) -> bool {
        self.experiments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            InputKind::classify("run_deconv.mzML"),
            Some(InputKind::Deconvolved)
        );
        assert_eq!(
            InputKind::classify("run_annotated.mzML"),
            Some(InputKind::Annotated)
        );
        assert_eq!(InputKind::classify("run.mzML"), None);
        assert_eq!(InputKind::classify("run_deconv.tsv"), None);
        assert_eq!(InputKind::classify("run_deconv.mzml"), None);
    }

    #[test]
    fn test_experiment_name() {
        assert_eq!(experiment_name("foo_bar_deconv.mzML"), "foo_bar");
        assert_eq!(experiment_name("IntactProteinMix_MS2_annotated.mzML"), "IntactProteinMix_MS2");
        assert_eq!(experiment_name("plain.mzML"), "plain.mzML");
    }

    #[test]
    fn test_listing_states() {
        assert_eq!(ExperimentListing::pair(&[], &[]), ExperimentListing::Empty);
        assert_eq!(
            ExperimentListing::pair(&[], &names(&["a_annotated.mzML"])),
            ExperimentListing::MissingDeconvolved
        );
        assert_eq!(
            ExperimentListing::pair(&names(&["a_deconv.mzML"]), &[]),
            ExperimentListing::MissingAnnotated
        );
        assert_eq!(
            ExperimentListing::pair(
                &names(&["a_deconv.mzML", "b_deconv.mzML"]),
                &names(&["a_annotated.mzML"])
            ),
            ExperimentListing::CountMismatch {
                deconvolved: 2,
                annotated: 1
            }
        );
    }

    #[test]
    fn test_pairs_by_position() {
        let listing = ExperimentListing::pair(
            &names(&["a_deconv.mzML", "b_deconv.mzML"]),
            &names(&["a_annotated.mzML", "c_annotated.mzML"]),
        );
        let experiments = listing.experiments();
        assert_eq!(experiments.len(), 2);
        assert_eq!(experiments[1].name, "c");
        assert_eq!(experiments[1].deconvolved, "b_deconv.mzML");
    }

    #[test]
    fn test_cache_remove() {
        let mut cache = ExperimentCache::new();
        let experiment = Experiment {
            name: "a".to_string(),
            deconvolved: "a_deconv.mzML".to_string(),
            annotated: "a_annotated.mzML".to_string(),
        };
        let parsed = ParsedExperiment {
            mass_table: Default::default(),
            annotated: Default::default(),
            tolerance: 10.0,
            mass_offset: 0.0,
            charge_mass: 1.007276,
        };
        cache.insert(&experiment, parsed);
        assert!(cache.contains_file(InputKind::Annotated, "a_annotated.mzML"));

        assert!(cache.remove("a").is_some());
        assert!(cache.is_empty());
        assert!(!cache.contains_file(InputKind::Deconvolved, "a_deconv.mzML"));
    }
}
