//! TOML configuration file support.
//!
//! Settings that would otherwise be repeated on every invocation can live in
//! a config file passed with `--config`:
//!
//! ```toml
//! # flashview.toml
//! [workspace]
//! root = "workspaces"
//! location = "local"
//! example_dir = "example-data/flashdeconv"
//!
//! [reader]
//! buffer_size = 262144
//! verify_encoded_length = true
//!
//! [export]
//! min_qscore = 0.5
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use flashview::deconv::ParseOptions;
use flashview::workspace::Location;

/// Root configuration structure for flashview.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Workspace settings.
    #[serde(default)]
    pub workspace: WorkspaceConfig,

    /// mzML reader settings.
    #[serde(default)]
    pub reader: ReaderConfig,

    /// TSV export settings.
    #[serde(default)]
    pub export: ExportConfig,
}

/// Where workspaces live and how they are allocated.
#[derive(Debug, Default, Deserialize)]
pub struct WorkspaceConfig {
    /// Directory holding all workspaces.
    pub root: Option<PathBuf>,

    /// `local` shares the default workspace, `online` creates one per session.
    pub location: Option<Location>,

    /// Directory with example FLASHDeconv output.
    pub example_dir: Option<PathBuf>,
}

/// Configuration for reading mzML.
#[derive(Debug, Default, Deserialize)]
pub struct ReaderConfig {
    /// Input buffer size in bytes.
    pub buffer_size: Option<usize>,

    /// Check each binary array against its encodedLength.
    pub verify_encoded_length: Option<bool>,
}

/// Configuration for the masses command.
#[derive(Debug, Default, Deserialize)]
pub struct ExportConfig {
    /// Drop masses below this qscore.
    pub min_qscore: Option<f64>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }

    /// Load `path` if given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Reader options with unset values at their defaults.
    pub fn parse_options(&self) -> ParseOptions {
        let defaults = ParseOptions::default();
        ParseOptions {
            buffer_size: self.reader.buffer_size.unwrap_or(defaults.buffer_size),
            verify_encoded_length: self
                .reader
                .verify_encoded_length
                .unwrap_or(defaults.verify_encoded_length),
        }
    }

    /// Workspaces directory.
    pub fn workspace_root(&self) -> PathBuf {
        self.workspace
            .root
            .clone()
            .unwrap_or_else(|| PathBuf::from("workspaces"))
    }

    /// Example data directory.
    pub fn example_dir(&self) -> PathBuf {
        self.workspace
            .example_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("example-data/flashdeconv"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml = r#"
            [workspace]
            root = "/tmp/ws"
            location = "online"

            [reader]
            buffer_size = 262144
            verify_encoded_length = false

            [export]
            min_qscore = 0.5
        "#;

        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.workspace_root(), PathBuf::from("/tmp/ws"));
        assert_eq!(config.workspace.location, Some(Location::Online));
        assert_eq!(config.reader.buffer_size, Some(262_144));
        assert_eq!(config.export.min_qscore, Some(0.5));

        let options = config.parse_options();
        assert_eq!(options.buffer_size, 262_144);
        assert!(!options.verify_encoded_length);
    }

    #[test]
    fn test_partial_config() {
        let toml = r#"
            [reader]
            buffer_size = 1024
        "#;

        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.parse_options().buffer_size, 1024);
        assert!(config.parse_options().verify_encoded_length);
        assert_eq!(config.workspace.location, None);
    }

    #[test]
    fn test_empty_config() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config.parse_options(), ParseOptions::default());
        assert_eq!(config.example_dir(), PathBuf::from("example-data/flashdeconv"));
    }

    #[test]
    fn test_unknown_location() {
        assert!(Config::from_str("[workspace]\nlocation = \"cloud\"").is_err());
    }
}
