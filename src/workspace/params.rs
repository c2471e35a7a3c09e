//! Workspace parameters persisted as `params.json`

use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::WorkspaceError;

/// File name of the parameter file inside a workspace
pub const PARAMS_FILE: &str = "params.json";

/// Key of the plot export format
pub const IMAGE_FORMAT: &str = "image-format";

/// Accepted values of [`IMAGE_FORMAT`]
pub const IMAGE_FORMATS: [&str; 4] = ["svg", "png", "jpeg", "webp"];

/// Free-form workspace parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(Map<String, Value>);

impl Params {
    /// Built-in defaults
    pub fn defaults() -> Self {
        let mut map = Map::new();
        map.insert(IMAGE_FORMAT.to_string(), Value::from("svg"));
        Self(map)
    }

    /// Value of a parameter
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Set a parameter, returning the previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Whether the parameter exists
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Parameter names in order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Plot export format
    pub fn image_format(&self) -> Option<&str> {
        self.get(IMAGE_FORMAT).and_then(Value::as_str)
    }

    /// Take over values of `overrides` for keys already present
    pub fn merge_existing(&mut self, overrides: &Params) {
        for (key, value) in &overrides.0 {
            if let Some(slot) = self.0.get_mut(key) {
                *slot = value.clone();
            }
        }
    }

    /// Check values with a fixed domain
    pub fn validate(&self) -> Result<(), WorkspaceError> {
        if let Some(value) = self.get(IMAGE_FORMAT) {
            let format = value.as_str().unwrap_or_default();
            if !IMAGE_FORMATS.contains(&format) {
                return Err(WorkspaceError::InvalidImageFormat(value.to_string()));
            }
        }
        Ok(())
    }

    /// Read a parameter file
    pub fn read(path: &Path) -> Result<Self, WorkspaceError> {
        let text = std::fs::read_to_string(path)?;
        let params: Params = serde_json::from_str(&text)?;
        Ok(params)
    }

    /// Write pretty JSON to `path`, replacing it atomically
    pub fn write(&self, path: &Path) -> Result<(), WorkspaceError> {
        self.validate()?;
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut file, self)?;
        file.write_all(b"\n")?;
        file.persist(path)?;
        Ok(())
    }
}

impl From<Map<String, Value>> for Params {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
