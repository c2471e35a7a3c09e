use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::mzml::cv_params::{CvParam, UserParam, MS_CV_ACCESSIONS};

/// File-level metadata from mzML: everything outside the spectrum and
/// chromatogram lists, including the attributes of `<run>`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MzMLFileMetadata {
    /// mzML version
    pub version: Option<String>,

    /// Controlled vocabularies declared in `cvList`
    pub cv_list: Vec<CvReference>,

    /// File content type descriptions
    pub file_content: Vec<CvParam>,

    /// Source files
    pub source_files: Vec<SourceFile>,

    /// Software used
    pub software_list: Vec<Software>,

    /// Instrument configurations
    pub instrument_configurations: Vec<InstrumentConfiguration>,

    /// Data processing steps
    pub data_processing: Vec<DataProcessing>,

    /// Sample information
    pub samples: Vec<Sample>,

    /// Run ID
    pub run_id: Option<String>,

    /// Run start time, as written in the file
    pub run_start_time: Option<String>,

    /// Default instrument configuration ref
    pub default_instrument_configuration_ref: Option<String>,

    /// Default source file ref
    pub default_source_file_ref: Option<String>,

    /// Sample ref of the run
    pub sample_ref: Option<String>,

    /// Declared `count` of the spectrum list
    pub spectrum_count: Option<usize>,

    /// Declared `count` of the chromatogram list
    pub chromatogram_count: Option<usize>,
}

impl MzMLFileMetadata {
    /// Parse the run start timestamp (`xs:dateTime`, with or without offset)
    pub fn start_timestamp(&self) -> Option<NaiveDateTime> {
        let raw = self.run_start_time.as_deref()?.trim();
        chrono::DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.naive_utc())
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
            .ok()
    }

    /// Instrument configuration referenced by the run
    pub fn default_instrument(&self) -> Option<&InstrumentConfiguration> {
        let id = self.default_instrument_configuration_ref.as_deref()?;
        self.instrument_configurations.iter().find(|ic| ic.id == id)
    }

    /// Sample referenced by the run
    pub fn sample(&self) -> Option<&Sample> {
        let id = self.sample_ref.as_deref()?;
        self.samples.iter().find(|s| s.id == id)
    }
}

/// A `<cv>` entry of the `cvList`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CvReference {
    /// Short identifier used by `cvRef` (e.g., "MS")
    pub id: String,
    /// Full name
    pub full_name: Option<String>,
    /// Version
    pub version: Option<String>,
    /// OBO URI
    pub uri: Option<String>,
}

/// Source file information from mzML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceFile {
    /// Unique identifier
    pub id: String,
    /// File name
    pub name: String,
    /// File location (path or URI)
    pub location: Option<String>,
    /// File checksum value
    pub checksum: Option<String>,
    /// Checksum algorithm (MD5, SHA-1, etc.)
    pub checksum_type: Option<String>,
    /// File format description
    pub file_format: Option<String>,
    /// CV parameters describing the file
    pub cv_params: Vec<CvParam>,
}

/// Software information from mzML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Software {
    /// Unique identifier
    pub id: String,
    /// Software version
    pub version: Option<String>,
    /// Software name
    pub name: Option<String>,
    /// CV parameters describing the software
    pub cv_params: Vec<CvParam>,
}

impl Software {
    /// Name for display: the custom tool value, the CV term name, or the ID
    pub fn display_name(&self) -> &str {
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            return name;
        }
        self.cv_params
            .iter()
            .find_map(|cv| {
                if cv.accession == MS_CV_ACCESSIONS::CUSTOM_SOFTWARE {
                    cv.value.as_deref().filter(|v| !v.is_empty())
                } else {
                    Some(cv.name.as_str())
                }
            })
            .unwrap_or(&self.id)
    }
}

/// Instrument configuration from mzML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstrumentConfiguration {
    /// Unique identifier
    pub id: String,
    /// Instrument components (source, analyzer, detector)
    pub components: Vec<InstrumentComponent>,
    /// Reference to controlling software
    pub software_ref: Option<String>,
    /// CV parameters describing the instrument
    pub cv_params: Vec<CvParam>,
}

/// Instrument component (source, analyzer, detector)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstrumentComponent {
    /// Type of component
    pub component_type: ComponentType,
    /// Order in the instrument path
    pub order: i32,
    /// CV parameters describing the component
    pub cv_params: Vec<CvParam>,
}

/// Type of instrument component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ComponentType {
    /// Unknown component type
    #[default]
    Unknown,
    /// Ion source
    Source,
    /// Mass analyzer
    Analyzer,
    /// Detector
    Detector,
}

impl ComponentType {
    /// Map a component element name
    pub fn from_element(name: &[u8]) -> Self {
        match name {
            b"source" => ComponentType::Source,
            b"analyzer" => ComponentType::Analyzer,
            b"detector" => ComponentType::Detector,
            _ => ComponentType::Unknown,
        }
    }
}

/// Data processing information from mzML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataProcessing {
    /// Unique identifier
    pub id: String,
    /// Processing methods applied
    pub processing_methods: Vec<ProcessingMethod>,
}

/// Processing method from mzML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessingMethod {
    /// Order of the processing step
    pub order: i32,
    /// Reference to the software used
    pub software_ref: Option<String>,
    /// CV parameters describing the processing
    pub cv_params: Vec<CvParam>,
    /// User parameters attached to the step
    pub user_params: Vec<UserParam>,
}

/// Sample information from mzML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Sample {
    /// Unique identifier
    pub id: String,
    /// Sample name
    pub name: Option<String>,
    /// CV parameters describing the sample
    pub cv_params: Vec<CvParam>,
}
