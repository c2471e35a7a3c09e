use crate::mzml::MzMLError;

/// Errors in FLASHDeconv userParam annotations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnnotationError {
    /// A `;`-separated field without `key=value` form
    #[error("Malformed annotation field '{0}'")]
    MalformedField(String),

    /// A value that is not a number
    #[error("Invalid number in '{field}': '{value}'")]
    InvalidNumber {
        /// Field name
        field: String,
        /// Offending value
        value: String,
    },

    /// A `peaks` entry that is not `min:max`
    #[error("Invalid charge range '{0}'")]
    InvalidChargeRange(String),

    /// Per-mass lists of different lengths
    #[error("Field '{field}' has {actual} entries, expected {expected}")]
    LengthMismatch {
        /// Field name
        field: String,
        /// Entries expected
        expected: usize,
        /// Entries found
        actual: usize,
    },

    /// A peak index pointing past the raw peak list
    #[error("Peak index {index} out of range for {peak_count} peaks")]
    PeakIndexOutOfRange {
        /// Offending index
        index: usize,
        /// Number of raw peaks
        peak_count: usize,
    },
}

/// Errors while turning FLASHDeconv output into tables
#[derive(Debug, thiserror::Error)]
pub enum DeconvError {
    /// Error reading mzML
    #[error("mzML error: {0}")]
    Mzml(#[from] MzMLError),

    /// Annotation of a spectrum could not be read
    #[error("Spectrum '{spectrum}': {source}")]
    Annotation {
        /// Native ID of the spectrum
        spectrum: String,
        /// Underlying annotation error
        #[source]
        source: AnnotationError,
    },

    /// Deconvolved and annotated files hold different numbers of spectra
    #[error("Spectrum count mismatch: {deconvolved} deconvolved vs {annotated} annotated")]
    SpectrumCountMismatch {
        /// Spectra in the deconvolved file
        deconvolved: usize,
        /// Spectra in the annotated file
        annotated: usize,
    },

    /// TSV writing failed
    #[error("TSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DeconvError {
    pub(crate) fn annotation(spectrum: &str, source: AnnotationError) -> Self {
        Self::Annotation {
            spectrum: spectrum.to_string(),
            source,
        }
    }
}
