use serde::{Deserialize, Serialize};

use crate::mzml::binary::{ArrayKind, BinaryEncoding, CompressionType};
use crate::mzml::cv_params::{CvParam, UserParam};

/// Represents a single spectrum from an mzML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MzMLSpectrum {
    /// Spectrum index (0-based)
    pub index: i64,

    /// Native spectrum ID from the file
    pub id: String,

    /// Default array length (number of peaks)
    pub default_array_length: usize,

    /// MS level (1 for MS1, 2 for MS2, etc.)
    pub ms_level: i16,

    /// Whether this is a centroid (true) or profile (false) spectrum
    pub centroided: bool,

    /// Polarity: 1 for positive, -1 for negative, 0 for unknown
    pub polarity: i8,

    /// Retention time in seconds
    pub retention_time: Option<f64>,

    /// Total ion current
    pub total_ion_current: Option<f64>,

    /// Base peak m/z
    pub base_peak_mz: Option<f64>,

    /// Base peak intensity
    pub base_peak_intensity: Option<f64>,

    /// Lowest observed m/z
    pub lowest_mz: Option<f64>,

    /// Highest observed m/z
    pub highest_mz: Option<f64>,

    /// Scan window lower limit
    pub scan_window_lower: Option<f64>,

    /// Scan window upper limit
    pub scan_window_upper: Option<f64>,

    /// Ion injection time in milliseconds
    pub ion_injection_time: Option<f64>,

    /// Filter string (vendor-specific)
    pub filter_string: Option<String>,

    /// Preset scan configuration
    pub preset_scan_configuration: Option<i32>,

    /// Precursor information (for MS2+ spectra)
    pub precursors: Vec<Precursor>,

    /// m/z array (decoded)
    pub mz_array: Vec<f64>,

    /// Intensity array (decoded)
    pub intensity_array: Vec<f64>,

    /// How each binary data array was stored, in document order
    pub arrays: Vec<BinaryArrayInfo>,

    /// All CV parameters for this spectrum
    pub cv_params: Vec<CvParam>,

    /// User parameters, in document order
    pub user_params: Vec<UserParam>,
}

impl MzMLSpectrum {
    /// Scan number from the native ID, or the 1-based position when the ID
    /// carries none
    pub fn scan_number(&self) -> i64 {
        scan_number_from_id(&self.id).unwrap_or(self.index + 1)
    }

    /// Get the number of peaks
    pub fn peak_count(&self) -> usize {
        self.mz_array.len()
    }

    /// First user parameter value with the given name
    pub fn user_param(&self, name: &str) -> Option<&str> {
        self.user_params
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }

    /// The first precursor, if any
    pub fn precursor(&self) -> Option<&Precursor> {
        self.precursors.first()
    }

    /// Storage details of the array of the given kind
    pub fn array_info(&self, kind: &ArrayKind) -> Option<&BinaryArrayInfo> {
        self.arrays.iter().find(|a| &a.kind == kind)
    }
}

/// Parse a scan number out of a native ID
///
/// Common formats:
/// "scan=12345",
/// "controllerType=0 controllerNumber=1 scan=12345",
/// "S12345"
fn scan_number_from_id(id: &str) -> Option<i64> {
    if let Some(pos) = id.find("scan=") {
        let start = pos + 5;
        let end = id[start..]
            .find(|c: char| !c.is_ascii_digit())
            .map(|i| start + i)
            .unwrap_or(id.len());
        id[start..end].parse().ok()
    } else if let Some(rest) = id.strip_prefix('S') {
        rest.parse().ok()
    } else {
        None
    }
}

/// Storage details of a decoded binary data array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryArrayInfo {
    /// Array kind
    pub kind: ArrayKind,
    /// Value encoding
    pub encoding: BinaryEncoding,
    /// Compression
    pub compression: CompressionType,
    /// Declared `encodedLength`
    pub encoded_length: Option<usize>,
    /// Raw bytes after Base64 decoding (before decompression)
    pub decoded_bytes: usize,
    /// Number of decoded values
    pub value_count: usize,
}

/// Precursor ion information for MS2+ spectra
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Precursor {
    /// Reference to the precursor spectrum ID
    pub spectrum_ref: Option<String>,

    /// Isolation window target m/z
    pub isolation_window_target: Option<f64>,

    /// Isolation window lower offset
    pub isolation_window_lower: Option<f64>,

    /// Isolation window upper offset
    pub isolation_window_upper: Option<f64>,

    /// Selected ion m/z
    pub selected_ion_mz: Option<f64>,

    /// Selected ion intensity
    pub selected_ion_intensity: Option<f64>,

    /// Selected ion charge state
    pub selected_ion_charge: Option<i16>,

    /// Activation method (CID, HCD, ETD, etc.)
    pub activation_method: Option<String>,

    /// Collision energy
    pub collision_energy: Option<f64>,

    /// CV parameters for this precursor
    pub cv_params: Vec<CvParam>,

    /// User parameters for this precursor
    pub user_params: Vec<UserParam>,
}

impl Precursor {
    /// Neutral mass of the selected ion, given the mass of one charge carrier
    pub fn neutral_mass(&self, charge_mass: f64) -> Option<f64> {
        let mz = self.selected_ion_mz?;
        let charge = self.selected_ion_charge.filter(|z| *z != 0)?;
        let z = f64::from(charge.abs());
        Some((mz - charge_mass * charge.signum() as f64) * z)
    }

    /// Scan number of the referenced precursor spectrum
    pub fn precursor_scan(&self) -> Option<i64> {
        self.spectrum_ref.as_deref().and_then(scan_number_from_id)
    }
}
