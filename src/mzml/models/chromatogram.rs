use serde::{Deserialize, Serialize};

use crate::mzml::cv_params::{CvParam, MS_CV_ACCESSIONS};

/// Represents a chromatogram from an mzML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MzMLChromatogram {
    /// Chromatogram index (0-based)
    pub index: i64,

    /// Native chromatogram ID
    pub id: String,

    /// Default array length
    pub default_array_length: usize,

    /// Chromatogram type (TIC, BPC, SRM, etc.)
    pub chromatogram_type: ChromatogramType,

    /// Time array (in seconds)
    pub time_array: Vec<f64>,

    /// Intensity array
    pub intensity_array: Vec<f64>,

    /// Arrays other than time and intensity (e.g. the "ms level" array)
    pub auxiliary_arrays: Vec<AuxiliaryArray>,

    /// CV parameters
    pub cv_params: Vec<CvParam>,
}

impl MzMLChromatogram {
    /// Find an auxiliary array by name
    pub fn auxiliary(&self, name: &str) -> Option<&AuxiliaryArray> {
        self.auxiliary_arrays.iter().find(|a| a.name == name)
    }

    /// Number of data points
    pub fn point_count(&self) -> usize {
        self.time_array.len()
    }
}

/// A named non-standard data array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuxiliaryArray {
    /// Array name (value of the non-standard data array cvParam)
    pub name: String,
    /// Decoded values
    pub values: ArrayValues,
}

/// Decoded values, keeping integer arrays as integers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArrayValues {
    /// Floating-point array
    Float(Vec<f64>),
    /// Integer array
    Integer(Vec<i64>),
}

impl ArrayValues {
    /// Number of values
    pub fn len(&self) -> usize {
        match self {
            ArrayValues::Float(v) => v.len(),
            ArrayValues::Integer(v) => v.len(),
        }
    }

    /// Whether the array is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Integer view, if this is an integer array
    pub fn as_integers(&self) -> Option<&[i64]> {
        match self {
            ArrayValues::Integer(v) => Some(v),
            ArrayValues::Float(_) => None,
        }
    }

    /// Values as floats, widening integers
    pub fn into_floats(self) -> Vec<f64> {
        match self {
            ArrayValues::Float(v) => v,
            ArrayValues::Integer(v) => v.into_iter().map(|x| x as f64).collect(),
        }
    }
}

/// Types of chromatograms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChromatogramType {
    /// No chromatogram type cvParam recognised
    #[default]
    Unknown,
    /// Total Ion Current
    TIC,
    /// Base Peak Chromatogram
    BPC,
    /// Selected Ion Monitoring
    SIM,
    /// Selected Reaction Monitoring / Multiple Reaction Monitoring
    SRM,
    /// Extracted Ion Chromatogram
    XIC,
    /// Absorption chromatogram
    Absorption,
    /// Emission chromatogram
    Emission,
}

impl ChromatogramType {
    /// Map a chromatogram-type accession, `None` for unrelated accessions
    pub fn from_cv_accession(accession: &str) -> Option<Self> {
        match accession {
            MS_CV_ACCESSIONS::TIC_CHROMATOGRAM => Some(ChromatogramType::TIC),
            MS_CV_ACCESSIONS::BPC_CHROMATOGRAM => Some(ChromatogramType::BPC),
            MS_CV_ACCESSIONS::SIM_CHROMATOGRAM => Some(ChromatogramType::SIM),
            MS_CV_ACCESSIONS::SRM_CHROMATOGRAM | "MS:1000908" => Some(ChromatogramType::SRM),
            MS_CV_ACCESSIONS::XIC_CHROMATOGRAM => Some(ChromatogramType::XIC),
            "MS:1000812" => Some(ChromatogramType::Absorption),
            "MS:1000813" => Some(ChromatogramType::Emission),
            _ => None,
        }
    }
}
