//! Data models for mzML structures
//!
//! These models represent the parsed mzML data in a Rust-native format,
//! ready for FLASHDeconv interpretation in [`crate::deconv`].

mod chromatogram;
mod index;
mod metadata;
mod spectrum;

pub use chromatogram::{ArrayValues, AuxiliaryArray, ChromatogramType, MzMLChromatogram};
pub use index::{IndexEntry, MzMLIndex};
pub use metadata::{
    ComponentType, CvReference, DataProcessing, InstrumentComponent, InstrumentConfiguration,
    MzMLFileMetadata, ProcessingMethod, Sample, Software, SourceFile,
};
pub use spectrum::{BinaryArrayInfo, MzMLSpectrum, Precursor};

use serde::{Deserialize, Serialize};

/// A fully read mzML document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MzMLDocument {
    /// File-level metadata
    pub metadata: MzMLFileMetadata,
    /// Index, when the file was opened through its `indexList`
    pub index: MzMLIndex,
    /// Spectra in document order
    pub spectra: Vec<MzMLSpectrum>,
    /// Chromatograms in document order
    pub chromatograms: Vec<MzMLChromatogram>,
}

impl MzMLDocument {
    /// Find a spectrum by native ID
    pub fn spectrum(&self, id: &str) -> Option<&MzMLSpectrum> {
        self.spectra.iter().find(|s| s.id == id)
    }

    /// Find a chromatogram by native ID
    pub fn chromatogram(&self, id: &str) -> Option<&MzMLChromatogram> {
        self.chromatograms.iter().find(|c| c.id == id)
    }
}
