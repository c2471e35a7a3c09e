use serde::{Deserialize, Serialize};

/// Index entry for indexed mzML files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Spectrum or chromatogram ID (`idRef`)
    pub id: String,
    /// Byte offset of the element's opening tag
    pub offset: u64,
}

/// Complete index from indexedmzML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MzMLIndex {
    /// Spectrum index entries
    pub spectrum_index: Vec<IndexEntry>,
    /// Chromatogram index entries
    pub chromatogram_index: Vec<IndexEntry>,
    /// Byte offset of the index list
    pub index_list_offset: Option<u64>,
    /// SHA-1 hex digest from `<fileChecksum>`
    pub file_checksum: Option<String>,
}

impl MzMLIndex {
    /// Check if this is an indexed file
    pub fn is_indexed(&self) -> bool {
        self.index_list_offset.is_some()
    }

    /// Get spectrum count
    pub fn spectrum_count(&self) -> usize {
        self.spectrum_index.len()
    }

    /// Get chromatogram count
    pub fn chromatogram_count(&self) -> usize {
        self.chromatogram_index.len()
    }

    /// Byte offset of the spectrum with the given native ID
    pub fn spectrum_offset(&self, id: &str) -> Option<u64> {
        self.spectrum_index
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.offset)
    }

    /// Byte offset of the chromatogram with the given ID
    pub fn chromatogram_offset(&self, id: &str) -> Option<u64> {
        self.chromatogram_index
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.offset)
    }
}
