//! Streaming mzML parser using quick-xml
//!
//! This module provides a pull-based streaming parser for mzML files,
//! designed to handle arbitrarily large files with minimal memory usage.
//! Random access through the `indexList` of an indexedmzML wrapper lives
//! in [`IndexedMzML`].

use std::io::BufRead;

use quick_xml::Reader;

use super::models::{MzMLDocument, MzMLFileMetadata, MzMLIndex};

pub use error::MzMLError;
pub use index::{
    ChecksumStatus, IndexReport, IndexedMzML, OffsetMismatch, DEFAULT_INPUT_BUFFER_SIZE,
};
pub use iterators::{ChromatogramIterator, SpectrumIterator};

mod chromatogram;
mod error;
mod helpers;
mod index;
mod iterators;
mod metadata;
mod spectrum;

#[cfg(test)]
mod tests;

/// Streaming parser for mzML files
pub struct MzMLStreamer<R: BufRead> {
    reader: Reader<R>,
    metadata: MzMLFileMetadata,
    index: MzMLIndex,
    metadata_read: bool,
    in_spectrum_list: bool,
    in_chromatogram_list: bool,
    current_spectrum_index: i64,
    current_chromatogram_index: i64,
    verify_encoded_length: bool,
}

impl<R: BufRead> MzMLStreamer<R> {
    /// Create a new streamer from a BufRead source
    pub fn new(reader: R) -> Result<Self, MzMLError> {
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.config_mut().trim_text(true);

        Ok(Self {
            reader: xml_reader,
            metadata: MzMLFileMetadata::default(),
            index: MzMLIndex::default(),
            metadata_read: false,
            in_spectrum_list: false,
            in_chromatogram_list: false,
            current_spectrum_index: 0,
            current_chromatogram_index: 0,
            verify_encoded_length: true,
        })
    }

    /// Streamer positioned directly on a `<spectrum>` or `<chromatogram>`
    /// element, as after seeking to an index offset
    pub(super) fn at_element(reader: R, position: i64, in_spectra: bool) -> Self {
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.config_mut().trim_text(true);

        Self {
            reader: xml_reader,
            metadata: MzMLFileMetadata::default(),
            index: MzMLIndex::default(),
            metadata_read: true,
            in_spectrum_list: in_spectra,
            in_chromatogram_list: !in_spectra,
            current_spectrum_index: position,
            current_chromatogram_index: position,
            verify_encoded_length: true,
        }
    }

    /// Enable or disable the `encodedLength` check on binary arrays
    pub fn with_encoded_length_check(mut self, enabled: bool) -> Self {
        self.verify_encoded_length = enabled;
        self
    }

    /// Get the file metadata
    pub fn metadata(&self) -> &MzMLFileMetadata {
        &self.metadata
    }

    /// Get the index if available
    pub fn index(&self) -> &MzMLIndex {
        &self.index
    }

    /// Get expected spectrum count
    pub fn spectrum_count(&self) -> Option<usize> {
        if self.index.is_indexed() {
            Some(self.index.spectrum_count())
        } else {
            self.metadata.spectrum_count
        }
    }

    /// Iterate over all spectra
    pub fn spectra(self) -> SpectrumIterator<R> {
        SpectrumIterator { streamer: self }
    }

    /// Iterate over all chromatograms, skipping any remaining spectra
    pub fn chromatograms(self) -> ChromatogramIterator<R> {
        ChromatogramIterator { streamer: self }
    }

    /// Read the whole document: metadata, every spectrum, every chromatogram
    pub fn read_document(mut self) -> Result<MzMLDocument, MzMLError> {
        self.read_metadata()?;

        let mut spectra = Vec::new();
        while let Some(spectrum) = self.next_spectrum()? {
            spectra.push(spectrum);
        }

        let mut chromatograms = Vec::new();
        while let Some(chromatogram) = self.next_chromatogram()? {
            chromatograms.push(chromatogram);
        }

        log::debug!(
            "Read {} spectra and {} chromatograms",
            spectra.len(),
            chromatograms.len()
        );

        Ok(MzMLDocument {
            metadata: self.metadata,
            index: self.index,
            spectra,
            chromatograms,
        })
    }
}
