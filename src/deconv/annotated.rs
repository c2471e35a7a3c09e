//! Raw peaks of annotated spectra and their assignment to deconvolved masses
//!
//! The annotated mzML written next to the deconvolved one keeps the raw
//! centroided peaks. Its `DeconvMassPeakIndices` userParam lists, for each
//! deconvolved mass, the indices of the raw peaks that produced it:
//! `0,9,48;1,14,52;...`.

use serde::{Deserialize, Serialize};

use super::{AnnotationError, DeconvError};
use crate::mzml::{MzMLError, MzMLSpectrum};

/// userParam name carrying the mass-to-peak assignment
pub const DECONV_MASS_PEAK_INDICES: &str = "DeconvMassPeakIndices";

/// Parse a `DeconvMassPeakIndices` value against a list of `peak_count` peaks
pub fn parse_peak_groups(
    value: &str,
    peak_count: usize,
) -> Result<Vec<Vec<usize>>, AnnotationError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(Vec::new());
    }

    value
        .trim_end_matches(';')
        .split(';')
        .map(|group| {
            group
                .split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| {
                    let index: usize = v.parse().map_err(|_| AnnotationError::InvalidNumber {
                        field: DECONV_MASS_PEAK_INDICES.to_string(),
                        value: v.to_string(),
                    })?;
                    if index >= peak_count {
                        return Err(AnnotationError::PeakIndexOutOfRange { index, peak_count });
                    }
                    Ok(index)
                })
                .collect()
        })
        .collect()
}

/// One spectrum of the annotated file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedSpectrum {
    /// Spectrum index in the file
    pub index: i64,
    /// Scan number
    pub scan: i64,
    /// MS level
    pub ms_level: i16,
    /// Retention time in seconds
    pub retention_time: Option<f64>,
    /// Raw peak m/z values
    pub mz: Vec<f64>,
    /// Raw peak intensities
    pub intensity: Vec<f64>,
    /// Raw peak indices per deconvolved mass
    pub peak_groups: Vec<Vec<usize>>,
}

impl AnnotatedSpectrum {
    /// Read raw peaks and peak groups from a spectrum
    pub fn from_spectrum(spectrum: &MzMLSpectrum) -> Result<Self, AnnotationError> {
        let peak_groups = match spectrum.user_param(DECONV_MASS_PEAK_INDICES) {
            Some(value) => parse_peak_groups(value, spectrum.mz_array.len())?,
            None => Vec::new(),
        };

        Ok(Self {
            index: spectrum.index,
            scan: spectrum.scan_number(),
            ms_level: spectrum.ms_level,
            retention_time: spectrum.retention_time,
            mz: spectrum.mz_array.clone(),
            intensity: spectrum.intensity_array.clone(),
            peak_groups,
        })
    }

    /// Number of raw peaks
    pub fn peak_count(&self) -> usize {
        self.mz.len()
    }

    /// Number of deconvolved masses with a peak group
    pub fn mass_count(&self) -> usize {
        self.peak_groups.len()
    }

    /// Raw (m/z, intensity) peaks of mass `i`
    pub fn peaks_for_mass(&self, i: usize) -> Option<Vec<(f64, f64)>> {
        let group = self.peak_groups.get(i)?;
        Some(
            group
                .iter()
                .filter_map(|&p| Some((*self.mz.get(p)?, *self.intensity.get(p)?)))
                .collect(),
        )
    }

    /// Mass index of every raw peak, `None` for noise peaks.
    ///
    /// A peak claimed by several masses keeps the first.
    pub fn mass_index_per_peak(&self) -> Vec<Option<usize>> {
        let mut assignment = vec![None; self.peak_count()];
        for (mass, group) in self.peak_groups.iter().enumerate() {
            for &peak in group {
                if let Some(slot) = assignment.get_mut(peak) {
                    slot.get_or_insert(mass);
                }
            }
        }
        assignment
    }

    /// Indices of peaks not claimed by any mass
    pub fn unassigned_peaks(&self) -> Vec<usize> {
        self.mass_index_per_peak()
            .iter()
            .enumerate()
            .filter_map(|(i, m)| m.is_none().then_some(i))
            .collect()
    }
}

/// All spectra of an annotated file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedTable {
    /// Spectra in file order
    pub spectra: Vec<AnnotatedSpectrum>,
}

impl AnnotatedTable {
    /// Build a table from a stream of spectra
    pub fn from_spectra<I>(spectra: I) -> Result<Self, DeconvError>
    where
        I: IntoIterator<Item = Result<MzMLSpectrum, MzMLError>>,
    {
        let mut table = Self::default();
        for spectrum in spectra {
            let spectrum = spectrum?;
            let annotated = AnnotatedSpectrum::from_spectrum(&spectrum)
                .map_err(|e| DeconvError::annotation(&spectrum.id, e))?;
            table.spectra.push(annotated);
        }
        Ok(table)
    }

    /// Number of spectra
    pub fn len(&self) -> usize {
        self.spectra.len()
    }

    /// Whether the table has no spectra
    pub fn is_empty(&self) -> bool {
        self.spectra.is_empty()
    }

    /// Total number of raw peaks
    pub fn peak_count(&self) -> usize {
        self.spectra.iter().map(AnnotatedSpectrum::peak_count).sum()
    }
}
