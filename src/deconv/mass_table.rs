//! Per-spectrum mass table built from a deconvolved mzML file

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::annotation::{
    DeconvAnnotation, MassAnnotation, DEFAULT_MASS_OFFSET, DEFAULT_TOLERANCE_PPM, PROTON_MASS,
};
use super::DeconvError;
use crate::mzml::{MzMLError, MzMLSpectrum};

/// One deconvolved spectrum
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MassTableRow {
    /// Spectrum index in the file
    pub index: i64,
    /// Scan number
    pub scan: i64,
    /// MS level
    pub ms_level: i16,
    /// Retention time in seconds
    pub retention_time: Option<f64>,
    /// Scan number of the precursor spectrum
    pub precursor_scan: Option<i64>,
    /// Neutral mass of the precursor ion
    pub precursor_mass: Option<f64>,
    /// Monoisotopic masses (the m/z array of a deconvolved spectrum)
    pub mono_masses: Vec<f64>,
    /// Summed intensity per mass
    pub intensities: Vec<f64>,
    /// Per-mass annotation, empty when the spectrum carries none
    pub annotations: Vec<MassAnnotation>,
}

impl MassTableRow {
    /// Number of masses in the spectrum
    pub fn mass_count(&self) -> usize {
        self.mono_masses.len()
    }

    /// Annotation of mass `i`, if present
    pub fn annotation(&self, i: usize) -> Option<&MassAnnotation> {
        self.annotations.get(i)
    }
}

/// Mass table of a whole deconvolved file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MassTable {
    /// Rows in file order
    pub rows: Vec<MassTableRow>,
    /// Mass tolerance in ppm
    pub tolerance: f64,
    /// Mass offset
    pub mass_offset: f64,
    /// Charge carrier mass
    pub charge_mass: f64,
    #[serde(skip)]
    annotated: bool,
}

impl Default for MassTable {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            tolerance: DEFAULT_TOLERANCE_PPM,
            mass_offset: DEFAULT_MASS_OFFSET,
            charge_mass: PROTON_MASS,
            annotated: false,
        }
    }
}

impl MassTable {
    /// Build a table from a stream of spectra
    pub fn from_spectra<I>(spectra: I) -> Result<Self, DeconvError>
    where
        I: IntoIterator<Item = Result<MzMLSpectrum, MzMLError>>,
    {
        let mut table = Self::default();
        for spectrum in spectra {
            table.push_spectrum(&spectrum?)?;
        }
        log::debug!(
            "Mass table: {} spectra, {} masses",
            table.len(),
            table.mass_count()
        );
        Ok(table)
    }

    /// Append one spectrum.
    ///
    /// The first spectrum with a `DeconvMassInfo` sets the file-level
    /// tolerance, mass offset and charge mass.
    pub fn push_spectrum(&mut self, spectrum: &MzMLSpectrum) -> Result<(), DeconvError> {
        let annotation = DeconvAnnotation::from_spectrum(spectrum)
            .map_err(|e| DeconvError::annotation(&spectrum.id, e))?;

        if let Some(annotation) = &annotation {
            if !self.annotated {
                self.tolerance = annotation.tolerance;
                self.mass_offset = annotation.mass_offset;
                self.charge_mass = annotation.charge_mass;
                self.annotated = true;
            }
            if !annotation.is_empty() {
                annotation
                    .zip_with_peaks(&spectrum.mz_array, &spectrum.intensity_array)
                    .map_err(|e| DeconvError::annotation(&spectrum.id, e))?;
            }
        }

        let precursor = spectrum.precursor();
        self.rows.push(MassTableRow {
            index: spectrum.index,
            scan: spectrum.scan_number(),
            ms_level: spectrum.ms_level,
            retention_time: spectrum.retention_time,
            precursor_scan: precursor.and_then(|p| p.precursor_scan()),
            precursor_mass: precursor.and_then(|p| p.neutral_mass(self.charge_mass)),
            mono_masses: spectrum.mz_array.clone(),
            intensities: spectrum.intensity_array.clone(),
            annotations: annotation.map(|a| a.masses).unwrap_or_default(),
        });
        Ok(())
    }

    /// Number of spectra
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no spectra
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row by scan number
    pub fn row_by_scan(&self, scan: i64) -> Option<&MassTableRow> {
        self.rows.iter().find(|r| r.scan == scan)
    }

    /// Spectrum count per MS level
    pub fn spectra_per_ms_level(&self) -> BTreeMap<i16, usize> {
        let mut counts = BTreeMap::new();
        for row in &self.rows {
            *counts.entry(row.ms_level).or_insert(0) += 1;
        }
        counts
    }

    /// Total number of masses over all spectra
    pub fn mass_count(&self) -> usize {
        self.rows.iter().map(MassTableRow::mass_count).sum()
    }

    /// Number of masses whose qscore is at least `threshold`
    pub fn masses_above_qscore(&self, threshold: f64) -> usize {
        self.rows
            .iter()
            .flat_map(|r| &r.annotations)
            .filter(|a| a.qscore.is_some_and(|q| q >= threshold))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mzml::{Precursor, UserParam};

    fn spectrum(scan: i64, masses: Vec<f64>, info: Option<&str>) -> MzMLSpectrum {
        MzMLSpectrum {
            index: scan - 1,
            id: format!("controllerType=0 controllerNumber=1 scan={scan}"),
            ms_level: 2,
            intensity_array: vec![1.0; masses.len()],
            mz_array: masses,
            user_params: info
                .map(|v| UserParam {
                    name: "DeconvMassInfo".to_string(),
                    param_type: Some("xsd:string".to_string()),
                    value: v.to_string(),
                })
                .into_iter()
                .collect(),
            precursors: vec![Precursor {
                spectrum_ref: Some("controllerType=0 controllerNumber=1 scan=1521".to_string()),
                selected_ion_mz: Some(918.4712),
                selected_ion_charge: Some(12),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_rows_and_file_parameters() {
        let spectra = vec![
            Ok(spectrum(
                1523,
                vec![481.3, 503.0],
                Some("tol=5;chargemass=1.0;peaks=1:5,1:4;qscore=0.49,0.96"),
            )),
            Ok(spectrum(1524, vec![600.0], Some("tol=20;peaks=2:3;qscore=0.2"))),
            Ok(spectrum(1525, vec![700.0, 800.0], None)),
        ];
        let table = MassTable::from_spectra(spectra).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.tolerance, 5.0);
        assert_eq!(table.charge_mass, 1.0);
        assert_eq!(table.mass_count(), 5);
        assert_eq!(table.masses_above_qscore(0.4), 2);
        assert_eq!(table.spectra_per_ms_level().get(&2), Some(&3));

        let row = table.row_by_scan(1523).unwrap();
        assert_eq!(row.precursor_scan, Some(1521));
        assert!((row.precursor_mass.unwrap() - (918.4712 - 1.0) * 12.0).abs() < 1e-9);
        assert_eq!(row.annotation(1).unwrap().max_charge, Some(4));
        assert!(table.row_by_scan(1525).unwrap().annotations.is_empty());
    }

    #[test]
    fn test_annotation_count_must_match_masses() {
        let spectra = vec![Ok(spectrum(7, vec![481.3], Some("peaks=1:5,1:4")))];
        let err = MassTable::from_spectra(spectra).unwrap_err();
        assert!(matches!(err, DeconvError::Annotation { .. }));
    }
}
