//! `DeconvMassInfo` parsing
//!
//! FLASHDeconv attaches one `DeconvMassInfo` userParam to each deconvolved
//! spectrum. Its value is a `;`-separated list of `key=value` fields:
//!
//! ```text
//! tol=10;massoffset=0.000000;chargemass=1.007276;peaks=1:5,1:4;cos=0.81,0.75;snr=3.2,4.2;qscore=0.49,0.96;qvalue=0.04,0.17
//! ```
//!
//! The per-mass lists run parallel to the m/z (monoisotopic mass) array.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::AnnotationError;
use crate::mzml::MzMLSpectrum;

/// userParam name carrying the per-mass annotation
pub const DECONV_MASS_INFO: &str = "DeconvMassInfo";

/// Mass tolerance (ppm) when `tol` is absent
pub const DEFAULT_TOLERANCE_PPM: f64 = 10.0;

/// Mass offset when `massoffset` is absent
pub const DEFAULT_MASS_OFFSET: f64 = 0.0;

/// Proton mass, the charge carrier when `chargemass` is absent
pub const PROTON_MASS: f64 = 1.007276;

/// Scores and charge range of one deconvolved mass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MassAnnotation {
    /// Lowest charge state observed
    pub min_charge: Option<i32>,
    /// Highest charge state observed
    pub max_charge: Option<i32>,
    /// Isotope cosine score
    pub cosine: Option<f64>,
    /// Signal-to-noise ratio
    pub snr: Option<f64>,
    /// Quality score
    pub qscore: Option<f64>,
    /// q-value
    pub qvalue: Option<f64>,
}

/// A parsed `DeconvMassInfo` value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeconvAnnotation {
    /// Mass tolerance in ppm
    pub tolerance: f64,
    /// Mass offset applied by the deconvolution
    pub mass_offset: f64,
    /// Mass of the charge carrier
    pub charge_mass: f64,
    /// One entry per deconvolved mass
    pub masses: Vec<MassAnnotation>,
    /// Fields this parser does not interpret, verbatim
    pub extra: BTreeMap<String, String>,
}

impl Default for DeconvAnnotation {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE_PPM,
            mass_offset: DEFAULT_MASS_OFFSET,
            charge_mass: PROTON_MASS,
            masses: Vec::new(),
            extra: BTreeMap::new(),
        }
    }
}

/// One mass with its intensity and annotation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnotatedMass<'a> {
    /// Monoisotopic mass
    pub mass: f64,
    /// Summed intensity
    pub intensity: f64,
    /// Scores and charges
    pub annotation: &'a MassAnnotation,
}

impl DeconvAnnotation {
    /// Parse a `DeconvMassInfo` value
    pub fn parse(value: &str) -> Result<Self, AnnotationError> {
        let mut annotation = Self::default();
        let mut charges: Option<Vec<(i32, i32)>> = None;
        let mut lists: [(&str, Option<Vec<f64>>); 4] =
            [("cos", None), ("snr", None), ("qscore", None), ("qvalue", None)];

        for field in value.split(';').map(str::trim).filter(|f| !f.is_empty()) {
            let (key, raw) = field
                .split_once('=')
                .ok_or_else(|| AnnotationError::MalformedField(field.to_string()))?;
            let key = key.trim();
            match key {
                "tol" => annotation.tolerance = parse_number(key, raw)?,
                "massoffset" => annotation.mass_offset = parse_number(key, raw)?,
                "chargemass" => annotation.charge_mass = parse_number(key, raw)?,
                "peaks" => {
                    charges = Some(
                        split_list(raw)
                            .map(parse_charge_range)
                            .collect::<Result<_, _>>()?,
                    )
                }
                _ => match lists.iter_mut().find(|(name, _)| *name == key) {
                    Some((_, slot)) => {
                        *slot = Some(
                            split_list(raw)
                                .map(|v| parse_number(key, v))
                                .collect::<Result<_, _>>()?,
                        )
                    }
                    None => {
                        annotation.extra.insert(key.to_string(), raw.to_string());
                    }
                },
            }
        }

        let count = charges
            .as_ref()
            .map(Vec::len)
            .or_else(|| lists.iter().find_map(|(_, l)| l.as_ref().map(Vec::len)))
            .unwrap_or(0);

        if let Some(c) = &charges {
            check_len("peaks", count, c.len())?;
        }
        for (name, list) in &lists {
            if let Some(list) = list {
                check_len(name, count, list.len())?;
            }
        }

        let [cos, snr, qscore, qvalue] = lists.map(|(_, l)| l);
        let value_at = |list: &Option<Vec<f64>>, i: usize| list.as_ref().map(|l| l[i]);
        annotation.masses = (0..count)
            .map(|i| MassAnnotation {
                min_charge: charges.as_ref().map(|c| c[i].0),
                max_charge: charges.as_ref().map(|c| c[i].1),
                cosine: value_at(&cos, i),
                snr: value_at(&snr, i),
                qscore: value_at(&qscore, i),
                qvalue: value_at(&qvalue, i),
            })
            .collect();

        Ok(annotation)
    }

    /// Annotation of a spectrum, `None` when it carries no `DeconvMassInfo`
    pub fn from_spectrum(spectrum: &MzMLSpectrum) -> Result<Option<Self>, AnnotationError> {
        spectrum.user_param(DECONV_MASS_INFO).map(Self::parse).transpose()
    }

    /// Number of annotated masses
    pub fn len(&self) -> usize {
        self.masses.len()
    }

    /// Whether no mass is annotated
    pub fn is_empty(&self) -> bool {
        self.masses.is_empty()
    }

    /// Pair each annotation with its mass and intensity
    pub fn zip_with_peaks<'a>(
        &'a self,
        masses: &[f64],
        intensities: &[f64],
    ) -> Result<Vec<AnnotatedMass<'a>>, AnnotationError> {
        check_len("m/z array", self.masses.len(), masses.len())?;
        check_len("intensity array", self.masses.len(), intensities.len())?;
        Ok(self
            .masses
            .iter()
            .zip(masses.iter().zip(intensities))
            .map(|(annotation, (&mass, &intensity))| AnnotatedMass {
                mass,
                intensity,
                annotation,
            })
            .collect())
    }
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|v| !v.is_empty())
}

fn parse_number(field: &str, raw: &str) -> Result<f64, AnnotationError> {
    raw.trim()
        .parse()
        .map_err(|_| AnnotationError::InvalidNumber {
            field: field.to_string(),
            value: raw.to_string(),
        })
}

fn parse_charge_range(raw: &str) -> Result<(i32, i32), AnnotationError> {
    let invalid = || AnnotationError::InvalidChargeRange(raw.to_string());
    let (min, max) = raw.split_once(':').ok_or_else(invalid)?;
    let min: i32 = min.trim().parse().map_err(|_| invalid())?;
    let max: i32 = max.trim().parse().map_err(|_| invalid())?;
    if min > max {
        return Err(invalid());
    }
    Ok((min, max))
}

fn check_len(field: &str, expected: usize, actual: usize) -> Result<(), AnnotationError> {
    if expected != actual {
        return Err(AnnotationError::LengthMismatch {
            field: field.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}
