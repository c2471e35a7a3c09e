//! # FLASHDeconv output
//!
//! FLASHDeconv writes two mzML files per run:
//!
//! - `*_deconv.mzML`: one spectrum per input scan whose m/z array holds the
//!   monoisotopic masses, annotated per mass by the `DeconvMassInfo` userParam
//! - `*_annotated.mzML`: the raw peaks of each scan, with
//!   `DeconvMassPeakIndices` listing which raw peaks make up each mass
//!
//! [`parse_flashdeconv_output`] reads both into a [`MassTable`] and an
//! [`AnnotatedTable`] matched by spectrum position.

pub mod annotated;
pub mod annotation;
mod error;
pub mod export;
pub mod mass_table;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::mzml::{MzMLStreamer, DEFAULT_INPUT_BUFFER_SIZE};

pub use annotated::{AnnotatedSpectrum, AnnotatedTable};
pub use annotation::{DeconvAnnotation, MassAnnotation};
pub use error::{AnnotationError, DeconvError};
pub use export::{write_annotated_tsv, write_mass_table_tsv, ExportOptions};
pub use mass_table::{MassTable, MassTableRow};

/// Reader settings used while parsing an experiment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOptions {
    /// Input buffer size in bytes
    pub buffer_size: usize,
    /// Check `encodedLength` of every binary array
    pub verify_encoded_length: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_INPUT_BUFFER_SIZE,
            verify_encoded_length: true,
        }
    }
}

/// Both tables of one FLASHDeconv run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedExperiment {
    /// Deconvolved masses per spectrum
    pub mass_table: MassTable,
    /// Raw peaks and their mass assignment per spectrum
    pub annotated: AnnotatedTable,
    /// Mass tolerance in ppm
    pub tolerance: f64,
    /// Mass offset
    pub mass_offset: f64,
    /// Charge carrier mass
    pub charge_mass: f64,
}

/// Parse an annotated/deconvolved file pair with default options
pub fn parse_flashdeconv_output<P, Q>(
    annotated_path: P,
    deconvolved_path: Q,
) -> Result<ParsedExperiment, DeconvError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    parse_flashdeconv_output_with(annotated_path, deconvolved_path, &ParseOptions::default())
}

/// Parse an annotated/deconvolved file pair.
///
/// Spectra are matched by position. Differing spectrum counts are an error;
/// differing scan numbers or mass counts at the same position are logged.
pub fn parse_flashdeconv_output_with<P, Q>(
    annotated_path: P,
    deconvolved_path: Q,
    options: &ParseOptions,
) -> Result<ParsedExperiment, DeconvError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let deconvolved_path = deconvolved_path.as_ref();
    let annotated_path = annotated_path.as_ref();
    log::info!(
        "Parsing {} and {}",
        deconvolved_path.display(),
        annotated_path.display()
    );

    let streamer = MzMLStreamer::open_with_buffer_size(deconvolved_path, options.buffer_size)?
        .with_encoded_length_check(options.verify_encoded_length);
    let mass_table = MassTable::from_spectra(streamer.spectra())?;

    let streamer = MzMLStreamer::open_with_buffer_size(annotated_path, options.buffer_size)?
        .with_encoded_length_check(options.verify_encoded_length);
    let annotated = AnnotatedTable::from_spectra(streamer.spectra())?;

    if mass_table.len() != annotated.len() {
        return Err(DeconvError::SpectrumCountMismatch {
            deconvolved: mass_table.len(),
            annotated: annotated.len(),
        });
    }

    for (row, spectrum) in mass_table.rows.iter().zip(&annotated.spectra) {
        if row.scan != spectrum.scan {
            log::warn!(
                "Spectrum {}: deconvolved scan {} but annotated scan {}",
                row.index,
                row.scan,
                spectrum.scan
            );
        }
        if !spectrum.peak_groups.is_empty() && row.mass_count() != spectrum.mass_count() {
            log::warn!(
                "Scan {}: {} deconvolved masses but {} peak groups",
                row.scan,
                row.mass_count(),
                spectrum.mass_count()
            );
        }
    }

    log::info!(
        "Parsed {} spectra with {} masses",
        mass_table.len(),
        mass_table.mass_count()
    );

    Ok(ParsedExperiment {
        tolerance: mass_table.tolerance,
        mass_offset: mass_table.mass_offset,
        charge_mass: mass_table.charge_mass,
        mass_table,
        annotated,
    })
}
