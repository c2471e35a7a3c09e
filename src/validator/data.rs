use std::path::Path;

use crate::deconv::annotated::{parse_peak_groups, DECONV_MASS_PEAK_INDICES};
use crate::deconv::annotation::{DeconvAnnotation, DECONV_MASS_INFO};
use crate::mzml::{MzMLError, MzMLFileMetadata, MzMLSpectrum, MzMLStreamer};

use super::{CheckCategory, ValidationCheck, ValidationReport};

#[derive(Default)]
struct AnnotationTally {
    mass_info: usize,
    peak_indices: usize,
    first_error: Option<String>,
}

impl AnnotationTally {
    fn record(&mut self, spectrum: &MzMLSpectrum) {
        let result = check_annotations(spectrum, self);
        if let Err(message) = result {
            if self.first_error.is_none() {
                self.first_error = Some(format!("Spectrum '{}': {}", spectrum.id, message));
            }
        }
    }
}

fn check_annotations(spectrum: &MzMLSpectrum, tally: &mut AnnotationTally) -> Result<(), String> {
    if spectrum.user_param(DECONV_MASS_INFO).is_some() {
        tally.mass_info += 1;
        if let Some(annotation) =
            DeconvAnnotation::from_spectrum(spectrum).map_err(|e| e.to_string())?
        {
            if !annotation.is_empty() {
                annotation
                    .zip_with_peaks(&spectrum.mz_array, &spectrum.intensity_array)
                    .map_err(|e| e.to_string())?;
            }
        }
    }
    if let Some(value) = spectrum.user_param(DECONV_MASS_PEAK_INDICES) {
        tally.peak_indices += 1;
        parse_peak_groups(value, spectrum.mz_array.len()).map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// Steps 2 and 3: decode every array and check FLASHDeconv annotations
pub(crate) fn check_data(path: &Path, metadata: &MzMLFileMetadata, report: &mut ValidationReport) {
    let mut tally = AnnotationTally::default();
    let (spectra, chromatograms) = match stream_all(path, &mut tally) {
        Ok(counts) => counts,
        Err(e) => {
            report.add_check(ValidationCheck::failed(
                CheckCategory::BinaryArrays,
                "Decode arrays",
                e.to_string(),
            ));
            return;
        }
    };

    report.add_check(ValidationCheck::ok(
        CheckCategory::BinaryArrays,
        format!("{spectra} spectra and {chromatograms} chromatograms decoded"),
    ));
    check_count(report, "spectrumList count", metadata.spectrum_count, spectra);
    check_count(
        report,
        "chromatogramList count",
        metadata.chromatogram_count,
        chromatograms,
    );

    if tally.mass_info == 0 && tally.peak_indices == 0 {
        return;
    }
    match tally.first_error {
        Some(message) => report.add_check(ValidationCheck::failed(
            CheckCategory::Annotation,
            "FLASHDeconv annotations",
            message,
        )),
        None => report.add_check(ValidationCheck::ok(
            CheckCategory::Annotation,
            format!(
                "{} {} and {} {} userParams",
                tally.mass_info, DECONV_MASS_INFO, tally.peak_indices, DECONV_MASS_PEAK_INDICES
            ),
        )),
    }
}

fn stream_all(path: &Path, tally: &mut AnnotationTally) -> Result<(usize, usize), MzMLError> {
    let mut streamer = MzMLStreamer::open(path)?.with_encoded_length_check(true);

    let mut spectra = 0;
    while let Some(spectrum) = streamer.next_spectrum()? {
        tally.record(&spectrum);
        spectra += 1;
    }

    let mut chromatograms = 0;
    while streamer.next_chromatogram()?.is_some() {
        chromatograms += 1;
    }
    Ok((spectra, chromatograms))
}

fn check_count(report: &mut ValidationReport, name: &str, declared: Option<usize>, found: usize) {
    match declared {
        Some(declared) if declared != found => report.add_check(ValidationCheck::warning(
            CheckCategory::Structure,
            name,
            format!("declares {declared}, found {found}"),
        )),
        Some(_) => report.add_check(ValidationCheck::ok(CheckCategory::Structure, name)),
        None => {}
    }
}
