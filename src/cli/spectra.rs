use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;

use flashview::mzml::{MzMLSpectrum, MzMLStreamer};

use super::output::label;
use super::Config;

/// Per-spectrum summary printed by `spectra`
#[derive(Debug, Serialize)]
struct SpectrumSummary {
    index: i64,
    id: String,
    ms_level: i16,
    retention_time: Option<f64>,
    peak_count: usize,
    base_peak_mz: Option<f64>,
    base_peak_intensity: Option<f64>,
    precursor_mz: Option<f64>,
    precursor_charge: Option<i16>,
}

impl From<&MzMLSpectrum> for SpectrumSummary {
    fn from(spectrum: &MzMLSpectrum) -> Self {
        let precursor = spectrum.precursor();
        Self {
            index: spectrum.index,
            id: spectrum.id.clone(),
            ms_level: spectrum.ms_level,
            retention_time: spectrum.retention_time,
            peak_count: spectrum.peak_count(),
            base_peak_mz: spectrum.base_peak_mz,
            base_peak_intensity: spectrum.base_peak_intensity,
            precursor_mz: precursor.and_then(|p| p.selected_ion_mz),
            precursor_charge: precursor.and_then(|p| p.selected_ion_charge),
        }
    }
}

fn optional(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.precision$}"))
}

/// List the spectra of an mzML file
pub fn run(file: PathBuf, json: bool, config: &Config) -> Result<()> {
    let options = config.parse_options();
    let streamer = MzMLStreamer::open_with_buffer_size(&file, options.buffer_size)
        .with_context(|| format!("Failed to open {}", file.display()))?
        .with_encoded_length_check(options.verify_encoded_length);

    let mut summaries = Vec::new();
    for spectrum in streamer.spectra() {
        let spectrum = spectrum.context("Failed to read spectrum")?;
        summaries.push(SpectrumSummary::from(&spectrum));
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    println!(
        "{}",
        label("Index\tId\tMS\tRT(s)\tPeaks\tBasePeakMz\tBasePeakInt\tPrecursor")
    );
    for s in &summaries {
        let precursor = match (s.precursor_mz, s.precursor_charge) {
            (Some(mz), Some(z)) => format!("{mz:.4} ({z}+)"),
            (Some(mz), None) => format!("{mz:.4}"),
            _ => "-".to_string(),
        };
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            s.index,
            s.id,
            s.ms_level,
            optional(s.retention_time, 2),
            s.peak_count,
            optional(s.base_peak_mz, 4),
            optional(s.base_peak_intensity, 1),
            precursor
        );
    }

    Ok(())
}
