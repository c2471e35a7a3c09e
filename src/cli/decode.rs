use anyhow::{Context, Result};
use log::info;
use std::path::{Path, PathBuf};

use flashview::mzml::{IndexedMzML, MzMLError, MzMLSpectrum, MzMLStreamer};

use super::Config;

/// Find a spectrum by id, through the index when the file has one
fn find_spectrum(file: &Path, id: &str, config: &Config) -> Result<MzMLSpectrum> {
    let options = config.parse_options();

    let mut indexed = IndexedMzML::open_with_buffer_size(file, options.buffer_size)
        .with_context(|| format!("Failed to open {}", file.display()))?
        .with_encoded_length_check(options.verify_encoded_length);
    match indexed.spectrum_by_id(id) {
        Ok(spectrum) => return Ok(spectrum),
        Err(MzMLError::NotIndexed) => info!("No index, scanning {}", file.display()),
        Err(e) => return Err(e).context("Indexed lookup failed"),
    }

    let streamer = MzMLStreamer::open_with_buffer_size(file, options.buffer_size)?
        .with_encoded_length_check(options.verify_encoded_length);
    for spectrum in streamer.spectra() {
        let spectrum = spectrum?;
        if spectrum.id == id {
            return Ok(spectrum);
        }
    }
    anyhow::bail!("Spectrum '{}' not found in {}", id, file.display())
}

/// Print decoded (m/z, intensity) pairs of one spectrum
pub fn run(file: PathBuf, id: &str, config: &Config) -> Result<()> {
    let spectrum = find_spectrum(&file, id, config)?;

    println!("# {} ({} peaks)", spectrum.id, spectrum.peak_count());
    for (mz, intensity) in spectrum.mz_array.iter().zip(&spectrum.intensity_array) {
        println!("{mz}\t{intensity}");
    }
    Ok(())
}
