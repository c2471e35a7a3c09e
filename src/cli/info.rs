use anyhow::{Context, Result};
use std::path::PathBuf;

use flashview::controlled_vocabulary::{describe, CvTerm};
use flashview::mzml::MzMLStreamer;

use super::output::{heading, label};
use super::Config;

/// Display run metadata of an mzML file
pub fn run(file: PathBuf, config: &Config) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {}", file.display());
    }

    let buffer_size = config.parse_options().buffer_size;
    let mut streamer = MzMLStreamer::open_indexed_with_buffer_size(&file, buffer_size)
        .with_context(|| format!("Failed to open {}", file.display()))?;
    let indexed = streamer.is_indexed();
    let indexed_spectra = streamer.index().spectrum_count();
    let indexed_chromatograms = streamer.index().chromatogram_count();
    let metadata = streamer
        .read_metadata()
        .context("Failed to read run metadata")?;

    println!("{}", heading("mzML File Information"));
    println!("{}: {}", label("File"), file.display());
    println!(
        "{}: {}",
        label("Version"),
        metadata.version.as_deref().unwrap_or("unknown")
    );
    println!();

    println!("{}", label("Controlled vocabularies:"));
    for cv in &metadata.cv_list {
        println!(
            "  {} {} {}",
            cv.id,
            cv.full_name.as_deref().unwrap_or(""),
            cv.version.as_deref().unwrap_or("")
        );
    }
    println!();

    if !metadata.file_content.is_empty() {
        println!("{}", label("File content:"));
        for param in &metadata.file_content {
            println!("  {}", CvTerm::from(param));
        }
        println!();
    }

    for source in &metadata.source_files {
        println!("{}: {} ({})", label("Source file"), source.name, source.id);
        if let (Some(kind), Some(checksum)) = (&source.checksum_type, &source.checksum) {
            println!("  {kind}: {checksum}");
        }
    }
    for software in &metadata.software_list {
        println!(
            "{}: {} {}",
            label("Software"),
            software.display_name(),
            software.version.as_deref().unwrap_or("")
        );
    }
    for instrument in &metadata.instrument_configurations {
        println!("{}: {}", label("Instrument"), instrument.id);
        for param in &instrument.cv_params {
            println!("  {}", describe(param));
        }
        for component in &instrument.components {
            let names: Vec<&str> = component.cv_params.iter().map(describe).collect();
            println!(
                "  {:?} #{}: {}",
                component.component_type,
                component.order,
                names.join(", ")
            );
        }
    }
    for processing in &metadata.data_processing {
        println!(
            "{}: {} ({} steps)",
            label("Data processing"),
            processing.id,
            processing.processing_methods.len()
        );
    }
    println!();

    println!("{}", label("Run:"));
    println!("  Id: {}", metadata.run_id.as_deref().unwrap_or("unknown"));
    if let Some(start) = metadata.start_timestamp() {
        println!("  Started: {start}");
    }
    if let Some(sample) = metadata.sample() {
        println!(
            "  Sample: {}",
            sample.name.as_deref().unwrap_or(sample.id.as_str())
        );
    }
    println!(
        "  Spectra: {}",
        metadata
            .spectrum_count
            .map_or_else(|| "unknown".to_string(), |n| n.to_string())
    );
    println!(
        "  Chromatograms: {}",
        metadata
            .chromatogram_count
            .map_or_else(|| "unknown".to_string(), |n| n.to_string())
    );
    println!();

    if indexed {
        println!(
            "{}: {} spectra, {} chromatograms",
            label("Index"),
            indexed_spectra,
            indexed_chromatograms
        );
    } else {
        println!("{}: none", label("Index"));
    }

    Ok(())
}
