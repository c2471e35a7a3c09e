use anyhow::{Context, Result};
use log::info;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use flashview::deconv::{
    parse_flashdeconv_output_with, write_annotated_tsv, AnnotatedTable, ExportOptions, MassTable,
};
use flashview::deconv::export::write_mass_table_tsv_with;
use flashview::mzml::MzMLStreamer;

use super::output::{label, success};
use super::Config;

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

/// Path of the annotated peak table next to the mass table
fn annotated_output(output: &Path) -> PathBuf {
    output.with_extension("annotated.tsv")
}

/// Build the mass table (and annotated table) and write TSV
pub fn run(
    deconvolved: PathBuf,
    annotated: Option<PathBuf>,
    output: Option<PathBuf>,
    min_qscore: Option<f64>,
    config: &Config,
) -> Result<()> {
    let options = config.parse_options();

    let (mass_table, annotated_table): (MassTable, Option<AnnotatedTable>) = match &annotated {
        Some(annotated) => {
            let parsed = parse_flashdeconv_output_with(annotated, &deconvolved, &options)
                .context("Failed to parse FLASHDeconv output")?;
            (parsed.mass_table, Some(parsed.annotated))
        }
        None => {
            let streamer =
                MzMLStreamer::open_with_buffer_size(&deconvolved, options.buffer_size)
                    .with_context(|| format!("Failed to open {}", deconvolved.display()))?
                    .with_encoded_length_check(options.verify_encoded_length);
            let table = MassTable::from_spectra(streamer.spectra())
                .context("Failed to build mass table")?;
            (table, None)
        }
    };

    let export = ExportOptions { min_qscore };
    let mut writer = open_output(output.as_deref())?;
    let lines = write_mass_table_tsv_with(&mass_table, &mut writer, &export)?;
    writer.flush()?;
    info!("Wrote {lines} mass lines");

    if let Some(table) = &annotated_table {
        match &output {
            Some(output) => {
                let path = annotated_output(output);
                let peaks = write_annotated_tsv(table, open_output(Some(&path))?)?;
                info!("Wrote {peaks} peak lines to {}", path.display());
            }
            None => {
                writeln!(writer)?;
                write_annotated_tsv(table, &mut writer)?;
                writer.flush()?;
            }
        }
    }

    for (level, count) in mass_table.spectra_per_ms_level() {
        eprintln!("{} MS{level}: {count} spectra", label("Spectra"));
    }
    let kept = match min_qscore {
        Some(q) => format!(", {} with qscore >= {q}", mass_table.masses_above_qscore(q)),
        None => String::new(),
    };
    eprintln!(
        "{}",
        success(&format!("{} masses{kept}", mass_table.mass_count()))
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotated_output_path() {
        assert_eq!(
            annotated_output(Path::new("out/run.tsv")),
            PathBuf::from("out/run.annotated.tsv")
        );
    }
}
