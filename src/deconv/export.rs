//! Tab-separated export of the mass and annotated-peak tables

use std::io::Write;

use super::annotated::AnnotatedTable;
use super::mass_table::MassTable;
use super::DeconvError;

/// Columns of the mass table export
pub const MASS_TABLE_COLUMNS: [&str; 14] = [
    "Index",
    "Scan",
    "MSLevel",
    "RT",
    "PrecursorScan",
    "PrecursorMass",
    "MonoMass",
    "SumIntensity",
    "MinCharge",
    "MaxCharge",
    "CosineScore",
    "SNR",
    "QScore",
    "QValue",
];

/// Columns of the annotated peak export
pub const ANNOTATED_COLUMNS: [&str; 5] = ["Index", "Scan", "MZ", "Intensity", "MassIndex"];

/// Filters applied when exporting
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExportOptions {
    /// Keep only masses with at least this qscore
    pub min_qscore: Option<f64>,
}

fn tsv_writer<W: Write>(writer: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_writer(writer)
}

fn cell<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Write one line per deconvolved mass; returns the number of data lines
pub fn write_mass_table_tsv<W: Write>(table: &MassTable, writer: W) -> Result<usize, DeconvError> {
    write_mass_table_tsv_with(table, writer, &ExportOptions::default())
}

/// [`write_mass_table_tsv`] with filters
pub fn write_mass_table_tsv_with<W: Write>(
    table: &MassTable,
    writer: W,
    options: &ExportOptions,
) -> Result<usize, DeconvError> {
    let mut tsv = tsv_writer(writer);
    tsv.write_record(MASS_TABLE_COLUMNS)?;

    let mut lines = 0;
    for row in &table.rows {
        for (i, (mass, intensity)) in row.mono_masses.iter().zip(&row.intensities).enumerate() {
            let annotation = row.annotation(i);
            let qscore = annotation.and_then(|a| a.qscore);
            if let Some(min) = options.min_qscore {
                if !qscore.is_some_and(|q| q >= min) {
                    continue;
                }
            }

            tsv.write_record([
                row.index.to_string(),
                row.scan.to_string(),
                row.ms_level.to_string(),
                cell(row.retention_time),
                cell(row.precursor_scan),
                cell(row.precursor_mass),
                mass.to_string(),
                intensity.to_string(),
                cell(annotation.and_then(|a| a.min_charge)),
                cell(annotation.and_then(|a| a.max_charge)),
                cell(annotation.and_then(|a| a.cosine)),
                cell(annotation.and_then(|a| a.snr)),
                cell(qscore),
                cell(annotation.and_then(|a| a.qvalue)),
            ])?;
            lines += 1;
        }
    }

    tsv.flush()?;
    Ok(lines)
}

/// Write one line per raw peak; noise peaks have an empty mass index
pub fn write_annotated_tsv<W: Write>(
    table: &AnnotatedTable,
    writer: W,
) -> Result<usize, DeconvError> {
    let mut tsv = tsv_writer(writer);
    tsv.write_record(ANNOTATED_COLUMNS)?;

    let mut lines = 0;
    for spectrum in &table.spectra {
        let assignment = spectrum.mass_index_per_peak();
        for ((mz, intensity), mass_index) in spectrum
            .mz
            .iter()
            .zip(&spectrum.intensity)
            .zip(assignment)
        {
            tsv.write_record([
                spectrum.index.to_string(),
                spectrum.scan.to_string(),
                mz.to_string(),
                intensity.to_string(),
                cell(mass_index),
            ])?;
            lines += 1;
        }
    }

    tsv.flush()?;
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deconv::annotated::AnnotatedSpectrum;
    use crate::deconv::annotation::MassAnnotation;
    use crate::deconv::mass_table::MassTableRow;

    fn table() -> MassTable {
        let mut table = MassTable::default();
        table.rows = vec![MassTableRow {
            index: 0,
            scan: 1523,
            ms_level: 2,
            retention_time: Some(1843.26705),
            precursor_scan: Some(1521),
            precursor_mass: None,
            mono_masses: vec![481.5, 503.25],
            intensities: vec![10.0, 20.5],
            annotations: vec![
                MassAnnotation {
                    min_charge: Some(1),
                    max_charge: Some(5),
                    qscore: Some(0.49),
                    ..Default::default()
                },
                MassAnnotation {
                    qscore: Some(0.96),
                    ..Default::default()
                },
            ],
        }];
        table
    }

    #[test]
    fn test_mass_table_tsv() {
        let mut out = Vec::new();
        let lines = write_mass_table_tsv(&table(), &mut out).unwrap();
        assert_eq!(lines, 2);

        let text = String::from_utf8(out).unwrap();
        let mut rows = text.lines();
        assert_eq!(rows.next().unwrap(), MASS_TABLE_COLUMNS.join("\t"));
        assert_eq!(
            rows.next().unwrap(),
            "0\t1523\t2\t1843.26705\t1521\t\t481.5\t10\t1\t5\t\t\t0.49\t"
        );
    }

    #[test]
    fn test_qscore_filter() {
        let mut out = Vec::new();
        let options = ExportOptions {
            min_qscore: Some(0.9),
        };
        let lines = write_mass_table_tsv_with(&table(), &mut out, &options).unwrap();
        assert_eq!(lines, 1);
        assert!(String::from_utf8(out).unwrap().contains("503.25"));
    }

    #[test]
    fn test_annotated_tsv() {
        let table = AnnotatedTable {
            spectra: vec![AnnotatedSpectrum {
                index: 0,
                scan: 1523,
                mz: vec![161.5, 162.0, 163.0],
                intensity: vec![1.0, 2.0, 3.0],
                peak_groups: vec![vec![0, 2]],
                ..Default::default()
            }],
        };
        let mut out = Vec::new();
        assert_eq!(write_annotated_tsv(&table, &mut out).unwrap(), 3);

        let text = String::from_utf8(out).unwrap();
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(rows[0], "Index\tScan\tMZ\tIntensity\tMassIndex");
        assert_eq!(rows[1], "0\t1523\t161.5\t1\t0");
        assert_eq!(rows[2], "0\t1523\t162\t2\t");
    }
}
