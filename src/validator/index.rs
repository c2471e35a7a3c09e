use std::path::Path;

use crate::mzml::{ChecksumStatus, IndexedMzML};

use super::{CheckCategory, ValidationCheck, ValidationReport};

/// Mismatches listed before the rest are summarised
const MAX_LISTED: usize = 3;

/// Steps 4 and 5: index offsets and file checksum
pub(crate) fn check_index(path: &Path, report: &mut ValidationReport) {
    let mut indexed = match IndexedMzML::open(path) {
        Ok(indexed) => indexed,
        Err(e) => {
            report.add_check(ValidationCheck::failed(
                CheckCategory::Index,
                "indexList",
                e.to_string(),
            ));
            return;
        }
    };

    if !indexed.index().is_indexed() {
        report.add_check(ValidationCheck::warning(
            CheckCategory::Index,
            "indexList",
            "File is not indexed",
        ));
        return;
    }

    match indexed.verify_offsets() {
        Ok(offsets) if offsets.is_ok() => report.add_check(ValidationCheck::ok(
            CheckCategory::Index,
            format!(
                "{} spectrum and {} chromatogram offsets",
                offsets.spectra_checked, offsets.chromatograms_checked
            ),
        )),
        Ok(offsets) => {
            let mut listed: Vec<String> = offsets
                .mismatches
                .iter()
                .take(MAX_LISTED)
                .map(|m| format!("{} '{}' at {} found {}", m.element, m.id, m.offset, m.found))
                .collect();
            if offsets.mismatches.len() > MAX_LISTED {
                listed.push(format!("{} more", offsets.mismatches.len() - MAX_LISTED));
            }
            report.add_check(ValidationCheck::failed(
                CheckCategory::Index,
                "Offsets",
                listed.join("; "),
            ));
        }
        Err(e) => report.add_check(ValidationCheck::failed(
            CheckCategory::Index,
            "Offsets",
            e.to_string(),
        )),
    }

    match indexed.verify_checksum() {
        Ok(ChecksumStatus::Valid(digest)) => report.add_check(ValidationCheck::ok(
            CheckCategory::Checksum,
            format!("SHA-1 {digest}"),
        )),
        Ok(ChecksumStatus::Mismatch { expected, actual }) => {
            report.add_check(ValidationCheck::failed(
                CheckCategory::Checksum,
                "SHA-1",
                format!("stored {expected}, computed {actual}"),
            ))
        }
        Ok(ChecksumStatus::Missing) => report.add_check(ValidationCheck::warning(
            CheckCategory::Checksum,
            "fileChecksum",
            "No checksum stored",
        )),
        Err(e) => report.add_check(ValidationCheck::failed(
            CheckCategory::Checksum,
            "SHA-1",
            e.to_string(),
        )),
    }
}
