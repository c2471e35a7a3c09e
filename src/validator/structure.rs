use std::path::Path;

use crate::mzml::{MzMLFileMetadata, MzMLStreamer};

use super::{CheckCategory, ValidationCheck, ValidationReport};

const CATEGORY: CheckCategory = CheckCategory::Structure;

/// Step 1: read the run metadata
pub(crate) fn check_structure(
    path: &Path,
    report: &mut ValidationReport,
) -> Option<MzMLFileMetadata> {
    if !path.is_file() {
        report.add_check(ValidationCheck::failed(
            CATEGORY,
            "File exists",
            format!("Not a file: {}", path.display()),
        ));
        return None;
    }

    let opened = MzMLStreamer::open(path).and_then(|mut streamer| {
        let metadata = streamer.read_metadata()?.clone();
        Ok(metadata)
    });
    let metadata = match opened {
        Ok(metadata) => metadata,
        Err(e) => {
            report.add_check(ValidationCheck::failed(CATEGORY, "Run metadata", e.to_string()));
            return None;
        }
    };
    report.add_check(ValidationCheck::ok(CATEGORY, "Run metadata"));

    match metadata.version.as_deref() {
        Some(version) => report.add_check(ValidationCheck::ok(
            CATEGORY,
            format!("mzML version {version}"),
        )),
        None => report.add_check(ValidationCheck::warning(
            CATEGORY,
            "mzML version",
            "No version attribute",
        )),
    }

    if metadata.cv_list.iter().any(|cv| cv.id == "MS") {
        report.add_check(ValidationCheck::ok(
            CATEGORY,
            format!("cvList ({} vocabularies)", metadata.cv_list.len()),
        ));
    } else {
        report.add_check(ValidationCheck::warning(
            CATEGORY,
            "cvList",
            "PSI-MS vocabulary not declared",
        ));
    }

    match &metadata.run_id {
        Some(id) => report.add_check(ValidationCheck::ok(CATEGORY, format!("Run '{id}'"))),
        None => {
            report.add_check(ValidationCheck::failed(CATEGORY, "Run", "No run element"));
            return None;
        }
    }

    Some(metadata)
}
