//! # mzML Validation Module
//!
//! Consistency checks for (indexed) mzML files, as produced by FLASHDeconv.
//!
//! ## Validation Checklist
//!
//! 1. **Structure**: the run metadata parses and declares a version, CVs and a run
//! 2. **Binary arrays**: every array decodes, with `encodedLength` and the
//!    array length matching the payload
//! 3. **Annotations**: `DeconvMassInfo` and `DeconvMassPeakIndices` parse and
//!    agree with the peak arrays
//! 4. **Index**: every offset points at the element it names
//! 5. **Checksum**: the SHA-1 `fileChecksum` matches the file
//!
//! ## Usage
//!
//! ```rust,no_run
//! use flashview::validator::validate_mzml_file;
//! use std::path::Path;
//!
//! let report = validate_mzml_file(Path::new("run_deconv.mzML"));
//! println!("{}", report);
//! if report.has_failures() {
//!     std::process::exit(1);
//! }
//! ```

use std::path::Path;

pub use report::{CheckCategory, CheckStatus, ValidationCheck, ValidationReport};

mod data;
mod index;
mod report;
mod structure;

/// Run every check on an mzML file.
///
/// Failures are recorded in the report; later steps still run where they can.
pub fn validate_mzml_file(path: &Path) -> ValidationReport {
    let mut report = ValidationReport::new(path.display().to_string());

    // 1. Structure
    let Some(metadata) = structure::check_structure(path, &mut report) else {
        return report;
    };

    // 2-3. Binary arrays and annotations
    data::check_data(path, &metadata, &mut report);

    // 4-5. Index and checksum
    index::check_index(path, &mut report);

    log::info!(
        "Validated {}: {} passed, {} warnings, {} failed",
        path.display(),
        report.success_count(),
        report.warning_count(),
        report.failure_count()
    );
    report
}
