use anyhow::Result;
use log::info;
use std::path::PathBuf;

use flashview::validator::validate_mzml_file;

/// Check arrays, index and checksum; exits non-zero on any failure
pub fn run(file: PathBuf) -> Result<()> {
    info!("Verifying {}", file.display());

    let report = validate_mzml_file(&file);

    #[cfg(feature = "colorized_output")]
    {
        println!("{}", report.format_colored());
    }

    #[cfg(not(feature = "colorized_output"))]
    {
        println!("{}", report);
    }

    if report.has_failures() {
        std::process::exit(1);
    }
    Ok(())
}
