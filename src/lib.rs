//! # flashview - FLASHDeconv mzML reader and experiment workspace
//!
//! `flashview` reads the two mzML files FLASHDeconv writes for every run and
//! turns them into tables:
//!
//! - `*_deconv.mzML`: deconvolved spectra whose peaks are monoisotopic masses,
//!   scored per mass by the `DeconvMassInfo` userParam
//! - `*_annotated.mzML`: the raw spectra, with `DeconvMassPeakIndices` naming
//!   the raw peaks behind each mass
//!
//! ## Key Features
//!
//! - **Streaming mzML**: pull parser over `quick-xml` with base64, zlib and
//!   32/64-bit float and integer array decoding.
//!
//! - **Checked input**: `encodedLength` and array lengths are verified while
//!   decoding; indexedmzML offsets and the SHA-1 `fileChecksum` can be
//!   verified against the file.
//!
//! - **Random access**: spectra and chromatograms are read through the
//!   trailing byte-offset index without parsing the whole file.
//!
//! - **Workspaces**: per-session directories pairing deconvolved and annotated
//!   files into experiments, with persisted `params.json`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flashview::deconv::parse_flashdeconv_output;
//!
//! let experiment = parse_flashdeconv_output(
//!     "run_annotated.mzML",
//!     "run_deconv.mzML",
//! )?;
//! println!(
//!     "{} spectra, {} masses, tolerance {} ppm",
//!     experiment.mass_table.len(),
//!     experiment.mass_table.mass_count(),
//!     experiment.tolerance
//! );
//! # Ok::<(), flashview::deconv::DeconvError>(())
//! ```
//!
//! ## Reading mzML
//!
//! ```rust,no_run
//! use flashview::mzml::{IndexedMzML, MzMLStreamer};
//!
//! let streamer = MzMLStreamer::open("run_deconv.mzML")?;
//! for spectrum in streamer.spectra() {
//!     let spectrum = spectrum?;
//!     println!("{}: {} peaks", spectrum.id, spectrum.peak_count());
//! }
//!
//! let mut indexed = IndexedMzML::open("run_deconv.mzML")?;
//! let first = indexed.spectrum_at(0)?;
//! assert!(indexed.verify_offsets()?.is_ok());
//! # let _ = first;
//! # Ok::<(), flashview::mzml::MzMLError>(())
//! ```
//!
//! ## Architecture
//!
//! - [`mzml`]: streaming and indexed mzML reader
//! - [`controlled_vocabulary`]: PSI-MS, UO, BTO, GO and PATO term lookup
//! - [`deconv`]: FLASHDeconv annotations, mass table and annotated peak table
//! - [`validator`]: whole-file consistency report
//! - [`workspace`]: experiment workspaces and parameters

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod controlled_vocabulary;
pub mod deconv;
pub mod mzml;
pub mod validator;
pub mod workspace;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::controlled_vocabulary::{describe, lookup, ControlledVocabulary, CvTerm};
    pub use crate::deconv::{
        parse_flashdeconv_output, parse_flashdeconv_output_with, write_annotated_tsv,
        write_mass_table_tsv, AnnotatedSpectrum, AnnotatedTable, DeconvAnnotation, DeconvError,
        MassAnnotation, MassTable, MassTableRow, ParseOptions, ParsedExperiment,
    };
    pub use crate::mzml::{
        ChecksumStatus, IndexedMzML, MzMLChromatogram, MzMLError, MzMLFileMetadata, MzMLSpectrum,
        MzMLStreamer,
    };
    pub use crate::validator::{validate_mzml_file, ValidationReport};
    pub use crate::workspace::{
        ExperimentCache, ExperimentListing, Location, Params, Workspace, WorkspaceError,
    };
}
