//! # mzML reader
//!
//! Pull parser for mzML 1.1 files as FLASHDeconv writes them: a plain or
//! `indexedmzML`-wrapped document with one `run`, base64 binary arrays and
//! an optional trailing index with a SHA-1 `fileChecksum`.
//!
//! [`MzMLStreamer`] reads the header once, then yields spectra and
//! chromatograms one at a time. [`IndexedMzML`] seeks through the
//! `indexList` instead and can verify offsets and checksum.
//!
//! ```text
//! indexedmzML
//! ├── mzML
//! │   ├── cvList, fileDescription, sampleList
//! │   ├── softwareList, instrumentConfigurationList, dataProcessingList
//! │   └── run
//! │       ├── spectrumList/spectrum*
//! │       │   ├── cvParam*, userParam* (DeconvMassInfo, DeconvMassPeakIndices)
//! │       │   ├── scanList, precursorList
//! │       │   └── binaryDataArrayList/binaryDataArray*
//! │       └── chromatogramList/chromatogram*
//! ├── indexList/index/offset*
//! ├── indexListOffset
//! └── fileChecksum
//! ```

mod binary;
mod cv_params;
mod models;
mod streamer;

pub use binary::{
    ArrayDescriptor, ArrayKind, BinaryDecodeError, BinaryDecoder, BinaryEncoding,
    CompressionType as BinaryCompression,
};
pub use cv_params::{
    extract_cv_f64, extract_cv_value, find_cv_param, has_cv_param, is_activation_method,
    normalize_retention_time, CvParam, UserParam, MS_CV_ACCESSIONS,
};
pub use models::*;
pub use streamer::{
    ChecksumStatus, ChromatogramIterator, IndexReport, IndexedMzML, MzMLError, MzMLStreamer,
    OffsetMismatch, SpectrumIterator, DEFAULT_INPUT_BUFFER_SIZE,
};
