//! Binary data decoding for mzML
//!
//! mzML stores numerical arrays (m/z, intensity, time, auxiliary integer
//! arrays) as Base64-encoded binary data, optionally compressed with zlib.
//! This module handles the decoding pipeline:
//!
//! 1. Check the declared `encodedLength` against the Base64 text
//! 2. Base64 decode the text
//! 3. Decompress if needed (zlib)
//! 4. Interpret bytes as little-endian float32/float64/int32/int64

use std::io::Read;

use base64::prelude::*;
use byteorder::{LittleEndian, ReadBytesExt};
use flate2::read::ZlibDecoder;
use serde::{Deserialize, Serialize};

use super::cv_params::{CvParam, MS_CV_ACCESSIONS};

/// Compression types used in mzML binary data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CompressionType {
    /// No compression (raw binary)
    #[default]
    None,
    /// zlib compression
    Zlib,
    /// MS-Numpress linear prediction
    NumpressLinear,
    /// MS-Numpress positive integer compression
    NumpressPic,
    /// MS-Numpress short logged float compression
    NumpressSlof,
}

impl CompressionType {
    /// Determine compression type from CV accession
    pub fn from_cv_accession(accession: &str) -> Option<Self> {
        match accession {
            MS_CV_ACCESSIONS::ZLIB_COMPRESSION => Some(CompressionType::Zlib),
            MS_CV_ACCESSIONS::NO_COMPRESSION => Some(CompressionType::None),
            MS_CV_ACCESSIONS::NUMPRESS_LINEAR => Some(CompressionType::NumpressLinear),
            MS_CV_ACCESSIONS::NUMPRESS_PIC => Some(CompressionType::NumpressPic),
            MS_CV_ACCESSIONS::NUMPRESS_SLOF => Some(CompressionType::NumpressSlof),
            _ => None,
        }
    }
}

/// Binary encoding of the array values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BinaryEncoding {
    /// 32-bit floating point (CV: MS:1000521)
    Float32,
    /// 64-bit floating point (CV: MS:1000523)
    #[default]
    Float64,
    /// 32-bit integer (CV: MS:1000519)
    Int32,
    /// 64-bit integer (CV: MS:1000522)
    Int64,
}

impl BinaryEncoding {
    /// Determine encoding from CV accession
    pub fn from_cv_accession(accession: &str) -> Option<Self> {
        match accession {
            MS_CV_ACCESSIONS::FLOAT_32_BIT => Some(BinaryEncoding::Float32),
            MS_CV_ACCESSIONS::FLOAT_64_BIT => Some(BinaryEncoding::Float64),
            MS_CV_ACCESSIONS::INT_32_BIT => Some(BinaryEncoding::Int32),
            MS_CV_ACCESSIONS::INT_64_BIT => Some(BinaryEncoding::Int64),
            _ => None,
        }
    }

    /// Get the byte size per value
    pub fn byte_size(&self) -> usize {
        match self {
            BinaryEncoding::Float32 | BinaryEncoding::Int32 => 4,
            BinaryEncoding::Float64 | BinaryEncoding::Int64 => 8,
        }
    }

    /// Whether values are integers
    pub fn is_integer(&self) -> bool {
        matches!(self, BinaryEncoding::Int32 | BinaryEncoding::Int64)
    }
}

/// What a binary data array holds, identified by its array-type cvParam
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ArrayKind {
    /// m/z array (MS:1000514)
    Mz,
    /// Intensity array (MS:1000515)
    Intensity,
    /// Charge array (MS:1000516)
    Charge,
    /// Time array (MS:1000595)
    Time,
    /// Non-standard data array (MS:1000786), named by the cvParam value
    NonStandard(String),
    /// No array-type cvParam present
    #[default]
    Unknown,
}

impl ArrayKind {
    /// Determine the array kind from a cvParam, if it is an array-type term
    pub fn from_cv_param(cv: &CvParam) -> Option<Self> {
        match cv.accession.as_str() {
            MS_CV_ACCESSIONS::MZ_ARRAY => Some(ArrayKind::Mz),
            MS_CV_ACCESSIONS::INTENSITY_ARRAY => Some(ArrayKind::Intensity),
            MS_CV_ACCESSIONS::CHARGE_ARRAY => Some(ArrayKind::Charge),
            MS_CV_ACCESSIONS::TIME_ARRAY => Some(ArrayKind::Time),
            MS_CV_ACCESSIONS::NON_STANDARD_DATA_ARRAY => Some(ArrayKind::NonStandard(
                cv.value.clone().unwrap_or_else(|| cv.name.clone()),
            )),
            _ => None,
        }
    }
}

/// Encoding details detected from the cvParams of one `binaryDataArray`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArrayDescriptor {
    /// Array kind
    pub kind: ArrayKind,
    /// Value encoding
    pub encoding: BinaryEncoding,
    /// Compression
    pub compression: CompressionType,
}

impl ArrayDescriptor {
    /// Collect kind, encoding and compression from a cvParam list.
    ///
    /// Missing encoding defaults to 64-bit float, missing compression to none.
    pub fn from_cv_params(cv_params: &[CvParam]) -> Self {
        let mut descriptor = ArrayDescriptor::default();
        for cv in cv_params {
            if let Some(enc) = BinaryEncoding::from_cv_accession(&cv.accession) {
                descriptor.encoding = enc;
            } else if let Some(comp) = CompressionType::from_cv_accession(&cv.accession) {
                descriptor.compression = comp;
            } else if let Some(kind) = ArrayKind::from_cv_param(cv) {
                descriptor.kind = kind;
            }
        }
        descriptor
    }
}

/// Errors that can occur during binary decoding
#[derive(Debug, thiserror::Error)]
pub enum BinaryDecodeError {
    /// Base64 text could not be decoded
    #[error("Base64 decode error: {0}")]
    Base64Error(#[from] base64::DecodeError),

    /// zlib stream could not be inflated
    #[error("Decompression error: {0}")]
    DecompressionError(#[from] std::io::Error),

    /// Decoded value count or byte count does not match the declaration
    #[error("Invalid data length: expected {expected}, got {actual}")]
    InvalidLength {
        /// Expected count
        expected: usize,
        /// Actual count
        actual: usize,
    },

    /// `encodedLength` attribute disagrees with the Base64 text
    #[error("Encoded length mismatch: declared {declared}, found {actual}")]
    EncodedLengthMismatch {
        /// Declared `encodedLength`
        declared: usize,
        /// Length of the Base64 text
        actual: usize,
    },

    /// Compression scheme not supported by this decoder
    #[error("Unsupported compression: {0:?}")]
    UnsupportedCompression(CompressionType),
}

/// Decoder for mzML binary data arrays
pub struct BinaryDecoder;

impl BinaryDecoder {
    /// Decode a Base64-encoded binary array from mzML
    ///
    /// # Arguments
    /// * `base64_data` - The Base64-encoded string from the `<binary>` element
    /// * `encoding` - The value encoding
    /// * `compression` - The compression type (none, zlib, etc.)
    /// * `expected_length` - Expected number of values (from defaultArrayLength)
    ///
    /// # Returns
    /// A `Vec<f64>` containing the decoded values (integers are widened)
    pub fn decode(
        base64_data: &str,
        encoding: BinaryEncoding,
        compression: CompressionType,
        expected_length: Option<usize>,
    ) -> Result<Vec<f64>, BinaryDecodeError> {
        let trimmed = base64_data.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }
        let decoded_bytes = BASE64_STANDARD.decode(trimmed)?;
        Self::decode_bytes(&decoded_bytes, encoding, compression, expected_length)
    }

    /// Decode a Base64-encoded integer array
    pub fn decode_integers(
        base64_data: &str,
        encoding: BinaryEncoding,
        compression: CompressionType,
        expected_length: Option<usize>,
    ) -> Result<Vec<i64>, BinaryDecodeError> {
        let trimmed = base64_data.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }
        let decoded_bytes = BASE64_STANDARD.decode(trimmed)?;
        let uncompressed = Self::decompress(decoded_bytes, compression)?;
        let values = Self::bytes_to_integers(&uncompressed, encoding)?;
        check_length(values.len(), expected_length)?;
        Ok(values)
    }

    /// Decode raw (already Base64-decoded) bytes
    pub fn decode_bytes(
        bytes: &[u8],
        encoding: BinaryEncoding,
        compression: CompressionType,
        expected_length: Option<usize>,
    ) -> Result<Vec<f64>, BinaryDecodeError> {
        let uncompressed = Self::decompress(bytes.to_vec(), compression)?;
        let values = match encoding {
            BinaryEncoding::Float32 | BinaryEncoding::Float64 => {
                Self::bytes_to_floats(&uncompressed, encoding)?
            }
            BinaryEncoding::Int32 | BinaryEncoding::Int64 => {
                Self::bytes_to_integers(&uncompressed, encoding)?
                    .into_iter()
                    .map(|v| v as f64)
                    .collect()
            }
        };
        check_length(values.len(), expected_length)?;
        Ok(values)
    }

    /// Compare a declared `encodedLength` with the Base64 text length
    pub fn check_encoded_length(
        base64_data: &str,
        declared: Option<usize>,
    ) -> Result<(), BinaryDecodeError> {
        let actual = base64_data.trim().len();
        match declared {
            Some(declared) if declared != actual => {
                Err(BinaryDecodeError::EncodedLengthMismatch { declared, actual })
            }
            _ => Ok(()),
        }
    }

    /// Number of raw bytes a Base64 payload decodes to, before decompression
    pub fn decoded_byte_len(base64_data: &str) -> usize {
        let trimmed = base64_data.trim();
        let padding = trimmed.bytes().rev().take_while(|b| *b == b'=').count();
        (trimmed.len() / 4) * 3 - padding.min(2)
    }

    fn decompress(
        decoded_bytes: Vec<u8>,
        compression: CompressionType,
    ) -> Result<Vec<u8>, BinaryDecodeError> {
        match compression {
            CompressionType::None => Ok(decoded_bytes),
            CompressionType::Zlib => {
                let mut decoder = ZlibDecoder::new(&decoded_bytes[..]);
                let mut uncompressed = Vec::new();
                decoder.read_to_end(&mut uncompressed)?;
                Ok(uncompressed)
            }
            CompressionType::NumpressLinear
            | CompressionType::NumpressPic
            | CompressionType::NumpressSlof => {
                Err(BinaryDecodeError::UnsupportedCompression(compression))
            }
        }
    }

    /// Convert raw bytes to f64 values based on encoding
    fn bytes_to_floats(
        bytes: &[u8],
        encoding: BinaryEncoding,
    ) -> Result<Vec<f64>, BinaryDecodeError> {
        let count = whole_values(bytes.len(), encoding)?;
        let mut values = Vec::with_capacity(count);
        let mut cursor = std::io::Cursor::new(bytes);

        match encoding {
            BinaryEncoding::Float32 => {
                for _ in 0..count {
                    values.push(cursor.read_f32::<LittleEndian>()? as f64);
                }
            }
            BinaryEncoding::Float64 => {
                for _ in 0..count {
                    values.push(cursor.read_f64::<LittleEndian>()?);
                }
            }
            BinaryEncoding::Int32 | BinaryEncoding::Int64 => {
                return Ok(Self::bytes_to_integers(bytes, encoding)?
                    .into_iter()
                    .map(|v| v as f64)
                    .collect());
            }
        }

        Ok(values)
    }

    fn bytes_to_integers(
        bytes: &[u8],
        encoding: BinaryEncoding,
    ) -> Result<Vec<i64>, BinaryDecodeError> {
        let count = whole_values(bytes.len(), encoding)?;
        let mut values = Vec::with_capacity(count);
        let mut cursor = std::io::Cursor::new(bytes);

        match encoding {
            BinaryEncoding::Int32 => {
                for _ in 0..count {
                    values.push(cursor.read_i32::<LittleEndian>()? as i64);
                }
            }
            BinaryEncoding::Int64 => {
                for _ in 0..count {
                    values.push(cursor.read_i64::<LittleEndian>()?);
                }
            }
            // Truncating float arrays requested as integers
            BinaryEncoding::Float32 | BinaryEncoding::Float64 => {
                return Ok(Self::bytes_to_floats(bytes, encoding)?
                    .into_iter()
                    .map(|v| v as i64)
                    .collect());
            }
        }

        Ok(values)
    }

    /// Decode with automatic detection of encoding from CV params
    pub fn decode_with_cv_params(
        base64_data: &str,
        cv_params: &[CvParam],
        expected_length: Option<usize>,
    ) -> Result<(Vec<f64>, BinaryEncoding), BinaryDecodeError> {
        let descriptor = ArrayDescriptor::from_cv_params(cv_params);
        let values = Self::decode(
            base64_data,
            descriptor.encoding,
            descriptor.compression,
            expected_length,
        )?;
        Ok((values, descriptor.encoding))
    }
}

fn whole_values(byte_len: usize, encoding: BinaryEncoding) -> Result<usize, BinaryDecodeError> {
    let byte_size = encoding.byte_size();
    if byte_len % byte_size != 0 {
        return Err(BinaryDecodeError::InvalidLength {
            expected: byte_len / byte_size * byte_size,
            actual: byte_len,
        });
    }
    Ok(byte_len / byte_size)
}

fn check_length(actual: usize, expected: Option<usize>) -> Result<(), BinaryDecodeError> {
    match expected {
        Some(expected) if expected != actual => {
            Err(BinaryDecodeError::InvalidLength { expected, actual })
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_float64_uncompressed() {
        // 100.0 = 0x4059000000000000, 200.0 = 0x4069000000000000 (little-endian)
        let bytes: [u8; 16] = [
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x59, 0x40, // 100.0
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x69, 0x40, // 200.0
        ];
        let base64_data = BASE64_STANDARD.encode(bytes);

        let result = BinaryDecoder::decode(
            &base64_data,
            BinaryEncoding::Float64,
            CompressionType::None,
            Some(2),
        )
        .unwrap();

        assert_eq!(result.len(), 2);
        assert!((result[0] - 100.0).abs() < 1e-10);
        assert!((result[1] - 200.0).abs() < 1e-10);
    }

    #[test]
    fn test_decode_float32_uncompressed() {
        let bytes: [u8; 8] = [
            0x00, 0x00, 0xc8, 0x42, // 100.0
            0x00, 0x00, 0x48, 0x43, // 200.0
        ];
        let base64_data = BASE64_STANDARD.encode(bytes);

        let result = BinaryDecoder::decode(
            &base64_data,
            BinaryEncoding::Float32,
            CompressionType::None,
            Some(2),
        )
        .unwrap();

        assert_eq!(result, vec![100.0, 200.0]);
    }

    #[test]
    fn test_decode_empty() {
        let result =
            BinaryDecoder::decode("", BinaryEncoding::Float64, CompressionType::None, None)
                .unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_decode_zlib_compressed() {
        use flate2::write::ZlibEncoder;
        use flate2::Compression;
        use std::io::Write;

        let values: Vec<f64> = vec![100.0, 200.0, 300.0, 400.0];
        let mut bytes = Vec::new();
        for v in &values {
            bytes.extend_from_slice(&v.to_le_bytes());
        }

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&bytes).unwrap();
        let compressed = encoder.finish().unwrap();
        let base64_data = BASE64_STANDARD.encode(&compressed);

        let result = BinaryDecoder::decode(
            &base64_data,
            BinaryEncoding::Float64,
            CompressionType::Zlib,
            Some(4),
        )
        .unwrap();

        assert_eq!(result, values);
    }

    #[test]
    fn test_decode_int64_ms_level_array() {
        let base64_data = BASE64_STANDARD.encode(2i64.to_le_bytes());
        let result = BinaryDecoder::decode_integers(
            &base64_data,
            BinaryEncoding::Int64,
            CompressionType::None,
            Some(1),
        )
        .unwrap();
        assert_eq!(result, vec![2]);
    }

    #[test]
    fn test_length_mismatch_is_an_error() {
        let base64_data = BASE64_STANDARD.encode(1.5f64.to_le_bytes());
        let err = BinaryDecoder::decode(
            &base64_data,
            BinaryEncoding::Float64,
            CompressionType::None,
            Some(3),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            BinaryDecodeError::InvalidLength {
                expected: 3,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_ragged_bytes_rejected() {
        let base64_data = BASE64_STANDARD.encode([0u8; 6]);
        let err = BinaryDecoder::decode(
            &base64_data,
            BinaryEncoding::Float32,
            CompressionType::None,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, BinaryDecodeError::InvalidLength { .. }));
    }

    #[test]
    fn test_numpress_unsupported() {
        let base64_data = BASE64_STANDARD.encode([0u8; 8]);
        let err = BinaryDecoder::decode(
            &base64_data,
            BinaryEncoding::Float64,
            CompressionType::NumpressLinear,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, BinaryDecodeError::UnsupportedCompression(_)));
    }

    #[test]
    fn test_encoded_and_decoded_lengths() {
        // 234 doubles and 234 floats, as in a deconvolved MS2 spectrum
        let mz = BASE64_STANDARD.encode(vec![0u8; 234 * 8]);
        let intensity = BASE64_STANDARD.encode(vec![0u8; 234 * 4]);
        assert_eq!(mz.len(), 2496);
        assert_eq!(intensity.len(), 1248);
        assert_eq!(BinaryDecoder::decoded_byte_len(&mz), 1872);
        assert_eq!(BinaryDecoder::decoded_byte_len(&intensity), 936);

        assert!(BinaryDecoder::check_encoded_length(&mz, Some(2496)).is_ok());
        assert!(BinaryDecoder::check_encoded_length(&mz, None).is_ok());
        assert!(matches!(
            BinaryDecoder::check_encoded_length(&intensity, Some(1200)),
            Err(BinaryDecodeError::EncodedLengthMismatch {
                declared: 1200,
                actual: 1248
            })
        ));
    }

    #[test]
    fn test_padded_decoded_length() {
        assert_eq!(BinaryDecoder::decoded_byte_len("AAAAAAAAWUA="), 8);
        assert_eq!(BinaryDecoder::decoded_byte_len("AADIQg=="), 4);
    }

    #[test]
    fn test_descriptor_defaults_and_detection() {
        let none = ArrayDescriptor::from_cv_params(&[]);
        assert_eq!(none.encoding, BinaryEncoding::Float64);
        assert_eq!(none.compression, CompressionType::None);
        assert_eq!(none.kind, ArrayKind::Unknown);

        let params = vec![
            CvParam {
                accession: MS_CV_ACCESSIONS::INT_64_BIT.to_string(),
                ..Default::default()
            },
            CvParam {
                accession: MS_CV_ACCESSIONS::ZLIB_COMPRESSION.to_string(),
                ..Default::default()
            },
            CvParam {
                accession: MS_CV_ACCESSIONS::NON_STANDARD_DATA_ARRAY.to_string(),
                name: "non-standard data array".to_string(),
                value: Some("ms level".to_string()),
                ..Default::default()
            },
        ];
        let descriptor = ArrayDescriptor::from_cv_params(&params);
        assert_eq!(descriptor.encoding, BinaryEncoding::Int64);
        assert_eq!(descriptor.compression, CompressionType::Zlib);
        assert_eq!(descriptor.kind, ArrayKind::NonStandard("ms level".to_string()));
    }
}
