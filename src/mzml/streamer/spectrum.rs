use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Decoder;

use super::helpers::{get_attribute, parse_attribute, parse_cv_param, parse_user_param};
use super::{MzMLError, MzMLStreamer};
use crate::mzml::binary::{ArrayDescriptor, ArrayKind, BinaryDecodeError, BinaryDecoder};
use crate::mzml::cv_params::{
    is_activation_method, normalize_retention_time, CvParam, MS_CV_ACCESSIONS,
};
use crate::mzml::models::{ArrayValues, BinaryArrayInfo, MzMLSpectrum, Precursor};

/// Where a cvParam or userParam sits inside a `<spectrum>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Spectrum,
    Scan,
    Precursor,
    BinaryArray,
}

impl<R: BufRead> MzMLStreamer<R> {
    /// Read the next spectrum from the stream
    pub fn next_spectrum(&mut self) -> Result<Option<MzMLSpectrum>, MzMLError> {
        if !self.in_spectrum_list {
            if self.metadata_read {
                return Ok(None);
            }
            self.read_metadata()?;
            if !self.in_spectrum_list {
                return Ok(None);
            }
        }

        let mut buf = Vec::new();
        loop {
            match self.reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    if e.name().as_ref() == b"spectrum" {
                        let spectrum = self.parse_spectrum(&e)?;
                        self.current_spectrum_index += 1;
                        return Ok(Some(spectrum));
                    }
                }
                Ok(Event::End(ref e)) => {
                    if e.name().as_ref() == b"spectrumList" {
                        self.in_spectrum_list = false;
                        return Ok(None);
                    }
                }
                Ok(Event::Eof) => {
                    self.in_spectrum_list = false;
                    return Ok(None);
                }
                Err(e) => return Err(MzMLError::XmlError(e)),
                _ => {}
            }
            buf.clear();
        }
    }

    /// Parse a single spectrum element
    fn parse_spectrum(&mut self, start_event: &BytesStart) -> Result<MzMLSpectrum, MzMLError> {
        let decoder = self.reader.decoder();
        let mut spectrum = MzMLSpectrum {
            index: parse_attribute(start_event, decoder, "index")?.unwrap_or(self.current_spectrum_index),
            id: get_attribute(start_event, decoder, "id")?.unwrap_or_default(),
            default_array_length: parse_attribute(start_event, decoder, "defaultArrayLength")?
                .unwrap_or(0),
            ..Default::default()
        };

        let mut depth = 1;
        let mut in_scan_list = false;
        let mut in_precursor_list = false;
        let mut in_binary_data_array_list = false;
        let mut current_precursor: Option<Precursor> = None;
        let mut current_binary_array: Option<BinaryArrayContext> = None;
        let mut buf = Vec::new();

        loop {
            let section = if in_binary_data_array_list {
                Section::BinaryArray
            } else if in_precursor_list {
                Section::Precursor
            } else if in_scan_list {
                Section::Scan
            } else {
                Section::Spectrum
            };

            match self.reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    depth += 1;
                    match e.name().as_ref() {
                        b"cvParam" | b"userParam" => Self::apply_param(
                            e,
                            decoder,
                            section,
                            &mut spectrum,
                            &mut current_precursor,
                            &mut current_binary_array,
                        )?,
                        b"scanList" => in_scan_list = true,
                        b"precursorList" => in_precursor_list = true,
                        b"precursor" => {
                            current_precursor = Some(Precursor {
                                spectrum_ref: get_attribute(e, decoder, "spectrumRef")?,
                                ..Default::default()
                            });
                        }
                        b"binaryDataArrayList" => in_binary_data_array_list = true,
                        b"binaryDataArray" => {
                            current_binary_array = Some(BinaryArrayContext::from_start(e, decoder)?);
                        }
                        b"binary" => {
                            if let Some(ref mut ctx) = current_binary_array {
                                ctx.in_binary = true;
                            }
                        }
                        _ => {}
                    }
                }
                Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                    b"cvParam" | b"userParam" => Self::apply_param(
                        e,
                        decoder,
                        section,
                        &mut spectrum,
                        &mut current_precursor,
                        &mut current_binary_array,
                    )?,
                    b"precursor" => spectrum.precursors.push(Precursor {
                        spectrum_ref: get_attribute(e, decoder, "spectrumRef")?,
                        ..Default::default()
                    }),
                    _ => {}
                },
                Ok(Event::Text(ref t)) => {
                    if let Some(ref mut ctx) = current_binary_array {
                        if ctx.in_binary {
                            // Base64 may be split over several text events
                            ctx.base64_data.push_str(&t.unescape()?);
                        }
                    }
                }
                Ok(Event::End(ref e)) => {
                    depth -= 1;
                    match e.name().as_ref() {
                        b"spectrum" => {
                            if depth == 0 {
                                break;
                            }
                        }
                        b"scanList" => in_scan_list = false,
                        b"precursorList" => in_precursor_list = false,
                        b"precursor" => {
                            if let Some(prec) = current_precursor.take() {
                                spectrum.precursors.push(prec);
                            }
                        }
                        b"binaryDataArrayList" => in_binary_data_array_list = false,
                        b"binary" => {
                            if let Some(ref mut ctx) = current_binary_array {
                                ctx.in_binary = false;
                            }
                        }
                        b"binaryDataArray" => {
                            if let Some(ctx) = current_binary_array.take() {
                                self.decode_binary_array(&mut spectrum, ctx)?;
                            }
                        }
                        _ => {}
                    }
                }
                Ok(Event::Eof) => {
                    return Err(MzMLError::InvalidStructure(
                        "Unexpected EOF in spectrum".to_string(),
                    ));
                }
                Err(e) => return Err(MzMLError::XmlError(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(spectrum)
    }

    /// Route a cvParam or userParam to the structure it describes
    fn apply_param(
        e: &BytesStart,
        decoder: Decoder,
        section: Section,
        spectrum: &mut MzMLSpectrum,
        current_precursor: &mut Option<Precursor>,
        current_binary_array: &mut Option<BinaryArrayContext>,
    ) -> Result<(), MzMLError> {
        if e.name().as_ref() == b"userParam" {
            let user_param = parse_user_param(e, decoder)?;
            match (section, current_precursor.as_mut()) {
                (Section::BinaryArray, _) => {}
                (Section::Precursor, Some(prec)) => prec.user_params.push(user_param),
                _ => spectrum.user_params.push(user_param),
            }
            return Ok(());
        }

        let cv_param = parse_cv_param(e, decoder)?;
        match section {
            Section::BinaryArray => {
                if let Some(ctx) = current_binary_array.as_mut() {
                    ctx.cv_params.push(cv_param);
                }
            }
            Section::Precursor => {
                if let Some(prec) = current_precursor.as_mut() {
                    Self::apply_precursor_cv_param(prec, &cv_param);
                    prec.cv_params.push(cv_param);
                }
            }
            Section::Scan => {
                Self::apply_scan_cv_param(spectrum, &cv_param);
                spectrum.cv_params.push(cv_param);
            }
            Section::Spectrum => {
                Self::apply_spectrum_cv_param(spectrum, &cv_param);
                spectrum.cv_params.push(cv_param);
            }
        }
        Ok(())
    }

    /// Apply CV param to spectrum properties
    fn apply_spectrum_cv_param(spectrum: &mut MzMLSpectrum, cv: &CvParam) {
        match cv.accession.as_str() {
            MS_CV_ACCESSIONS::MS_LEVEL => {
                spectrum.ms_level = cv.value_as_i64().unwrap_or(1) as i16;
            }
            MS_CV_ACCESSIONS::CENTROID_SPECTRUM => {
                spectrum.centroided = true;
            }
            MS_CV_ACCESSIONS::PROFILE_SPECTRUM => {
                spectrum.centroided = false;
            }
            MS_CV_ACCESSIONS::POSITIVE_SCAN => {
                spectrum.polarity = 1;
            }
            MS_CV_ACCESSIONS::NEGATIVE_SCAN => {
                spectrum.polarity = -1;
            }
            MS_CV_ACCESSIONS::TOTAL_ION_CURRENT => {
                spectrum.total_ion_current = cv.value_as_f64();
            }
            MS_CV_ACCESSIONS::BASE_PEAK_MZ => {
                spectrum.base_peak_mz = cv.value_as_f64();
            }
            MS_CV_ACCESSIONS::BASE_PEAK_INTENSITY => {
                spectrum.base_peak_intensity = cv.value_as_f64();
            }
            MS_CV_ACCESSIONS::LOWEST_OBSERVED_MZ => {
                spectrum.lowest_mz = cv.value_as_f64();
            }
            MS_CV_ACCESSIONS::HIGHEST_OBSERVED_MZ => {
                spectrum.highest_mz = cv.value_as_f64();
            }
            MS_CV_ACCESSIONS::FILTER_STRING => {
                spectrum.filter_string = cv.value.clone();
            }
            MS_CV_ACCESSIONS::PRESET_SCAN_CONFIGURATION => {
                spectrum.preset_scan_configuration = cv.value_as_i32();
            }
            _ => {}
        }
    }

    /// Apply CV param to scan properties
    fn apply_scan_cv_param(spectrum: &mut MzMLSpectrum, cv: &CvParam) {
        match cv.accession.as_str() {
            MS_CV_ACCESSIONS::SCAN_START_TIME => {
                if let Some(val) = cv.value_as_f64() {
                    spectrum.retention_time =
                        Some(normalize_retention_time(val, cv.unit_accession.as_deref()));
                }
            }
            MS_CV_ACCESSIONS::ION_INJECTION_TIME => {
                spectrum.ion_injection_time = cv.value_as_f64();
            }
            MS_CV_ACCESSIONS::SCAN_WINDOW_LOWER_LIMIT => {
                spectrum.scan_window_lower = cv.value_as_f64();
            }
            MS_CV_ACCESSIONS::SCAN_WINDOW_UPPER_LIMIT => {
                spectrum.scan_window_upper = cv.value_as_f64();
            }
            _ => {
                Self::apply_spectrum_cv_param(spectrum, cv);
            }
        }
    }

    /// Apply CV param to precursor properties
    fn apply_precursor_cv_param(precursor: &mut Precursor, cv: &CvParam) {
        match cv.accession.as_str() {
            MS_CV_ACCESSIONS::ISOLATION_WINDOW_TARGET_MZ => {
                precursor.isolation_window_target = cv.value_as_f64();
            }
            MS_CV_ACCESSIONS::ISOLATION_WINDOW_LOWER_OFFSET => {
                precursor.isolation_window_lower = cv.value_as_f64();
            }
            MS_CV_ACCESSIONS::ISOLATION_WINDOW_UPPER_OFFSET => {
                precursor.isolation_window_upper = cv.value_as_f64();
            }
            MS_CV_ACCESSIONS::SELECTED_ION_MZ => {
                precursor.selected_ion_mz = cv.value_as_f64();
            }
            MS_CV_ACCESSIONS::PEAK_INTENSITY => {
                precursor.selected_ion_intensity = cv.value_as_f64();
            }
            MS_CV_ACCESSIONS::CHARGE_STATE => {
                precursor.selected_ion_charge = cv.value_as_i64().map(|v| v as i16);
            }
            MS_CV_ACCESSIONS::COLLISION_ENERGY => {
                precursor.collision_energy = cv.value_as_f64();
            }
            accession if is_activation_method(accession) => {
                precursor.activation_method = Some(cv.name.clone());
            }
            _ => {}
        }
    }

    /// Decode binary array and add to spectrum
    fn decode_binary_array(
        &self,
        spectrum: &mut MzMLSpectrum,
        ctx: BinaryArrayContext,
    ) -> Result<(), MzMLError> {
        let decoded = ctx
            .decode(spectrum.default_array_length, self.verify_encoded_length)
            .map_err(|source| MzMLError::BinaryError {
                element: "spectrum",
                id: spectrum.id.clone(),
                source,
            })?;

        match decoded.info.kind {
            ArrayKind::Mz => spectrum.mz_array = decoded.values.into_floats(),
            ArrayKind::Intensity => spectrum.intensity_array = decoded.values.into_floats(),
            _ => log::debug!(
                "Spectrum {}: keeping only storage details of {:?} array",
                spectrum.id,
                decoded.info.kind
            ),
        }
        spectrum.arrays.push(decoded.info);

        Ok(())
    }
}

/// Binary array being collected from a `<binaryDataArray>` element
#[derive(Debug, Default)]
pub(super) struct BinaryArrayContext {
    pub(super) cv_params: Vec<CvParam>,
    pub(super) base64_data: String,
    pub(super) encoded_length: Option<usize>,
    pub(super) array_length: Option<usize>,
    pub(super) in_binary: bool,
}

/// A decoded array together with how it was stored
pub(super) struct DecodedArray {
    pub(super) info: BinaryArrayInfo,
    pub(super) values: ArrayValues,
}

impl BinaryArrayContext {
    /// Start collecting from the attributes of `<binaryDataArray>`
    pub(super) fn from_start(e: &BytesStart, decoder: Decoder) -> Result<Self, MzMLError> {
        Ok(Self {
            encoded_length: parse_attribute(e, decoder, "encodedLength")?,
            array_length: parse_attribute(e, decoder, "arrayLength")?,
            ..Default::default()
        })
    }

    /// Decode the collected payload.
    ///
    /// The value count must equal `arrayLength` when present, the owning
    /// element's `defaultArrayLength` otherwise. An empty payload decodes
    /// to an empty array.
    pub(super) fn decode(
        self,
        default_array_length: usize,
        verify_encoded_length: bool,
    ) -> Result<DecodedArray, BinaryDecodeError> {
        let descriptor = ArrayDescriptor::from_cv_params(&self.cv_params);
        let expected = Some(self.array_length.unwrap_or(default_array_length));

        if verify_encoded_length {
            BinaryDecoder::check_encoded_length(&self.base64_data, self.encoded_length)?;
        }

        let values = if self.base64_data.trim().is_empty() {
            if descriptor.encoding.is_integer() {
                ArrayValues::Integer(Vec::new())
            } else {
                ArrayValues::Float(Vec::new())
            }
        } else if descriptor.encoding.is_integer() {
            ArrayValues::Integer(BinaryDecoder::decode_integers(
                &self.base64_data,
                descriptor.encoding,
                descriptor.compression,
                expected,
            )?)
        } else {
            ArrayValues::Float(BinaryDecoder::decode(
                &self.base64_data,
                descriptor.encoding,
                descriptor.compression,
                expected,
            )?)
        };

        let info = BinaryArrayInfo {
            kind: descriptor.kind,
            encoding: descriptor.encoding,
            compression: descriptor.compression,
            encoded_length: self.encoded_length,
            decoded_bytes: BinaryDecoder::decoded_byte_len(&self.base64_data),
            value_count: values.len(),
        };

        Ok(DecodedArray { info, values })
    }
}
