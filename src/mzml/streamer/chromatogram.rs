use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};

use super::helpers::{get_attribute, parse_attribute, parse_cv_param};
use super::spectrum::BinaryArrayContext;
use super::{MzMLError, MzMLStreamer};
use crate::mzml::binary::ArrayKind;
use crate::mzml::cv_params::CvParam;
use crate::mzml::models::{AuxiliaryArray, ChromatogramType, MzMLChromatogram};

impl<R: BufRead> MzMLStreamer<R> {
    /// Read the next chromatogram from the stream.
    ///
    /// Spectra that have not been consumed yet are skipped.
    pub fn next_chromatogram(&mut self) -> Result<Option<MzMLChromatogram>, MzMLError> {
        if !self.metadata_read {
            self.read_metadata()?;
        }

        let decoder = self.reader.decoder();
        let mut buf = Vec::new();
        loop {
            match self.reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => match e.name().as_ref() {
                    b"chromatogram" => {
                        let chromatogram = self.parse_chromatogram(e)?;
                        self.current_chromatogram_index += 1;
                        return Ok(Some(chromatogram));
                    }
                    b"chromatogramList" => {
                        self.in_spectrum_list = false;
                        self.in_chromatogram_list = true;
                        self.metadata.chromatogram_count = parse_attribute(e, decoder, "count")?;
                    }
                    _ => {}
                },
                Ok(Event::End(ref e)) => match e.name().as_ref() {
                    b"chromatogramList" => {
                        self.in_chromatogram_list = false;
                        return Ok(None);
                    }
                    b"spectrumList" => self.in_spectrum_list = false,
                    _ => {}
                },
                Ok(Event::Eof) => return Ok(None),
                Err(e) => return Err(MzMLError::XmlError(e)),
                _ => {}
            }
            buf.clear();
        }
    }

    /// Parse a single chromatogram element
    fn parse_chromatogram(
        &mut self,
        start_event: &BytesStart,
    ) -> Result<MzMLChromatogram, MzMLError> {
        let decoder = self.reader.decoder();
        let mut chromatogram = MzMLChromatogram {
            index: parse_attribute(start_event, decoder, "index")?
                .unwrap_or(self.current_chromatogram_index),
            id: get_attribute(start_event, decoder, "id")?.unwrap_or_default(),
            default_array_length: parse_attribute(start_event, decoder, "defaultArrayLength")?
                .unwrap_or(0),
            ..Default::default()
        };

        let mut depth = 1;
        let mut in_binary_data_array_list = false;
        let mut current_binary_array: Option<BinaryArrayContext> = None;
        let mut buf = Vec::new();

        loop {
            match self.reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    depth += 1;
                    match e.name().as_ref() {
                        b"cvParam" => {
                            let cv_param = parse_cv_param(e, decoder)?;
                            Self::push_chromatogram_cv_param(
                                &mut chromatogram,
                                current_binary_array.as_mut().filter(|_| in_binary_data_array_list),
                                cv_param,
                            );
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
                Ok(Event::Empty(ref e)) => {
                    if e.name().as_ref() == b"cvParam" {
                        let cv_param = parse_cv_param(e, decoder)?;
                        Self::push_chromatogram_cv_param(
                            &mut chromatogram,
                            current_binary_array.as_mut().filter(|_| in_binary_data_array_list),
                            cv_param,
                        );
                    }
                }
                Ok(Event::Text(ref t)) => {
                    if let Some(ref mut ctx) = current_binary_array {
                        if ctx.in_binary {
                            ctx.base64_data.push_str(&t.unescape()?);
                        }
                    }
                }
                Ok(Event::End(ref e)) => {
                    depth -= 1;
                    match e.name().as_ref() {
                        b"chromatogram" => {
                            if depth == 0 {
                                break;
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
                                self.decode_chromatogram_binary_array(&mut chromatogram, ctx)?;
                            }
                        }
                        _ => {}
                    }
                }
                Ok(Event::Eof) => {
                    return Err(MzMLError::InvalidStructure(
                        "Unexpected EOF in chromatogram".to_string(),
                    ));
                }
                Err(e) => return Err(MzMLError::XmlError(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(chromatogram)
    }

    fn push_chromatogram_cv_param(
        chromatogram: &mut MzMLChromatogram,
        binary_array: Option<&mut BinaryArrayContext>,
        cv_param: CvParam,
    ) {
        match binary_array {
            Some(ctx) => ctx.cv_params.push(cv_param),
            None => {
                if let Some(kind) = ChromatogramType::from_cv_accession(&cv_param.accession) {
                    chromatogram.chromatogram_type = kind;
                }
                chromatogram.cv_params.push(cv_param);
            }
        }
    }

    /// Decode a binary array for chromatograms: time, intensity or auxiliary
    fn decode_chromatogram_binary_array(
        &self,
        chromatogram: &mut MzMLChromatogram,
        ctx: BinaryArrayContext,
    ) -> Result<(), MzMLError> {
        let decoded = ctx
            .decode(chromatogram.default_array_length, self.verify_encoded_length)
            .map_err(|source| MzMLError::BinaryError {
                element: "chromatogram",
                id: chromatogram.id.clone(),
                source,
            })?;

        match decoded.info.kind {
            ArrayKind::Time => chromatogram.time_array = decoded.values.into_floats(),
            ArrayKind::Intensity => chromatogram.intensity_array = decoded.values.into_floats(),
            ArrayKind::NonStandard(name) => chromatogram.auxiliary_arrays.push(AuxiliaryArray {
                name,
                values: decoded.values,
            }),
            other => chromatogram.auxiliary_arrays.push(AuxiliaryArray {
                name: format!("{other:?}").to_lowercase(),
                values: decoded.values,
            }),
        }

        Ok(())
    }
}
