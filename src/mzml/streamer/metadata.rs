use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Decoder;

use super::helpers::{get_attribute, parse_attribute, parse_cv_param, parse_user_param};
use super::{MzMLError, MzMLStreamer};
use crate::mzml::cv_params::{CvParam, UserParam, MS_CV_ACCESSIONS};
use crate::mzml::models::*;

/// Parameters and references collected from one metadata element
#[derive(Debug, Default)]
struct ParamBlock {
    cv_params: Vec<CvParam>,
    user_params: Vec<UserParam>,
    software_ref: Option<String>,
}

impl<R: BufRead> MzMLStreamer<R> {
    /// Read file-level metadata (everything before spectrumList).
    ///
    /// List wrappers are walked through; each item element is parsed where it
    /// is met. Calling this again after the first pass returns the cached
    /// metadata without touching the stream.
    pub fn read_metadata(&mut self) -> Result<&MzMLFileMetadata, MzMLError> {
        if self.metadata_read {
            return Ok(&self.metadata);
        }
        self.metadata_read = true;

        let mut buf = Vec::new();
        loop {
            let event = self.reader.read_event_into(&mut buf);
            // Known only once the XML declaration has been read
            let decoder = self.reader.decoder();
            match event {
                Ok(Event::Start(ref e)) => match e.name().as_ref() {
                    b"mzML" => {
                        self.metadata.version = get_attribute(e, decoder, "version")?;
                    }
                    b"cv" => self.push_cv_reference(e)?,
                    b"fileContent" => {
                        let block = self.collect_params(b"fileContent")?;
                        self.metadata.file_content.extend(block.cv_params);
                    }
                    b"sourceFile" => {
                        let source = self.parse_source_file(e)?;
                        self.metadata.source_files.push(source);
                    }
                    b"sample" => {
                        let sample = Sample {
                            id: get_attribute(e, decoder, "id")?.unwrap_or_default(),
                            name: get_attribute(e, decoder, "name")?,
                            cv_params: self.collect_params(b"sample")?.cv_params,
                        };
                        self.metadata.samples.push(sample);
                    }
                    b"software" => {
                        let software = self.parse_software(e)?;
                        self.metadata.software_list.push(software);
                    }
                    b"instrumentConfiguration" => {
                        let id = get_attribute(e, decoder, "id")?.unwrap_or_default();
                        let ic = self.parse_instrument_configuration(id)?;
                        self.metadata.instrument_configurations.push(ic);
                    }
                    b"dataProcessing" => {
                        let id = get_attribute(e, decoder, "id")?.unwrap_or_default();
                        let dp = self.parse_data_processing(id)?;
                        self.metadata.data_processing.push(dp);
                    }
                    b"run" => self.apply_run_attributes(e)?,
                    b"spectrumList" => {
                        self.in_spectrum_list = true;
                        self.metadata.spectrum_count = parse_attribute(e, decoder, "count")?;
                        break;
                    }
                    b"chromatogramList" => {
                        self.in_chromatogram_list = true;
                        self.metadata.chromatogram_count = parse_attribute(e, decoder, "count")?;
                        break;
                    }
                    _ => {}
                },
                Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                    b"cv" => self.push_cv_reference(e)?,
                    b"sample" => self.metadata.samples.push(Sample {
                        id: get_attribute(e, decoder, "id")?.unwrap_or_default(),
                        name: get_attribute(e, decoder, "name")?,
                        cv_params: Vec::new(),
                    }),
                    b"software" => self.metadata.software_list.push(Software {
                        id: get_attribute(e, decoder, "id")?.unwrap_or_default(),
                        version: get_attribute(e, decoder, "version")?,
                        ..Default::default()
                    }),
                    b"run" => self.apply_run_attributes(e)?,
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(MzMLError::XmlError(e)),
                _ => {}
            }
            buf.clear();
        }

        log::debug!(
            "mzML {} metadata: {} software, {} instrument configurations, {} spectra declared",
            self.metadata.version.as_deref().unwrap_or("?"),
            self.metadata.software_list.len(),
            self.metadata.instrument_configurations.len(),
            self.metadata
                .spectrum_count
                .map_or_else(|| "no".to_string(), |c| c.to_string()),
        );

        Ok(&self.metadata)
    }

    fn push_cv_reference(&mut self, e: &BytesStart) -> Result<(), MzMLError> {
        let decoder = self.reader.decoder();
        self.metadata.cv_list.push(CvReference {
            id: get_attribute(e, decoder, "id")?.unwrap_or_default(),
            full_name: get_attribute(e, decoder, "fullName")?,
            version: get_attribute(e, decoder, "version")?,
            uri: get_attribute(e, decoder, "URI")?,
        });
        Ok(())
    }

    fn apply_run_attributes(&mut self, e: &BytesStart) -> Result<(), MzMLError> {
        let decoder = self.reader.decoder();
        self.metadata.run_id = get_attribute(e, decoder, "id")?;
        self.metadata.run_start_time = get_attribute(e, decoder, "startTimeStamp")?;
        self.metadata.default_instrument_configuration_ref =
            get_attribute(e, decoder, "defaultInstrumentConfigurationRef")?;
        self.metadata.default_source_file_ref = get_attribute(e, decoder, "defaultSourceFileRef")?;
        self.metadata.sample_ref = get_attribute(e, decoder, "sampleRef")?;
        Ok(())
    }

    /// Collect every cvParam and userParam up to the end tag `end`
    fn collect_params(&mut self, end: &[u8]) -> Result<ParamBlock, MzMLError> {
        let decoder = self.reader.decoder();
        let mut block = ParamBlock::default();
        let mut depth = 1;
        let mut buf = Vec::new();

        loop {
            match self.reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    depth += 1;
                    collect_param(e, decoder, &mut block)?;
                }
                Ok(Event::Empty(ref e)) => collect_param(e, decoder, &mut block)?,
                Ok(Event::End(ref e)) => {
                    depth -= 1;
                    if e.name().as_ref() == end && depth == 0 {
                        break;
                    }
                }
                Ok(Event::Eof) => {
                    return Err(MzMLError::InvalidStructure(format!(
                        "Unexpected EOF in {}",
                        String::from_utf8_lossy(end)
                    )));
                }
                Err(e) => return Err(MzMLError::XmlError(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(block)
    }

    /// Parse sourceFile element content (after start tag has been consumed)
    fn parse_source_file(&mut self, start: &BytesStart) -> Result<SourceFile, MzMLError> {
        let decoder = self.reader.decoder();
        let mut source = SourceFile {
            id: get_attribute(start, decoder, "id")?.unwrap_or_default(),
            name: get_attribute(start, decoder, "name")?.unwrap_or_default(),
            location: get_attribute(start, decoder, "location")?,
            ..Default::default()
        };

        for cv in self.collect_params(b"sourceFile")?.cv_params {
            match cv.accession.as_str() {
                MS_CV_ACCESSIONS::SHA1_CHECKSUM => {
                    source.checksum = cv.value.clone();
                    source.checksum_type = Some("SHA-1".to_string());
                }
                MS_CV_ACCESSIONS::MD5_CHECKSUM => {
                    source.checksum = cv.value.clone();
                    source.checksum_type = Some("MD5".to_string());
                }
                _ => {
                    if cv.name.to_lowercase().contains("format") {
                        source.file_format = Some(cv.name.clone());
                    }
                }
            }
            source.cv_params.push(cv);
        }

        Ok(source)
    }

    /// Parse software element content
    fn parse_software(&mut self, start: &BytesStart) -> Result<Software, MzMLError> {
        let decoder = self.reader.decoder();
        let cv_params = self.collect_params(b"software")?.cv_params;
        Ok(Software {
            id: get_attribute(start, decoder, "id")?.unwrap_or_default(),
            version: get_attribute(start, decoder, "version")?,
            name: cv_params.first().map(|cv| cv.name.clone()),
            cv_params,
        })
    }

    /// Parse instrumentConfiguration element content
    fn parse_instrument_configuration(
        &mut self,
        id: String,
    ) -> Result<InstrumentConfiguration, MzMLError> {
        let decoder = self.reader.decoder();
        let mut ic = InstrumentConfiguration {
            id,
            ..Default::default()
        };

        let mut depth = 1;
        let mut buf = Vec::new();

        loop {
            match self.reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    depth += 1;
                    match e.name().as_ref() {
                        name @ (b"source" | b"analyzer" | b"detector") => {
                            let component_type = ComponentType::from_element(name);
                            let order = parse_attribute(e, decoder, "order")?.unwrap_or(0);
                            let block = self.collect_params(name)?;
                            depth -= 1;
                            ic.components.push(InstrumentComponent {
                                component_type,
                                order,
                                cv_params: block.cv_params,
                            });
                        }
                        b"softwareRef" => ic.software_ref = get_attribute(e, decoder, "ref")?,
                        b"cvParam" => ic.cv_params.push(parse_cv_param(e, decoder)?),
                        _ => {}
                    }
                }
                Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                    b"cvParam" => ic.cv_params.push(parse_cv_param(e, decoder)?),
                    b"softwareRef" => ic.software_ref = get_attribute(e, decoder, "ref")?,
                    _ => {}
                },
                Ok(Event::End(ref e)) => {
                    depth -= 1;
                    if e.name().as_ref() == b"instrumentConfiguration" && depth == 0 {
                        break;
                    }
                }
                Ok(Event::Eof) => {
                    return Err(MzMLError::InvalidStructure(
                        "Unexpected EOF in instrumentConfiguration".to_string(),
                    ));
                }
                Err(e) => return Err(MzMLError::XmlError(e)),
                _ => {}
            }
            buf.clear();
        }

        ic.components.sort_by_key(|c| c.order);
        Ok(ic)
    }

    /// Parse dataProcessing element content
    fn parse_data_processing(&mut self, id: String) -> Result<DataProcessing, MzMLError> {
        let decoder = self.reader.decoder();
        let mut dp = DataProcessing {
            id,
            ..Default::default()
        };

        let mut depth = 1;
        let mut buf = Vec::new();

        loop {
            match self.reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    depth += 1;
                    if e.name().as_ref() == b"processingMethod" {
                        let order = parse_attribute(e, decoder, "order")?.unwrap_or(0);
                        let software_ref = get_attribute(e, decoder, "softwareRef")?;
                        let block = self.collect_params(b"processingMethod")?;
                        depth -= 1;
                        dp.processing_methods.push(ProcessingMethod {
                            order,
                            software_ref: software_ref.or(block.software_ref),
                            cv_params: block.cv_params,
                            user_params: block.user_params,
                        });
                    }
                }
                Ok(Event::Empty(ref e)) => {
                    if e.name().as_ref() == b"processingMethod" {
                        dp.processing_methods.push(ProcessingMethod {
                            order: parse_attribute(e, decoder, "order")?.unwrap_or(0),
                            software_ref: get_attribute(e, decoder, "softwareRef")?,
                            ..Default::default()
                        });
                    }
                }
                Ok(Event::End(ref e)) => {
                    depth -= 1;
                    if e.name().as_ref() == b"dataProcessing" && depth == 0 {
                        break;
                    }
                }
                Ok(Event::Eof) => {
                    return Err(MzMLError::InvalidStructure(
                        "Unexpected EOF in dataProcessing".to_string(),
                    ));
                }
                Err(e) => return Err(MzMLError::XmlError(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(dp)
    }
}

fn collect_param(e: &BytesStart, decoder: Decoder, block: &mut ParamBlock) -> Result<(), MzMLError> {
    match e.name().as_ref() {
        b"cvParam" => block.cv_params.push(parse_cv_param(e, decoder)?),
        b"userParam" => block.user_params.push(parse_user_param(e, decoder)?),
        b"softwareRef" => block.software_ref = get_attribute(e, decoder, "ref")?,
        _ => {}
    }
    Ok(())
}
