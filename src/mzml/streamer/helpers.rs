use quick_xml::events::BytesStart;
use quick_xml::Decoder;

use super::MzMLError;
use crate::mzml::cv_params::{CvParam, UserParam};

/// Attribute value decoded with the document encoding and unescaped
pub(super) fn get_attribute(
    e: &BytesStart,
    decoder: Decoder,
    name: &str,
) -> Result<Option<String>, MzMLError> {
    for attr in e.attributes() {
        let attr = attr.map_err(|e| MzMLError::XmlError(quick_xml::Error::from(e)))?;
        if attr.key.as_ref() == name.as_bytes() {
            let value = attr.decode_and_unescape_value(decoder)?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Attribute parsed with `FromStr`, `None` when absent or unparsable
pub(super) fn parse_attribute<T: std::str::FromStr>(
    e: &BytesStart,
    decoder: Decoder,
    name: &str,
) -> Result<Option<T>, MzMLError> {
    Ok(get_attribute(e, decoder, name)?.and_then(|s| s.trim().parse().ok()))
}

/// Parse a cvParam element
pub(super) fn parse_cv_param(e: &BytesStart, decoder: Decoder) -> Result<CvParam, MzMLError> {
    let attr = |name| get_attribute(e, decoder, name);
    Ok(CvParam {
        cv_ref: attr("cvRef")?.unwrap_or_default(),
        accession: attr("accession")?.unwrap_or_default(),
        name: attr("name")?.unwrap_or_default(),
        value: attr("value")?,
        unit_cv_ref: attr("unitCvRef")?,
        unit_accession: attr("unitAccession")?,
        unit_name: attr("unitName")?,
    })
}

/// Parse a userParam element
pub(super) fn parse_user_param(e: &BytesStart, decoder: Decoder) -> Result<UserParam, MzMLError> {
    Ok(UserParam {
        name: get_attribute(e, decoder, "name")?
            .ok_or_else(|| MzMLError::MissingAttribute("userParam/@name".to_string()))?,
        param_type: get_attribute(e, decoder, "type")?,
        value: get_attribute(e, decoder, "value")?.unwrap_or_default(),
    })
}
