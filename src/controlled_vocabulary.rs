//! # Controlled Vocabularies
//!
//! mzML annotates almost everything with `cvParam` elements that point into
//! ontologies declared in the file's `cvList`: PSI-MS for mass spectrometry
//! terms, UO for units, and BTO, GO and PATO for sample descriptions. This
//! module identifies the vocabulary of an accession and resolves the terms
//! this crate knows by name.
//!
//! ## Reference
//! - OBO file: https://raw.githubusercontent.com/HUPO-PSI/psi-ms-CV/master/psi-ms.obo
//! - Documentation: https://github.com/HUPO-PSI/psi-ms-CV

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::mzml::CvParam;

/// An ontology referenced by mzML accessions
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlledVocabulary {
    /// PSI Mass Spectrometry Ontology
    Ms,
    /// Unit Ontology
    Uo,
    /// BRENDA Tissue Ontology
    Bto,
    /// Gene Ontology
    Go,
    /// Phenotype And Trait Ontology
    Pato,
    /// Any other vocabulary, by its prefix
    Other(String),
}

impl ControlledVocabulary {
    /// Vocabulary of an accession such as `MS:1000511`
    pub fn from_accession(accession: &str) -> Self {
        let prefix = accession.split(':').next().unwrap_or(accession);
        Self::from_cv_ref(prefix)
    }

    /// Vocabulary named by a `cvRef` attribute or `cv/@id`
    pub fn from_cv_ref(cv_ref: &str) -> Self {
        match cv_ref.to_ascii_uppercase().as_str() {
            "MS" | "PSI-MS" => Self::Ms,
            "UO" => Self::Uo,
            "BTO" => Self::Bto,
            "GO" => Self::Go,
            "PATO" => Self::Pato,
            _ => Self::Other(cv_ref.to_string()),
        }
    }

    /// Standard `cv/@id` of the vocabulary
    pub fn prefix(&self) -> &str {
        match self {
            Self::Ms => "MS",
            Self::Uo => "UO",
            Self::Bto => "BTO",
            Self::Go => "GO",
            Self::Pato => "PATO",
            Self::Other(prefix) => prefix,
        }
    }

    /// Full ontology name as written in `cv/@fullName`
    pub fn full_name(&self) -> Option<&'static str> {
        match self {
            Self::Ms => Some("Proteomics Standards Initiative Mass Spectrometry Ontology"),
            Self::Uo => Some("Unit Ontology"),
            Self::Bto => Some("BrendaTissueOBO"),
            Self::Go => Some("Gene Ontology - Slim Version"),
            Self::Pato => Some("Quality ontology"),
            Self::Other(_) => None,
        }
    }
}

impl fmt::Display for ControlledVocabulary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// A controlled vocabulary term with its accession and name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CvTerm {
    /// CV accession (e.g., "MS:1000040")
    pub accession: String,
    /// Human-readable name
    pub name: String,
    /// Optional value associated with the term
    pub value: Option<String>,
    /// Optional unit accession for the value
    pub unit_accession: Option<String>,
    /// Optional unit name
    pub unit_name: Option<String>,
}

impl CvTerm {
    /// Create a new CV term with accession and name
    pub fn new(accession: &str, name: &str) -> Self {
        Self {
            accession: accession.to_string(),
            name: name.to_string(),
            value: None,
            unit_accession: None,
            unit_name: None,
        }
    }

    /// Add a value to the CV term
    pub fn with_value(mut self, value: impl ToString) -> Self {
        self.value = Some(value.to_string());
        self
    }

    /// Add a unit to the CV term value
    pub fn with_unit(mut self, unit_accession: &str, unit_name: &str) -> Self {
        self.unit_accession = Some(unit_accession.to_string());
        self.unit_name = Some(unit_name.to_string());
        self
    }

    /// Vocabulary the accession belongs to
    pub fn vocabulary(&self) -> ControlledVocabulary {
        ControlledVocabulary::from_accession(&self.accession)
    }
}

impl fmt::Display for CvTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(v) if !v.is_empty() => write!(f, "[{}: {}={}]", self.accession, self.name, v)?,
            _ => write!(f, "[{}: {}]", self.accession, self.name)?,
        }
        if let Some(unit) = &self.unit_name {
            write!(f, " ({unit})")?;
        }
        Ok(())
    }
}

impl From<&CvParam> for CvTerm {
    fn from(param: &CvParam) -> Self {
        Self {
            accession: param.accession.clone(),
            name: describe(param).to_string(),
            value: param.value.clone(),
            unit_accession: param.unit_accession.clone(),
            unit_name: param.unit_name.clone(),
        }
    }
}

/// Terms the reader interprets, plus the run, instrument and sample terms
/// FLASHDeconv writes
static TERMS: &[(&str, &str)] = &[
    // Sample
    ("MS:1000004", "sample mass"),
    ("MS:1000005", "sample volume"),
    ("MS:1000006", "sample concentration"),
    // Spectrum
    ("MS:1000127", "centroid spectrum"),
    ("MS:1000128", "profile spectrum"),
    ("MS:1000129", "negative scan"),
    ("MS:1000130", "positive scan"),
    ("MS:1000511", "ms level"),
    ("MS:1000579", "MS1 spectrum"),
    ("MS:1000580", "MSn spectrum"),
    ("MS:1000285", "total ion current"),
    ("MS:1000504", "base peak m/z"),
    ("MS:1000505", "base peak intensity"),
    ("MS:1000527", "highest observed m/z"),
    ("MS:1000528", "lowest observed m/z"),
    // Scan
    ("MS:1000016", "scan start time"),
    ("MS:1000500", "scan window upper limit"),
    ("MS:1000501", "scan window lower limit"),
    ("MS:1000512", "filter string"),
    ("MS:1000616", "preset scan configuration"),
    ("MS:1000795", "no combination"),
    ("MS:1000927", "ion injection time"),
    // Precursor
    ("MS:1000041", "charge state"),
    ("MS:1000042", "peak intensity"),
    ("MS:1000744", "selected ion m/z"),
    ("MS:1000827", "isolation window target m/z"),
    ("MS:1000828", "isolation window lower offset"),
    ("MS:1000829", "isolation window upper offset"),
    // Activation
    ("MS:1000045", "collision energy"),
    ("MS:1000133", "collision-induced dissociation"),
    ("MS:1000250", "electron capture dissociation"),
    ("MS:1000262", "infrared multiphoton dissociation"),
    ("MS:1000422", "beam-type collision-induced dissociation"),
    ("MS:1000435", "photodissociation"),
    ("MS:1000598", "electron transfer dissociation"),
    // Binary data arrays
    ("MS:1000514", "m/z array"),
    ("MS:1000515", "intensity array"),
    ("MS:1000516", "charge array"),
    ("MS:1000519", "32-bit integer"),
    ("MS:1000521", "32-bit float"),
    ("MS:1000522", "64-bit integer"),
    ("MS:1000523", "64-bit float"),
    ("MS:1000574", "zlib compression"),
    ("MS:1000576", "no compression"),
    ("MS:1000595", "time array"),
    ("MS:1000786", "non-standard data array"),
    ("MS:1002312", "MS-Numpress linear prediction compression"),
    ("MS:1002313", "MS-Numpress positive integer compression"),
    ("MS:1002314", "MS-Numpress short logged float compression"),
    // Chromatograms
    ("MS:1000235", "total ion current chromatogram"),
    ("MS:1000627", "selected ion current chromatogram"),
    ("MS:1000628", "basepeak chromatogram"),
    ("MS:1001472", "selected ion monitoring chromatogram"),
    ("MS:1001473", "selected reaction monitoring chromatogram"),
    // Files and software
    ("MS:1000563", "Thermo RAW format"),
    ("MS:1000568", "MD5"),
    ("MS:1000569", "SHA-1"),
    ("MS:1000584", "mzML format"),
    ("MS:1000768", "Thermo nativeID format"),
    ("MS:1000799", "custom unreleased software tool"),
    // Data processing
    ("MS:1000033", "deisotoping"),
    ("MS:1000034", "charge deconvolution"),
    // Instrument
    ("MS:1000031", "instrument model"),
    ("MS:1000073", "electrospray ionization"),
    ("MS:1000484", "orbitrap"),
    ("MS:1000624", "inductive detector"),
    ("MS:1001911", "Q Exactive"),
    // Units
    ("MS:1000040", "m/z"),
    ("MS:1000131", "number of detector counts"),
    ("MS:1000132", "percent of base peak"),
    ("UO:0000010", "second"),
    ("UO:0000021", "gram"),
    ("UO:0000028", "millisecond"),
    ("UO:0000031", "minute"),
    ("UO:0000098", "milliliter"),
    ("UO:0000175", "gram per liter"),
    ("UO:0000186", "dimensionless unit"),
    ("UO:0000266", "electronvolt"),
];

static TABLE: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| TERMS.iter().copied().collect());

/// Look up a known term by accession
pub fn lookup(accession: &str) -> Option<CvTerm> {
    TABLE.get(accession).map(|name| CvTerm::new(accession, name))
}

/// Name of a cvParam: the registered name when known, else the one in the file
pub fn describe(param: &CvParam) -> &str {
    TABLE
        .get(param.accession.as_str())
        .copied()
        .unwrap_or(param.name.as_str())
}

/// Number of registered terms
pub fn term_count() -> usize {
    TABLE.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mzml::MS_CV_ACCESSIONS;

    #[test]
    fn test_vocabulary_from_accession() {
        assert_eq!(
            ControlledVocabulary::from_accession("MS:1000511"),
            ControlledVocabulary::Ms
        );
        assert_eq!(
            ControlledVocabulary::from_accession("UO:0000010"),
            ControlledVocabulary::Uo
        );
        assert_eq!(
            ControlledVocabulary::from_accession("BTO:0000142"),
            ControlledVocabulary::Bto
        );
        assert_eq!(
            ControlledVocabulary::from_cv_ref("pato"),
            ControlledVocabulary::Pato
        );
        assert_eq!(
            ControlledVocabulary::from_accession("NCIT:C25330"),
            ControlledVocabulary::Other("NCIT".to_string())
        );
    }

    #[test]
    fn test_lookup() {
        let term = lookup(MS_CV_ACCESSIONS::MS_LEVEL).unwrap();
        assert_eq!(term.name, "ms level");
        assert_eq!(term.vocabulary(), ControlledVocabulary::Ms);
        assert!(lookup("MS:9999999").is_none());
        assert_eq!(term_count(), TERMS.len());
    }

    #[test]
    fn test_interpreted_accessions_are_registered() {
        for accession in [
            MS_CV_ACCESSIONS::MZ_ARRAY,
            MS_CV_ACCESSIONS::INTENSITY_ARRAY,
            MS_CV_ACCESSIONS::INT_64_BIT,
            MS_CV_ACCESSIONS::NON_STANDARD_DATA_ARRAY,
            MS_CV_ACCESSIONS::HCD,
            MS_CV_ACCESSIONS::UNIT_ELECTRONVOLT,
        ] {
            assert!(lookup(accession).is_some(), "{accession} missing");
        }
    }

    #[test]
    fn test_describe_falls_back_to_file_name() {
        let param = CvParam {
            accession: "MS:1002999".to_string(),
            name: "something new".to_string(),
            ..Default::default()
        };
        assert_eq!(describe(&param), "something new");
    }

    #[test]
    fn test_display() {
        let term = CvTerm::new("MS:1000045", "collision energy")
            .with_value(25)
            .with_unit("UO:0000266", "electronvolt");
        assert_eq!(term.to_string(), "[MS:1000045: collision energy=25] (electronvolt)");
        assert_eq!(
            CvTerm::new("MS:1000130", "positive scan").to_string(),
            "[MS:1000130: positive scan]"
        );
    }
}
