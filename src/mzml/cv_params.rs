//! cvParam and userParam values
//!
//! Spectrum and chromatogram properties arrive as PSI-MS / UO tagged
//! `cvParam` elements. FLASHDeconv stores its per-mass output as free-form
//! `userParam` strings.

use serde::{Deserialize, Serialize};

/// One `<cvParam>` element
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CvParam {
    /// Vocabulary id from the cvList (`MS`, `UO`, ...)
    pub cv_ref: String,
    /// Term accession, e.g. `MS:1000511`
    pub accession: String,
    /// Term name
    pub name: String,
    /// Value attribute, absent for flag terms
    pub value: Option<String>,
    /// Unit vocabulary id
    pub unit_cv_ref: Option<String>,
    /// Unit accession
    pub unit_accession: Option<String>,
    /// Unit name
    pub unit_name: Option<String>,
}

impl CvParam {
    /// Value parsed as a float
    pub fn value_as_f64(&self) -> Option<f64> {
        self.value.as_ref()?.trim().parse().ok()
    }

    /// Value parsed as an integer
    pub fn value_as_i64(&self) -> Option<i64> {
        self.value.as_ref()?.trim().parse().ok()
    }

    /// Value parsed as a 32-bit integer
    pub fn value_as_i32(&self) -> Option<i32> {
        self.value.as_ref()?.trim().parse().ok()
    }
}

/// One `<userParam>` element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserParam {
    /// Parameter name, e.g. `DeconvMassInfo`
    pub name: String,
    /// Declared type, e.g. `xsd:string`
    pub param_type: Option<String>,
    /// Raw value
    pub value: String,
}

/// Accessions the reader interprets
#[allow(non_snake_case)]
pub mod MS_CV_ACCESSIONS {
    // spectrum
    /// ms level
    pub const MS_LEVEL: &str = "MS:1000511";
    /// centroid spectrum
    pub const CENTROID_SPECTRUM: &str = "MS:1000127";
    /// profile spectrum
    pub const PROFILE_SPECTRUM: &str = "MS:1000128";
    /// positive scan
    pub const POSITIVE_SCAN: &str = "MS:1000130";
    /// negative scan
    pub const NEGATIVE_SCAN: &str = "MS:1000129";
    /// total ion current
    pub const TOTAL_ION_CURRENT: &str = "MS:1000285";
    /// base peak m/z
    pub const BASE_PEAK_MZ: &str = "MS:1000504";
    /// base peak intensity
    pub const BASE_PEAK_INTENSITY: &str = "MS:1000505";
    /// lowest observed m/z
    pub const LOWEST_OBSERVED_MZ: &str = "MS:1000528";
    /// highest observed m/z
    pub const HIGHEST_OBSERVED_MZ: &str = "MS:1000527";

    // scan
    /// scan start time
    pub const SCAN_START_TIME: &str = "MS:1000016";
    /// filter string
    pub const FILTER_STRING: &str = "MS:1000512";
    /// preset scan configuration
    pub const PRESET_SCAN_CONFIGURATION: &str = "MS:1000616";
    /// ion injection time
    pub const ION_INJECTION_TIME: &str = "MS:1000927";
    /// scan window lower limit
    pub const SCAN_WINDOW_LOWER_LIMIT: &str = "MS:1000501";
    /// scan window upper limit
    pub const SCAN_WINDOW_UPPER_LIMIT: &str = "MS:1000500";

    // precursor
    /// isolation window target m/z
    pub const ISOLATION_WINDOW_TARGET_MZ: &str = "MS:1000827";
    /// isolation window lower offset
    pub const ISOLATION_WINDOW_LOWER_OFFSET: &str = "MS:1000828";
    /// isolation window upper offset
    pub const ISOLATION_WINDOW_UPPER_OFFSET: &str = "MS:1000829";
    /// selected ion m/z
    pub const SELECTED_ION_MZ: &str = "MS:1000744";
    /// charge state
    pub const CHARGE_STATE: &str = "MS:1000041";
    /// peak intensity of the selected ion
    pub const PEAK_INTENSITY: &str = "MS:1000042";
    /// collision energy
    pub const COLLISION_ENERGY: &str = "MS:1000045";

    // dissociation methods
    /// collision-induced dissociation
    pub const CID: &str = "MS:1000133";
    /// beam-type collision-induced dissociation
    pub const HCD: &str = "MS:1000422";
    /// electron transfer dissociation
    pub const ETD: &str = "MS:1000598";
    /// electron capture dissociation
    pub const ECD: &str = "MS:1000250";
    /// infrared multiphoton dissociation
    pub const IRMPD: &str = "MS:1000262";
    /// photodissociation
    pub const PHOTODISSOCIATION: &str = "MS:1000435";

    // binary data arrays
    /// m/z array
    pub const MZ_ARRAY: &str = "MS:1000514";
    /// intensity array
    pub const INTENSITY_ARRAY: &str = "MS:1000515";
    /// charge array
    pub const CHARGE_ARRAY: &str = "MS:1000516";
    /// time array
    pub const TIME_ARRAY: &str = "MS:1000595";
    /// non-standard data array, named by its value
    pub const NON_STANDARD_DATA_ARRAY: &str = "MS:1000786";
    /// 32-bit float
    pub const FLOAT_32_BIT: &str = "MS:1000521";
    /// 64-bit float
    pub const FLOAT_64_BIT: &str = "MS:1000523";
    /// 32-bit integer
    pub const INT_32_BIT: &str = "MS:1000519";
    /// 64-bit integer
    pub const INT_64_BIT: &str = "MS:1000522";
    /// zlib compression
    pub const ZLIB_COMPRESSION: &str = "MS:1000574";
    /// no compression
    pub const NO_COMPRESSION: &str = "MS:1000576";
    /// MS-Numpress linear prediction compression
    pub const NUMPRESS_LINEAR: &str = "MS:1002312";
    /// MS-Numpress positive integer compression
    pub const NUMPRESS_PIC: &str = "MS:1002313";
    /// MS-Numpress short logged float compression
    pub const NUMPRESS_SLOF: &str = "MS:1002314";

    // chromatograms
    /// total ion current chromatogram
    pub const TIC_CHROMATOGRAM: &str = "MS:1000235";
    /// basepeak chromatogram
    pub const BPC_CHROMATOGRAM: &str = "MS:1000628";
    /// selected ion monitoring chromatogram
    pub const SIM_CHROMATOGRAM: &str = "MS:1001472";
    /// selected reaction monitoring chromatogram
    pub const SRM_CHROMATOGRAM: &str = "MS:1001473";
    /// selected ion current chromatogram
    pub const XIC_CHROMATOGRAM: &str = "MS:1000627";

    // files and software
    /// SHA-1
    pub const SHA1_CHECKSUM: &str = "MS:1000569";
    /// MD5
    pub const MD5_CHECKSUM: &str = "MS:1000568";
    /// custom unreleased software tool, carries the tool name as value
    pub const CUSTOM_SOFTWARE: &str = "MS:1000799";

    // units
    /// minute
    pub const UNIT_MINUTE: &str = "UO:0000031";
    /// millisecond
    pub const UNIT_MILLISECOND: &str = "UO:0000028";
    /// electronvolt
    pub const UNIT_ELECTRONVOLT: &str = "UO:0000266";
}

/// First cvParam with the given accession
pub fn find_cv_param<'a>(cv_params: &'a [CvParam], accession: &str) -> Option<&'a CvParam> {
    cv_params.iter().find(|p| p.accession == accession)
}

/// Value of the first cvParam with the given accession
pub fn extract_cv_value(cv_params: &[CvParam], accession: &str) -> Option<String> {
    find_cv_param(cv_params, accession)?.value.clone()
}

/// Float value of the first cvParam with the given accession
pub fn extract_cv_f64(cv_params: &[CvParam], accession: &str) -> Option<f64> {
    find_cv_param(cv_params, accession)?.value_as_f64()
}

/// Whether any cvParam carries the given accession
pub fn has_cv_param(cv_params: &[CvParam], accession: &str) -> bool {
    find_cv_param(cv_params, accession).is_some()
}

/// Whether an accession names a dissociation method
pub fn is_activation_method(accession: &str) -> bool {
    use MS_CV_ACCESSIONS::*;
    matches!(
        accession,
        CID | HCD | ETD | ECD | IRMPD | PHOTODISSOCIATION
    )
}

/// Scan start time in seconds, from a value in minutes, milliseconds or seconds
pub fn normalize_retention_time(value: f64, unit_accession: Option<&str>) -> f64 {
    match unit_accession {
        Some(MS_CV_ACCESSIONS::UNIT_MINUTE) => value * 60.0,
        Some(MS_CV_ACCESSIONS::UNIT_MILLISECOND) => value / 1000.0,
        _ => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(accession: &str, value: Option<&str>) -> CvParam {
        CvParam {
            cv_ref: "MS".to_string(),
            accession: accession.to_string(),
            value: value.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_numeric_values() {
        let charge = param(MS_CV_ACCESSIONS::CHARGE_STATE, Some(" 12 "));
        assert_eq!(charge.value_as_i64(), Some(12));
        assert_eq!(charge.value_as_i32(), Some(12));
        assert_eq!(charge.value_as_f64(), Some(12.0));

        let flag = param(MS_CV_ACCESSIONS::CENTROID_SPECTRUM, Some(""));
        assert_eq!(flag.value_as_f64(), None);
        assert_eq!(param(MS_CV_ACCESSIONS::CENTROID_SPECTRUM, None).value_as_i64(), None);
    }

    #[test]
    fn test_lookup_by_accession() {
        let params = vec![
            param(MS_CV_ACCESSIONS::MS_LEVEL, Some("2")),
            param(MS_CV_ACCESSIONS::CENTROID_SPECTRUM, None),
            param(MS_CV_ACCESSIONS::BASE_PEAK_MZ, Some("16297.317755")),
        ];

        assert_eq!(
            extract_cv_value(&params, MS_CV_ACCESSIONS::MS_LEVEL).as_deref(),
            Some("2")
        );
        assert_eq!(
            extract_cv_f64(&params, MS_CV_ACCESSIONS::BASE_PEAK_MZ),
            Some(16297.317755)
        );
        assert_eq!(extract_cv_value(&params, MS_CV_ACCESSIONS::CENTROID_SPECTRUM), None);
        assert!(has_cv_param(&params, MS_CV_ACCESSIONS::CENTROID_SPECTRUM));
        assert!(!has_cv_param(&params, MS_CV_ACCESSIONS::PROFILE_SPECTRUM));
    }

    #[test]
    fn test_activation_methods() {
        assert!(is_activation_method(MS_CV_ACCESSIONS::HCD));
        assert!(is_activation_method(MS_CV_ACCESSIONS::ETD));
        assert!(!is_activation_method(MS_CV_ACCESSIONS::COLLISION_ENERGY));
    }

    #[test]
    fn test_retention_time_units() {
        assert_eq!(
            normalize_retention_time(2.0, Some(MS_CV_ACCESSIONS::UNIT_MINUTE)),
            120.0
        );
        assert_eq!(
            normalize_retention_time(1500.0, Some(MS_CV_ACCESSIONS::UNIT_MILLISECOND)),
            1.5
        );
        assert_eq!(normalize_retention_time(1843.26705, Some("UO:0000010")), 1843.26705);
    }
}
