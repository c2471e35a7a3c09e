use super::*;
use std::io::BufReader;

use crate::mzml::binary::{ArrayKind, BinaryEncoding};
use crate::mzml::models::{ArrayValues, ChromatogramType, ComponentType};

const MINIMAL_MZML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<mzML xmlns="http://psi.hupo.org/ms/mzml" version="1.1.0">
  <cvList count="2">
    <cv id="MS" fullName="Proteomics Standards Initiative Mass Spectrometry Ontology" version="4.1.30" URI="https://raw.githubusercontent.com/HUPO-PSI/psi-ms-CV/master/psi-ms.obo"/>
    <cv id="UO" fullName="Unit Ontology" URI="https://raw.githubusercontent.com/bio-ontology-research-group/unit-ontology/master/unit.obo"/>
  </cvList>
  <fileDescription>
    <fileContent>
      <cvParam cvRef="MS" accession="MS:1000580" name="MSn spectrum"/>
    </fileContent>
    <sourceFileList count="1">
      <sourceFile id="sf_0" name="run.raw" location="file:///data">
        <cvParam cvRef="MS" accession="MS:1000569" name="SHA-1" value="0123456789abcdef0123456789abcdef01234567"/>
        <cvParam cvRef="MS" accession="MS:1000563" name="Thermo RAW format"/>
      </sourceFile>
    </sourceFileList>
  </fileDescription>
  <sampleList count="1">
    <sample id="sa_0" name="mix"/>
  </sampleList>
  <softwareList count="1">
    <software id="so_0" version="3.0.0">
      <cvParam cvRef="MS" accession="MS:1000799" name="custom unreleased software tool" value="FLASHDeconv"/>
    </software>
  </softwareList>
  <instrumentConfigurationList count="1">
    <instrumentConfiguration id="ic_0">
      <cvParam cvRef="MS" accession="MS:1001911" name="Q Exactive"/>
      <componentList count="2">
        <source order="1">
          <cvParam cvRef="MS" accession="MS:1000073" name="electrospray ionization"/>
        </source>
        <analyzer order="2">
          <cvParam cvRef="MS" accession="MS:1000484" name="orbitrap"/>
        </analyzer>
      </componentList>
      <softwareRef ref="so_0"/>
    </instrumentConfiguration>
  </instrumentConfigurationList>
  <dataProcessingList count="1">
    <dataProcessing id="dp_0">
      <processingMethod order="0" softwareRef="so_0">
        <cvParam cvRef="MS" accession="MS:1000034" name="charge deconvolution"/>
        <userParam name="FLASHDeconv_output" type="xsd:string" value="deconvolved"/>
      </processingMethod>
    </dataProcessing>
  </dataProcessingList>
  <run id="test_run" defaultInstrumentConfigurationRef="ic_0" sampleRef="sa_0" startTimeStamp="2021-03-04T16:21:37">
    <spectrumList count="2">
      <spectrum index="0" id="scan=1" defaultArrayLength="2">
        <cvParam cvRef="MS" accession="MS:1000511" name="ms level" value="1"/>
        <cvParam cvRef="MS" accession="MS:1000130" name="positive scan"/>
        <cvParam cvRef="MS" accession="MS:1000127" name="centroid spectrum"/>
        <scanList count="1">
          <scan>
            <cvParam cvRef="MS" accession="MS:1000016" name="scan start time" value="1.0" unitCvRef="UO" unitAccession="UO:0000031" unitName="minute"/>
          </scan>
        </scanList>
        <binaryDataArrayList count="2">
          <binaryDataArray encodedLength="24">
            <cvParam cvRef="MS" accession="MS:1000523" name="64-bit float"/>
            <cvParam cvRef="MS" accession="MS:1000576" name="no compression"/>
            <cvParam cvRef="MS" accession="MS:1000514" name="m/z array"/>
            <binary>AAAAAAAAWUAAAAAAAABpQA==</binary>
          </binaryDataArray>
          <binaryDataArray encodedLength="12">
            <cvParam cvRef="MS" accession="MS:1000521" name="32-bit float"/>
            <cvParam cvRef="MS" accession="MS:1000576" name="no compression"/>
            <cvParam cvRef="MS" accession="MS:1000515" name="intensity array"/>
            <binary>AADIQgAASEM=</binary>
          </binaryDataArray>
        </binaryDataArrayList>
      </spectrum>
      <spectrum index="1" id="scan=2" defaultArrayLength="2">
        <cvParam cvRef="MS" accession="MS:1000511" name="ms level" value="2"/>
        <userParam name="DeconvMassInfo" type="xsd:string" value="tol=10;peaks=1:5,2:4"/>
        <precursorList count="1">
          <precursor spectrumRef="scan=1">
            <selectedIonList count="1">
              <selectedIon>
                <cvParam cvRef="MS" accession="MS:1000744" name="selected ion m/z" value="500.5"/>
                <cvParam cvRef="MS" accession="MS:1000041" name="charge state" value="2"/>
              </selectedIon>
            </selectedIonList>
            <activation>
              <cvParam cvRef="MS" accession="MS:1000422" name="beam-type collision-induced dissociation"/>
              <cvParam cvRef="MS" accession="MS:1000045" name="collision energy" value="25"/>
              <userParam name="note" value="inside precursor"/>
            </activation>
          </precursor>
        </precursorList>
        <binaryDataArrayList count="2">
          <binaryDataArray encodedLength="24">
            <cvParam cvRef="MS" accession="MS:1000523" name="64-bit float"/>
            <cvParam cvRef="MS" accession="MS:1000514" name="m/z array"/>
            <binary>AAAAAAAAWUAAAAAAAABpQA==</binary>
          </binaryDataArray>
          <binaryDataArray encodedLength="12">
            <cvParam cvRef="MS" accession="MS:1000521" name="32-bit float"/>
            <cvParam cvRef="MS" accession="MS:1000515" name="intensity array"/>
            <binary>AADIQgAASEM=</binary>
          </binaryDataArray>
        </binaryDataArrayList>
      </spectrum>
    </spectrumList>
    <chromatogramList count="1">
      <chromatogram index="0" id="TIC" defaultArrayLength="1">
        <cvParam cvRef="MS" accession="MS:1000235" name="total ion current chromatogram"/>
        <binaryDataArrayList count="2">
          <binaryDataArray encodedLength="12">
            <cvParam cvRef="MS" accession="MS:1000523" name="64-bit float"/>
            <cvParam cvRef="MS" accession="MS:1000595" name="time array" unitAccession="UO:0000010" unitName="second"/>
            <binary>AAAAAAAATkA=</binary>
          </binaryDataArray>
          <binaryDataArray arrayLength="1" encodedLength="12">
            <cvParam cvRef="MS" accession="MS:1000522" name="64-bit integer"/>
            <cvParam cvRef="MS" accession="MS:1000786" name="non-standard data array" value="ms level"/>
            <binary>AgAAAAAAAAA=</binary>
          </binaryDataArray>
        </binaryDataArrayList>
      </chromatogram>
    </chromatogramList>
  </run>
</mzML>"#;

fn streamer(xml: &str) -> MzMLStreamer<BufReader<std::io::Cursor<Vec<u8>>>> {
    let reader = std::io::Cursor::new(xml.as_bytes().to_vec());
    MzMLStreamer::new(BufReader::new(reader)).unwrap()
}

#[test]
fn test_parse_minimal_mzml() {
    let mut streamer = streamer(MINIMAL_MZML);

    let spectrum = streamer.next_spectrum().unwrap().unwrap();

    assert_eq!(spectrum.index, 0);
    assert_eq!(spectrum.id, "scan=1");
    assert_eq!(spectrum.ms_level, 1);
    assert_eq!(spectrum.polarity, 1);
    assert!(spectrum.centroided);
    assert!((spectrum.retention_time.unwrap() - 60.0).abs() < 0.001);
    assert_eq!(spectrum.mz_array.len(), 2);
    assert_eq!(spectrum.intensity_array.len(), 2);
    assert!((spectrum.mz_array[0] - 100.0).abs() < 0.001);
    assert!((spectrum.mz_array[1] - 200.0).abs() < 0.001);
    assert!((spectrum.intensity_array[1] - 200.0).abs() < 0.001);
}

#[test]
fn test_metadata_sections() {
    let mut streamer = streamer(MINIMAL_MZML);
    let metadata = streamer.read_metadata().unwrap().clone();

    assert_eq!(metadata.version.as_deref(), Some("1.1.0"));
    assert_eq!(metadata.cv_list.len(), 2);
    assert_eq!(metadata.cv_list[0].id, "MS");
    assert_eq!(metadata.cv_list[0].version.as_deref(), Some("4.1.30"));
    assert_eq!(metadata.cv_list[1].version, None);
    assert_eq!(metadata.file_content.len(), 1);

    let source = &metadata.source_files[0];
    assert_eq!(source.checksum_type.as_deref(), Some("SHA-1"));
    assert_eq!(source.file_format.as_deref(), Some("Thermo RAW format"));

    assert_eq!(metadata.samples[0].name.as_deref(), Some("mix"));
    assert_eq!(metadata.software_list[0].version.as_deref(), Some("3.0.0"));

    let ic = &metadata.instrument_configurations[0];
    assert_eq!(ic.cv_params.len(), 1);
    assert_eq!(ic.software_ref.as_deref(), Some("so_0"));
    assert_eq!(ic.components.len(), 2);
    assert_eq!(ic.components[0].component_type, ComponentType::Source);
    assert_eq!(ic.components[1].component_type, ComponentType::Analyzer);

    let method = &metadata.data_processing[0].processing_methods[0];
    assert_eq!(method.software_ref.as_deref(), Some("so_0"));
    assert_eq!(method.user_params[0].value, "deconvolved");

    assert_eq!(metadata.run_id.as_deref(), Some("test_run"));
    assert_eq!(metadata.sample_ref.as_deref(), Some("sa_0"));
    assert!(metadata.start_timestamp().is_some());
    assert_eq!(metadata.spectrum_count, Some(2));
    assert_eq!(streamer.spectrum_count(), Some(2));
}

#[test]
fn test_read_metadata_is_idempotent() {
    let mut streamer = streamer(MINIMAL_MZML);
    streamer.read_metadata().unwrap();
    streamer.read_metadata().unwrap();
    assert_eq!(streamer.metadata().software_list.len(), 1);
    assert_eq!(streamer.next_spectrum().unwrap().unwrap().id, "scan=1");
}

#[test]
fn test_precursor_and_user_params() {
    let spectra: Vec<_> = streamer(MINIMAL_MZML)
        .spectra()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(spectra.len(), 2);

    let ms2 = &spectra[1];
    assert_eq!(ms2.ms_level, 2);
    assert_eq!(ms2.user_param("DeconvMassInfo"), Some("tol=10;peaks=1:5,2:4"));
    assert_eq!(ms2.user_params.len(), 1);

    let precursor = ms2.precursor().unwrap();
    assert_eq!(precursor.precursor_scan(), Some(1));
    assert_eq!(precursor.selected_ion_charge, Some(2));
    assert_eq!(precursor.collision_energy, Some(25.0));
    assert_eq!(
        precursor.activation_method.as_deref(),
        Some("beam-type collision-induced dissociation")
    );
    assert_eq!(precursor.user_params[0].name, "note");
}

#[test]
fn test_array_info_recorded() {
    let spectrum = streamer(MINIMAL_MZML).next_spectrum().unwrap().unwrap();
    let mz = spectrum.array_info(&ArrayKind::Mz).unwrap();
    assert_eq!(mz.encoding, BinaryEncoding::Float64);
    assert_eq!(mz.encoded_length, Some(24));
    assert_eq!(mz.decoded_bytes, 16);
    assert_eq!(mz.value_count, 2);

    let intensity = spectrum.array_info(&ArrayKind::Intensity).unwrap();
    assert_eq!(intensity.encoding, BinaryEncoding::Float32);
    assert_eq!(intensity.decoded_bytes, 8);
}

#[test]
fn test_chromatogram_after_spectra() {
    let mut streamer = streamer(MINIMAL_MZML);
    assert!(streamer.next_spectrum().unwrap().is_some());

    // The remaining spectrum is skipped
    let chromatogram = streamer.next_chromatogram().unwrap().unwrap();
    assert_eq!(chromatogram.id, "TIC");
    assert_eq!(chromatogram.chromatogram_type, ChromatogramType::TIC);
    assert_eq!(chromatogram.time_array, vec![60.0]);
    assert!(chromatogram.intensity_array.is_empty());

    let ms_level = chromatogram.auxiliary("ms level").unwrap();
    assert_eq!(ms_level.values, ArrayValues::Integer(vec![2]));
    assert!(streamer.next_chromatogram().unwrap().is_none());
}

#[test]
fn test_read_document() {
    let document = streamer(MINIMAL_MZML).read_document().unwrap();
    assert_eq!(document.spectra.len(), 2);
    assert_eq!(document.chromatograms.len(), 1);
    assert_eq!(document.metadata.chromatogram_count, Some(1));
    assert!(document.spectrum("scan=2").is_some());
    assert!(document.chromatogram("TIC").is_some());
}

#[test]
fn test_encoded_length_mismatch() {
    let xml = MINIMAL_MZML.replacen("encodedLength=\"24\"", "encodedLength=\"25\"", 1);

    let err = streamer(&xml).next_spectrum().unwrap_err();
    assert!(matches!(
        err,
        MzMLError::BinaryError {
            element: "spectrum",
            source: crate::mzml::binary::BinaryDecodeError::EncodedLengthMismatch {
                declared: 25,
                actual: 24
            },
            ..
        }
    ));

    let relaxed = streamer(&xml).with_encoded_length_check(false);
    assert!(relaxed.spectra().next().unwrap().is_ok());
}

#[test]
fn test_array_length_mismatch() {
    let xml = MINIMAL_MZML.replacen("defaultArrayLength=\"2\"", "defaultArrayLength=\"3\"", 1);
    let err = streamer(&xml).next_spectrum().unwrap_err();
    assert!(matches!(err, MzMLError::BinaryError { .. }));
}

#[test]
fn test_truncated_spectrum() {
    let cut = MINIMAL_MZML.find("</spectrum>").unwrap();
    let err = streamer(&MINIMAL_MZML[..cut]).next_spectrum().unwrap_err();
    assert!(matches!(err, MzMLError::InvalidStructure(_)));
}

#[test]
fn test_no_spectrum_list() {
    let xml = r#"<mzML version="1.1.0"><run id="r"></run></mzML>"#;
    let mut streamer = streamer(xml);
    assert!(streamer.next_spectrum().unwrap().is_none());
    assert!(streamer.next_spectrum().unwrap().is_none());
    assert!(streamer.next_chromatogram().unwrap().is_none());
}

/// Wrap `MINIMAL_MZML` into an indexedmzML document with correct offsets
/// and checksum
fn indexed_document() -> String {
    let body = MINIMAL_MZML.replacen(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
        "",
        1,
    );
    let mut doc = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<indexedmzML xmlns=\"http://psi.hupo.org/ms/mzml\">\n",
    );
    doc.push_str(&body);
    doc.push('\n');

    let offset_of = |needle: &str| doc.find(needle).unwrap();
    let scan1 = offset_of("<spectrum index=\"0\"");
    let scan2 = offset_of("<spectrum index=\"1\"");
    let tic = offset_of("<chromatogram ");

    let index_list_offset = doc.len();
    doc.push_str(&format!(
        "<indexList count=\"2\">\n<index name=\"spectrum\">\n\
         <offset idRef=\"scan=1\">{scan1}</offset>\n<offset idRef=\"scan=2\">{scan2}</offset>\n\
         </index>\n<index name=\"chromatogram\">\n<offset idRef=\"TIC\">{tic}</offset>\n</index>\n\
         </indexList>\n<indexListOffset>{index_list_offset}</indexListOffset>\n<fileChecksum>"
    ));

    use sha1::{Digest, Sha1};
    let digest: String = Sha1::digest(doc.as_bytes())
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect();
    doc.push_str(&digest);
    doc.push_str("</fileChecksum>\n</indexedmzML>\n");
    doc
}

fn write_temp(contents: impl AsRef<[u8]>) -> tempfile::NamedTempFile {
    use std::io::Write;
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_ref()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_open_indexed_reads_index() {
    let file = write_temp(&indexed_document());
    let streamer = MzMLStreamer::open_indexed(file.path()).unwrap();
    assert!(streamer.is_indexed());
    assert_eq!(streamer.index().spectrum_count(), 2);
    assert_eq!(streamer.index().chromatogram_count(), 1);
    assert!(streamer.index().file_checksum.is_some());

    let spectra: Vec<_> = streamer.spectra().collect::<Result<_, _>>().unwrap();
    assert_eq!(spectra.len(), 2);
}

#[test]
fn test_indexed_random_access() {
    let file = write_temp(&indexed_document());
    let mut indexed = IndexedMzML::open(file.path()).unwrap();

    let spectrum = indexed.spectrum_by_id("scan=2").unwrap();
    assert_eq!(spectrum.index, 1);
    assert_eq!(spectrum.ms_level, 2);
    assert_eq!(spectrum.mz_array, vec![100.0, 200.0]);

    let first = indexed.spectrum_at(0).unwrap();
    assert_eq!(first.id, "scan=1");

    let tic = indexed.chromatogram_by_id("TIC").unwrap();
    assert_eq!(tic.time_array, vec![60.0]);

    assert!(matches!(
        indexed.spectrum_by_id("scan=3"),
        Err(MzMLError::ElementNotFound { .. })
    ));
    assert!(indexed.spectrum_at(5).is_err());

    let metadata = indexed.metadata().unwrap();
    assert_eq!(metadata.run_id.as_deref(), Some("test_run"));
}

#[test]
fn test_verify_offsets_and_checksum() {
    let file = write_temp(&indexed_document());
    let mut indexed = IndexedMzML::open(file.path()).unwrap();

    let report = indexed.verify_offsets().unwrap();
    assert!(report.is_ok());
    assert_eq!(report.spectra_checked, 2);
    assert_eq!(report.chromatograms_checked, 1);

    assert!(matches!(
        indexed.verify_checksum().unwrap(),
        ChecksumStatus::Valid(_)
    ));
}

#[test]
fn test_verify_detects_shifted_offset() {
    let doc = indexed_document();
    let file = write_temp(&doc);
    let scan2_offset = IndexedMzML::open(file.path())
        .unwrap()
        .index()
        .spectrum_offset("scan=2")
        .unwrap();

    // Only the index changes, so indexListOffset still points at the indexList
    let shifted = doc.replacen(
        &format!(">{scan2_offset}</offset>"),
        &format!(">{}</offset>", scan2_offset + 1),
        1,
    );
    let file = write_temp(&shifted);
    let mut indexed = IndexedMzML::open(file.path()).unwrap();

    let report = indexed.verify_offsets().unwrap();
    assert!(!report.is_ok());
    assert_eq!(report.mismatches.len(), 1);
    assert_eq!(report.mismatches[0].id, "scan=2");
    assert_eq!(report.mismatches[0].element, "spectrum");

    assert!(matches!(
        indexed.verify_checksum().unwrap(),
        ChecksumStatus::Mismatch { .. }
    ));
}

#[test]
fn test_unindexed_file() {
    let file = write_temp(MINIMAL_MZML);
    let mut indexed = IndexedMzML::open(file.path()).unwrap();
    assert!(!indexed.index().is_indexed());
    assert!(matches!(
        indexed.spectrum_by_id("scan=1"),
        Err(MzMLError::NotIndexed)
    ));
    assert!(matches!(indexed.verify_offsets(), Err(MzMLError::NotIndexed)));
    assert_eq!(indexed.verify_checksum().unwrap(), ChecksumStatus::Missing);
}

/// Characters below U+0100 as ISO-8859-1 bytes
fn latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap())
        .collect()
}

fn byte_offset(haystack: &[u8], needle: &str) -> usize {
    haystack
        .windows(needle.len())
        .position(|w| w == needle.as_bytes())
        .unwrap()
}

/// `MINIMAL_MZML` as an ISO-8859-1 indexedmzML document with non-ASCII
/// attribute values, including one in the index trailer
fn latin1_indexed_document() -> Vec<u8> {
    let body = MINIMAL_MZML
        .replacen("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n", "", 1)
        .replacen("name=\"mix\"", "name=\"Müller\"", 1)
        .replacen("id=\"scan=1\"", "id=\"scan=1 café\"", 1);
    let mut doc = latin1(
        "<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>\n<indexedmzML xmlns=\"http://psi.hupo.org/ms/mzml\">\n",
    );
    doc.extend(latin1(&body));
    doc.push(b'\n');

    let scan1 = byte_offset(&doc, "<spectrum index=\"0\"");
    let scan2 = byte_offset(&doc, "<spectrum index=\"1\"");
    let tic = byte_offset(&doc, "<chromatogram ");

    let index_list_offset = doc.len();
    doc.extend(latin1(&format!(
        "<indexList count=\"2\">\n<index name=\"spectrum\">\n\
         <offset idRef=\"scan=1 café\">{scan1}</offset>\n<offset idRef=\"scan=2\">{scan2}</offset>\n\
         </index>\n<index name=\"chromatogram\">\n<offset idRef=\"TIC\">{tic}</offset>\n</index>\n\
         </indexList>\n<indexListOffset>{index_list_offset}</indexListOffset>\n<fileChecksum>"
    )));

    use sha1::{Digest, Sha1};
    let digest: String = Sha1::digest(&doc)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect();
    doc.extend(digest.as_bytes());
    doc.extend(b"</fileChecksum>\n</indexedmzML>\n");
    doc
}

#[test]
fn test_latin1_indexed_document() {
    let file = write_temp(latin1_indexed_document());
    let mut indexed = IndexedMzML::open(file.path()).unwrap();
    assert_eq!(indexed.index().spectrum_index[0].id, "scan=1 café");

    let report = indexed.verify_offsets().unwrap();
    assert!(report.is_ok(), "{:?}", report.mismatches);
    assert!(matches!(
        indexed.verify_checksum().unwrap(),
        ChecksumStatus::Valid(_)
    ));

    let spectrum = indexed.spectrum_by_id("scan=1 café").unwrap();
    assert_eq!(spectrum.id, "scan=1 café");
    assert_eq!(spectrum.mz_array, vec![100.0, 200.0]);
    assert_eq!(indexed.spectrum_at(1).unwrap().id, "scan=2");

    let metadata = indexed.metadata().unwrap();
    assert_eq!(metadata.samples[0].name.as_deref(), Some("Müller"));
}

#[test]
fn test_latin1_streaming() {
    let doc = latin1_indexed_document();
    let file = write_temp(&doc);
    let mut streamer = MzMLStreamer::open_indexed(file.path()).unwrap();
    assert_eq!(
        streamer.read_metadata().unwrap().samples[0].name.as_deref(),
        Some("Müller")
    );
    let first = streamer.next_spectrum().unwrap().unwrap();
    assert_eq!(first.id, "scan=1 café");
    // ISO-8859-1 café is one byte shorter than its UTF-8 form
    let expected = byte_offset(&doc, "<spectrum index=\"0\"") as u64;
    assert_eq!(streamer.index().spectrum_offset("scan=1 café"), Some(expected));
}
