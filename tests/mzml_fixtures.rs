//! Reader tests against the FLASHDeconv fixtures in example-data/flashdeconv

use std::path::PathBuf;

use flashview::mzml::{
    ArrayKind, BinaryCompression, BinaryEncoding, ChecksumStatus, ChromatogramType, IndexedMzML,
    MzMLStreamer,
};

const SPECTRUM_ID: &str = "controllerType=0 controllerNumber=1 scan=1523";

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("example-data/flashdeconv")
        .join(name)
}

fn deconv() -> PathBuf {
    fixture("IntactProteinMix_MS2_deconv.mzML")
}

fn annotated() -> PathBuf {
    fixture("IntactProteinMix_MS2_annotated.mzML")
}

#[test]
fn test_deconv_metadata() {
    let mut streamer = MzMLStreamer::open(deconv()).unwrap();
    let metadata = streamer.read_metadata().unwrap();

    assert_eq!(metadata.version.as_deref(), Some("1.1.0"));
    let cv_ids: Vec<&str> = metadata.cv_list.iter().map(|cv| cv.id.as_str()).collect();
    assert_eq!(cv_ids, vec!["MS", "UO", "BTO", "GO", "PATO"]);

    assert_eq!(metadata.run_id.as_deref(), Some("ru_0"));
    assert_eq!(metadata.sample_ref.as_deref(), Some("sa_0"));
    assert_eq!(
        metadata.start_timestamp().unwrap().to_string(),
        "2021-03-04 16:21:37"
    );
    assert_eq!(metadata.spectrum_count, Some(1));

    assert_eq!(metadata.source_files.len(), 1);
    assert_eq!(metadata.source_files[0].name, "Intact_Protein_Standard_Mix.mzML");
    assert_eq!(metadata.software_list.len(), 2);
    assert_eq!(metadata.instrument_configurations[0].components.len(), 3);
    assert_eq!(metadata.samples[0].cv_params.len(), 3);
}

#[test]
fn test_deconv_spectrum() {
    let streamer = MzMLStreamer::open(deconv()).unwrap();
    let spectra: Vec<_> = streamer.spectra().collect::<Result<_, _>>().unwrap();
    assert_eq!(spectra.len(), 1);

    let spectrum = &spectra[0];
    assert_eq!(spectrum.id, SPECTRUM_ID);
    assert_eq!(spectrum.scan_number(), 1523);
    assert_eq!(spectrum.ms_level, 2);
    assert!(spectrum.centroided);
    assert_eq!(spectrum.polarity, 1);
    assert_eq!(spectrum.retention_time, Some(1843.26705));
    assert_eq!(spectrum.base_peak_mz, Some(16297.317755));
    assert_eq!(spectrum.lowest_mz, Some(481.314538));
    assert_eq!(spectrum.highest_mz, Some(16759.582303));
    assert_eq!(spectrum.scan_window_lower, Some(200.0));
    assert_eq!(spectrum.scan_window_upper, Some(2000.0));
    assert!(spectrum
        .filter_string
        .as_deref()
        .unwrap()
        .contains("917.9712@hcd25.00"));

    let precursor = spectrum.precursor().unwrap();
    assert_eq!(precursor.precursor_scan(), Some(1521));
    assert_eq!(precursor.isolation_window_target, Some(917.9712));
    assert_eq!(precursor.selected_ion_mz, Some(918.4712));
    assert_eq!(precursor.selected_ion_charge, Some(12));
    assert_eq!(precursor.collision_energy, Some(25.0));
    assert_eq!(
        precursor.activation_method.as_deref(),
        Some("beam-type collision-induced dissociation")
    );

    assert!(spectrum.user_param("DeconvMassInfo").unwrap().starts_with("tol=10;"));
}

#[test]
fn test_deconv_binary_arrays() {
    let streamer = MzMLStreamer::open(deconv()).unwrap();
    let spectrum = streamer.spectra().next().unwrap().unwrap();

    assert_eq!(spectrum.mz_array.len(), 234);
    assert_eq!(spectrum.intensity_array.len(), 234);
    assert_eq!(spectrum.mz_array[0], 481.314538);
    assert_eq!(spectrum.mz_array[233], 16759.582303);
    assert_eq!(spectrum.intensity_array[0], 1067224.5);

    let mz = spectrum.array_info(&ArrayKind::Mz).unwrap();
    assert_eq!(mz.encoding, BinaryEncoding::Float64);
    assert_eq!(mz.compression, BinaryCompression::None);
    assert_eq!(mz.encoded_length, Some(2496));
    assert_eq!(mz.decoded_bytes, 1872);

    let intensity = spectrum.array_info(&ArrayKind::Intensity).unwrap();
    assert_eq!(intensity.encoding, BinaryEncoding::Float32);
    assert_eq!(intensity.encoded_length, Some(1248));
    assert_eq!(intensity.decoded_bytes, 936);
}

#[test]
fn test_deconv_chromatogram() {
    let streamer = MzMLStreamer::open(deconv()).unwrap();
    let chromatograms: Vec<_> = streamer
        .chromatograms()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(chromatograms.len(), 1);

    let tic = &chromatograms[0];
    assert_eq!(tic.id, "TIC");
    assert_eq!(tic.chromatogram_type, ChromatogramType::TIC);
    assert_eq!(tic.time_array, vec![1843.26705]);
    assert_eq!(tic.intensity_array, vec![574660544.0]);

    let ms_level = tic.auxiliary("ms level").unwrap();
    assert_eq!(ms_level.values.as_integers(), Some(&[2i64][..]));
}

#[test]
fn test_annotated_zlib_arrays() {
    let streamer = MzMLStreamer::open(annotated()).unwrap();
    let spectrum = streamer.spectra().next().unwrap().unwrap();

    assert_eq!(spectrum.id, SPECTRUM_ID);
    assert_eq!(spectrum.default_array_length, 702);
    assert_eq!(spectrum.mz_array.len(), 702);
    assert_eq!(spectrum.intensity_array.len(), 702);
    assert_eq!(spectrum.intensity_array[0], 213444.90625);

    let mz = spectrum.array_info(&ArrayKind::Mz).unwrap();
    assert_eq!(mz.compression, BinaryCompression::Zlib);
    assert_eq!(mz.encoded_length, Some(7000));
    assert_eq!(mz.decoded_bytes, 5248);
    assert_eq!(mz.value_count, 702);

    assert!(spectrum
        .user_param("DeconvMassPeakIndices")
        .unwrap()
        .starts_with("0,9,48;1,14,52;"));
    assert!(spectrum.user_param("DeconvMassInfo").is_none());
}

#[test]
fn test_read_document() {
    let document = MzMLStreamer::open(deconv()).unwrap().read_document().unwrap();
    assert_eq!(document.spectra.len(), 1);
    assert_eq!(document.chromatograms.len(), 1);
    assert!(document.spectrum(SPECTRUM_ID).is_some());
    assert!(document.chromatogram("TIC").is_some());
}

#[test]
fn test_index_trailer() {
    let indexed = IndexedMzML::open(deconv()).unwrap();
    let index = indexed.index();

    assert!(index.is_indexed());
    assert_eq!(index.index_list_offset, Some(21113));
    assert_eq!(index.spectrum_offset(SPECTRUM_ID), Some(3994));
    assert_eq!(index.chromatogram_offset("TIC"), Some(19636));
    assert_eq!(
        index.file_checksum.as_deref(),
        Some("8fb502e5ac92b93fa9a7454e54067b360e48caba")
    );

    let annotated = IndexedMzML::open(annotated()).unwrap();
    assert_eq!(annotated.index().spectrum_offset(SPECTRUM_ID), Some(3992));
    assert_eq!(annotated.index().chromatogram_offset("TIC"), Some(21525));
}

#[test]
fn test_random_access() {
    let mut indexed = IndexedMzML::open(annotated()).unwrap();

    let by_id = indexed.spectrum_by_id(SPECTRUM_ID).unwrap();
    let by_position = indexed.spectrum_at(0).unwrap();
    assert_eq!(by_id.peak_count(), 702);
    assert_eq!(by_position.id, by_id.id);

    let tic = indexed.chromatogram_by_id("TIC").unwrap();
    assert_eq!(tic.intensity_array, vec![459728416.0]);

    assert!(indexed.spectrum_by_id("scan=1").is_err());
    assert!(indexed.spectrum_at(1).is_err());
}

#[test]
fn test_offsets_and_checksums_verify() {
    for path in [deconv(), annotated()] {
        let mut indexed = IndexedMzML::open(&path).unwrap();

        let report = indexed.verify_offsets().unwrap();
        assert!(report.is_ok(), "{}: {:?}", path.display(), report.mismatches);
        assert_eq!(report.spectra_checked, 1);
        assert_eq!(report.chromatograms_checked, 1);

        assert!(matches!(
            indexed.verify_checksum().unwrap(),
            ChecksumStatus::Valid(_)
        ));
    }
}

#[test]
fn test_checksum_detects_edit() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("edited_deconv.mzML");

    let original = std::fs::read_to_string(deconv()).unwrap();
    let edited = original.replacen("hcd25.00", "hcd26.00", 1);
    assert_eq!(edited.len(), original.len());
    std::fs::write(&path, edited).unwrap();

    let mut indexed = IndexedMzML::open(&path).unwrap();
    assert!(indexed.verify_offsets().unwrap().is_ok());
    match indexed.verify_checksum().unwrap() {
        ChecksumStatus::Mismatch { expected, actual } => {
            assert_eq!(expected, "8fb502e5ac92b93fa9a7454e54067b360e48caba");
            assert_ne!(actual, expected);
        }
        other => panic!("expected checksum mismatch, got {other:?}"),
    }
}

#[test]
fn test_open_indexed_streamer() {
    let mut streamer = MzMLStreamer::open_indexed(deconv()).unwrap();
    assert!(streamer.is_indexed());
    assert_eq!(streamer.index().spectrum_count(), 1);

    let spectrum = streamer.next_spectrum().unwrap().unwrap();
    assert_eq!(spectrum.peak_count(), 234);
    assert!(streamer.next_spectrum().unwrap().is_none());
    assert!(streamer.next_chromatogram().unwrap().is_some());
}
