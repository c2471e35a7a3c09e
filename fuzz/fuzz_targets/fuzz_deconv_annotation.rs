#![no_main]

use libfuzzer_sys::fuzz_target;

use flashview::deconv::annotated::parse_peak_groups;
use flashview::deconv::annotation::DeconvAnnotation;

fuzz_target!(|data: &[u8]| {
    let Ok(value) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(annotation) = DeconvAnnotation::parse(value) {
        let masses = vec![0.0; annotation.len()];
        let _ = annotation.zip_with_peaks(&masses, &masses);
    }
    let _ = parse_peak_groups(value, 1024);
});
