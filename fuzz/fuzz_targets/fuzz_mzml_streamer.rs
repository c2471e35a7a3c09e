#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

use flashview::mzml::MzMLStreamer;

fuzz_target!(|data: &[u8]| {
    // Any input must parse or fail with an error, never panic
    let Ok(mut streamer) = MzMLStreamer::new(Cursor::new(data)) else {
        return;
    };

    for _ in 0..100 {
        match streamer.next_spectrum() {
            Ok(Some(_)) => {}
            Ok(None) | Err(_) => break,
        }
    }

    for _ in 0..100 {
        match streamer.next_chromatogram() {
            Ok(Some(_)) => {}
            Ok(None) | Err(_) => break,
        }
    }
});
