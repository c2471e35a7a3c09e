use std::io::BufRead;

use super::{MzMLError, MzMLStreamer};
use crate::mzml::models::{MzMLChromatogram, MzMLSpectrum};

/// Iterator over spectra in an mzML file
pub struct SpectrumIterator<R: BufRead> {
    pub(super) streamer: MzMLStreamer<R>,
}

impl<R: BufRead> SpectrumIterator<R> {
    /// Give the streamer back, e.g. to continue with chromatograms
    pub fn into_inner(self) -> MzMLStreamer<R> {
        self.streamer
    }
}

impl<R: BufRead> Iterator for SpectrumIterator<R> {
    type Item = Result<MzMLSpectrum, MzMLError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.streamer.next_spectrum().transpose()
    }
}

/// Iterator over chromatograms in an mzML file
pub struct ChromatogramIterator<R: BufRead> {
    pub(super) streamer: MzMLStreamer<R>,
}

impl<R: BufRead> Iterator for ChromatogramIterator<R> {
    type Item = Result<MzMLChromatogram, MzMLError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.streamer.next_chromatogram().transpose()
    }
}
