use std::fs::File;
use std::io::{BufRead, BufReader, Chain, Cursor, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Serialize;
use sha1::{Digest, Sha1};

use super::helpers::get_attribute;
use super::{MzMLError, MzMLStreamer};
use crate::mzml::models::{
    IndexEntry, MzMLChromatogram, MzMLFileMetadata, MzMLIndex, MzMLSpectrum,
};

/// Default input buffer size for mzML parsing (64KB)
pub const DEFAULT_INPUT_BUFFER_SIZE: usize = 64 * 1024;

/// Bytes read from the end of the file when looking for the index trailer
const TAIL_SIZE: u64 = 1024;

/// Bytes read at an index offset to inspect the element start tag
const TAG_PROBE_SIZE: u64 = 4096;

/// Bytes read at the start of the file when looking for the XML declaration
const DECLARATION_PROBE_SIZE: u64 = 512;

const INDEX_LIST_OFFSET_TAG: &[u8] = b"<indexListOffset>";
const INDEX_LIST_OFFSET_END_TAG: &[u8] = b"</indexListOffset>";
const FILE_CHECKSUM_TAG: &[u8] = b"<fileChecksum>";

/// Reader over an element in the middle of the file, behind the XML declaration
type SeekedReader<'a> = BufReader<Chain<Cursor<Vec<u8>>, &'a mut File>>;

impl MzMLStreamer<BufReader<File>> {
    /// Open an mzML file for streaming with default buffer size (64KB)
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, MzMLError> {
        Self::open_with_buffer_size(path, DEFAULT_INPUT_BUFFER_SIZE)
    }

    /// Open an mzML file for streaming with custom buffer size
    ///
    /// # Arguments
    /// * `path` - Path to the mzML file
    /// * `buffer_size` - Size of the input buffer in bytes
    ///
    /// # Example
    /// ```rust,no_run
    /// use flashview::mzml::MzMLStreamer;
    ///
    /// // Use 256KB buffer for better throughput
    /// let streamer = MzMLStreamer::open_with_buffer_size("data.mzML", 256 * 1024)?;
    /// # Ok::<(), flashview::mzml::MzMLError>(())
    /// ```
    pub fn open_with_buffer_size<P: AsRef<Path>>(
        path: P,
        buffer_size: usize,
    ) -> Result<Self, MzMLError> {
        let file = File::open(path.as_ref())?;
        let reader = BufReader::with_capacity(buffer_size, file);
        Self::new(reader)
    }

    /// Open an indexed mzML file and read the index first
    pub fn open_indexed<P: AsRef<Path>>(path: P) -> Result<Self, MzMLError> {
        Self::open_indexed_with_buffer_size(path, DEFAULT_INPUT_BUFFER_SIZE)
    }

    /// Open an indexed mzML file with custom buffer size
    pub fn open_indexed_with_buffer_size<P: AsRef<Path>>(
        path: P,
        buffer_size: usize,
    ) -> Result<Self, MzMLError> {
        let mut file = File::open(path.as_ref())?;

        let declaration = read_declaration(&mut file)?;
        let (index, _) = read_index_from_file(&mut file, &declaration)?;

        // Reset to beginning
        file.seek(SeekFrom::Start(0))?;

        let reader = BufReader::with_capacity(buffer_size, file);
        let mut streamer = Self::new(reader)?;
        streamer.index = index;

        Ok(streamer)
    }
}

/// The `<?xml ...?>` declaration at the start of the file, empty when absent.
///
/// Prepended to data read from the middle of the file so the parser decodes
/// it with the declared encoding.
fn read_declaration(file: &mut File) -> Result<Vec<u8>, MzMLError> {
    file.seek(SeekFrom::Start(0))?;
    let mut head = Vec::new();
    (&mut *file).take(DECLARATION_PROBE_SIZE).read_to_end(&mut head)?;

    let head = head.strip_prefix(b"\xEF\xBB\xBF".as_slice()).unwrap_or(&head[..]);
    if !head.starts_with(b"<?xml") {
        return Ok(Vec::new());
    }
    Ok(find_bytes(head, b"?>")
        .map(|end| head[..end + 2].to_vec())
        .unwrap_or_default())
}

fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Read the index from the end of an indexed mzML file.
///
/// Returns the index and the absolute position just past the
/// `<fileChecksum>` opening tag, when there is one. A file without an
/// `indexListOffset` trailer yields an empty index.
fn read_index_from_file(
    file: &mut File,
    declaration: &[u8],
) -> Result<(MzMLIndex, Option<u64>), MzMLError> {
    let file_size = file.seek(SeekFrom::End(0))?;

    // Read last 1KB to find indexListOffset
    let read_size = TAIL_SIZE.min(file_size);
    let tail_start = file_size - read_size;
    file.seek(SeekFrom::Start(tail_start))?;

    let mut tail = vec![0u8; read_size as usize];
    file.read_exact(&mut tail)?;

    // Offsets are byte positions; the tail is never decoded as a whole
    let checksum_end = find_bytes(&tail, FILE_CHECKSUM_TAG)
        .map(|pos| tail_start + (pos + FILE_CHECKSUM_TAG.len()) as u64);

    let Some(pos) = find_bytes(&tail, INDEX_LIST_OFFSET_TAG) else {
        log::debug!("No indexListOffset in the last {read_size} bytes");
        return Ok((MzMLIndex::default(), checksum_end));
    };
    let start = pos + INDEX_LIST_OFFSET_TAG.len();
    let Some(end) = find_bytes(&tail[start..], INDEX_LIST_OFFSET_END_TAG) else {
        return Ok((MzMLIndex::default(), checksum_end));
    };
    let offset = std::str::from_utf8(&tail[start..start + end])
        .map_err(|e| MzMLError::InvalidAttributeValue(format!("indexListOffset: {e}")))?
        .trim()
        .parse::<u64>()
        .map_err(|e| MzMLError::InvalidAttributeValue(format!("indexListOffset: {e}")))?;

    if offset >= file_size {
        return Err(MzMLError::InvalidStructure(format!(
            "indexListOffset {offset} is beyond the end of the file ({file_size} bytes)"
        )));
    }

    // Seek to index and parse it
    file.seek(SeekFrom::Start(offset))?;
    let mut index_data = declaration.to_vec();
    file.read_to_end(&mut index_data)?;

    let index = parse_index_data(&index_data, offset)?;
    log::debug!(
        "Read index at offset {offset}: {} spectra, {} chromatograms",
        index.spectrum_count(),
        index.chromatogram_count()
    );
    Ok((index, checksum_end))
}

/// Parse the indexList from raw XML data
fn parse_index_data(data: &[u8], offset: u64) -> Result<MzMLIndex, MzMLError> {
    let mut reader = Reader::from_reader(data);
    reader.config_mut().trim_text(true);
    // The data starts mid-document; `</indexedmzML>` has no opening tag here
    reader.config_mut().check_end_names = false;
    reader.config_mut().allow_unmatched_ends = true;

    let mut buf = Vec::new();
    let mut index = MzMLIndex {
        index_list_offset: Some(offset),
        ..Default::default()
    };

    let mut current_index_name: Option<String> = None;
    let mut in_checksum = false;

    loop {
        let event = reader.read_event_into(&mut buf);
        let decoder = reader.decoder();
        match event {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"index" => {
                    current_index_name = get_attribute(e, decoder, "name")?;
                }
                b"offset" => {
                    let id = get_attribute(e, decoder, "idRef")?.unwrap_or_default();
                    // Read the offset value
                    let mut offset_buf = Vec::new();
                    let offset_val = match reader.read_event_into(&mut offset_buf) {
                        Ok(Event::Text(t)) => t.unescape()?.trim().parse::<u64>().map_err(|e| {
                            MzMLError::InvalidAttributeValue(format!("offset of '{id}': {e}"))
                        })?,
                        Ok(_) => {
                            return Err(MzMLError::InvalidStructure(format!(
                                "Empty offset for '{id}'"
                            )))
                        }
                        Err(e) => return Err(MzMLError::XmlError(e)),
                    };

                    let entry = IndexEntry {
                        id,
                        offset: offset_val,
                    };
                    match current_index_name.as_deref() {
                        Some("spectrum") => index.spectrum_index.push(entry),
                        Some("chromatogram") => index.chromatogram_index.push(entry),
                        _ => {}
                    }
                }
                b"fileChecksum" => in_checksum = true,
                _ => {}
            },
            Ok(Event::Text(ref t)) => {
                if in_checksum {
                    index.file_checksum = Some(t.unescape()?.trim().to_string());
                }
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"index" => current_index_name = None,
                b"fileChecksum" => in_checksum = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(MzMLError::XmlError(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(index)
}

/// Index offset that does not land on the element it names
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OffsetMismatch {
    /// Element kind ("spectrum" or "chromatogram")
    pub element: &'static str,
    /// `idRef` of the index entry
    pub id: String,
    /// Byte offset from the index
    pub offset: u64,
    /// What was found at the offset: the id of an element of the right kind,
    /// or the first bytes there
    pub found: String,
}

/// Result of checking every index offset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexReport {
    /// Spectrum offsets checked
    pub spectra_checked: usize,
    /// Chromatogram offsets checked
    pub chromatograms_checked: usize,
    /// Offsets that do not point at their element
    pub mismatches: Vec<OffsetMismatch>,
}

impl IndexReport {
    /// Whether every offset points at its element
    pub fn is_ok(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Outcome of the `fileChecksum` check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ChecksumStatus {
    /// Stored and computed digests agree
    Valid(String),
    /// Stored digest differs from the computed one
    Mismatch {
        /// Digest stored in the file
        expected: String,
        /// Digest computed over the file
        actual: String,
    },
    /// The file carries no `fileChecksum`
    Missing,
}

/// Random access to an indexedmzML file through its byte-offset index
pub struct IndexedMzML {
    path: PathBuf,
    file: File,
    index: MzMLIndex,
    checksum_end: Option<u64>,
    declaration: Vec<u8>,
    buffer_size: usize,
    verify_encoded_length: bool,
}

impl IndexedMzML {
    /// Open a file and read its index trailer
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, MzMLError> {
        Self::open_with_buffer_size(path, DEFAULT_INPUT_BUFFER_SIZE)
    }

    /// Open a file with a custom buffer size for element parsing
    pub fn open_with_buffer_size<P: AsRef<Path>>(
        path: P,
        buffer_size: usize,
    ) -> Result<Self, MzMLError> {
        let path = path.as_ref().to_path_buf();
        let mut file = File::open(&path)?;
        let declaration = read_declaration(&mut file)?;
        let (index, checksum_end) = read_index_from_file(&mut file, &declaration)?;

        Ok(Self {
            path,
            file,
            index,
            checksum_end,
            declaration,
            buffer_size,
            verify_encoded_length: true,
        })
    }

    /// Enable or disable the `encodedLength` check on binary arrays
    pub fn with_encoded_length_check(mut self, enabled: bool) -> Self {
        self.verify_encoded_length = enabled;
        self
    }

    /// Path of the underlying file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The parsed index
    pub fn index(&self) -> &MzMLIndex {
        &self.index
    }

    /// Read file-level metadata from the start of the file
    pub fn metadata(&mut self) -> Result<MzMLFileMetadata, MzMLError> {
        self.file.seek(SeekFrom::Start(0))?;
        let reader = BufReader::with_capacity(self.buffer_size, &mut self.file);
        let mut streamer = MzMLStreamer::new(reader)?;
        Ok(streamer.read_metadata()?.clone())
    }

    /// Spectrum by native ID
    pub fn spectrum_by_id(&mut self, id: &str) -> Result<MzMLSpectrum, MzMLError> {
        let (position, offset) = self.locate(id, true)?;
        self.spectrum_at_offset(position, offset, id)
    }

    /// Spectrum by position in the index
    pub fn spectrum_at(&mut self, position: usize) -> Result<MzMLSpectrum, MzMLError> {
        if !self.index.is_indexed() {
            return Err(MzMLError::NotIndexed);
        }
        let entry = self.index.spectrum_index.get(position).cloned().ok_or_else(|| {
            MzMLError::ElementNotFound {
                element: "spectrum",
                id: format!("#{position}"),
            }
        })?;
        self.spectrum_at_offset(position, entry.offset, &entry.id)
    }

    /// Chromatogram by native ID
    pub fn chromatogram_by_id(&mut self, id: &str) -> Result<MzMLChromatogram, MzMLError> {
        let (position, offset) = self.locate(id, false)?;
        let verify = self.verify_encoded_length;
        self.streamer_at(offset, position, false)?
            .with_encoded_length_check(verify)
            .next_chromatogram()?
            .ok_or_else(|| MzMLError::InvalidStructure(format!(
                "No chromatogram element at offset {offset} for '{id}'"
            )))
    }

    /// Check that every offset points at the opening tag of its element
    pub fn verify_offsets(&mut self) -> Result<IndexReport, MzMLError> {
        if !self.index.is_indexed() {
            return Err(MzMLError::NotIndexed);
        }

        let mut report = IndexReport::default();
        let entries: Vec<(&'static str, IndexEntry)> = self
            .index
            .spectrum_index
            .iter()
            .map(|e| ("spectrum", e.clone()))
            .chain(
                self.index
                    .chromatogram_index
                    .iter()
                    .map(|e| ("chromatogram", e.clone())),
            )
            .collect();

        for (element, entry) in entries {
            match element {
                "spectrum" => report.spectra_checked += 1,
                _ => report.chromatograms_checked += 1,
            }
            let found = self.probe_element(entry.offset, element)?;
            if found.as_deref() != Ok(entry.id.as_str()) {
                log::warn!(
                    "Index offset {} for {element} '{}' does not point at its element",
                    entry.offset,
                    entry.id
                );
                report.mismatches.push(OffsetMismatch {
                    element,
                    id: entry.id,
                    offset: entry.offset,
                    found: found.unwrap_or_else(|raw| raw),
                });
            }
        }

        Ok(report)
    }

    /// Recompute the SHA-1 of the bytes up to and including `<fileChecksum>`
    pub fn verify_checksum(&mut self) -> Result<ChecksumStatus, MzMLError> {
        let (Some(expected), Some(end)) = (self.index.file_checksum.clone(), self.checksum_end)
        else {
            return Ok(ChecksumStatus::Missing);
        };

        self.file.seek(SeekFrom::Start(0))?;
        let mut hasher = Sha1::new();
        let mut remaining = end;
        let mut chunk = vec![0u8; self.buffer_size.max(4096)];
        while remaining > 0 {
            let want = chunk.len().min(remaining as usize);
            let n = self.file.read(&mut chunk[..want])?;
            if n == 0 {
                return Err(MzMLError::InvalidStructure(
                    "File ended before the fileChecksum tag".to_string(),
                ));
            }
            hasher.update(&chunk[..n]);
            remaining -= n as u64;
        }

        let actual: String = hasher
            .finalize()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect();

        if actual.eq_ignore_ascii_case(expected.trim()) {
            Ok(ChecksumStatus::Valid(actual))
        } else {
            Ok(ChecksumStatus::Mismatch { expected, actual })
        }
    }

    fn locate(&self, id: &str, spectrum: bool) -> Result<(usize, u64), MzMLError> {
        if !self.index.is_indexed() {
            return Err(MzMLError::NotIndexed);
        }
        let (element, entries) = if spectrum {
            ("spectrum", &self.index.spectrum_index)
        } else {
            ("chromatogram", &self.index.chromatogram_index)
        };
        entries
            .iter()
            .position(|e| e.id == id)
            .map(|pos| (pos, entries[pos].offset))
            .ok_or_else(|| MzMLError::ElementNotFound {
                element,
                id: id.to_string(),
            })
    }

    fn spectrum_at_offset(
        &mut self,
        position: usize,
        offset: u64,
        id: &str,
    ) -> Result<MzMLSpectrum, MzMLError> {
        let verify = self.verify_encoded_length;
        let mut streamer = self
            .streamer_at(offset, position, true)?
            .with_encoded_length_check(verify);
        streamer.next_spectrum()?.ok_or_else(|| {
            MzMLError::InvalidStructure(format!(
                "No spectrum element at offset {offset} for '{id}'"
            ))
        })
    }

    fn streamer_at(
        &mut self,
        offset: u64,
        position: usize,
        in_spectra: bool,
    ) -> Result<MzMLStreamer<SeekedReader<'_>>, MzMLError> {
        self.file.seek(SeekFrom::Start(offset))?;
        let source = Cursor::new(self.declaration.clone()).chain(&mut self.file);
        let reader = BufReader::with_capacity(self.buffer_size, source);
        Ok(MzMLStreamer::at_element(reader, position as i64, in_spectra))
    }

    /// Id of the `element` whose start tag sits at `offset`; `Err` carries the
    /// bytes found there instead
    fn probe_element(
        &mut self,
        offset: u64,
        element: &str,
    ) -> Result<Result<String, String>, MzMLError> {
        self.file.seek(SeekFrom::Start(offset))?;
        let mut bytes = Vec::new();
        (&mut self.file).take(TAG_PROBE_SIZE).read_to_end(&mut bytes)?;

        let prefix = format!("<{element} ");
        if !bytes.starts_with(prefix.as_bytes()) {
            let shown = String::from_utf8_lossy(&bytes[..bytes.len().min(32)]).into_owned();
            return Ok(Err(shown));
        }

        let mut data = self.declaration.clone();
        data.extend_from_slice(&bytes);
        let mut reader = Reader::from_reader(&data[..]);
        let mut buf = Vec::new();
        loop {
            let event = reader.read_event_into(&mut buf);
            let decoder = reader.decoder();
            match event {
                Ok(Event::Decl(_)) => {}
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                    return Ok(get_attribute(e, decoder, "id")?
                        .ok_or_else(|| format!("<{element}> without id")));
                }
                _ => return Ok(Err(format!("unreadable <{element}> start tag"))),
            }
            buf.clear();
        }
    }
}

impl<R: BufRead> MzMLStreamer<R> {
    /// Whether this streamer was opened with an index
    pub fn is_indexed(&self) -> bool {
        self.index.is_indexed()
    }
}
