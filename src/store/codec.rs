//! The on-disk framing of a climate record store.
//!
//! A store is a plain sequence of frames. Each frame is a little-endian `u32` payload
//! length followed by the payload: one [`Record`] encoded with `bincode` (serde,
//! fixed-int, little endian). An empty file is a valid, empty store.
//!
//! [`RecordReader`] walks the frames front to back as an [`Iterator`] of records. A frame
//! whose payload cannot be decoded is logged and skipped, so one corrupt record never hides
//! the records after it. A truncated frame or an implausible length ends the scan, since
//! the following frame boundary can no longer be trusted.

use crate::store::error::RecordStoreError;
use crate::types::record::Record;
use bincode::config::{Configuration, Fixint, Limit, LittleEndian};
use log::{debug, warn};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

const FRAME_LIMIT: usize = 64 * 1024 * 1024;

/// Largest payload a frame may declare.
pub const MAX_FRAME_LEN: u32 = FRAME_LIMIT as u32;

// The limit also stops a corrupt length prefix inside a payload from driving a huge allocation.
pub(crate) const BINCODE_CONFIG: Configuration<LittleEndian, Fixint, Limit<FRAME_LIMIT>> =
    bincode::config::standard()
        .with_fixed_int_encoding()
        .with_limit::<FRAME_LIMIT>();

enum HeaderRead {
    Complete,
    Eof,
    Truncated(usize),
}

/// Streams [`Record`]s out of a store without materialising it.
///
/// # Examples
///
/// ```
/// use climatrend::{Record, RecordReader, RecordWriter, Variable};
///
/// let mut writer = RecordWriter::new(Vec::new());
/// writer.append(&Record::new("2015-01-01 00:00:00", vec![(0.0, 0.0)])
///     .with_variable(Variable::Temperature, vec![3.5])).unwrap();
/// let bytes = writer.finish().unwrap();
///
/// let records: Vec<Record> = RecordReader::new(bytes.as_slice()).collect();
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].key.as_str(), "2015-01-01 00:00:00");
/// ```
pub struct RecordReader<R> {
    reader: R,
    buf: Vec<u8>,
    frames_read: usize,
    skipped: usize,
    finished: bool,
}

impl RecordReader<BufReader<File>> {
    /// Opens a fresh read handle on the store at `path`.
    pub fn open(path: &Path) -> Result<Self, RecordStoreError> {
        let file = File::open(path)
            .map_err(|e| RecordStoreError::DatasetUnavailable(path.to_path_buf(), e))?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: Read> RecordReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            frames_read: 0,
            skipped: 0,
            finished: false,
        }
    }

    /// Number of frames skipped so far because their payload was malformed.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn read_header(&mut self, header: &mut [u8; 4]) -> io::Result<HeaderRead> {
        let mut filled = 0;
        while filled < header.len() {
            match self.reader.read(&mut header[filled..]) {
                Ok(0) if filled == 0 => return Ok(HeaderRead::Eof),
                Ok(0) => return Ok(HeaderRead::Truncated(filled)),
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(HeaderRead::Complete)
    }

    fn stop(&mut self) -> Option<Record> {
        self.finished = true;
        None
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        while !self.finished {
            let frame = self.frames_read;
            let mut header = [0u8; 4];
            match self.read_header(&mut header) {
                Ok(HeaderRead::Complete) => {}
                Ok(HeaderRead::Eof) => return self.stop(),
                Ok(HeaderRead::Truncated(n)) => {
                    warn!("Record store ends inside the header of frame {} ({} of 4 bytes)", frame, n);
                    return self.stop();
                }
                Err(e) => {
                    warn!("I/O error reading frame {}: {}; ending scan", frame, e);
                    return self.stop();
                }
            }

            let len = u32::from_le_bytes(header);
            if len > MAX_FRAME_LEN {
                warn!(
                    "Frame {} declares {} bytes (limit {}); store is corrupt from here, ending scan",
                    frame, len, MAX_FRAME_LEN
                );
                return self.stop();
            }

            self.buf.resize(len as usize, 0);
            if let Err(e) = self.reader.read_exact(&mut self.buf) {
                warn!("Frame {} is truncated ({} bytes declared): {}", frame, len, e);
                return self.stop();
            }
            self.frames_read += 1;

            match bincode::serde::decode_from_slice::<Record, _>(&self.buf, BINCODE_CONFIG) {
                Ok((record, _)) => return Some(record.sanitized()),
                Err(e) => {
                    self.skipped += 1;
                    warn!("Skipping malformed record in frame {} ({} bytes): {}", frame, len, e);
                }
            }
        }
        None
    }
}

/// Appends [`Record`]s to a store in the framing [`RecordReader`] understands.
pub struct RecordWriter<W: Write> {
    writer: W,
    written: usize,
}

impl RecordWriter<BufWriter<File>> {
    /// Creates (or truncates) the store file at `path`.
    pub fn create(path: &Path) -> Result<Self, RecordStoreError> {
        let file =
            File::create(path).map_err(|e| RecordStoreError::Create(path.to_path_buf(), e))?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> RecordWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    pub fn append(&mut self, record: &Record) -> Result<(), RecordStoreError> {
        let payload = bincode::serde::encode_to_vec(record, BINCODE_CONFIG)
            .map_err(|e| RecordStoreError::Encode(record.key.to_string(), Box::new(e)))?;
        let len = u32::try_from(payload.len())
            .ok()
            .filter(|len| *len <= MAX_FRAME_LEN)
            .ok_or_else(|| RecordStoreError::FrameTooLarge {
                key: record.key.to_string(),
                len: payload.len(),
            })?;

        self.writer
            .write_all(&len.to_le_bytes())
            .map_err(RecordStoreError::WriteIo)?;
        self.writer
            .write_all(&payload)
            .map_err(RecordStoreError::WriteIo)?;
        self.written += 1;
        debug!("Wrote record {} ({} bytes)", record.key, payload.len());
        Ok(())
    }

    pub fn records_written(&self) -> usize {
        self.written
    }

    /// Flushes and hands back the underlying writer.
    pub fn finish(mut self) -> Result<W, RecordStoreError> {
        self.writer.flush().map_err(RecordStoreError::WriteIo)?;
        Ok(self.writer)
    }
}
