//! The [`RawArchive`] reader — the primary embedding surface.
//!
//! ```no_run
//! use flexarc::archive::RawArchive;
//!
//! let mut ar = RawArchive::open("static/u8gumps.flx")?;
//! for i in 0..ar.record_count() {
//!     if let Some(bytes) = ar.read_record(i)? {
//!         println!("record {i}: {} bytes", bytes.len());
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Every higher-level asset format in the surrounding engine (shapes, fonts,
//! sounds, usecode, map globs) is stored as records inside one of these
//! archives.  The reader is format-agnostic: it hands out exact byte ranges
//! and never interprets them.  Absent records — an index past the directory,
//! or a zero-length slot — come back as `None`, not as errors; only a source
//! that contradicts its own directory is an error, and that is caught once
//! at construction.

use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::directory::{DirectoryError, RecordDirectory, RecordEntry};

// ── Errors ───────────────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("unable to open {path}: {source}")]
    MissingSource { path: PathBuf, source: io::Error },
    #[error("malformed archive directory: {0}")]
    Malformed(#[from] DirectoryError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

// ── RawArchive ───────────────────────────────────────────────────────────────

/// A Flex archive opened for reading.
///
/// Owns its byte source exclusively; the directory is parsed and validated
/// once at construction and never changes afterwards.  Record bytes are read
/// on demand and never cached here — caching, if wanted, belongs to the
/// consumer.
#[derive(Debug)]
pub struct RawArchive<R: Read + Seek> {
    source: R,
    directory: RecordDirectory,
    kind: u16,
}

impl RawArchive<File> {
    /// Open an archive file.  An unopenable path is reported as
    /// [`ArchiveError::MissingSource`] so the load orchestrator can decide
    /// how fatal that is for the asset category in question.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ArchiveError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ArchiveError::MissingSource {
            path: path.to_owned(),
            source,
        })?;
        Self::new(file)
    }
}

impl<R: Read + Seek> RawArchive<R> {
    /// Take ownership of `source` and parse its directory.
    ///
    /// Construction either fully succeeds or fails; there is no partial
    /// recovery for a directory that contradicts the source length.
    pub fn new(source: R) -> Result<Self, ArchiveError> {
        Self::with_kind(source, 0)
    }

    /// Like [`RawArchive::new`], tagging the archive with an opaque identity.
    /// The tag is never interpreted here; [`crate::bundle`] gives it meaning.
    pub fn with_kind(mut source: R, kind: u16) -> Result<Self, ArchiveError> {
        let source_len = source.seek(SeekFrom::End(0))?;
        source.seek(SeekFrom::Start(0))?;
        let directory = RecordDirectory::read(&mut source, source_len)?;
        Ok(Self { source, directory, kind })
    }

    pub fn kind(&self) -> u16 {
        self.kind
    }

    /// Total number of directory entries, empty slots included.
    pub fn record_count(&self) -> u32 {
        self.directory.count()
    }

    /// Directory metadata for one slot, without touching the source.
    /// `None` if `index` is past the directory.
    pub fn entry(&self, index: u32) -> Option<RecordEntry> {
        self.directory.get(index)
    }

    /// Byte length of a record; `Some(0)` for an empty slot, `None` for an
    /// out-of-range index.
    pub fn record_size(&self, index: u32) -> Option<u32> {
        self.directory.get(index).map(|e| e.length)
    }

    /// Read the exact bytes `[offset, offset + length)` of one record.
    ///
    /// `Ok(None)` for an out-of-range index or a zero-length slot; both are
    /// normal outcomes, not errors.  An I/O failure on a range the directory
    /// already validated is an `Err`.
    pub fn read_record(&mut self, index: u32) -> io::Result<Option<Vec<u8>>> {
        let entry = match self.directory.get(index) {
            Some(e) if !e.is_empty() => e,
            _ => return Ok(None),
        };
        self.source.seek(SeekFrom::Start(entry.offset as u64))?;
        let mut buf = vec![0u8; entry.length as usize];
        self.source.read_exact(&mut buf)?;
        Ok(Some(buf))
    }

    /// Materialize one record as an independently owned in-memory stream,
    /// for records that are themselves nested archives (the `glob.flx`
    /// pattern).  The returned cursor can be fed straight back into
    /// [`RawArchive::new`]; it is dropped like any other owned value.
    pub fn record_source(&mut self, index: u32) -> io::Result<Option<Cursor<Vec<u8>>>> {
        Ok(self.read_record(index)?.map(Cursor::new))
    }

    /// CRC-32 of a record's bytes, with the usual absent semantics.
    /// Used by the `verify` and `list --checksums` tooling.
    pub fn record_crc32(&mut self, index: u32) -> io::Result<Option<u32>> {
        let bytes = match self.read_record(index)? {
            Some(b) => b,
            None => return Ok(None),
        };
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&bytes);
        Ok(Some(hasher.finalize()))
    }

    /// Structured listing of the directory, for `list --json` and embedders.
    pub fn manifest(&self) -> Manifest {
        Manifest {
            record_count: self.directory.count(),
            records: self
                .directory
                .entries()
                .iter()
                .enumerate()
                .map(|(i, e)| RecordInfo::from_entry(i as u32, e))
                .collect(),
        }
    }

    /// Release the backing source.
    pub fn into_inner(self) -> R {
        self.source
    }
}

// ── Manifest ─────────────────────────────────────────────────────────────────

/// Lightweight descriptor for one directory slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordInfo {
    pub index: u32,
    pub offset: u32,
    pub length: u32,
    pub empty: bool,
}

impl RecordInfo {
    fn from_entry(index: u32, entry: &RecordEntry) -> Self {
        RecordInfo {
            index,
            offset: entry.offset,
            length: entry.length,
            empty: entry.is_empty(),
        }
    }
}

/// A complete directory listing, serializable for tooling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub record_count: u32,
    pub records: Vec<RecordInfo>,
}
