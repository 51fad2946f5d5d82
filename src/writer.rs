//! Reference encoder for Flex archives.
//!
//! Records accumulate in memory and the whole archive is emitted in one
//! pass on [`FlexWriter::finalize`] — the directory sits at the front and
//! its size depends on the final record count, so nothing can be written
//! before the set is complete.  Intended for tests, the `pack` command, and
//! repacking tools; the engine itself only ever reads these files.

use std::io::{self, Write};

use thiserror::Error;

use crate::directory::{RecordDirectory, RecordEntry, COUNT_SIZE, ENTRY_SIZE};

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("record {index} is {size} bytes; the format caps a record at 4 GiB")]
    RecordTooLarge { index: u32, size: u64 },
    #[error("archive would be {size} bytes; offsets are 32-bit")]
    ArchiveTooLarge { size: u64 },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Builds a Flex archive record by record.
///
/// ```
/// use flexarc::writer::FlexWriter;
///
/// let mut w = FlexWriter::new(Vec::new());
/// w.add_record(b"HELLO")?;
/// w.add_empty_record();
/// w.add_record(b"!XY")?;
/// let bytes = w.finalize()?;
/// assert_eq!(bytes.len(), 4 + 3 * 8 + 8); // directory + payloads
/// # Ok::<(), flexarc::writer::WriteError>(())
/// ```
pub struct FlexWriter<W: Write> {
    writer: W,
    records: Vec<Option<Vec<u8>>>,
}

impl<W: Write> FlexWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, records: Vec::new() }
    }

    /// Append one record.  Zero-length data is legal and equivalent to
    /// [`FlexWriter::add_empty_record`].
    pub fn add_record(&mut self, data: &[u8]) -> Result<(), WriteError> {
        if data.len() as u64 > u32::MAX as u64 {
            return Err(WriteError::RecordTooLarge {
                index: self.records.len() as u32,
                size: data.len() as u64,
            });
        }
        if data.is_empty() {
            self.records.push(None);
        } else {
            self.records.push(Some(data.to_vec()));
        }
        Ok(())
    }

    /// Append an intentionally empty slot (offset 0, length 0 on disk).
    pub fn add_empty_record(&mut self) {
        self.records.push(None);
    }

    pub fn record_count(&self) -> u32 {
        self.records.len() as u32
    }

    /// Emit directory + payloads and return the underlying writer.
    /// Consuming `self` makes "finalize exactly once" a compile-time fact.
    pub fn finalize(mut self) -> Result<W, WriteError> {
        let dir_size = COUNT_SIZE + self.records.len() as u64 * ENTRY_SIZE;

        let mut position = dir_size;
        let mut entries = Vec::with_capacity(self.records.len());
        for record in &self.records {
            match record {
                Some(data) => {
                    // Only the start offset must fit in 32 bits.
                    if position > u32::MAX as u64 {
                        return Err(WriteError::ArchiveTooLarge { size: position });
                    }
                    entries.push(RecordEntry {
                        offset: position as u32,
                        length: data.len() as u32,
                    });
                    position += data.len() as u64;
                }
                None => entries.push(RecordEntry { offset: 0, length: 0 }),
            }
        }

        RecordDirectory::from_entries(entries).write(&mut self.writer)?;
        for record in self.records.iter().flatten() {
            self.writer.write_all(record)?;
        }
        self.writer.flush()?;
        Ok(self.writer)
    }
}
