use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};
use thiserror::Error;

/// Bytes occupied by the record count field.
pub const COUNT_SIZE: u64 = 4;
/// Bytes occupied by one directory entry (offset + length).
pub const ENTRY_SIZE: u64 = 8;

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("source too short for a {declared}-record directory (need {needed} bytes, have {actual})")]
    TruncatedDirectory { declared: u32, needed: u64, actual: u64 },
    #[error("record {index} spans bytes {offset}..{end}, past end of source ({source_len} bytes)")]
    RecordOutOfBounds { index: u32, offset: u32, end: u64, source_len: u64 },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// One directory entry: where a record's bytes live in the source.
/// A `length` of 0 means the slot is intentionally empty; its `offset`
/// carries no meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordEntry {
    pub offset: u32,
    pub length: u32,
}

impl RecordEntry {
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// One-past-the-end byte position of this record in the source.
    pub fn end(&self) -> u64 {
        self.offset as u64 + self.length as u64
    }
}

/// The parsed, validated record directory of a Flex archive.
///
/// Immutable after construction: the entry table is fixed for the lifetime
/// of the archive it describes.
#[derive(Debug, Clone)]
pub struct RecordDirectory {
    entries: Vec<RecordEntry>,
}

impl RecordDirectory {
    /// Parse `u32le count` followed by `count` `(u32le offset, u32le length)`
    /// pairs, then validate every non-empty entry against `source_len`.
    ///
    /// The reader must be positioned at the start of the archive's byte
    /// source; `source_len` is that source's total size in bytes.
    pub fn read<R: Read>(mut reader: R, source_len: u64) -> Result<Self, DirectoryError> {
        if source_len < COUNT_SIZE {
            return Err(DirectoryError::TruncatedDirectory {
                declared: 0,
                needed: COUNT_SIZE,
                actual: source_len,
            });
        }
        let count = reader.read_u32::<LittleEndian>()?;

        let needed = COUNT_SIZE + count as u64 * ENTRY_SIZE;
        if source_len < needed {
            return Err(DirectoryError::TruncatedDirectory {
                declared: count,
                needed,
                actual: source_len,
            });
        }

        let mut entries = Vec::with_capacity(count as usize);
        for index in 0..count {
            let offset = reader.read_u32::<LittleEndian>()?;
            let length = reader.read_u32::<LittleEndian>()?;
            let entry = RecordEntry { offset, length };
            if !entry.is_empty() && entry.end() > source_len {
                return Err(DirectoryError::RecordOutOfBounds {
                    index,
                    offset,
                    end: entry.end(),
                    source_len,
                });
            }
            entries.push(entry);
        }
        Ok(Self { entries })
    }

    /// Emit the directory in wire layout. Used by the writer; entries are
    /// written exactly as stored.
    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_u32::<LittleEndian>(self.entries.len() as u32)?;
        for entry in &self.entries {
            writer.write_u32::<LittleEndian>(entry.offset)?;
            writer.write_u32::<LittleEndian>(entry.length)?;
        }
        Ok(())
    }

    pub fn from_entries(entries: Vec<RecordEntry>) -> Self {
        Self { entries }
    }

    pub fn count(&self) -> u32 {
        self.entries.len() as u32
    }

    pub fn get(&self, index: u32) -> Option<RecordEntry> {
        self.entries.get(index as usize).copied()
    }

    pub fn entries(&self) -> &[RecordEntry] {
        &self.entries
    }

    /// Size in bytes of the directory itself (count field + entry table).
    pub fn byte_size(&self) -> u64 {
        COUNT_SIZE + self.entries.len() as u64 * ENTRY_SIZE
    }
}
