use serde::{de::DeserializeOwned, Serialize};
use std::{
    fs::{File, OpenOptions},
    io::{BufWriter, Cursor, Read, Seek, SeekFrom, Write},
    path::Path,
};

use super::{mem_entry::MemEntry, MemError, RawMem};

/// Journal entries tolerated beyond twice the cell count before an open compacts.
const COMPACT_SLACK: u64 = 1024;

/// File-backed memory.
///
/// Cells are kept in RAM and every mutation is appended to a bincode journal.
/// Opening the file replays the journal to rebuild the array.
#[derive(Debug)]
pub struct FileMapped<T> {
    cells: Vec<T>,
    journal: BufWriter<File>,
    entries: u64,
}

impl<T> FileMapped<T>
where
    T: Copy + Default + Serialize + DeserializeOwned,
{
    /// Opens or creates the journal at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, MemError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;
        Self::new(file)
    }

    /// Builds the memory from an already opened journal file.
    pub fn new(mut file: File) -> Result<Self, MemError> {
        file.seek(SeekFrom::Start(0))?;
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)?;
        let (cells, entries, valid) = Self::replay(&buffer)?;
        if valid < buffer.len() as u64 {
            tracing::warn!(
                dropped = buffer.len() as u64 - valid,
                "discarding torn journal tail"
            );
            file.set_len(valid)?;
        }
        file.seek(SeekFrom::End(0))?;

        let mut mem = Self {
            cells,
            journal: BufWriter::new(file),
            entries,
        };
        if mem.entries > 2 * mem.cells.len() as u64 + COMPACT_SLACK {
            mem.compact()?;
        }
        Ok(mem)
    }

    /// Replays a journal, returning the cells, the number of entries read and
    /// the length of the well-formed prefix.
    fn replay(buffer: &[u8]) -> Result<(Vec<T>, u64, u64), MemError> {
        let mut cells = Vec::new();
        let mut entries = 0;
        let mut valid = 0;
        let mut cursor = Cursor::new(buffer);

        while cursor.position() < buffer.len() as u64 {
            match bincode::deserialize_from::<_, MemEntry<T>>(&mut cursor) {
                Ok(MemEntry::Set(index, value)) => {
                    let index = index as usize;
                    if index >= cells.len() {
                        cells.resize(index + 1, T::default());
                    }
                    cells[index] = value;
                }
                Ok(MemEntry::Truncate(len)) => cells.truncate(len as usize),
                Err(e) => match e.as_ref() {
                    bincode::ErrorKind::Io(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                        break;
                    }
                    _ => return Err(MemError::BincodeError(e)),
                },
            }
            entries += 1;
            valid = cursor.position();
        }

        Ok((cells, entries, valid))
    }

    /// Rewrites the journal so it holds exactly one entry per cell.
    pub fn compact(&mut self) -> Result<(), MemError> {
        self.reset_journal()?;
        for (index, value) in self.cells.iter().enumerate() {
            bincode::serialize_into(&mut self.journal, &MemEntry::Set(index as u64, *value))?;
        }
        self.entries = self.cells.len() as u64;
        self.journal.flush()?;
        tracing::debug!(cells = self.cells.len(), "compacted journal");
        Ok(())
    }

    /// Number of entries currently in the journal.
    pub fn journal_entries(&self) -> u64 {
        self.entries
    }

    fn append(&mut self, entry: &MemEntry<T>) -> Result<(), MemError> {
        bincode::serialize_into(&mut self.journal, entry)?;
        self.entries += 1;
        Ok(())
    }

    fn reset_journal(&mut self) -> Result<(), MemError> {
        self.journal.flush()?;
        let file = self.journal.get_mut();
        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        self.entries = 0;
        Ok(())
    }
}

impl<T> RawMem<T> for FileMapped<T>
where
    T: Copy + Default + Serialize + DeserializeOwned,
{
    #[inline]
    fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline(always)]
    fn get(&self, index: usize) -> Option<&T> {
        self.cells.get(index)
    }

    fn set(&mut self, index: usize, value: T) -> Result<(), MemError> {
        if index >= self.cells.len() {
            self.cells.resize(index + 1, T::default());
        }
        self.cells[index] = value;
        self.append(&MemEntry::Set(index as u64, value))
    }

    fn truncate(&mut self, len: usize) -> Result<(), MemError> {
        if len == 0 {
            self.cells.clear();
            return self.reset_journal();
        }
        if len >= self.cells.len() {
            return Ok(());
        }
        self.cells.truncate(len);
        self.append(&MemEntry::Truncate(len as u64))
    }

    fn flush(&mut self) -> Result<(), MemError> {
        self.journal.flush()?;
        Ok(())
    }
}

impl<T> Drop for FileMapped<T> {
    fn drop(&mut self) {
        if let Err(e) = self.journal.flush() {
            tracing::warn!(error = %e, "failed to flush journal");
        }
    }
}
