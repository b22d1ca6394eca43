//! Memory the doublets stores are built on.
//!
//! A store sees its memory as a growable array of fixed-size cells. Two kinds
//! are provided: [`Volatile`], which lives only in RAM, and [`FileMapped`],
//! which mirrors every mutation into an append-only journal so the array can
//! be rebuilt when the file is opened again.

pub mod file_mapped;
pub mod mem_entry;
pub mod mem_error;
pub mod volatile;


pub use self::{file_mapped::FileMapped, mem_error::MemError, volatile::Volatile};

/// A growable array of cells.
pub trait RawMem<T> {
    /// Number of cells currently allocated.
    fn len(&self) -> usize;

    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, index: usize) -> Option<&T>;

    /// Writes `value` at `index`, growing the array with default cells as needed.
    fn set(&mut self, index: usize, value: T) -> Result<(), MemError>;

    /// Shrinks the array to `len` cells. Does nothing if it is already shorter.
    fn truncate(&mut self, len: usize) -> Result<(), MemError>;

    fn clear(&mut self) -> Result<(), MemError> {
        self.truncate(0)
    }

    /// Pushes buffered writes to the backing storage.
    fn flush(&mut self) -> Result<(), MemError> {
        Ok(())
    }
}
