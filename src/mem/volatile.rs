use super::{MemError, RawMem};

/// Memory that lives only as long as the process.
#[derive(Debug, Clone, Default)]
pub struct Volatile<T> {
    cells: Vec<T>,
}

impl<T> Volatile<T> {
    pub fn new() -> Self {
        Self { cells: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cells: Vec::with_capacity(capacity),
        }
    }
}

impl<T: Copy + Default> RawMem<T> for Volatile<T> {
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
        Ok(())
    }

    fn truncate(&mut self, len: usize) -> Result<(), MemError> {
        self.cells.truncate(len);
        Ok(())
    }
}
