use serde::{Deserialize, Serialize};

/// A contiguous range of rows, the unit of work handed to a worker.
///
/// A `row_count` of zero marks an exhausted allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Chunk {
    pub start_row: u32,
    pub row_count: u32,
}

impl Chunk {
    pub fn new(start_row: u32, row_count: u32) -> Self {
        Self {
            start_row,
            row_count,
        }
    }

    pub fn terminal(at: u32) -> Self {
        Self::new(at, 0)
    }

    pub fn is_terminal(&self) -> bool {
        self.row_count == 0
    }

    /// One past the last row, widened so it cannot overflow.
    pub fn end_row(&self) -> u64 {
        self.start_row as u64 + self.row_count as u64
    }

    pub fn rows(&self) -> std::ops::Range<u32> {
        self.start_row..self.start_row + self.row_count
    }
}

impl std::fmt::Display for Chunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.start_row, self.row_count)
    }
}
