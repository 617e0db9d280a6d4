use serde::{Deserialize, Serialize};

use super::chunk::Chunk;

/// Dimensions of the image being computed. Fixed for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RasterInfo {
    pub total_rows: u32,
    pub total_cols: u32,
}

impl RasterInfo {
    pub fn new(total_rows: u32, total_cols: u32) -> Self {
        Self {
            total_rows,
            total_cols,
        }
    }

    /// Number of pixel bytes covering `chunk`.
    pub fn chunk_len(&self, chunk: &Chunk) -> usize {
        chunk.row_count as usize * self.total_cols as usize
    }

    pub fn contains(&self, chunk: &Chunk) -> bool {
        chunk.end_row() <= self.total_rows as u64
    }
}
