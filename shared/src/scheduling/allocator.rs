use crate::models::chunk::Chunk;

/// Maximum number of rows handed out per chunk.
pub const QUOTA: u32 = 8;

/// Takes the next chunk of at most [`QUOTA`] rows starting at `cursor` and advances it.
///
/// Once every row has been handed out the terminal chunk is returned and the
/// cursor stays where it is.
pub fn next_chunk(cursor: &mut u32, total_rows: u32) -> Chunk {
    if *cursor >= total_rows {
        return Chunk::terminal(total_rows);
    }

    let row_count = QUOTA.min(total_rows - *cursor);
    let chunk = Chunk::new(*cursor, row_count);
    *cursor += row_count;
    chunk
}

/// Worst case pixel payload of a single chunk.
pub fn max_chunk_bytes(total_cols: u32) -> usize {
    QUOTA as usize * total_cols as usize
}

/// Owns the cursor for one run over `total_rows`.
#[derive(Debug, Clone)]
pub struct WorkAllocator {
    cursor: u32,
    total_rows: u32,
}

impl WorkAllocator {
    pub fn new(total_rows: u32) -> Self {
        Self {
            cursor: 0,
            total_rows,
        }
    }

    pub fn next_chunk(&mut self) -> Chunk {
        next_chunk(&mut self.cursor, self.total_rows)
    }

    pub fn rows_allocated(&self) -> u32 {
        self.cursor
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.total_rows
    }
}
