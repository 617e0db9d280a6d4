use thiserror::Error;

use crate::models::chunk::Chunk;

use super::CapacityClass;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("buffer holds {available} bytes, message needs {needed}")]
    BufferTooSmall { needed: usize, available: usize },

    #[error("{class:?} message of {needed} bytes exceeds its capacity of {capacity}")]
    ExceedsCapacity {
        class: CapacityClass,
        needed: usize,
        capacity: usize,
    },

    #[error("message truncated: {0} bytes is shorter than a work header")]
    Truncated(usize),

    #[error("chunk {chunk} expects {expected} pixel bytes, got {actual}")]
    PayloadLength {
        chunk: Chunk,
        expected: usize,
        actual: usize,
    },

    #[error("negative {field} on the wire: {value}")]
    NegativeField { field: &'static str, value: i32 },

    #[error("row {0} does not fit in a 32-bit wire field")]
    RowOverflow(u32),

    #[error("chunk {chunk} runs past the last row ({total_rows})")]
    OutOfRange { chunk: Chunk, total_rows: u32 },

    #[error("terminate message carries {0} unexpected bytes")]
    UnexpectedBody(usize),

    #[error("unknown message tag {0}")]
    UnknownTag(u8),
}

pub type CodecResult<T> = std::result::Result<T, CodecError>;
