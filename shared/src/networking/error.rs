use thiserror::Error;

use crate::protocol::CodecError;

use super::Rank;

#[derive(Error, Debug)]
pub enum NetworkingError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Channel to rank {0} is closed")]
    ChannelClosed(Rank),

    #[error("Rank {rank} is not part of a group of {size}")]
    UnknownRank { rank: Rank, size: usize },

    #[error("Expected a message from rank {expected}, got one from rank {actual}")]
    UnexpectedSource { expected: Rank, actual: Rank },

    #[error("Frame of {len} bytes does not fit a {capacity} byte buffer")]
    FrameTooLarge { len: usize, capacity: usize },

    #[error("Buffer allocation failed, {0} bytes")]
    Allocation(usize),

    #[error("Handshake failed: {0}")]
    Handshake(String),
}
