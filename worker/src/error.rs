use shared::{models::chunk::Chunk, networking::error::NetworkingError, protocol::CodecError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Networking error: {0}")]
    Networking(#[from] NetworkingError),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Request for {0} came with a pixel payload")]
    UnexpectedPayload(Chunk),

    #[error("Chunk {chunk} needs {needed} pixel bytes, the buffer holds {capacity}")]
    ChunkTooLarge {
        chunk: Chunk,
        needed: usize,
        capacity: usize,
    },
}

pub type WorkerResult<T> = std::result::Result<T, WorkerError>;
