use shared::{
    models::chunk::Chunk,
    networking::{error::NetworkingError, Rank},
    protocol::CodecError,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoordinatorError {
    #[error("No workers in the group to compute {0} rows")]
    NoWorkers(u32),

    #[error("Networking error: {0}")]
    Networking(#[from] NetworkingError),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Rank {rank} replied with {received} while assigned {expected:?}")]
    UnexpectedReply {
        rank: Rank,
        expected: Option<Chunk>,
        received: Chunk,
    },

    #[error("Rank {rank} replied to {chunk} without pixels")]
    MissingPayload { rank: Rank, chunk: Chunk },

    #[error("Rank {0} sent a terminate message")]
    UnexpectedTerminate(Rank),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type CoordinatorResult<T> = std::result::Result<T, CoordinatorError>;
