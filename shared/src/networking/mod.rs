pub mod coordinator;
pub mod error;
pub mod handshake;
pub mod local;
pub mod result;
pub mod tcp;
pub mod worker;

use std::future::Future;

use log::debug;
use serde::{de::DeserializeOwned, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::protocol::MessageTag;

use self::{error::NetworkingError, result::NetworkingResult};

/// Position of a process in the group. The coordinator is always rank 0.
pub type Rank = usize;

pub const COORDINATOR_RANK: Rank = 0;

/// Largest JSON message accepted during the handshake.
pub const MAX_JSON_LEN: usize = 64 * 1024;

/// Who a receive accepts a message from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Any,
    Rank(Rank),
}

/// What arrived: sender, tag and how many bytes of the receive buffer it filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    pub source: Rank,
    pub tag: MessageTag,
    pub len: usize,
}

/// Point-to-point, blocking, tagged message passing within a fixed group.
///
/// A receive copies the body into the caller's buffer and fails if it does
/// not fit; it never grows the buffer.
pub trait Communicator: Send {
    fn rank(&self) -> Rank;

    /// Number of processes in the group, coordinator included.
    fn size(&self) -> usize;

    fn send(
        &mut self,
        dest: Rank,
        tag: MessageTag,
        body: &[u8],
    ) -> impl Future<Output = NetworkingResult<()>> + Send;

    fn recv(
        &mut self,
        source: Source,
        buffer: &mut [u8],
    ) -> impl Future<Output = NetworkingResult<Status>> + Send;
}

/// Allocates a zeroed buffer, reporting failure instead of aborting.
pub fn allocate_buffer(len: usize) -> NetworkingResult<Vec<u8>> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|_| NetworkingError::Allocation(len))?;
    buffer.resize(len, 0);
    Ok(buffer)
}

/// Writes a binary frame: `[tag:u8][len:u32 BE][body]`.
pub async fn write_frame<W>(stream: &mut W, tag: MessageTag, body: &[u8]) -> NetworkingResult<()>
where
    W: AsyncWrite + Unpin,
{
    let mut header = [0u8; 5];
    header[0] = tag.as_u8();
    header[1..].copy_from_slice(&(body.len() as u32).to_be_bytes());

    stream.write_all(&header).await?;
    stream.write_all(body).await?;
    Ok(stream.flush().await?)
}

/// Reads a frame header. `Ok(None)` means the peer closed the connection
/// cleanly between two frames.
pub async fn read_frame_header<R>(stream: &mut R) -> NetworkingResult<Option<(MessageTag, usize)>>
where
    R: AsyncRead + Unpin,
{
    let tag = match stream.read_u8().await {
        Ok(tag) => tag,
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let tag = MessageTag::try_from(tag)?;
    let len = stream.read_u32().await? as usize;
    Ok(Some((tag, len)))
}

/// Writes a length-prefixed JSON message, used for the handshake.
pub async fn write_json_message<W, T>(stream: &mut W, message: &T) -> NetworkingResult<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let message_bytes = serde_json::to_vec(message)?;
    debug!("Sending JSON message of {} bytes", message_bytes.len());

    stream.write_u32(message_bytes.len() as u32).await?;
    stream.write_all(&message_bytes).await?;
    Ok(stream.flush().await?)
}

pub async fn read_json_message<R, T>(stream: &mut R) -> NetworkingResult<T>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    let length = stream.read_u32().await? as usize;
    if length > MAX_JSON_LEN {
        return Err(NetworkingError::FrameTooLarge {
            len: length,
            capacity: MAX_JSON_LEN,
        });
    }
    let mut json_message = vec![0u8; length];
    stream.read_exact(&mut json_message).await?;
    Ok(serde_json::from_slice(&json_message)?)
}
