//! Messages exchanged between the coordinator and its workers.
//!
//! The message kind travels out of band as a [`MessageTag`], next to the
//! encoded body rather than inside it.

pub mod codec;
pub mod error;

use crate::models::chunk::Chunk;

pub use self::codec::{CapacityClass, Encoded, MessageCodec, HEADER_LEN};
pub use self::error::{CodecError, CodecResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageTag {
    Work = 1,
    Terminate = 2,
}

impl MessageTag {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for MessageTag {
    type Error = CodecError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(MessageTag::Work),
            2 => Ok(MessageTag::Terminate),
            other => Err(CodecError::UnknownTag(other)),
        }
    }
}

/// A decoded message. Pixel payloads borrow from the buffer they were read
/// from or computed into, so nothing is copied on the way through.
///
/// The wire has no way to tell an empty payload from none, so
/// `Work { pixels: Some(&[]) }` decodes as `pixels: None`. Build replies with
/// [`WorkMessage::reply`], which already maps an empty slice to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkMessage<'a> {
    Work {
        chunk: Chunk,
        pixels: Option<&'a [u8]>,
    },
    Terminate,
}

impl<'a> WorkMessage<'a> {
    /// Coordinator to worker: compute these rows.
    pub fn request(chunk: Chunk) -> Self {
        WorkMessage::Work {
            chunk,
            pixels: None,
        }
    }

    /// Worker to coordinator: these are the rows. An empty payload is sent
    /// as no payload, which is what the wire carries for a zero-row chunk.
    pub fn reply(chunk: Chunk, pixels: &'a [u8]) -> Self {
        WorkMessage::Work {
            chunk,
            pixels: (!pixels.is_empty()).then_some(pixels),
        }
    }

    pub fn tag(&self) -> MessageTag {
        match self {
            WorkMessage::Work { .. } => MessageTag::Work,
            WorkMessage::Terminate => MessageTag::Terminate,
        }
    }
}
