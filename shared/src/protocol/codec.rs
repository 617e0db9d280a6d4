use std::mem::size_of;

use crate::models::{chunk::Chunk, raster::RasterInfo};
use crate::scheduling::allocator::max_chunk_bytes;

use super::{CodecError, CodecResult, MessageTag, WorkMessage};

/// `start_row` and `row_count`, both big-endian `i32`.
pub const HEADER_LEN: usize = 2 * size_of::<i32>();

/// The two buffer sizes every process allocates up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityClass {
    /// A work request: header only.
    Header,
    /// A work reply: header plus up to a full quota of pixel rows.
    Full,
}

/// Result of encoding: the tag to send alongside and how many bytes of the
/// buffer hold the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Encoded {
    pub tag: MessageTag,
    pub len: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct MessageCodec {
    raster: RasterInfo,
}

impl MessageCodec {
    pub fn new(raster: RasterInfo) -> Self {
        Self { raster }
    }

    pub fn raster(&self) -> RasterInfo {
        self.raster
    }

    pub fn max_encoded_size(&self, class: CapacityClass) -> usize {
        match class {
            CapacityClass::Header => HEADER_LEN,
            CapacityClass::Full => HEADER_LEN + max_chunk_bytes(self.raster.total_cols),
        }
    }

    pub fn encode(&self, message: &WorkMessage<'_>, buffer: &mut [u8]) -> CodecResult<Encoded> {
        let (chunk, pixels) = match message {
            WorkMessage::Terminate => {
                return Ok(Encoded {
                    tag: MessageTag::Terminate,
                    len: 0,
                })
            }
            WorkMessage::Work { chunk, pixels } => (*chunk, *pixels),
        };

        let class = match pixels {
            Some(_) => CapacityClass::Full,
            None => CapacityClass::Header,
        };
        if let Some(pixels) = pixels {
            let expected = self.raster.chunk_len(&chunk);
            if pixels.len() != expected {
                return Err(CodecError::PayloadLength {
                    chunk,
                    expected,
                    actual: pixels.len(),
                });
            }
        }

        let needed = HEADER_LEN + pixels.map_or(0, <[u8]>::len);
        let capacity = self.max_encoded_size(class);
        if needed > capacity {
            return Err(CodecError::ExceedsCapacity {
                class,
                needed,
                capacity,
            });
        }
        if buffer.len() < needed {
            return Err(CodecError::BufferTooSmall {
                needed,
                available: buffer.len(),
            });
        }

        buffer[0..4].copy_from_slice(&to_wire(chunk.start_row)?.to_be_bytes());
        buffer[4..8].copy_from_slice(&to_wire(chunk.row_count)?.to_be_bytes());
        if let Some(pixels) = pixels {
            buffer[HEADER_LEN..needed].copy_from_slice(pixels);
        }

        Ok(Encoded {
            tag: MessageTag::Work,
            len: needed,
        })
    }

    /// Decodes exactly `bytes`, which must be the received length and not
    /// the whole receive buffer.
    pub fn decode<'a>(&self, tag: MessageTag, bytes: &'a [u8]) -> CodecResult<WorkMessage<'a>> {
        if tag == MessageTag::Terminate {
            if !bytes.is_empty() {
                return Err(CodecError::UnexpectedBody(bytes.len()));
            }
            return Ok(WorkMessage::Terminate);
        }

        if bytes.len() < HEADER_LEN {
            return Err(CodecError::Truncated(bytes.len()));
        }
        let start_row = from_wire("start_row", &bytes[0..4])?;
        let row_count = from_wire("row_count", &bytes[4..8])?;
        let chunk = Chunk::new(start_row, row_count);
        if !self.raster.contains(&chunk) {
            return Err(CodecError::OutOfRange {
                chunk,
                total_rows: self.raster.total_rows,
            });
        }

        let body = &bytes[HEADER_LEN..];
        if body.is_empty() {
            return Ok(WorkMessage::request(chunk));
        }
        let expected = self.raster.chunk_len(&chunk);
        if body.len() != expected {
            return Err(CodecError::PayloadLength {
                chunk,
                expected,
                actual: body.len(),
            });
        }

        Ok(WorkMessage::Work {
            chunk,
            pixels: Some(body),
        })
    }
}

fn to_wire(value: u32) -> CodecResult<i32> {
    i32::try_from(value).map_err(|_| CodecError::RowOverflow(value))
}

fn from_wire(field: &'static str, bytes: &[u8]) -> CodecResult<u32> {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(bytes);
    let value = i32::from_be_bytes(raw);
    u32::try_from(value).map_err(|_| CodecError::NegativeField { field, value })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::scheduling::allocator::next_chunk;

    fn codec() -> MessageCodec {
        MessageCodec::new(RasterInfo::new(20, 10))
    }

    fn round_trip(message: WorkMessage<'_>) {
        let codec = codec();
        let mut buffer = vec![0u8; codec.max_encoded_size(CapacityClass::Full)];
        let encoded = codec.encode(&message, &mut buffer).unwrap();
        assert_eq!(encoded.tag, message.tag());
        let decoded = codec.decode(encoded.tag, &buffer[..encoded.len]).unwrap();
        assert_eq!(decoded, message);
    }

    #[test]
    fn capacities_follow_the_quota() {
        let codec = codec();
        assert_eq!(codec.max_encoded_size(CapacityClass::Header), 8);
        assert_eq!(codec.max_encoded_size(CapacityClass::Full), 8 + 80);
    }

    #[test]
    fn request_reply_and_terminate_survive_a_round_trip() {
        round_trip(WorkMessage::request(Chunk::new(8, 8)));
        round_trip(WorkMessage::request(Chunk::terminal(20)));
        let pixels: Vec<u8> = (0..40).collect();
        round_trip(WorkMessage::reply(Chunk::new(16, 4), &pixels));
        round_trip(WorkMessage::Terminate);
    }

    /// Round-trips the request and the reply for every chunk handed out from
    /// `cursor` onwards, the terminal chunk included.
    fn round_trip_allocations(raster: RasterInfo, mut cursor: u32) {
        let codec = MessageCodec::new(raster);
        let mut buffer = vec![0u8; codec.max_encoded_size(CapacityClass::Full)];
        loop {
            let chunk = next_chunk(&mut cursor, raster.total_rows);
            let pixels: Vec<u8> = (0..raster.chunk_len(&chunk)).map(|i| i as u8).collect();
            for message in [WorkMessage::request(chunk), WorkMessage::reply(chunk, &pixels)] {
                let encoded = codec.encode(&message, &mut buffer).unwrap();
                let decoded = codec.decode(encoded.tag, &buffer[..encoded.len]).unwrap();
                assert_eq!(decoded, message, "{chunk} in {raster:?}");
            }
            if chunk.is_terminal() {
                return;
            }
        }
    }

    #[test]
    fn every_allocated_chunk_survives_a_round_trip() {
        round_trip_allocations(RasterInfo::new(20, 10), 0);
        round_trip_allocations(RasterInfo::new(37, 3), 0);
        round_trip_allocations(RasterInfo::new(0, 10), 0);
        round_trip_allocations(RasterInfo::new(20, 0), 0);
        let last_row = i32::MAX as u32;
        round_trip_allocations(RasterInfo::new(last_row, 2), last_row - 21);
    }

    #[test]
    fn rows_beyond_i32_cannot_be_encoded() {
        let codec = MessageCodec::new(RasterInfo::new(u32::MAX, 1));
        let mut buffer = [0u8; HEADER_LEN];
        let start_row = i32::MAX as u32 + 1;
        assert_eq!(
            codec.encode(&WorkMessage::request(Chunk::new(start_row, 1)), &mut buffer),
            Err(CodecError::RowOverflow(start_row))
        );
    }

    proptest! {
        #[test]
        fn allocated_chunks_round_trip_anywhere_in_the_raster(
            total_rows in 0u32..=i32::MAX as u32,
            total_cols in 0u32..48,
            position in 0u64..=1000,
            seed in any::<u8>(),
        ) {
            let raster = RasterInfo::new(total_rows, total_cols);
            let codec = MessageCodec::new(raster);
            let mut cursor = (total_rows as u64 * position / 1000) as u32;
            let chunk = next_chunk(&mut cursor, total_rows);
            let pixels: Vec<u8> = (0..raster.chunk_len(&chunk))
                .map(|i| seed.wrapping_add(i as u8))
                .collect();

            let mut buffer = vec![0u8; codec.max_encoded_size(CapacityClass::Full)];
            for message in [WorkMessage::request(chunk), WorkMessage::reply(chunk, &pixels)] {
                let encoded = codec.encode(&message, &mut buffer).unwrap();
                prop_assert_eq!(codec.decode(encoded.tag, &buffer[..encoded.len]), Ok(message));
            }
        }
    }

    #[test]
    fn request_fits_the_header_buffer() {
        let codec = codec();
        let mut buffer = [0u8; HEADER_LEN];
        let encoded = codec
            .encode(&WorkMessage::request(Chunk::new(0, 8)), &mut buffer)
            .unwrap();
        assert_eq!(encoded.len, HEADER_LEN);
        assert_eq!(buffer, [0, 0, 0, 0, 0, 0, 0, 8]);
    }

    #[test]
    fn reply_does_not_fit_the_header_buffer() {
        let codec = codec();
        let mut buffer = [0u8; HEADER_LEN];
        let pixels = [7u8; 10];
        let err = codec
            .encode(&WorkMessage::reply(Chunk::new(0, 1), &pixels), &mut buffer)
            .unwrap_err();
        assert_eq!(
            err,
            CodecError::BufferTooSmall {
                needed: 18,
                available: 8
            }
        );
    }

    #[test]
    fn decode_ignores_stale_bytes_past_the_received_length() {
        let codec = codec();
        let mut buffer = vec![0xAAu8; codec.max_encoded_size(CapacityClass::Full)];
        let pixels = [1u8; 20];
        codec
            .encode(&WorkMessage::reply(Chunk::new(4, 2), &pixels), &mut buffer)
            .unwrap();
        let encoded = codec
            .encode(&WorkMessage::request(Chunk::new(6, 1)), &mut buffer)
            .unwrap();

        let decoded = codec
            .decode(MessageTag::Work, &buffer[..encoded.len])
            .unwrap();
        assert_eq!(decoded, WorkMessage::request(Chunk::new(6, 1)));
    }

    #[test]
    fn payload_must_match_the_chunk() {
        let codec = codec();
        let mut buffer = vec![0u8; 128];
        let pixels = [0u8; 15];
        let err = codec
            .encode(&WorkMessage::reply(Chunk::new(0, 2), &pixels), &mut buffer)
            .unwrap_err();
        assert!(matches!(err, CodecError::PayloadLength { expected: 20, actual: 15, .. }));
    }

    #[test]
    fn oversized_chunk_exceeds_the_full_class() {
        let codec = codec();
        let mut buffer = vec![0u8; 256];
        let pixels = [0u8; 90];
        let err = codec
            .encode(&WorkMessage::reply(Chunk::new(0, 9), &pixels), &mut buffer)
            .unwrap_err();
        assert!(matches!(err, CodecError::ExceedsCapacity { class: CapacityClass::Full, .. }));
    }

    #[test]
    fn malformed_bodies_are_rejected() {
        let codec = codec();
        assert_eq!(
            codec.decode(MessageTag::Work, &[0, 0, 0]),
            Err(CodecError::Truncated(3))
        );
        assert!(matches!(
            codec.decode(MessageTag::Work, &[0xff, 0xff, 0xff, 0xff, 0, 0, 0, 1]),
            Err(CodecError::NegativeField { field: "start_row", value: -1 })
        ));
        assert!(matches!(
            codec.decode(MessageTag::Work, &[0, 0, 0, 18, 0, 0, 0, 8]),
            Err(CodecError::OutOfRange { .. })
        ));
        assert_eq!(
            codec.decode(MessageTag::Terminate, &[1]),
            Err(CodecError::UnexpectedBody(1))
        );
        assert_eq!(MessageTag::try_from(9), Err(CodecError::UnknownTag(9)));
    }
}
