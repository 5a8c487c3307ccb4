use std::time::Duration;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Length prefix: one big-endian `u32` counting every byte that follows.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Width of the opcode (inbound) or message kind (outbound) word.
pub const OPCODE_SIZE: usize = 4;

/// Default maximum payload size: 16 MiB.
pub const DEFAULT_MAX_PAYLOAD: usize = 16 * 1024 * 1024;

/// Default bounded wait for the next length prefix, close to one 30 Hz tick.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_millis(32);

/// Encode a payload into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────────┬──────────────────────────────┐
/// │ Length (4B)  │ Payload                      │
/// │ big-endian   │ (opcode/kind + body)         │
/// └──────────────┴──────────────────────────────┘
/// ```
pub fn encode_frame(payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.len() > u32::MAX as usize {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: u32::MAX as usize,
        });
    }
    dst.reserve(LENGTH_PREFIX_SIZE + payload.len());
    dst.put_u32(payload.len() as u32);
    dst.put_slice(payload);
    Ok(())
}

/// Decode one complete frame from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// On success, consumes the frame bytes from the buffer. The driver never
/// buffers inbound frames this way; hosts and tests use it to parse what the
/// driver writes.
pub fn decode_frame(src: &mut BytesMut, max_payload: usize) -> Result<Option<Bytes>> {
    if src.len() < LENGTH_PREFIX_SIZE {
        return Ok(None);
    }

    let payload_len = decode_length([src[0], src[1], src[2], src[3]]) as usize;
    if payload_len > max_payload {
        return Err(FrameError::PayloadTooLarge {
            size: payload_len,
            max: max_payload,
        });
    }

    let total = LENGTH_PREFIX_SIZE + payload_len;
    if src.len() < total {
        return Ok(None);
    }

    src.advance(LENGTH_PREFIX_SIZE);
    Ok(Some(src.split_to(payload_len).freeze()))
}

/// Interpret a length prefix, independent of host byte order.
pub fn decode_length(prefix: [u8; LENGTH_PREFIX_SIZE]) -> u32 {
    u32::from_be_bytes(prefix)
}

/// Configuration for the frame codec.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum payload size in bytes. Larger frames are drained unprocessed.
    /// Default: 16 MiB.
    pub max_payload_size: usize,
    /// How long one wait for a length prefix may block. Default: 32 ms.
    pub poll_timeout: Duration,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
        }
    }
}
