//! Big-endian length-prefixed framing for the vgport host protocol.
//!
//! Every message in either direction is framed as:
//! - a 4-byte big-endian length of everything that follows
//! - a 4-byte big-endian opcode (inbound) or message kind (outbound)
//! - the opcode-specific payload
//!
//! Inbound frames are never buffered whole. The dispatcher consumes each one
//! in place through a [`FrameBody`], whose [`FrameBody::read_bounded`] is the
//! single choke point that keeps a handler from reading past its frame.

pub mod body;
pub mod codec;
pub mod error;
pub mod message;
pub mod opcode;
pub mod reader;
pub mod writer;

pub use body::FrameBody;
pub use codec::{
    decode_frame, encode_frame, FrameConfig, DEFAULT_MAX_PAYLOAD, DEFAULT_POLL_TIMEOUT,
    LENGTH_PREFIX_SIZE,
};
pub use error::{FrameError, Result};
pub use message::{split_kind, Outbound, StatsReport};
pub use reader::FrameReader;
pub use writer::FrameWriter;
