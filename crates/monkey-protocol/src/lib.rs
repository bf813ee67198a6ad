//! # Monkey Protocol
//!
//! Wire messages and the length-prefixed frame codec for the
//! Controller/agent TCP link.
//!
//! A frame is a 4-byte big-endian length followed by that many bytes of
//! JSON. The JSON object carries a `type` discriminator naming the
//! message variant.

mod codec;
mod messages;

pub use codec::{
    decode_message, encode_message, FrameBuffer, ProtocolError, MAX_FRAME_LEN,
};
pub use messages::{AckStatus, Message};
