use thiserror::Error;

use super::messages::Message;

/// Upper bound on a frame payload. Anything larger is a protocol error,
/// rejected before the body is awaited.
pub const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("frame of {len} bytes exceeds the {MAX_FRAME_LEN}-byte limit")]
    FrameTooLarge { len: usize },
    #[error("malformed frame payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Serialize a message and prepend its big-endian length.
pub fn encode_message(msg: &Message) -> Result<Vec<u8>, ProtocolError> {
    let payload = serde_json::to_vec(msg)?;
    let len = payload.len() as u32;
    let mut frame = Vec::with_capacity(4 + payload.len());
    frame.extend_from_slice(&len.to_be_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

/// Try to decode one message from the front of `buf`.
///
/// Returns `Ok(None)` while the buffer holds less than a full frame.
/// On success the caller must discard `consumed` bytes from the front
/// of its buffer.
pub fn decode_message(buf: &[u8]) -> Result<Option<(Message, usize)>, ProtocolError> {
    if buf.len() < 4 {
        return Ok(None);
    }

    let len = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;
    if len > MAX_FRAME_LEN {
        return Err(ProtocolError::FrameTooLarge { len });
    }
    if buf.len() < 4 + len {
        return Ok(None);
    }

    let msg: Message = serde_json::from_slice(&buf[4..4 + len])?;
    Ok(Some((msg, 4 + len)))
}

/// Accumulates stream bytes and yields complete messages.
///
/// Both endpoints read into this between socket reads; partial frames
/// stay buffered until the rest arrives.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    pending: Vec<u8>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
    }

    /// Pop the next complete message, if the buffer holds one.
    pub fn next_message(&mut self) -> Result<Option<Message>, ProtocolError> {
        match decode_message(&self.pending)? {
            Some((msg, consumed)) => {
                self.pending.drain(..consumed);
                Ok(Some(msg))
            }
            None => Ok(None),
        }
    }
}
