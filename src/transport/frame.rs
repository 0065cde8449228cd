//! Length-prefixed JSON framing: every frame is `<byte length>#<json>`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::app_system::ErrorEnvelope;

pub const MAX_FRAME_LEN: usize = 4 * 1024 * 1024;
const DELIMITER: u8 = b'#';
/// Longest accepted length header, in digits.
const MAX_HEADER_LEN: usize = 20;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid frame header: {0}")]
    InvalidHeader(String),
    #[error("Frame of {0} bytes exceeds the limit")]
    TooLarge(usize),
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reads one frame. `Ok(None)` means the peer closed the stream cleanly
/// between frames.
pub async fn read_frame<R>(reader: &mut R) -> Result<Option<Value>, FrameError>
where
    R: AsyncBufRead + Unpin,
{
    let mut header = Vec::new();
    let read = (&mut *reader)
        .take(MAX_HEADER_LEN as u64 + 1)
        .read_until(DELIMITER, &mut header)
        .await?;
    if read == 0 {
        return Ok(None);
    }
    if header.pop() != Some(DELIMITER) {
        return Err(FrameError::InvalidHeader("missing length delimiter".to_string()));
    }

    let digits = std::str::from_utf8(&header)
        .map_err(|_| FrameError::InvalidHeader("length is not UTF-8".to_string()))?;
    let len: usize = digits
        .trim()
        .parse()
        .map_err(|_| FrameError::InvalidHeader(format!("bad length {digits:?}")))?;
    if len > MAX_FRAME_LEN {
        return Err(FrameError::TooLarge(len));
    }

    // Grows with the bytes that actually arrive, not the claimed length
    let mut body = Vec::new();
    (&mut *reader).take(len as u64).read_to_end(&mut body).await?;
    if body.len() < len {
        return Err(FrameError::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!("frame ended after {} of {len} bytes", body.len()),
        )));
    }
    Ok(Some(serde_json::from_slice(&body)?))
}

pub async fn write_frame<W, T>(writer: &mut W, message: &T) -> Result<(), FrameError>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let body = serde_json::to_vec(message)?;
    let mut frame = format!("{}#", body.len()).into_bytes();
    frame.extend_from_slice(&body);
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

/// Message pattern; either `{"cmd": "..."}` or the bare command name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Pattern {
    Command { cmd: String },
    Name(String),
}

impl Pattern {
    pub fn command(&self) -> &str {
        match self {
            Self::Command { cmd } => cmd,
            Self::Name(name) => name,
        }
    }
}

/// Request packet. Packets without an `id` are fire-and-forget events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundPacket {
    pub pattern: Pattern,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub id: Option<String>,
}

/// Reply packet, carrying either `response` or `err`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundPacket {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err: Option<ErrorEnvelope>,
    pub is_disposed: bool,
}

impl OutboundPacket {
    pub fn reply(id: String, result: Result<Value, ErrorEnvelope>) -> Self {
        let (response, err) = match result {
            Ok(value) => (Some(value), None),
            Err(envelope) => (None, Some(envelope)),
        };
        Self {
            id,
            response,
            err,
            is_disposed: true,
        }
    }
}
