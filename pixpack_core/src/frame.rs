use crate::error::{PixpackError, Result};

/// Size of the big-endian length prefix in front of every payload.
pub const LEN_PREFIX_SIZE: usize = 4;

/// Largest payload the 4-byte length field can describe.
pub const MAX_PAYLOAD_LEN: u64 = u32::MAX as u64;

// ── Header ─────────────────────────────────────────────────────────────────

/// Decoded representation of the 4-byte length prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub payload_len: u32,
}

impl FrameHeader {
    /// Build the header describing `payload`, rejecting payloads over 4 GiB.
    pub fn for_payload(payload: &[u8]) -> Result<Self> {
        let len = payload.len() as u64;
        let payload_len = u32::try_from(len).map_err(|_| PixpackError::PayloadTooLarge {
            len,
            max: MAX_PAYLOAD_LEN,
        })?;
        Ok(Self { payload_len })
    }

    /// Serialize to exactly `LEN_PREFIX_SIZE` bytes (big-endian).
    pub fn to_bytes(&self) -> [u8; LEN_PREFIX_SIZE] {
        self.payload_len.to_be_bytes()
    }

    /// Parse the prefix from the start of `buf`.
    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        let prefix: [u8; LEN_PREFIX_SIZE] = buf
            .get(..LEN_PREFIX_SIZE)
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| {
                PixpackError::MalformedFrame(format!(
                    "{} bytes is too short for the {}-byte length prefix",
                    buf.len(),
                    LEN_PREFIX_SIZE
                ))
            })?;
        Ok(Self {
            payload_len: u32::from_be_bytes(prefix),
        })
    }
}

// ── Codec ──────────────────────────────────────────────────────────────────

/// Total size of the framed buffer for a payload of `payload_len` bytes.
#[inline]
pub fn framed_len(payload_len: usize) -> usize {
    LEN_PREFIX_SIZE + payload_len
}

/// Prepend the big-endian payload length.
pub fn frame(payload: &[u8]) -> Result<Vec<u8>> {
    let header = FrameHeader::for_payload(payload)?;
    let mut framed = Vec::with_capacity(framed_len(payload.len()));
    framed.extend_from_slice(&header.to_bytes());
    framed.extend_from_slice(payload);
    Ok(framed)
}

/// Return exactly the payload described by the length prefix.
///
/// Anything after the payload is padding and is ignored; a prefix declaring
/// more bytes than remain is rejected.
pub fn unframe(framed: &[u8]) -> Result<&[u8]> {
    let header = FrameHeader::from_bytes(framed)?;
    let declared = header.payload_len as usize;
    let available = framed.len() - LEN_PREFIX_SIZE;
    if declared > available {
        return Err(PixpackError::MalformedFrame(format!(
            "declared payload of {} bytes but only {} bytes follow the prefix",
            declared, available
        )));
    }
    Ok(&framed[LEN_PREFIX_SIZE..LEN_PREFIX_SIZE + declared])
}
