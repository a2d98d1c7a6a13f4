use crate::error::{PixpackError, Result};
use crate::frame::MAX_PAYLOAD_LEN;

/// Default upper bound on bytes per part: 32 MiB.
pub const DEFAULT_MAX_CHUNK_SIZE: u64 = 32 * 1024 * 1024;

/// Reject chunk sizes that are zero or would overflow the frame length field.
pub fn validate_chunk_size(max_chunk_size: u64) -> Result<usize> {
    if max_chunk_size == 0 || max_chunk_size > MAX_PAYLOAD_LEN {
        return Err(PixpackError::InvalidChunkSize(max_chunk_size));
    }
    usize::try_from(max_chunk_size).map_err(|_| PixpackError::InvalidChunkSize(max_chunk_size))
}

/// Number of chunks `split` will produce: `ceil(len / max)`, at least 1.
pub fn chunk_count(len: usize, max_chunk_size: u64) -> Result<usize> {
    let max = validate_chunk_size(max_chunk_size)?;
    Ok(len.div_ceil(max).max(1))
}

/// Partition `stream` into consecutive slices of at most `max_chunk_size` bytes.
///
/// An empty stream yields a single empty chunk, so every run produces at
/// least one part.
pub fn split(stream: &[u8], max_chunk_size: u64) -> Result<Vec<&[u8]>> {
    let max = validate_chunk_size(max_chunk_size)?;
    if stream.is_empty() {
        return Ok(vec![stream]);
    }
    Ok(stream.chunks(max).collect())
}

/// Concatenate chunks in the order given. Ordering is the caller's job.
pub fn join<I, C>(chunks: I) -> Vec<u8>
where
    I: IntoIterator<Item = C>,
    C: AsRef<[u8]>,
{
    let mut stream = Vec::new();
    for chunk in chunks {
        stream.extend_from_slice(chunk.as_ref());
    }
    stream
}
