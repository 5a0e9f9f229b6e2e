//! Wire format:
//!
//! ```text
//! Header:     [N:u32 little-endian]
//! Size table: [S_1:u32] [S_2:u32] ... [S_N:u32]
//! Payload:    [B_1 (S_1 bytes)] [B_2 (S_2 bytes)] ... [B_N (S_N bytes)]
//! ```
//!
//! Total bytes = `4 + 4*N + sum(S_i)`. The empty array encodes as the
//! four bytes `00 00 00 00`.
//!
//! The sector-aligned prepend variant writes opaque metadata before
//! the header and pads the end to a multiple of `sector_size`:
//!
//! ```text
//! [Metadata (M bytes)] [Header] [Size table] [Payload] [Padding (P bytes)]
//! ```

use crate::array::ConstBufferArray;
use crate::buffer::ConstBuffer;
use crate::error::CodecError;

/// Conservative cap for a plain [`serialize`], so its output can
/// always be passed into [`serialize_with_prepend`] at a later stage
/// without overflowing, for any `sector_size` up to 4096.
const MAX_SERIALIZE_SIZE: u64 = u32::MAX as u64 - 4095;

fn write_u32(dest: &mut [u8], value: u32) {
    dest[..4].copy_from_slice(&value.to_le_bytes());
}

fn read_u32(src: &[u8]) -> u32 {
    u32::from_le_bytes(src[..4].try_into().unwrap())
}

/// Computes `(buffer_count, total_serialized_size)` for `array`,
/// failing if the count or the cumulative size would exceed `cap`
/// (which must itself fit in a `u32`).
fn checked_serialized_size(array: &ConstBufferArray, cap: u64) -> Result<(u32, u32), CodecError> {
    let n = u32::try_from(array.len())
        .map_err(|_| CodecError::Overflow(array.len() as u64))?;

    let mut total: u128 = 4 + 4u128 * n as u128;
    for buf in array.iter() {
        total += buf.size() as u128;
    }

    if total > cap as u128 {
        return Err(CodecError::Overflow(total as u64));
    }
    Ok((n, total as u32))
}

/// Writes the header, size table and payload of `array` into
/// `dest[start..]`. `dest` must already be sized to hold exactly that
/// many bytes starting at `start`.
fn write_body(dest: &mut [u8], start: usize, n: u32, array: &ConstBufferArray) {
    write_u32(&mut dest[start..], n);

    let mut size_off = start + 4;
    let mut payload_off = start + 4 + 4 * n as usize;
    for buf in array.iter() {
        let content = buf.content();
        write_u32(&mut dest[size_off..], content.len() as u32);
        dest[payload_off..payload_off + content.len()].copy_from_slice(content);
        size_off += 4;
        payload_off += content.len();
    }
}

/// Produces just the header and size table for `array` — no payload.
pub fn header_of(array: &ConstBufferArray) -> Result<ConstBuffer, CodecError> {
    let n = u32::try_from(array.len())
        .map_err(|_| CodecError::Overflow(array.len() as u64))?;

    let mut out = vec![0u8; 4 + 4 * n as usize];
    write_u32(&mut out, n);
    for (i, buf) in array.iter().enumerate() {
        let size = u32::try_from(buf.size()).map_err(|_| CodecError::Overflow(buf.size() as u64))?;
        write_u32(&mut out[4 + 4 * i..], size);
    }
    Ok(ConstBuffer::from_vec(out))
}

/// Produces the full serialized image of `array`.
pub fn serialize(array: &ConstBufferArray) -> Result<ConstBuffer, CodecError> {
    let (n, total) = checked_serialized_size(array, MAX_SERIALIZE_SIZE)?;
    let mut out = vec![0u8; total as usize];
    write_body(&mut out, 0, n, array);
    Ok(ConstBuffer::from_vec(out))
}

/// Parses `image` back into a buffer array whose elements alias
/// `image`'s own storage — no payload bytes are copied.
pub fn deserialize(image: &ConstBuffer) -> Result<ConstBufferArray, CodecError> {
    let content = image.content();

    if content.len() < 4 {
        return Err(CodecError::MalformedInput(
            "image is shorter than the 4-byte count header".to_string(),
        ));
    }

    let n = read_u32(content);

    if n == 0 {
        return if content.len() == 4 {
            Ok(ConstBufferArray::empty())
        } else {
            Err(CodecError::MalformedInput(format!(
                "empty array must serialize to exactly 4 bytes, image has {}",
                content.len()
            )))
        };
    }

    if n as u64 > (u32::MAX as u64 - 4) / 4 {
        return Err(CodecError::Overflow(n as u64));
    }

    let size_table_bytes = 4 + 4 * n as usize;
    if size_table_bytes > content.len() {
        log::error!(
            "deserialize: image has {} bytes, not enough to hold {} buffer sizes",
            content.len(),
            n
        );
        return Err(CodecError::MalformedInput(format!(
            "image has {} bytes, too short to hold {} buffer sizes",
            content.len(),
            n
        )));
    }

    let mut sizes = Vec::with_capacity(n as usize);
    let mut total: u64 = size_table_bytes as u64;
    for i in 0..n {
        let size = read_u32(&content[4 + 4 * i as usize..]);
        total = total
            .checked_add(size as u64)
            .ok_or(CodecError::Overflow(total))?;
        if total > u32::MAX as u64 {
            return Err(CodecError::Overflow(total));
        }
        sizes.push(size);
    }

    if total != content.len() as u64 {
        return Err(CodecError::MalformedInput(format!(
            "computed total size {total} does not match image size {}",
            content.len()
        )));
    }

    let mut buffers = Vec::with_capacity(n as usize);
    let mut payload_off = size_table_bytes;
    for size in sizes {
        let len = size as usize;
        buffers.push(ConstBuffer::alias(image, payload_off, len));
        payload_off += len;
    }
    Ok(ConstBufferArray::new(buffers))
}

/// Produces a buffer holding `metadata`'s bytes followed by the
/// serialized form of `payload`, padded to a multiple of
/// `sector_size`. Returns the padding length alongside the buffer.
pub fn serialize_with_prepend(
    metadata: &ConstBuffer,
    payload: &ConstBufferArray,
    sector_size: u32,
) -> Result<(ConstBuffer, u32), CodecError> {
    if sector_size == 0 {
        return Err(CodecError::InvalidArgument("sector_size must be non-zero"));
    }

    // The greatest value <= u32::MAX that is always safely reachable
    // by padding up to a sector_size multiple.
    let max_possible = u32::MAX as u64 - (sector_size as u64 - 1);

    let metadata_size = metadata.size() as u64;
    if metadata_size >= u32::MAX as u64 {
        return Err(CodecError::Overflow(metadata_size));
    }
    if metadata_size >= max_possible {
        return Err(CodecError::Overflow(metadata_size));
    }
    let metadata_size = metadata_size as u32;

    let (payload_n, payload_size) = checked_serialized_size(payload, max_possible)?;
    if payload_size as u64 > max_possible - metadata_size as u64 {
        return Err(CodecError::Overflow(payload_size as u64 + metadata_size as u64));
    }

    let useful = metadata_size + payload_size;
    let rem = useful % sector_size;
    let padding = if rem == 0 { 0 } else { sector_size - rem };
    let total = useful as usize + padding as usize;

    let mut out = vec![0u8; total];
    out[..metadata_size as usize].copy_from_slice(metadata.content());
    write_body(&mut out, metadata_size as usize, payload_n, payload);
    // Padding bytes are left at whatever `vec![0u8; total]` produced;
    // the specification permits uninitialized padding, zero satisfies
    // that permission without resorting to unsafe code.

    Ok((ConstBuffer::from_vec(out), padding))
}
