//! Protobuf-style base-128 varints for the frame length and type tags.
//!
//! 7 payload bits per byte, least-significant group first, high bit set
//! on every byte except the last. A `u32` takes at most 5 bytes.

use std::io::{self, Read};

/// Longest encoding of a `u32`.
pub const MAX_VARINT_LEN: usize = 5;

/// Why a varint could not be read.
#[derive(Debug)]
pub enum VarintError {
    /// The source ended after `consumed` bytes of the varint.
    Eof { consumed: usize },
    /// Continuation past 5 bytes, or a value wider than 32 bits.
    Malformed,
    Io(io::Error),
}

/// Appends the varint encoding of `value` to `buf`.
pub fn encode_varint(mut value: u32, buf: &mut Vec<u8>) {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        buf.push(byte);
        if value == 0 {
            break;
        }
    }
}

/// Number of bytes [`encode_varint`] emits for `value`.
#[must_use]
pub fn encoded_len(value: u32) -> usize {
    match value {
        0..=0x7F => 1,
        0x80..=0x3FFF => 2,
        0x4000..=0x1F_FFFF => 3,
        0x20_0000..=0x0FFF_FFFF => 4,
        _ => 5,
    }
}

/// Reads one varint from `r`, returning the value and the bytes consumed.
pub fn read_varint<R: Read>(r: &mut R) -> Result<(u32, usize), VarintError> {
    let mut result: u32 = 0;
    let mut byte = [0u8; 1];

    for i in 0..MAX_VARINT_LEN {
        match r.read_exact(&mut byte) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                return Err(VarintError::Eof { consumed: i });
            }
            Err(e) => return Err(VarintError::Io(e)),
        }

        let payload = u32::from(byte[0] & 0x7F);
        // the fifth group only has room for the top 4 bits
        if i == MAX_VARINT_LEN - 1 && payload > 0x0F {
            return Err(VarintError::Malformed);
        }
        result |= payload << (7 * i);

        if byte[0] & 0x80 == 0 {
            return Ok((result, i + 1));
        }
    }

    Err(VarintError::Malformed)
}
