//! symbfile binary format constants.
//!
//! ```text
//! [magic: "symbfile" (8 bytes)]
//! [payload_len: varint][message_type: varint][payload: payload_len bytes]
//! ... repeated until EOF ...
//! ```
//!
//! The first frame is always a Header. Frames with a message type this
//! version does not know are skipped by length alone.

/// Preamble identifying a symbfile stream.
pub const MAGIC: [u8; 8] = *b"symbfile";

/// Size of the preamble in bytes.
pub const MAGIC_LEN: u64 = MAGIC.len() as u64;

/// Known frame message types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum MessageType {
    /// Reserved zero value; never written.
    Invalid = 0,
    Header = 1,
    RangeV1 = 2,
    ReturnPadV1 = 3,
    StringTableV1 = 4,
}

impl MessageType {
    /// Maps a wire tag to a known message type.
    ///
    /// `Invalid` is deliberately not returned: a zero tag in a stream is
    /// treated like any other unrecognized tag.
    #[must_use]
    pub fn from_u32(tag: u32) -> Option<Self> {
        match tag {
            1 => Some(MessageType::Header),
            2 => Some(MessageType::RangeV1),
            3 => Some(MessageType::ReturnPadV1),
            4 => Some(MessageType::StringTableV1),
            _ => None,
        }
    }

    /// The wire tag of this message type.
    #[must_use]
    pub fn tag(self) -> u32 {
        self as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_tags_map_back() {
        for ty in [
            MessageType::Header,
            MessageType::RangeV1,
            MessageType::ReturnPadV1,
            MessageType::StringTableV1,
        ] {
            assert_eq!(MessageType::from_u32(ty.tag()), Some(ty));
        }
    }

    #[test]
    fn zero_and_future_tags_are_unknown() {
        assert_eq!(MessageType::from_u32(0), None);
        assert_eq!(MessageType::from_u32(5), None);
        assert_eq!(MessageType::from_u32(99), None);
    }
}
