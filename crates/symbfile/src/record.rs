//! Decoded stream records.

use crate::format::MessageType;
use crate::range::Range;
use crate::return_pad::ReturnPad;

/// Stream header. Carries no data in this version of the format.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {}

/// One decoded frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Header(Header),
    Range(Range),
    ReturnPad(ReturnPad),
    /// A string-table swap. The reader has already installed it by the time
    /// the caller sees this record.
    StringTable(Vec<String>),
    /// A frame of a message type this version does not know. The payload is
    /// kept verbatim and never interpreted.
    Unknown { message_type: u32, payload: Vec<u8> },
}

impl Record {
    /// Wire tag of this record.
    #[must_use]
    pub fn message_type(&self) -> u32 {
        match self {
            Record::Header(_) => MessageType::Header.tag(),
            Record::Range(_) => MessageType::RangeV1.tag(),
            Record::ReturnPad(_) => MessageType::ReturnPadV1.tag(),
            Record::StringTable(_) => MessageType::StringTableV1.tag(),
            Record::Unknown { message_type, .. } => *message_type,
        }
    }

    /// Short human-readable kind, used in logs and by `symbdump`.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Record::Header(_) => "header",
            Record::Range(_) => "range",
            Record::ReturnPad(_) => "return_pad",
            Record::StringTable(_) => "string_table",
            Record::Unknown { .. } => "unknown",
        }
    }
}
