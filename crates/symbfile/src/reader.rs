use std::fs::File;
use std::io::Read;
use std::path::Path;

use prost::Message;

use crate::address::AddressTracker;
use crate::error::{FormatError, SemanticError, SymbfileError};
use crate::format::MessageType;
use crate::framer::{Frame, FrameReader};
use crate::inline::InlineStack;
use crate::proto;
use crate::range::decode_range;
use crate::record::{Header, Record};
use crate::return_pad::decode_return_pad;
use crate::string_table::StringTable;

/// Forward-only decoder for a symbfile stream.
///
/// All cross-record state (the current string table, the address cursor
/// and the open inline ranges) lives in the reader and is scoped to one
/// traversal; independent readers over the same bytes share nothing.
///
/// # Errors and partial consumption
///
/// - Format and I/O errors are fatal: the error is returned once and the
///   reader yields nothing afterwards.
/// - Semantic errors reject a single record. Its frame was consumed in
///   full, so the caller may keep reading or stop and keep what it has.
/// - Unknown message types are not errors; they come back as
///   [`Record::Unknown`].
pub struct Reader<R: Read> {
    frames: FrameReader<R>,
    strings: StringTable,
    addresses: AddressTracker,
    inline: InlineStack,
    seen_header: bool,
    done: bool,
    /// Offset of the frame behind the most recent record or semantic error.
    record_offset: u64,
}

impl Reader<File> {
    /// Opens a symbfile on disk for sequential decoding.
    ///
    /// Returns `SymbfileError::Io` if the file cannot be opened. The magic
    /// is checked on the first call to [`next_record`](Reader::next_record).
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Reader<File>, SymbfileError> {
        let f = File::open(path)?;
        Ok(Reader::from_reader(f))
    }
}

impl<R: Read> Reader<R> {
    /// Constructs a reader from any `Read` implementor.
    pub fn from_reader(reader: R) -> Self {
        Reader {
            frames: FrameReader::new(reader),
            strings: StringTable::new(),
            addresses: AddressTracker::new(),
            inline: InlineStack::new(),
            seen_header: false,
            done: false,
            record_offset: 0,
        }
    }

    /// Bytes consumed so far.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.frames.offset()
    }

    /// Byte offset of the frame that produced the last record returned by
    /// [`next_record`](Reader::next_record), or the last semantic error.
    /// Zero before the first frame.
    #[must_use]
    pub fn record_offset(&self) -> u64 {
        self.record_offset
    }

    /// The string table currently in effect.
    pub fn string_table(&self) -> &StringTable {
        &self.strings
    }

    /// Decodes the next record, or `Ok(None)` at a clean end of stream.
    pub fn next_record(&mut self) -> Result<Option<Record>, SymbfileError> {
        if self.done {
            return Ok(None);
        }

        let frame = match self.frames.read_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                self.done = true;
                return Ok(None);
            }
            Err(e) => {
                self.done = true;
                return Err(e);
            }
        };
        self.record_offset = frame.offset;

        if !self.seen_header {
            if frame.message_type != MessageType::Header.tag() {
                self.done = true;
                return Err(SymbfileError::format(
                    frame.offset,
                    FormatError::MissingHeader {
                        found: frame.message_type,
                    },
                ));
            }
            self.seen_header = true;
        }

        let offset = frame.offset;
        self.decode(frame).map(Some).map_err(|kind| {
            log::warn!("rejecting record at byte {}: {}", offset, kind);
            SymbfileError::semantic(offset, kind)
        })
    }

    fn decode(&mut self, frame: Frame) -> Result<Record, SemanticError> {
        let payload = frame.payload.as_slice();
        let record = match MessageType::from_u32(frame.message_type) {
            Some(MessageType::Header) => {
                proto::Header::decode(payload)?;
                Record::Header(Header {})
            }
            Some(MessageType::RangeV1) => {
                let msg = proto::RangeV1::decode(payload)?;
                Record::Range(decode_range(
                    msg,
                    &mut self.addresses,
                    &self.strings,
                    &mut self.inline,
                )?)
            }
            Some(MessageType::ReturnPadV1) => {
                let msg = proto::ReturnPadV1::decode(payload)?;
                Record::ReturnPad(decode_return_pad(msg, &mut self.addresses, &self.strings)?)
            }
            Some(MessageType::StringTableV1) => {
                let msg = proto::StringTableV1::decode(payload)?;
                log::debug!(
                    "installing string table with {} entries at byte {}",
                    msg.strings.len(),
                    frame.offset
                );
                self.strings.replace(msg.strings.clone());
                Record::StringTable(msg.strings)
            }
            Some(MessageType::Invalid) | None => {
                log::debug!(
                    "passing over unknown message type {} ({} bytes) at byte {}",
                    frame.message_type,
                    frame.payload.len(),
                    frame.offset
                );
                Record::Unknown {
                    message_type: frame.message_type,
                    payload: frame.payload,
                }
            }
        };
        Ok(record)
    }
}

impl<R: Read> Iterator for Reader<R> {
    type Item = Result<Record, SymbfileError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

impl<R: Read> std::iter::FusedIterator for Reader<R> {}

/// Decodes every record of a stream, stopping at the first error.
pub fn read_all<R: Read>(reader: R) -> Result<Vec<Record>, SymbfileError> {
    Reader::from_reader(reader).collect()
}
