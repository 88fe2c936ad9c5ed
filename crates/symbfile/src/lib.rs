//! # symbfile - streaming symbolization container
//!
//! A forward-only, append-only binary format for symbolization facts
//! produced by a native-code profiler: address ranges of (inlined)
//! functions with their line tables, and inline stacks at call-return
//! addresses. The layout is tuned for cheap sequential ingestion and for
//! compressing well under a general-purpose outer compressor.
//!
//! ## Stream layout
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │ MAGIC  "symbfile" (8 bytes)                                   │
//! ├───────────────────────────────────────────────────────────────┤
//! │ FRAME  payload_len (varint) | message_type (varint) | payload │
//! │                                                               │
//! │ ... repeated; the first frame is always a Header ...          │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! | Type | Message         | Payload                                   |
//! |------|-----------------|-------------------------------------------|
//! | 0    | Invalid         | reserved, never written                   |
//! | 1    | Header          | empty                                     |
//! | 2    | RangeV1         | one flattened inline-tree node            |
//! | 3    | ReturnPadV1     | columnar inline stack at a return address |
//! | 4    | StringTableV1   | replaces the current string table         |
//!
//! Payloads are protobuf messages (see [`proto`]). Frames of any other
//! type are skipped by length and surfaced as [`Record::Unknown`].
//!
//! ## Cross-record state
//!
//! - **Address cursor**: range and return-pad addresses are absolute or a
//!   signed delta from the previous record's address.
//! - **String table**: `*_ref` fields index the most recent StringTableV1
//!   (zero-based). Each table replaces the previous one wholesale.
//! - **Inline parents**: a range without `call_file` inherits the `file`
//!   of the enclosing range one level shallower.
//!
//! ## Example
//!
//! ```rust
//! use symbfile::{Range, Reader, Record, Writer, WriterConfig};
//!
//! let mut w = Writer::new(Vec::new(), WriterConfig::default());
//! w.write_header().unwrap();
//! w.write_range(&Range::new(0x1000, 0x20, "main")).unwrap();
//! let bytes = w.finish().unwrap();
//!
//! let records: Vec<Record> = Reader::from_reader(bytes.as_slice())
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(records.len(), 2);
//! ```

mod address;
mod error;
mod format;
mod framer;
mod inline;
mod line_table;
pub mod proto;
mod range;
mod reader;
mod record;
mod return_pad;
mod string_table;
mod varint;
mod writer;

pub use address::{AddressField, AddressTracker};
pub use error::{FormatError, SemanticError, SymbfileError};
pub use format::{MessageType, MAGIC};
pub use framer::{Frame, FrameReader, FrameWriter};
pub use line_table::{LineRow, LineTable};
pub use range::Range;
pub use reader::{read_all, Reader};
pub use record::{Header, Record};
pub use return_pad::{InlineFrame, ReturnPad};
pub use string_table::StringTable;
pub use symbfile_config::WriterConfig;
pub use varint::{encode_varint, encoded_len, read_varint, VarintError};
pub use writer::{Writer, WriterStats};

#[cfg(test)]
mod tests;
