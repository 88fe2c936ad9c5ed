//! Error taxonomy for reading and writing symbfiles.

use std::io;

use thiserror::Error;

/// Framing-level corruption. Always fatal to the stream: once the framer
/// has lost its position no further frame boundary can be trusted.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The stream does not start with the 8-byte `symbfile` preamble.
    #[error("bad magic (expected \"symbfile\")")]
    BadMagic,

    /// A length or type varint runs past 5 bytes or exceeds `u32::MAX`.
    #[error("malformed varint")]
    MalformedVarint,

    /// The stream ends inside a frame.
    #[error("truncated record")]
    TruncatedRecord,

    /// A payload does not fit the `u32` length prefix.
    #[error("payload of {0} bytes exceeds u32::MAX")]
    PayloadTooLarge(usize),

    /// The first frame after the preamble is not a Header.
    #[error("first record must be a header, found message type {found}")]
    MissingHeader { found: u32 },
}

/// A single record could not be decoded. The frame itself was consumed in
/// full, so the stream position is still valid.
#[derive(Debug, Error)]
pub enum SemanticError {
    #[error("string index {index} out of range (table has {len} entries)")]
    StringIndexOutOfRange { index: u32, len: usize },

    #[error("line table has {offsets} offsets but {lines} line numbers")]
    LineTableLengthMismatch { offsets: usize, lines: usize },

    #[error("return pad columns differ in length (func={func}, file={file}, line={line})")]
    ColumnLengthMismatch {
        func: usize,
        file: usize,
        line: usize,
    },

    #[error("address delta {delta} underflows base {base:#x}")]
    AddressUnderflow { base: u64, delta: i64 },

    #[error("address delta {delta} overflows base {base:#x}")]
    AddressOverflow { base: u64, delta: i64 },

    /// A delta address appeared before any absolute address.
    #[error("delta address with no preceding absolute address")]
    DeltaWithoutBase,

    #[error("line table offsets overflow u32")]
    LineTableOverflow,

    #[error("required field `{0}` is not set")]
    MissingField(&'static str),

    #[error("payload decode failed: {0}")]
    Payload(#[from] prost::DecodeError),
}

/// Errors surfaced by [`Reader`](crate::Reader) and [`Writer`](crate::Writer).
#[derive(Debug, Error)]
pub enum SymbfileError {
    /// An underlying I/O error.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("format error at byte {offset}: {kind}")]
    Format { offset: u64, kind: FormatError },

    #[error("invalid record at byte {offset}: {kind}")]
    Semantic { offset: u64, kind: SemanticError },

    /// The header was written twice, or a record was written before it.
    #[error("header must be written exactly once, before any other record")]
    HeaderOrder,

    /// The writer was handed data it cannot encode.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl SymbfileError {
    pub(crate) fn format(offset: u64, kind: FormatError) -> Self {
        SymbfileError::Format { offset, kind }
    }

    pub(crate) fn semantic(offset: u64, kind: SemanticError) -> Self {
        SymbfileError::Semantic { offset, kind }
    }

    /// Returns `true` for errors after which the stream cannot continue.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(self, SymbfileError::Semantic { .. })
    }

    /// Byte offset the error refers to, if any.
    #[must_use]
    pub fn offset(&self) -> Option<u64> {
        match self {
            SymbfileError::Format { offset, .. } | SymbfileError::Semantic { offset, .. } => {
                Some(*offset)
            }
            _ => None,
        }
    }
}
