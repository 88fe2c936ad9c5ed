//! Frame-level I/O: the magic preamble and `(length, type, payload)` triples.
//!
//! The framer never looks inside a payload. Known and unknown message
//! types come out of [`FrameReader::read_frame`] the same way; deciding
//! what to do with them is the [`Reader`](crate::Reader)'s job.

use std::io::{self, BufReader, Read, Write};

use crate::error::{FormatError, SymbfileError};
use crate::format::{MAGIC, MAGIC_LEN};
use crate::varint::{encode_varint, read_varint, VarintError, MAX_VARINT_LEN};

/// One raw frame as read from the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Byte offset of the frame's length varint.
    pub offset: u64,
    pub message_type: u32,
    pub payload: Vec<u8>,
}

/// Sequential frame reader.
///
/// Generic over any `Read` implementor, so it works on files as well as
/// in-memory buffers. The preamble is checked lazily on the first call to
/// [`read_frame`](FrameReader::read_frame).
pub struct FrameReader<R: Read> {
    rdr: BufReader<R>,
    /// Bytes consumed so far.
    offset: u64,
    magic_checked: bool,
}

impl<R: Read> FrameReader<R> {
    pub fn new(reader: R) -> Self {
        FrameReader {
            rdr: BufReader::new(reader),
            offset: 0,
            magic_checked: false,
        }
    }

    /// Bytes consumed from the underlying reader.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    fn check_magic(&mut self) -> Result<(), SymbfileError> {
        let mut magic = Vec::with_capacity(MAGIC.len());
        (&mut self.rdr).take(MAGIC_LEN).read_to_end(&mut magic)?;
        if magic != MAGIC {
            return Err(SymbfileError::format(0, FormatError::BadMagic));
        }
        self.offset = MAGIC_LEN;
        self.magic_checked = true;
        Ok(())
    }

    /// Reads the next frame.
    ///
    /// # Termination
    ///
    /// - **EOF exactly at a frame boundary** -> `Ok(None)`.
    /// - **EOF inside a varint or payload** -> `FormatError::TruncatedRecord`.
    /// - **Varint longer than 5 bytes** -> `FormatError::MalformedVarint`.
    pub fn read_frame(&mut self) -> Result<Option<Frame>, SymbfileError> {
        if !self.magic_checked {
            self.check_magic()?;
        }

        let start = self.offset;

        let len = match read_varint(&mut self.rdr) {
            Ok((v, n)) => {
                self.offset += n as u64;
                v
            }
            Err(VarintError::Eof { consumed: 0 }) => return Ok(None),
            Err(e) => return Err(self.varint_error(e)),
        };

        let message_type = match read_varint(&mut self.rdr) {
            Ok((v, n)) => {
                self.offset += n as u64;
                v
            }
            Err(e) => return Err(self.varint_error(e)),
        };

        // read_to_end grows the buffer as bytes arrive, so a corrupt length
        // never triggers a huge up-front allocation
        let mut payload = Vec::new();
        let got = (&mut self.rdr)
            .take(u64::from(len))
            .read_to_end(&mut payload)?;
        self.offset += got as u64;
        if got < len as usize {
            return Err(SymbfileError::format(
                self.offset,
                FormatError::TruncatedRecord,
            ));
        }

        log::trace!(
            "frame at {}: type={} len={}",
            start,
            message_type,
            payload.len()
        );

        Ok(Some(Frame {
            offset: start,
            message_type,
            payload,
        }))
    }

    fn varint_error(&mut self, e: VarintError) -> SymbfileError {
        match e {
            VarintError::Eof { consumed } => {
                self.offset += consumed as u64;
                SymbfileError::format(self.offset, FormatError::TruncatedRecord)
            }
            VarintError::Malformed => {
                SymbfileError::format(self.offset, FormatError::MalformedVarint)
            }
            VarintError::Io(e) => SymbfileError::Io(e),
        }
    }
}

/// Append-only frame writer.
///
/// Each frame is assembled in a reusable scratch buffer and handed to the
/// sink in a single `write_all` call.
pub struct FrameWriter<W: Write> {
    out: W,
    bytes_written: u64,
    /// Reusable scratch buffer to avoid allocation on every frame.
    buf: Vec<u8>,
}

impl<W: Write> FrameWriter<W> {
    pub fn new(out: W) -> Self {
        FrameWriter {
            out,
            bytes_written: 0,
            buf: Vec::with_capacity(256),
        }
    }

    /// Total bytes handed to the sink, preamble included.
    #[must_use]
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn write_magic(&mut self) -> Result<(), SymbfileError> {
        self.out.write_all(&MAGIC)?;
        self.bytes_written += MAGIC_LEN;
        Ok(())
    }

    /// Writes `[len: varint][message_type: varint][payload]`.
    pub fn write_frame(&mut self, message_type: u32, payload: &[u8]) -> Result<(), SymbfileError> {
        let len = check_payload_len(payload.len())
            .map_err(|kind| SymbfileError::format(self.bytes_written, kind))?;

        self.buf.clear();
        encode_varint(len, &mut self.buf);
        encode_varint(message_type, &mut self.buf);
        debug_assert!(self.buf.len() <= 2 * MAX_VARINT_LEN);
        self.buf.extend_from_slice(payload);

        self.out.write_all(&self.buf)?;
        self.bytes_written += self.buf.len() as u64;
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Checks that a payload length fits the `u32` length prefix.
pub(crate) fn check_payload_len(len: usize) -> Result<u32, FormatError> {
    u32::try_from(len).map_err(|_| FormatError::PayloadTooLarge(len))
}
