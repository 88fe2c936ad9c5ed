use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use prost::Message;
use symbfile_config::WriterConfig;

use crate::address::AddressTracker;
use crate::error::SymbfileError;
use crate::format::MessageType;
use crate::framer::FrameWriter;
use crate::inline::InlineStack;
use crate::proto;
use crate::range::{encode_range, literals, Range};
use crate::record::Record;
use crate::return_pad::{encode_return_pad, ReturnPad};
use crate::string_table::Interner;

/// Counters kept by a [`Writer`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriterStats {
    pub ranges: u64,
    pub return_pads: u64,
    pub string_tables: u64,
    pub unknown: u64,
    pub bytes: u64,
}

/// Append-only symbfile encoder.
///
/// Mirrors the reader's traversal state so it can pick the compact wire
/// form for every field: delta addresses after the first absolute one,
/// string-table references for interned strings, and an omitted
/// `call_file` where the reader would inherit the same value.
///
/// Call [`write_header`](Writer::write_header) first, then any mix of
/// records, then [`finish`](Writer::finish).
///
/// The mirrored state only advances once a frame has been handed to the
/// sink. A rejected record (`InvalidInput`, `PayloadTooLarge`) leaves the
/// writer as it was, so the caller may skip it and carry on.
pub struct Writer<W: Write> {
    frames: FrameWriter<BufWriter<W>>,
    config: WriterConfig,
    interner: Interner,
    addresses: AddressTracker,
    inline: InlineStack,
    header_written: bool,
    stats: WriterStats,
    /// Reusable payload buffer.
    buf: Vec<u8>,
}

impl Writer<File> {
    /// Creates (or truncates) a symbfile at `path`.
    pub fn create<P: AsRef<Path>>(path: P, config: WriterConfig) -> Result<Self, SymbfileError> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        Ok(Writer::new(file, config))
    }
}

impl<W: Write> Writer<W> {
    pub fn new(sink: W, config: WriterConfig) -> Self {
        let config = config.normalized();
        Writer {
            frames: FrameWriter::new(BufWriter::new(sink)),
            // literal counts cover at most four tables' worth of strings
            interner: Interner::new(
                config.intern_threshold,
                config.max_string_table_len.saturating_mul(4),
            ),
            config,
            addresses: AddressTracker::new(),
            inline: InlineStack::new(),
            header_written: false,
            stats: WriterStats::default(),
            buf: Vec::with_capacity(256),
        }
    }

    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    /// The string table a reader will have installed at this point.
    pub fn string_table(&self) -> &[String] {
        self.interner.table()
    }

    pub fn stats(&self) -> WriterStats {
        WriterStats {
            bytes: self.frames.bytes_written(),
            ..self.stats.clone()
        }
    }

    /// Writes the magic preamble and the Header record. Must be the first
    /// call, exactly once.
    pub fn write_header(&mut self) -> Result<(), SymbfileError> {
        if self.header_written {
            return Err(SymbfileError::HeaderOrder);
        }
        self.frames.write_magic()?;
        self.emit(MessageType::Header.tag(), &proto::Header {})?;
        self.header_written = true;
        Ok(())
    }

    /// Replaces the string table with `strings`, verbatim.
    ///
    /// Strings scheduled for automatic interning that are not part of
    /// `strings` are dropped from the schedule.
    pub fn write_string_table<S: AsRef<str>>(&mut self, strings: &[S]) -> Result<(), SymbfileError> {
        self.ensure_header()?;
        let strings: Vec<String> = strings.iter().map(|s| s.as_ref().to_string()).collect();
        self.emit_string_table(strings)
    }

    /// Writes one range record.
    pub fn write_range(&mut self, range: &Range) -> Result<(), SymbfileError> {
        self.ensure_header()?;
        self.flush_pending_strings()?;

        let mut addresses = self.addresses;
        let msg = encode_range(
            range,
            &mut addresses,
            &self.interner,
            &self.inline,
            self.config.delta_addresses,
        )
        .map_err(SymbfileError::InvalidInput)?;
        self.emit(MessageType::RangeV1.tag(), &msg)?;

        self.addresses = addresses;
        self.inline
            .push(range.elf_va, range.length, range.depth, range.file.clone());
        for s in literals(&msg) {
            self.interner.note_literal(s);
        }
        self.stats.ranges += 1;
        Ok(())
    }

    /// Writes one return-pad record, first updating the string table if
    /// any of its function or file names is not referenceable yet.
    ///
    /// A table update triggered here always carries every name the pad
    /// uses, so a restart over the size limit cannot evict them.
    pub fn write_return_pad(&mut self, pad: &ReturnPad) -> Result<(), SymbfileError> {
        self.ensure_header()?;

        let required = pad.strings();
        let missing = required.iter().any(|s| self.interner.get(s).is_none());
        if missing || self.pending_full() {
            let next = self
                .interner
                .next_table(&required, self.config.max_string_table_len);
            self.emit_string_table(next)?;
        }

        let mut addresses = self.addresses;
        let msg = encode_return_pad(
            pad,
            &mut addresses,
            &self.interner,
            self.config.delta_addresses,
        )
        .map_err(SymbfileError::InvalidInput)?;
        self.emit(MessageType::ReturnPadV1.tag(), &msg)?;

        self.addresses = addresses;
        self.stats.return_pads += 1;
        Ok(())
    }

    /// Passes a frame of arbitrary type through verbatim.
    pub fn write_unknown(&mut self, message_type: u32, payload: &[u8]) -> Result<(), SymbfileError> {
        self.ensure_header()?;
        if message_type == MessageType::Invalid.tag() {
            return Err(SymbfileError::InvalidInput(
                "message type 0 is reserved and never written".to_string(),
            ));
        }
        if MessageType::from_u32(message_type).is_some() {
            return Err(SymbfileError::InvalidInput(format!(
                "message type {} is a known type and cannot be written raw",
                message_type
            )));
        }
        self.frames.write_frame(message_type, payload)?;
        self.stats.unknown += 1;
        Ok(())
    }

    /// Writes any decoded record. Feeding a reader's output through this
    /// re-encodes a stream.
    pub fn write_record(&mut self, record: &Record) -> Result<(), SymbfileError> {
        log::trace!(
            "writing {} record (type {})",
            record.kind(),
            record.message_type()
        );
        match record {
            Record::Header(_) => self.write_header(),
            Record::Range(r) => self.write_range(r),
            Record::ReturnPad(p) => self.write_return_pad(p),
            Record::StringTable(s) => self.write_string_table(s.as_slice()),
            Record::Unknown {
                message_type,
                payload,
            } => self.write_unknown(*message_type, payload),
        }
    }

    /// Flushes buffered output and returns the sink.
    ///
    /// There is no trailer in this version of the format; a stream is
    /// complete at any frame boundary.
    pub fn finish(mut self) -> Result<W, SymbfileError> {
        self.frames.flush()?;
        let stats = self.stats();
        log::debug!(
            "symbfile finished: {} ranges, {} return pads, {} string tables, {} unknown, {} bytes",
            stats.ranges,
            stats.return_pads,
            stats.string_tables,
            stats.unknown,
            stats.bytes
        );
        self.frames
            .into_inner()
            .into_inner()
            .map_err(|e| SymbfileError::Io(e.into_error()))
    }

    fn ensure_header(&self) -> Result<(), SymbfileError> {
        if self.header_written {
            Ok(())
        } else {
            Err(SymbfileError::HeaderOrder)
        }
    }

    fn pending_full(&self) -> bool {
        self.config.interning_enabled()
            && self.interner.pending_len() >= self.config.string_table_batch
    }

    /// Emits a table update once enough promoted strings are waiting.
    fn flush_pending_strings(&mut self) -> Result<(), SymbfileError> {
        if !self.pending_full() {
            return Ok(());
        }
        let next = self
            .interner
            .next_table(&[], self.config.max_string_table_len);
        self.emit_string_table(next)
    }

    fn emit_string_table(&mut self, strings: Vec<String>) -> Result<(), SymbfileError> {
        log::debug!("emitting string table with {} entries", strings.len());
        let msg = proto::StringTableV1 { strings };
        self.emit(MessageType::StringTableV1.tag(), &msg)?;
        self.interner.install(&msg.strings);
        self.stats.string_tables += 1;
        Ok(())
    }

    fn emit<M: Message>(&mut self, message_type: u32, msg: &M) -> Result<(), SymbfileError> {
        self.buf.clear();
        msg.encode(&mut self.buf)
            .map_err(|e| SymbfileError::InvalidInput(e.to_string()))?;
        self.frames.write_frame(message_type, &self.buf)
    }
}
