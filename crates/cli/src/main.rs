//! # symbdump - inspect and rewrite symbfiles
//!
//! A thin command-line front end over the `symbfile` reader and writer.
//!
//! ## Commands
//!
//! ```text
//! dump <file> [--limit N]      Print one line per record
//! stats <file> [--keep-going]  Count records by kind
//! reencode <in> <out>          Decode and write back with the current writer policy
//! ```
//!
//! ## Configuration
//!
//! `reencode` reads its writer policy from the environment (see
//! `symbfile_config::WriterConfig::from_env`):
//!
//! ```text
//! SYMBFILE_INTERN_THRESHOLD  literal uses before interning   (default: 2, 0 = off)
//! SYMBFILE_TABLE_BATCH       promoted strings per table swap (default: 64)
//! SYMBFILE_TABLE_MAX         max string table entries        (default: 65536)
//! SYMBFILE_DELTA_ADDRESSES   delta-encode addresses          (default: "true")
//! ```
//!
//! Log output goes to stderr and is filtered with `RUST_LOG`.
//!
//! ## Example
//!
//! ```text
//! $ symbdump dump perf.symbfile --limit 3
//!        8  header
//!       10  string_table entries=16
//!      182  range 0x10000..0x10080 depth=0 func=func_0 file=src/file_0.c call=-:0 lines=2
//! ```

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use symbfile::{Reader, Record, Writer, WriterStats};
use symbfile_config::WriterConfig;

#[derive(Parser, Debug)]
#[command(name = "symbdump", version, about = "Inspect and rewrite symbfile streams")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print one line per record
    Dump {
        file: PathBuf,
        /// Stop after this many records
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Count records by kind
    Stats {
        file: PathBuf,
        /// Count invalid records instead of failing on the first one
        #[arg(long)]
        keep_going: bool,
    },
    /// Decode a stream and write it back with the current writer policy
    Reencode { input: PathBuf, output: PathBuf },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match cli.command {
        Command::Dump { file, limit } => {
            let reader = open(&file)?;
            dump(reader, limit, &mut out)?;
        }
        Command::Stats { file, keep_going } => {
            let reader = open(&file)?;
            let counts = count(reader, keep_going)?;
            counts.print(&mut out)?;
        }
        Command::Reencode { input, output } => {
            let config = WriterConfig::from_env();
            info!("reencoding {} -> {} with {:?}", input.display(), output.display(), config);
            let reader = open(&input)?;
            let writer = Writer::create(&output, config)
                .with_context(|| format!("failed to create {}", output.display()))?;
            if !writer.config().interning_enabled() {
                info!("string interning disabled; only forced tables will be written");
            }
            let stats = reencode(reader, writer)?;
            print_writer_stats(&stats, &mut out)?;
        }
    }

    out.flush()?;
    Ok(())
}

fn open(path: &Path) -> Result<Reader<File>> {
    Reader::open(path).with_context(|| format!("failed to open {}", path.display()))
}

/// One-line description of a record.
fn describe(record: &Record) -> String {
    let detail = match record {
        Record::Header(_) => return record.kind().to_string(),
        Record::Range(r) => format!(
            "{:#x}..{:#x} depth={} func={} file={} call={}:{} lines={}",
            r.elf_va,
            r.end(),
            r.depth,
            r.func,
            r.file.as_deref().unwrap_or("-"),
            r.call_file.as_deref().unwrap_or("-"),
            r.call_line,
            r.line_table.len()
        ),
        Record::ReturnPad(p) => {
            let frames: Vec<String> = p
                .frames
                .iter()
                .map(|f| format!("{}@{}:{}", f.func, f.file, f.line))
                .collect();
            format!("{:#x} [{}]", p.elf_va, frames.join(" > "))
        }
        Record::StringTable(s) => format!("entries={}", s.len()),
        Record::Unknown {
            message_type,
            payload,
        } => format!("type={} len={}", message_type, payload.len()),
    };
    format!("{} {}", record.kind(), detail)
}

/// Prints records until EOF or `limit`. Invalid records are reported
/// inline; framing errors end the dump with an error.
fn dump<R: Read, W: Write>(mut reader: Reader<R>, limit: Option<usize>, out: &mut W) -> Result<()> {
    let mut printed = 0usize;
    loop {
        if limit.is_some_and(|l| printed >= l) {
            break;
        }
        match reader.next_record() {
            Ok(Some(record)) => {
                writeln!(out, "{:>8}  {}", reader.record_offset(), describe(&record))?
            }
            Ok(None) => break,
            Err(e) if !e.is_fatal() => writeln!(out, "{:>8}  ! {}", reader.record_offset(), e)?,
            Err(e) => return Err(e).context("stream is corrupt"),
        }
        printed += 1;
    }
    Ok(())
}

/// Per-kind record counts of one stream.
#[derive(Debug, Default, PartialEq, Eq)]
struct Counts {
    headers: u64,
    ranges: u64,
    return_pads: u64,
    string_tables: u64,
    unknown: u64,
    invalid: u64,
    max_depth: u32,
    line_rows: u64,
    bytes: u64,
}

impl Counts {
    fn add(&mut self, record: &Record) {
        match record {
            Record::Header(_) => self.headers += 1,
            Record::Range(r) => {
                self.ranges += 1;
                self.max_depth = self.max_depth.max(r.depth);
                self.line_rows += r.line_table.len() as u64;
            }
            Record::ReturnPad(_) => self.return_pads += 1,
            Record::StringTable(_) => self.string_tables += 1,
            Record::Unknown { .. } => self.unknown += 1,
        }
    }

    fn print<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "headers:       {}", self.headers)?;
        writeln!(out, "ranges:        {}", self.ranges)?;
        writeln!(out, "return_pads:   {}", self.return_pads)?;
        writeln!(out, "string_tables: {}", self.string_tables)?;
        writeln!(out, "unknown:       {}", self.unknown)?;
        writeln!(out, "invalid:       {}", self.invalid)?;
        writeln!(out, "max_depth:     {}", self.max_depth)?;
        writeln!(out, "line_rows:     {}", self.line_rows)?;
        writeln!(out, "bytes:         {}", self.bytes)
    }
}

fn count<R: Read>(mut reader: Reader<R>, keep_going: bool) -> Result<Counts> {
    let mut counts = Counts::default();
    for res in reader.by_ref() {
        match res {
            Ok(record) => counts.add(&record),
            Err(e) if keep_going && !e.is_fatal() => {
                warn!("{}", e);
                counts.invalid += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }
    counts.bytes = reader.offset();
    Ok(counts)
}

/// Copies every record into `writer`. Any invalid record aborts, since
/// dropping it would silently change the meaning of what follows.
fn reencode<R: Read, W: Write>(reader: Reader<R>, mut writer: Writer<W>) -> Result<WriterStats> {
    let mut seen_header = false;
    for res in reader {
        let record = res.context("failed to decode input")?;
        if matches!(record, Record::Header(_)) {
            seen_header = true;
        }
        writer.write_record(&record)?;
    }
    if !seen_header {
        bail!("input has no records");
    }
    let stats = writer.stats();
    writer.finish()?;
    Ok(stats)
}

fn print_writer_stats<W: Write>(stats: &WriterStats, out: &mut W) -> io::Result<()> {
    writeln!(
        out,
        "wrote {} ranges, {} return pads, {} string tables, {} unknown ({} bytes)",
        stats.ranges, stats.return_pads, stats.string_tables, stats.unknown, stats.bytes
    )
}
