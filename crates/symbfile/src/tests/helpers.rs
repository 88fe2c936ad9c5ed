use prost::Message;

use crate::format::MAGIC;
use crate::framer::{Frame, FrameReader};
use crate::varint::encode_varint;
use crate::*;

/// Appends one raw `[len][type][payload]` frame.
pub fn push_frame(buf: &mut Vec<u8>, message_type: u32, payload: &[u8]) {
    encode_varint(payload.len() as u32, buf);
    encode_varint(message_type, buf);
    buf.extend_from_slice(payload);
}

/// Magic followed by the given raw frames.
pub fn raw_stream(frames: &[(u32, Vec<u8>)]) -> Vec<u8> {
    let mut buf = MAGIC.to_vec();
    for (ty, payload) in frames {
        push_frame(&mut buf, *ty, payload);
    }
    buf
}

pub fn header_frame() -> (u32, Vec<u8>) {
    (MessageType::Header.tag(), Vec::new())
}

pub fn msg_frame<M: Message>(ty: MessageType, msg: &M) -> (u32, Vec<u8>) {
    (ty.tag(), msg.encode_to_vec())
}

pub fn string_table_frame(strings: &[&str]) -> (u32, Vec<u8>) {
    msg_frame(
        MessageType::StringTableV1,
        &proto::StringTableV1 {
            strings: strings.iter().map(|s| s.to_string()).collect(),
        },
    )
}

/// A RangeV1 at an absolute address with a literal function name.
pub fn literal_range(elf_va: u64, length: u64, func: &str) -> proto::RangeV1 {
    proto::RangeV1 {
        elf_va: Some(proto::range_v1::ElfVa::SetElfVa(elf_va)),
        length,
        func: Some(proto::range_v1::Func::FuncStr(func.to_string())),
        ..Default::default()
    }
}

/// Decodes every record, panicking on the first error.
pub fn records(bytes: &[u8]) -> Vec<Record> {
    read_all(bytes).expect("stream should decode")
}

/// Decodes until the reader stops, keeping errors in place.
pub fn results(bytes: &[u8]) -> Vec<Result<Record, SymbfileError>> {
    Reader::from_reader(bytes).collect()
}

/// All raw frames of a stream.
pub fn frames(bytes: &[u8]) -> Vec<Frame> {
    let mut r = FrameReader::new(bytes);
    let mut out = Vec::new();
    while let Some(f) = r.read_frame().expect("framing should be valid") {
        out.push(f);
    }
    out
}

pub fn range_payloads(bytes: &[u8]) -> Vec<proto::RangeV1> {
    frames(bytes)
        .into_iter()
        .filter(|f| f.message_type == MessageType::RangeV1.tag())
        .map(|f| proto::RangeV1::decode(f.payload.as_slice()).unwrap())
        .collect()
}

pub fn encode_all(records: &[Record], config: WriterConfig) -> Vec<u8> {
    let mut w = Writer::new(Vec::new(), config);
    for r in records {
        w.write_record(r).unwrap();
    }
    w.finish().unwrap()
}

/// A realistic mix of inline trees and return pads with repeating names.
///
/// Children carry `call_file` equal to their parent's `file`, so the
/// decoded records compare equal to these.
pub fn sample_records(functions: usize) -> Vec<Record> {
    let mut out = vec![Record::Header(Header {})];
    for i in 0..functions {
        let base = 0x10_000 + (i as u64) * 0x100;
        let file = format!("src/file_{}.c", i % 3);

        out.push(Record::Range(Range {
            elf_va: base,
            length: 0x80,
            func: format!("func_{}", i % 7),
            file: Some(file.clone()),
            call_line: 0,
            call_file: None,
            depth: 0,
            line_table: LineTable::from_pairs([(0, 10 + i as u32), (0x30, 12 + i as u32)]),
        }));
        out.push(Record::Range(Range {
            elf_va: base + 0x10,
            length: 0x20,
            func: format!("inline_{}", i % 5),
            file: Some("util.h".to_string()),
            call_line: 11 + i as u32,
            call_file: Some(file.clone()),
            depth: 1,
            line_table: LineTable::from_pairs([(0x4, 3)]),
        }));
        out.push(Record::Range(Range {
            elf_va: base + 0x14,
            length: 0x8,
            func: "deep".to_string(),
            file: Some("deep.h".to_string()),
            call_line: 4,
            call_file: Some(if i % 4 == 0 { "other.h" } else { "util.h" }.to_string()),
            depth: 2,
            line_table: LineTable::default(),
        }));

        if i % 3 == 0 {
            out.push(Record::ReturnPad(ReturnPad::new(
                base + 0x41,
                vec![
                    InlineFrame::new(format!("func_{}", i % 7), file.clone(), 14),
                    InlineFrame::new(format!("inline_{}", i % 5), "util.h", 7),
                ],
            )));
        }
    }
    out
}

/// Every function and file name [`sample_records`] uses in return pads.
pub fn sample_pad_strings() -> Vec<String> {
    let mut v: Vec<String> = (0..7).map(|i| format!("func_{}", i)).collect();
    v.extend((0..3).map(|i| format!("src/file_{}.c", i)));
    v.extend((0..5).map(|i| format!("inline_{}", i)));
    v.push("util.h".to_string());
    v
}
