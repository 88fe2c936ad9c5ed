//! ReturnPadV1: the inline stack at a call-return address.
//!
//! On the wire the stack is stored column-wise (`func[]`, `file[]`,
//! `line[]`), with function and file always given as string-table
//! references. Decoded, it is a list of frames, outermost first.

use crate::address::AddressTracker;
use crate::error::SemanticError;
use crate::proto;
use crate::string_table::{Interner, StringTable};

/// One inline level of a return pad.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineFrame {
    pub func: String,
    pub file: String,
    /// Call line for every frame but the last; for the last frame, the
    /// line of the return-pad address itself.
    pub line: u32,
}

impl InlineFrame {
    pub fn new(func: impl Into<String>, file: impl Into<String>, line: u32) -> Self {
        Self {
            func: func.into(),
            file: file.into(),
            line,
        }
    }
}

/// Symbol information for a non-leaf stack frame address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnPad {
    pub elf_va: u64,
    /// Ordered by ascending inline depth (index 0 = outermost). The order
    /// is taken from the producer as-is.
    pub frames: Vec<InlineFrame>,
}

impl ReturnPad {
    pub fn new(elf_va: u64, frames: Vec<InlineFrame>) -> Self {
        Self { elf_va, frames }
    }

    /// Line at the return-pad address (the innermost frame's line).
    #[must_use]
    pub fn leaf_line(&self) -> Option<u32> {
        self.frames.last().map(|f| f.line)
    }

    /// Call-site lines of the enclosing frames, outermost first.
    pub fn call_lines(&self) -> impl Iterator<Item = u32> + '_ {
        let n = self.frames.len().saturating_sub(1);
        self.frames[..n].iter().map(|f| f.line)
    }

    /// Function and file names this record needs in the string table,
    /// deduplicated, in first-use order.
    pub(crate) fn strings(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for f in &self.frames {
            for s in [&f.func, &f.file] {
                if !out.iter().any(|o| o == s) {
                    out.push(s.clone());
                }
            }
        }
        out
    }
}

/// Decodes a ReturnPadV1 payload against the current traversal state.
pub(crate) fn decode_return_pad(
    msg: proto::ReturnPadV1,
    addresses: &mut AddressTracker,
    strings: &StringTable,
) -> Result<ReturnPad, SemanticError> {
    let elf_va = addresses.resolve(
        msg.elf_va
            .ok_or(SemanticError::MissingField("elf_va"))?
            .into(),
    )?;

    if msg.func.len() != msg.file.len() || msg.func.len() != msg.line.len() {
        return Err(SemanticError::ColumnLengthMismatch {
            func: msg.func.len(),
            file: msg.file.len(),
            line: msg.line.len(),
        });
    }

    let mut frames = Vec::with_capacity(msg.func.len());
    for ((func, file), line) in msg.func.iter().zip(&msg.file).zip(&msg.line) {
        frames.push(InlineFrame {
            func: strings.lookup(*func)?.to_string(),
            file: strings.lookup(*file)?.to_string(),
            line: *line,
        });
    }

    Ok(ReturnPad { elf_va, frames })
}

/// Encodes `pad`. Every function and file name must already be present in
/// the interner's table; the writer guarantees this by emitting a table
/// update first.
pub(crate) fn encode_return_pad(
    pad: &ReturnPad,
    addresses: &mut AddressTracker,
    interner: &Interner,
    allow_delta: bool,
) -> Result<proto::ReturnPadV1, String> {
    let mut func = Vec::with_capacity(pad.frames.len());
    let mut file = Vec::with_capacity(pad.frames.len());
    let mut line = Vec::with_capacity(pad.frames.len());

    for f in &pad.frames {
        let fi = interner
            .get(&f.func)
            .ok_or_else(|| format!("function {:?} is not in the string table", f.func))?;
        let fl = interner
            .get(&f.file)
            .ok_or_else(|| format!("file {:?} is not in the string table", f.file))?;
        func.push(fi);
        file.push(fl);
        line.push(f.line);
    }

    let elf_va = addresses.encode(pad.elf_va, allow_delta);

    Ok(proto::ReturnPadV1 {
        elf_va: Some(elf_va.into()),
        func,
        file,
        line,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::AddressField;

    fn table(v: &[&str]) -> StringTable {
        let mut t = StringTable::new();
        t.replace(v.iter().map(|s| s.to_string()).collect());
        t
    }

    #[test]
    fn decode_columns_into_frames() {
        let strings = table(&["main", "main.c", "helper", "util.h"]);
        let mut addrs = AddressTracker::new();
        let pad = decode_return_pad(
            proto::ReturnPadV1 {
                elf_va: Some(proto::return_pad_v1::ElfVa::SetElfVa(0x2000)),
                func: vec![0, 2],
                file: vec![1, 3],
                line: vec![12, 40],
            },
            &mut addrs,
            &strings,
        )
        .unwrap();

        assert_eq!(pad.elf_va, 0x2000);
        assert_eq!(
            pad.frames,
            vec![
                InlineFrame::new("main", "main.c", 12),
                InlineFrame::new("helper", "util.h", 40),
            ]
        );
        assert_eq!(pad.leaf_line(), Some(40));
        assert_eq!(pad.call_lines().collect::<Vec<_>>(), vec![12]);
        assert_eq!(addrs.cursor(), Some(0x2000));
    }

    #[test]
    fn column_length_mismatch() {
        let strings = table(&["f", "a.c"]);
        let err = decode_return_pad(
            proto::ReturnPadV1 {
                elf_va: Some(proto::return_pad_v1::ElfVa::SetElfVa(1)),
                func: vec![0, 0],
                file: vec![1],
                line: vec![1, 2],
            },
            &mut AddressTracker::new(),
            &strings,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SemanticError::ColumnLengthMismatch {
                func: 2,
                file: 1,
                line: 2
            }
        ));
    }

    #[test]
    fn dangling_reference() {
        let err = decode_return_pad(
            proto::ReturnPadV1 {
                elf_va: Some(proto::return_pad_v1::ElfVa::SetElfVa(1)),
                func: vec![5],
                file: vec![0],
                line: vec![1],
            },
            &mut AddressTracker::new(),
            &table(&["x"]),
        )
        .unwrap_err();
        assert!(matches!(err, SemanticError::StringIndexOutOfRange { index: 5, .. }));
    }

    #[test]
    fn encode_uses_references_and_deltas() {
        let mut interner = Interner::new(0, 16);
        interner.install(&["main".to_string(), "main.c".to_string()]);
        let mut addrs = AddressTracker::new();
        addrs.encode(0x1000, true);

        let pad = ReturnPad::new(0x1010, vec![InlineFrame::new("main", "main.c", 9)]);
        let msg = encode_return_pad(&pad, &mut addrs, &interner, true).unwrap();
        assert_eq!(msg.func, vec![0]);
        assert_eq!(msg.file, vec![1]);
        assert_eq!(msg.line, vec![9]);
        assert_eq!(
            msg.elf_va.map(AddressField::from),
            Some(AddressField::Delta(0x10))
        );
    }

    #[test]
    fn strings_are_deduplicated() {
        let pad = ReturnPad::new(
            0,
            vec![
                InlineFrame::new("a", "x.c", 1),
                InlineFrame::new("b", "x.c", 2),
                InlineFrame::new("a", "y.h", 3),
            ],
        );
        assert_eq!(pad.strings(), vec!["a", "x.c", "b", "y.h"]);
    }
}
