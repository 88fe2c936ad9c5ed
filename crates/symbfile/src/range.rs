//! RangeV1: one node of a flattened inline-function tree.

use crate::address::{AddressField, AddressTracker};
use crate::error::SemanticError;
use crate::inline::InlineStack;
use crate::line_table::LineTable;
use crate::proto::{self, range_v1};
use crate::string_table::{Interner, StrField, StringTable};

/// A contiguous instruction span attributed to one (possibly inlined)
/// function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Range {
    /// Resolved start address.
    pub elf_va: u64,
    /// Span length in bytes.
    pub length: u64,
    pub func: String,
    pub file: Option<String>,
    /// Line of the call site in the parent; meaningful only when `depth > 0`.
    pub call_line: u32,
    /// File of the call site. When absent on the wire it is inherited from
    /// the enclosing parent range's `file`.
    pub call_file: Option<String>,
    /// Inline depth; 0 is the outermost, non-inlined function.
    pub depth: u32,
    pub line_table: LineTable,
}

impl Range {
    /// A top-level range with no file, call site or line table.
    pub fn new(elf_va: u64, length: u64, func: impl Into<String>) -> Self {
        Self {
            elf_va,
            length,
            func: func.into(),
            file: None,
            call_line: 0,
            call_file: None,
            depth: 0,
            line_table: LineTable::default(),
        }
    }

    /// Exclusive end address.
    #[must_use]
    pub fn end(&self) -> u64 {
        self.elf_va.saturating_add(self.length)
    }

    #[must_use]
    pub fn contains(&self, addr: u64) -> bool {
        self.elf_va <= addr && addr < self.end()
    }

    /// Absolute `[start, end) -> line` intervals of the line table.
    pub fn line_mappings(&self) -> Vec<(std::ops::Range<u64>, u32)> {
        self.line_table.mappings(self.elf_va, self.length)
    }

    /// Line number for `addr`, or `None` if the address lies outside the
    /// range or in the gap before the first line-table row.
    #[must_use]
    pub fn line_at(&self, addr: u64) -> Option<u32> {
        if !self.contains(addr) {
            return None;
        }
        self.line_mappings()
            .into_iter()
            .find(|(span, _)| span.contains(&addr))
            .map(|(_, line)| line)
    }
}

/// Decodes a RangeV1 payload against the current traversal state.
pub(crate) fn decode_range(
    msg: proto::RangeV1,
    addresses: &mut AddressTracker,
    strings: &StringTable,
    inline: &mut InlineStack,
) -> Result<Range, SemanticError> {
    let elf_va = addresses.resolve(
        msg.elf_va
            .ok_or(SemanticError::MissingField("elf_va"))?
            .into(),
    )?;

    let func = match msg.func {
        Some(range_v1::Func::FuncStr(s)) => s,
        Some(range_v1::Func::FuncRef(i)) => strings.lookup(i)?.to_string(),
        None => return Err(SemanticError::MissingField("func")),
    };

    let file = match msg.file {
        Some(range_v1::File::FileStr(s)) => Some(s),
        Some(range_v1::File::FileRef(i)) => Some(strings.lookup(i)?.to_string()),
        None => None,
    };

    // an unset oneof, a zero reference and an empty literal all mean
    // "same as the parent's file"
    let explicit_call_file = match msg.call_file {
        Some(range_v1::CallFile::CallFileStr(s)) if !s.is_empty() => Some(s),
        Some(range_v1::CallFile::CallFileRef(i)) if i != 0 => {
            Some(strings.lookup(i)?.to_string())
        }
        _ => None,
    };

    let line_table = match msg.line_table {
        Some(lt) => LineTable::from_proto(lt)?,
        None => LineTable::default(),
    };

    let call_file = match explicit_call_file {
        Some(f) => Some(f),
        None => inline
            .parent_file(elf_va, msg.length, msg.depth)
            .flatten()
            .map(str::to_string),
    };
    inline.push(elf_va, msg.length, msg.depth, file.clone());

    Ok(Range {
        elf_va,
        length: msg.length,
        func,
        file,
        call_line: msg.call_line,
        call_file,
        depth: msg.depth,
        line_table,
    })
}

/// Encodes `range`, choosing delta/absolute address and literal/reference
/// strings from the writer's mirrored state.
///
/// Only `addresses` is advanced; the caller commits it, the inline stack
/// and the literal counts once the frame has been written. A `call_file`
/// equal to the parent's `file` is omitted so the reader inherits it.
pub(crate) fn encode_range(
    range: &Range,
    addresses: &mut AddressTracker,
    interner: &Interner,
    inline: &InlineStack,
    allow_delta: bool,
) -> Result<proto::RangeV1, String> {
    // validate before touching any state
    let line_table = range.line_table.to_proto()?;

    let elf_va: AddressField = addresses.encode(range.elf_va, allow_delta);

    let func = match interner.field(&range.func) {
        StrField::Literal(s) => range_v1::Func::FuncStr(s),
        StrField::Ref(i) => range_v1::Func::FuncRef(i),
    };

    let file = range.file.as_deref().map(|f| match interner.field(f) {
        StrField::Literal(s) => range_v1::File::FileStr(s),
        StrField::Ref(i) => range_v1::File::FileRef(i),
    });

    let inherited = match (
        range.call_file.as_deref(),
        inline.parent_file(range.elf_va, range.length, range.depth),
    ) {
        (None, _) | (Some(""), _) => true,
        (Some(cf), Some(Some(pf))) => cf == pf,
        _ => false,
    };
    let call_file = if inherited {
        None
    } else {
        range.call_file.as_deref().map(|f| match interner.field(f) {
            // reference 0 is the inherit sentinel, so entry 0 goes out literally
            StrField::Ref(0) => range_v1::CallFile::CallFileStr(f.to_string()),
            StrField::Ref(i) => range_v1::CallFile::CallFileRef(i),
            StrField::Literal(s) => range_v1::CallFile::CallFileStr(s),
        })
    };

    Ok(proto::RangeV1 {
        elf_va: Some(elf_va.into()),
        length: range.length,
        func: Some(func),
        file,
        call_line: range.call_line,
        call_file,
        depth: range.depth,
        line_table: if line_table.offset.is_empty() {
            None
        } else {
            Some(line_table)
        },
    })
}

/// Strings an encoded range carries as literals, in field order.
pub(crate) fn literals(msg: &proto::RangeV1) -> Vec<&str> {
    let mut out = Vec::with_capacity(3);
    if let Some(range_v1::Func::FuncStr(s)) = &msg.func {
        out.push(s.as_str());
    }
    if let Some(range_v1::File::FileStr(s)) = &msg.file {
        out.push(s.as_str());
    }
    if let Some(range_v1::CallFile::CallFileStr(s)) = &msg.call_file {
        out.push(s.as_str());
    }
    out
}
