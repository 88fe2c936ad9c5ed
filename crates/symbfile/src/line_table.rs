//! Line tables embedded in range records.
//!
//! On the wire the offsets are delta-coded: the first is relative to the
//! range's start address, each following one relative to its predecessor.
//! Decoded rows hold offsets relative to the range start.

use crate::error::SemanticError;
use crate::proto;

/// One line-table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRow {
    /// Byte offset from the owning range's `elf_va`.
    pub offset: u32,
    pub line_number: u32,
}

/// Address-to-line mapping for one range.
///
/// Row `i` covers `[offset[i], offset[i + 1])`; the last row extends to
/// the end of the range. Addresses before the first offset have no line
/// in this table (usually a nested inline range covers them).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineTable {
    pub rows: Vec<LineRow>,
}

impl LineTable {
    pub fn new(rows: Vec<LineRow>) -> Self {
        Self { rows }
    }

    /// Builds a table from `(offset, line)` pairs.
    pub fn from_pairs<I: IntoIterator<Item = (u32, u32)>>(pairs: I) -> Self {
        Self {
            rows: pairs
                .into_iter()
                .map(|(offset, line_number)| LineRow {
                    offset,
                    line_number,
                })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Absolute `[start, end) -> line` intervals for a range at `elf_va`
    /// spanning `length` bytes.
    pub fn mappings(&self, elf_va: u64, length: u64) -> Vec<(std::ops::Range<u64>, u32)> {
        let range_end = elf_va.saturating_add(length);
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let start = elf_va.saturating_add(u64::from(row.offset));
                let end = match self.rows.get(i + 1) {
                    Some(next) => elf_va.saturating_add(u64::from(next.offset)),
                    None => range_end,
                };
                (start..end, row.line_number)
            })
            .collect()
    }

    /// Un-deltas the wire offsets and pairs them with line numbers.
    pub(crate) fn from_proto(p: proto::LineTable) -> Result<Self, SemanticError> {
        if p.offset.len() != p.line_number.len() {
            return Err(SemanticError::LineTableLengthMismatch {
                offsets: p.offset.len(),
                lines: p.line_number.len(),
            });
        }

        let mut rows = Vec::with_capacity(p.offset.len());
        let mut acc: u32 = 0;
        for (i, (delta, line_number)) in p.offset.into_iter().zip(p.line_number).enumerate() {
            acc = if i == 0 {
                delta
            } else {
                acc.checked_add(delta)
                    .ok_or(SemanticError::LineTableOverflow)?
            };
            rows.push(LineRow {
                offset: acc,
                line_number,
            });
        }
        Ok(Self { rows })
    }

    /// Delta-codes the offsets. Fails if they are not strictly increasing.
    pub(crate) fn to_proto(&self) -> Result<proto::LineTable, String> {
        let mut offset = Vec::with_capacity(self.rows.len());
        let mut line_number = Vec::with_capacity(self.rows.len());
        let mut prev: Option<u32> = None;

        for row in &self.rows {
            let delta = match prev {
                None => row.offset,
                Some(p) if row.offset > p => row.offset - p,
                Some(p) => {
                    return Err(format!(
                        "line table offsets must be strictly increasing ({:#x} after {:#x})",
                        row.offset, p
                    ));
                }
            };
            offset.push(delta);
            line_number.push(row.line_number);
            prev = Some(row.offset);
        }

        Ok(proto::LineTable {
            offset,
            line_number,
        })
    }
}
