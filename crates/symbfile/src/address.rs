//! The cross-record address cursor.
//!
//! Range and ReturnPad records store their address either absolute or as a
//! signed delta from the previous record's address. The tracker holds the
//! last resolved address; one instance is threaded through one traversal.

use crate::error::SemanticError;
use crate::proto::{range_v1, return_pad_v1};

/// An address field as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressField {
    Absolute(u64),
    Delta(i64),
}

/// Last resolved ELF virtual address of the stream.
#[derive(Debug, Default, Clone, Copy)]
pub struct AddressTracker {
    /// `None` until the first absolute address has been seen.
    cursor: Option<u64>,
}

impl AddressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last resolved address, if any.
    #[must_use]
    pub fn cursor(&self) -> Option<u64> {
        self.cursor
    }

    /// Resolves a wire address field and advances the cursor.
    ///
    /// A delta before any absolute address fails with
    /// [`SemanticError::DeltaWithoutBase`]. On error the cursor is left
    /// unchanged.
    pub fn resolve(&mut self, field: AddressField) -> Result<u64, SemanticError> {
        let addr = match field {
            AddressField::Absolute(addr) => addr,
            AddressField::Delta(delta) => {
                let base = self.cursor.ok_or(SemanticError::DeltaWithoutBase)?;
                base.checked_add_signed(delta).ok_or(if delta < 0 {
                    SemanticError::AddressUnderflow { base, delta }
                } else {
                    SemanticError::AddressOverflow { base, delta }
                })?
            }
        };
        self.cursor = Some(addr);
        Ok(addr)
    }

    /// Chooses the wire form for `addr` and advances the cursor to it.
    ///
    /// Deltas are used only when `allow_delta` is set, a base exists, and
    /// the difference is representable as an `i64`.
    pub fn encode(&mut self, addr: u64, allow_delta: bool) -> AddressField {
        let field = match self.cursor {
            Some(base) if allow_delta => {
                let delta = addr.wrapping_sub(base) as i64;
                if base.checked_add_signed(delta) == Some(addr) {
                    AddressField::Delta(delta)
                } else {
                    AddressField::Absolute(addr)
                }
            }
            _ => AddressField::Absolute(addr),
        };
        self.cursor = Some(addr);
        field
    }
}

impl From<range_v1::ElfVa> for AddressField {
    fn from(v: range_v1::ElfVa) -> Self {
        match v {
            range_v1::ElfVa::SetElfVa(a) => AddressField::Absolute(a),
            range_v1::ElfVa::DeltaElfVa(d) => AddressField::Delta(d),
        }
    }
}

impl From<AddressField> for range_v1::ElfVa {
    fn from(f: AddressField) -> Self {
        match f {
            AddressField::Absolute(a) => range_v1::ElfVa::SetElfVa(a),
            AddressField::Delta(d) => range_v1::ElfVa::DeltaElfVa(d),
        }
    }
}

impl From<return_pad_v1::ElfVa> for AddressField {
    fn from(v: return_pad_v1::ElfVa) -> Self {
        match v {
            return_pad_v1::ElfVa::SetElfVa(a) => AddressField::Absolute(a),
            return_pad_v1::ElfVa::DeltaElfVa(d) => AddressField::Delta(d),
        }
    }
}

impl From<AddressField> for return_pad_v1::ElfVa {
    fn from(f: AddressField) -> Self {
        match f {
            AddressField::Absolute(a) => return_pad_v1::ElfVa::SetElfVa(a),
            AddressField::Delta(d) => return_pad_v1::ElfVa::DeltaElfVa(d),
        }
    }
}
