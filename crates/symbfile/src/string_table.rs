//! String interning: the active table on the read path, and the
//! writer's mirror of it together with the promotion bookkeeping.

use std::collections::{HashMap, HashSet};

use crate::error::SemanticError;

// =============================================================================
// Read path
// =============================================================================

/// The string table currently in effect while walking a stream.
///
/// Starts empty and is swapped wholesale by every StringTableV1 record.
#[derive(Debug, Default)]
pub struct StringTable {
    strings: Vec<String>,
}

impl StringTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `strings` as the current table, discarding the old one.
    pub fn replace(&mut self, strings: Vec<String>) {
        self.strings = strings;
    }

    /// Looks up a zero-based index in the current table.
    pub fn lookup(&self, index: u32) -> Result<&str, SemanticError> {
        self.strings
            .get(index as usize)
            .map(String::as_str)
            .ok_or(SemanticError::StringIndexOutOfRange {
                index,
                len: self.strings.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

// =============================================================================
// Write path
// =============================================================================

/// How a string field is emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrField {
    Literal(String),
    Ref(u32),
}

/// Writer-side mirror of the current string table.
///
/// Tracks how often each literal has been written. Once a literal reaches
/// the threshold it is moved to `pending`; pending strings join the table
/// the next time the writer emits a table update.
///
/// Only written frames may touch this state: the writer asks for
/// [`field`](Interner::field) while encoding and reports the literals
/// with [`note_literal`](Interner::note_literal) once the frame is out.
#[derive(Debug)]
pub struct Interner {
    /// Mirror of the table the reader will have installed.
    table: Vec<String>,
    /// string -> index into `table`.
    index: HashMap<String, u32>,
    /// Literal occurrence counts for strings not yet promoted.
    counts: HashMap<String, u32>,
    /// Promoted strings waiting for the next table update, in promotion order.
    pending: Vec<String>,
    threshold: u32,
    /// `counts` is reset once it tracks more distinct strings than this.
    max_tracked: usize,
}

impl Interner {
    /// `threshold == 0` disables promotion.
    pub fn new(threshold: u32, max_tracked: usize) -> Self {
        Self {
            table: Vec::new(),
            index: HashMap::new(),
            counts: HashMap::new(),
            pending: Vec::new(),
            threshold,
            max_tracked: max_tracked.max(1),
        }
    }

    /// Index of `s` in the current table, if present.
    pub fn get(&self, s: &str) -> Option<u32> {
        self.index.get(s).copied()
    }

    /// Picks the encoding for one occurrence of `s`.
    pub fn field(&self, s: &str) -> StrField {
        match self.get(s) {
            Some(idx) => StrField::Ref(idx),
            None => StrField::Literal(s.to_string()),
        }
    }

    /// Counts one written literal occurrence of `s`, promoting it to
    /// pending when it reaches the threshold.
    pub fn note_literal(&mut self, s: &str) {
        if self.threshold == 0 || self.get(s).is_some() || self.pending.iter().any(|p| p == s) {
            return;
        }
        if !self.counts.contains_key(s) && self.counts.len() >= self.max_tracked {
            log::debug!("interner tracked {} literals, resetting counts", self.counts.len());
            self.counts.clear();
        }
        let count = self.counts.entry(s.to_string()).or_insert(0);
        *count += 1;
        if *count >= self.threshold {
            self.counts.remove(s);
            self.pending.push(s.to_string());
        }
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Computes the next table: current + pending + `required`, or only
    /// `required` + pending when that would exceed `max_len`. Pending is
    /// truncated to fit; `required` is always kept in full.
    pub fn next_table(&self, required: &[String], max_len: usize) -> Vec<String> {
        let mut next: Vec<String> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();

        let grown = self.table.len() + self.pending.len() + required.len();
        let sources: Vec<&String> = if grown <= max_len {
            self.table
                .iter()
                .chain(self.pending.iter())
                .chain(required.iter())
                .collect()
        } else {
            required.iter().chain(self.pending.iter()).collect()
        };

        for s in sources {
            if seen.contains(s.as_str()) {
                continue;
            }
            let is_required = required.iter().any(|r| r == s);
            if next.len() >= max_len && !is_required {
                continue;
            }
            seen.insert(s.as_str());
            next.push(s.clone());
        }
        next
    }

    /// Records that `strings` is now the current table. Pending promotions
    /// are dropped; the ones that made it into the table are now references.
    pub fn install(&mut self, strings: &[String]) {
        self.table = strings.to_vec();
        self.index.clear();
        for (i, s) in self.table.iter().enumerate() {
            // first occurrence wins, matching what a lookup by value would find
            self.index.entry(s.clone()).or_insert(i as u32);
        }
        self.pending.clear();
    }

    pub fn table(&self) -> &[String] {
        &self.table
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.counts.len()
    }
}
