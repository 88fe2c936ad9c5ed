//! Parent tracking for flattened inline trees.
//!
//! Range records of one inline tree arrive parent-first. A child's parent
//! is the nearest still-open range one level shallower whose interval
//! contains the child. Ranges that can no longer be a parent of anything
//! that follows are popped when the next range is pushed.

#[derive(Debug, Clone)]
struct OpenRange {
    start: u64,
    end: u64,
    depth: u32,
    file: Option<String>,
}

impl OpenRange {
    fn contains(&self, start: u64, end: u64) -> bool {
        self.start <= start && end <= self.end
    }
}

/// Stack of ranges that may still enclose upcoming records.
#[derive(Debug, Default)]
pub struct InlineStack {
    open: Vec<OpenRange>,
}

impl InlineStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries that can enclose `[start, end)` at `depth`.
    fn enclosing(&self, start: u64, end: u64, depth: u32) -> usize {
        self.open
            .iter()
            .rposition(|r| r.depth < depth && r.contains(start, end))
            .map_or(0, |i| i + 1)
    }

    /// The file of the parent of `[start, start + length)` at `depth`.
    ///
    /// The outer `Option` is `None` when there is no parent; the inner one
    /// is the parent's (possibly absent) file. Does not modify the stack.
    pub fn parent_file(&self, start: u64, length: u64, depth: u32) -> Option<Option<&str>> {
        let end = start.saturating_add(length);
        let n = self.enclosing(start, end, depth);
        match n.checked_sub(1).map(|i| &self.open[i]) {
            Some(top) if depth > 0 && top.depth == depth - 1 => Some(top.file.as_deref()),
            _ => None,
        }
    }

    /// Pops the ranges the new one closes and pushes it, so later records
    /// can find it as their parent.
    pub fn push(&mut self, start: u64, length: u64, depth: u32, file: Option<String>) {
        let end = start.saturating_add(length);
        let n = self.enclosing(start, end, depth);
        self.open.truncate(n);
        self.open.push(OpenRange {
            start,
            end,
            depth,
            file,
        });
    }

    #[cfg(test)]
    pub fn depth(&self) -> usize {
        self.open.len()
    }
}
