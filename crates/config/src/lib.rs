//! # Config - symbfile writer settings
//!
//! Knobs for the writer-side heuristics of the symbfile codec. None of
//! these settings are part of the wire contract: a reader decodes any
//! stream regardless of the policy that produced it.
//!
//! ## Environment
//!
//! ```text
//! SYMBFILE_INTERN_THRESHOLD  literal uses before a string is interned (default: 2, 0 = never)
//! SYMBFILE_TABLE_BATCH       pending strings per string-table update  (default: 64)
//! SYMBFILE_TABLE_MAX         max entries in one string table          (default: 65536)
//! SYMBFILE_DELTA_ADDRESSES   delta-encode addresses                   (default: "true")
//! ```

use std::str::FromStr;

/// Default number of literal occurrences after which a string is interned.
pub const DEFAULT_INTERN_THRESHOLD: u32 = 2;

/// Default number of pending strings that triggers a string-table update.
pub const DEFAULT_STRING_TABLE_BATCH: usize = 64;

/// Default upper bound on the number of entries in one string table.
pub const DEFAULT_MAX_STRING_TABLE_LEN: usize = 64 * 1024;

/// Writer-side encoding policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterConfig {
    /// A string written this many times as a literal is scheduled for
    /// interning. `0` disables automatic interning.
    pub intern_threshold: u32,
    /// Scheduled strings are flushed as a new string table once this many
    /// are pending.
    pub string_table_batch: usize,
    /// A table that would grow past this many entries is restarted from
    /// only the newly required strings.
    pub max_string_table_len: usize,
    /// Emit delta addresses after the first absolute one.
    pub delta_addresses: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            intern_threshold: DEFAULT_INTERN_THRESHOLD,
            string_table_batch: DEFAULT_STRING_TABLE_BATCH,
            max_string_table_len: DEFAULT_MAX_STRING_TABLE_LEN,
            delta_addresses: true,
        }
    }
}

/// Reads and parses a configuration value from the environment, falling
/// back to `default` when it is missing or does not parse.
fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl WriterConfig {
    /// Builds a config from the `SYMBFILE_*` environment variables.
    ///
    /// Missing or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            intern_threshold: env_parse("SYMBFILE_INTERN_THRESHOLD", d.intern_threshold),
            string_table_batch: env_parse("SYMBFILE_TABLE_BATCH", d.string_table_batch),
            max_string_table_len: env_parse("SYMBFILE_TABLE_MAX", d.max_string_table_len),
            delta_addresses: env_parse("SYMBFILE_DELTA_ADDRESSES", d.delta_addresses),
        }
        .normalized()
    }

    /// Config with automatic interning disabled: strings are only
    /// referenced when the caller installed a table containing them.
    #[must_use]
    pub fn literal_only() -> Self {
        Self {
            intern_threshold: 0,
            ..Self::default()
        }
    }

    /// Clamps the batch and table limits to at least one entry.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.string_table_batch = self.string_table_batch.max(1);
        self.max_string_table_len = self.max_string_table_len.max(1);
        self
    }

    /// Returns `true` if literals are ever promoted into the string table.
    #[must_use]
    pub fn interning_enabled(&self) -> bool {
        self.intern_threshold > 0
    }
}
