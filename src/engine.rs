//! Engine: orchestrates parsing dumps, computing attribute frequencies and
//! building reports. Provides streaming file-based loaders with optional
//! memory-mapped I/O for large exports.
//!
//! Typical usage:
//!
//! ```no_run
//! use ldapscout::engine::Engine;
//! use ldapscout::filter::FilterConfig;
//! use ldapscout::report::Mode;
//! # fn main() -> anyhow::Result<()> {
//! let mut engine = Engine::new();
//! engine.load_from_file_paths(&["/path/to/users.ldif"])?;
//! let report = engine.build_report(&FilterConfig::default(), Mode::Report);
//! println!("{}", ldapscout::render::render_report(&report));
//! # Ok(())
//! # }
//! ```
use std::path::Path;

use anyhow::Result;
use log::info;

use crate::entry::Entry;
use crate::filter::FilterConfig;
use crate::frequency::FrequencyTable;
use crate::io::{DEFAULT_MMAP_THRESHOLD_BYTES, lines_auto};
use crate::parser::{EntryParser, ParseStats, parse_ldif_contents_with_stats};
use crate::registry::StandardRegistry;
use crate::report::{Mode, Report, build_report};

/// Holds the parsed dataset and the registry it is classified against.
#[derive(Debug, Default)]
pub struct Engine {
    pub entries: Vec<Entry>,
    pub registry: StandardRegistry,
    pub parse_stats: Option<ParseStats>,
    frequencies: FrequencyTable,
}

impl Engine {
    /// Create an empty engine using the built-in registry.
    pub fn new() -> Self {
        Self::with_registry(StandardRegistry::default())
    }

    pub fn with_registry(registry: StandardRegistry) -> Self {
        Self {
            entries: Vec::new(),
            registry,
            parse_stats: None,
            frequencies: FrequencyTable::default(),
        }
    }

    fn set_entries(&mut self, entries: Vec<Entry>, stats: ParseStats) {
        self.frequencies = FrequencyTable::analyze(&entries);
        info!(
            "parsed {} entries with {} distinct attributes",
            entries.len(),
            self.frequencies.len()
        );
        self.entries = entries;
        self.parse_stats = Some(stats);
    }

    /// Load dumps already in memory. Each string is parsed independently and
    /// the entries are concatenated; any previous dataset is replaced.
    pub fn load_from_strings(&mut self, dumps: &[&str]) {
        let mut all = Vec::new();
        let mut stats = ParseStats::default();
        for d in dumps {
            let (entries, s) = parse_ldif_contents_with_stats(d);
            all.extend(entries);
            merge_stats(&mut stats, s);
        }
        self.set_entries(all, stats);
    }

    /// Stream dumps from file paths line by line, mapping files at or above
    /// `mmap_threshold_bytes`.
    pub fn load_from_file_paths_with_threshold<P: AsRef<Path>>(
        &mut self,
        paths: &[P],
        mmap_threshold_bytes: u64,
    ) -> Result<()> {
        let mut all = Vec::new();
        let mut stats = ParseStats::default();
        for p in paths {
            let mut parser = EntryParser::new();
            for line in lines_auto(p, mmap_threshold_bytes)? {
                parser.feed_line(&line?);
            }
            let (entries, s) = parser.finish();
            all.extend(entries);
            merge_stats(&mut stats, s);
        }
        self.set_entries(all, stats);
        Ok(())
    }

    /// Convenience wrapper that uses the default mmap threshold.
    pub fn load_from_file_paths<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<()> {
        self.load_from_file_paths_with_threshold(paths, DEFAULT_MMAP_THRESHOLD_BYTES)
    }

    pub fn frequencies(&self) -> &FrequencyTable {
        &self.frequencies
    }

    /// Names referenced by `config` that occur in no loaded entry, sorted and
    /// deduplicated. They never match anything; callers may warn about them.
    pub fn unknown_fields(&self, config: &FilterConfig) -> Vec<String> {
        let mut unknown: Vec<String> = config
            .referenced_names()
            .filter(|name| !self.frequencies.contains(name))
            .map(|name| name.to_string())
            .collect();
        unknown.sort();
        unknown.dedup();
        unknown
    }

    pub fn build_report(&self, config: &FilterConfig, mode: Mode) -> Report {
        build_report(
            &self.entries,
            &self.frequencies,
            &self.registry,
            config,
            mode,
        )
    }
}

fn merge_stats(total: &mut ParseStats, s: ParseStats) {
    total.entries += s.entries;
    total.skipped_blocks += s.skipped_blocks;
    total.comment_lines += s.comment_lines;
    total.continuation_lines += s.continuation_lines;
    total.orphan_lines += s.orphan_lines;
}
