//! Attribute occurrence statistics over a parsed dataset.
//!
//! Defines `FrequencyEntry` (per-attribute counts) and `FrequencyTable`
//! aggregating them. Relative frequencies are kept in fixed point (basis
//! points, floored) so threshold comparisons are exact at whole percentages.
use std::collections::HashMap;

use crate::entry::Entry;

/// Relative frequency in basis points (1/100 of a percent), in `0..=10_000`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RelativeFrequency(u32);

impl RelativeFrequency {
    pub const SCALE: u32 = 10_000;

    /// Floored `count / total`. Flooring keeps `freq < k%` exact for any
    /// whole percentage `k`. A zero total yields zero.
    pub fn from_counts(count: usize, total: usize) -> Self {
        if total == 0 {
            return Self(0);
        }
        let bp = (count as u64 * Self::SCALE as u64) / total as u64;
        Self(bp.min(Self::SCALE as u64) as u32)
    }

    pub fn from_basis_points(bp: u32) -> Self {
        Self(bp.min(Self::SCALE))
    }

    pub fn basis_points(self) -> u32 {
        self.0
    }

    /// True when this frequency, as a percentage, is strictly below `percent`.
    pub fn is_below_percent(self, percent: u8) -> bool {
        self.0 < percent as u32 * 100
    }

    /// Percentage with two decimals, e.g. `"5.00%"`.
    pub fn display_percent(self) -> String {
        format!("{}.{:02}%", self.0 / 100, self.0 % 100)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyEntry {
    pub name: String,
    pub occurrence_count: usize,
    pub total_records: usize,
    pub relative_frequency: RelativeFrequency,
}

/// Per-attribute occurrence counts, in first-seen order across the dataset.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    total_records: usize,
    entries: Vec<FrequencyEntry>,
    index: HashMap<String, usize>,
}

impl FrequencyTable {
    /// Count, for each attribute name, how many entries contain it. An
    /// attribute contributes once per entry however many values it has.
    pub fn analyze(records: &[Entry]) -> Self {
        let mut counts: Vec<(String, usize)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for record in records {
            for name in record.attribute_names() {
                match index.get(name) {
                    Some(&i) => counts[i].1 += 1,
                    None => {
                        index.insert(name.to_string(), counts.len());
                        counts.push((name.to_string(), 1));
                    }
                }
            }
        }
        let total = records.len();
        let entries = counts
            .into_iter()
            .map(|(name, count)| FrequencyEntry {
                name,
                occurrence_count: count,
                total_records: total,
                relative_frequency: RelativeFrequency::from_counts(count, total),
            })
            .collect();
        Self {
            total_records: total,
            entries,
            index,
        }
    }

    pub fn total_records(&self) -> usize {
        self.total_records
    }

    pub fn get(&self, name: &str) -> Option<&FrequencyEntry> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    /// Relative frequency of `name`; zero for attributes never observed.
    pub fn relative_frequency(&self, name: &str) -> RelativeFrequency {
        self.get(name)
            .map(|e| e.relative_frequency)
            .unwrap_or_default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn entries(&self) -> &[FrequencyEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
