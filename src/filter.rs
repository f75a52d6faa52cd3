//! Filter engine: decides which entries surface in the report and which of
//! their attributes are shown.
//!
//! Precedence, highest first: exclude, include-all, include, default
//! qualification (any non-standard or rare attribute). `include` only adds
//! attributes to entries that already qualify.
use std::collections::BTreeSet;

use serde::Serialize;

use crate::classify::{Classification, ConfigError, DatasetClassifier, Level};
use crate::entry::Entry;

/// Caller-supplied filter configuration, read-only for the whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterConfig {
    pub exclude: BTreeSet<String>,
    pub include: BTreeSet<String>,
    pub include_all: BTreeSet<String>,
    pub level: Level,
}

impl FilterConfig {
    /// Build a configuration from raw option values, validating `level`.
    pub fn new<I, S>(exclude: I, include: I, include_all: I, level: u8) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self {
            exclude: exclude.into_iter().map(Into::into).collect(),
            include: include.into_iter().map(Into::into).collect(),
            include_all: include_all.into_iter().map(Into::into).collect(),
            level: Level::try_from(level)?,
        })
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.exclude.contains(name)
    }

    /// Every name the configuration refers to, across all three sets.
    pub fn referenced_names(&self) -> impl Iterator<Item = &str> {
        self.exclude
            .iter()
            .chain(self.include.iter())
            .chain(self.include_all.iter())
            .map(|s| s.as_str())
    }
}

/// Why an attribute is part of a report section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Reason {
    /// Non-standard or rare standard attribute.
    Flagged,
    /// Named in `include` on an entry that qualified.
    Included,
    /// Named in `include_all`; forces the entry into the report.
    IncludeAll,
}

impl Reason {
    pub fn label(self) -> &'static str {
        match self {
            Reason::Flagged => "Flagged Field",
            Reason::Included => "Included Field",
            Reason::IncludeAll => "Include-All Field",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShownField {
    pub name: String,
    pub values: Vec<String>,
    pub class: Classification,
    pub reason: Reason,
}

/// Return the attributes to show for `entry`, or `None` when the entry does
/// not qualify. Shown fields keep the entry's attribute order.
pub fn select_fields(
    entry: &Entry,
    classifier: &DatasetClassifier<'_>,
    config: &FilterConfig,
) -> Option<Vec<ShownField>> {
    let mut qualifies = false;
    let mut shown = Vec::new();
    for attr in entry.attributes() {
        if config.is_excluded(&attr.name) {
            continue;
        }
        let class = classifier.classify(&attr.name);
        let reason = if config.include_all.contains(&attr.name) {
            qualifies = true;
            Some(Reason::IncludeAll)
        } else if config.include.contains(&attr.name) {
            Some(Reason::Included)
        } else if class.is_flagged() {
            Some(Reason::Flagged)
        } else {
            None
        };
        if class.is_flagged() {
            qualifies = true;
        }
        if let Some(reason) = reason {
            shown.push(ShownField {
                name: attr.name.clone(),
                values: attr.values.clone(),
                class,
                reason,
            });
        }
    }
    qualifies.then_some(shown)
}

/// Most severe class among the entry's non-excluded attributes, used by the
/// user listing. Entries whose attributes are all excluded count as standard.
pub fn worst_class(
    entry: &Entry,
    classifier: &DatasetClassifier<'_>,
    config: &FilterConfig,
) -> Classification {
    entry
        .attribute_names()
        .filter(|name| !config.is_excluded(name))
        .map(|name| classifier.classify(name))
        .max()
        .unwrap_or(Classification::Standard)
}
