//! Attribute classification against the registry and a rarity level.
//!
//! `classify` is a pure function of (name, relative frequency, level,
//! registry). Registry absence always wins; registry members are rare when
//! their frequency falls strictly below the level's threshold percentage.
use std::fmt;

use crate::frequency::{FrequencyTable, RelativeFrequency};
use crate::registry::StandardRegistry;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: level {0} is outside 1-5")]
    InvalidLevel(u8),
}

/// Level → rarity threshold percentage.
pub const LEVEL_THRESHOLDS: [(u8, u8); 5] = [(1, 10), (2, 25), (3, 50), (4, 75), (5, 95)];

/// Validated rarity level in `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Level(u8);

impl Level {
    pub const DEFAULT: Level = Level(2);

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn threshold_percent(self) -> u8 {
        // levels are validated against the table on construction and the
        // table is ordered 1..=5, so the index is always in bounds
        LEVEL_THRESHOLDS[usize::from(self.0 - 1)].1
    }

    pub fn all() -> impl Iterator<Item = Level> {
        LEVEL_THRESHOLDS.iter().map(|(level, _)| Level(*level))
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u8> for Level {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if LEVEL_THRESHOLDS.iter().any(|(level, _)| *level == value) {
            Ok(Level(value))
        } else {
            Err(ConfigError::InvalidLevel(value))
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}%)", self.0, self.threshold_percent())
    }
}

/// Ordered by severity: `Standard < RareStandard < NonStandard`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub enum Classification {
    Standard,
    RareStandard,
    NonStandard,
}

impl Classification {
    pub fn is_flagged(self) -> bool {
        self != Classification::Standard
    }

    pub fn label(self) -> &'static str {
        match self {
            Classification::Standard => "Standard Field",
            Classification::RareStandard => "Rare Standard Field",
            Classification::NonStandard => "Non-Standard Field",
        }
    }
}

pub fn classify(
    name: &str,
    frequency: RelativeFrequency,
    level: Level,
    registry: &StandardRegistry,
) -> Classification {
    if !registry.contains(name) {
        Classification::NonStandard
    } else if frequency.is_below_percent(level.threshold_percent()) {
        Classification::RareStandard
    } else {
        Classification::Standard
    }
}

/// Binds a frequency table, registry and level so callers can classify by
/// attribute name alone.
#[derive(Debug, Clone, Copy)]
pub struct DatasetClassifier<'a> {
    pub table: &'a FrequencyTable,
    pub registry: &'a StandardRegistry,
    pub level: Level,
}

impl<'a> DatasetClassifier<'a> {
    pub fn new(table: &'a FrequencyTable, registry: &'a StandardRegistry, level: Level) -> Self {
        Self {
            table,
            registry,
            level,
        }
    }

    pub fn classify(&self, name: &str) -> Classification {
        classify(
            name,
            self.table.relative_frequency(name),
            self.level,
            self.registry,
        )
    }
}
