//! Report assembly: turns classified, filtered entries into an immutable
//! `Report` value for a renderer or exporter.
//!
//! Three shapes exist: the default findings report (qualifying users and
//! their shown fields), the field listing, and the user listing. All carry
//! the same `Summary`.
use crate::classify::{Classification, DatasetClassifier, Level};
use crate::entry::Entry;
use crate::filter::{FilterConfig, ShownField, select_fields, worst_class};
use crate::frequency::{FrequencyTable, RelativeFrequency};
use crate::registry::StandardRegistry;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Report,
    ListFields,
    ListUsers,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSection {
    pub identity: String,
    pub fields: Vec<ShownField>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldListing {
    pub name: String,
    pub occurrence_count: usize,
    pub total_records: usize,
    pub relative_frequency: RelativeFrequency,
    pub class: Classification,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserListing {
    pub identity: String,
    pub class: Classification,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportBody {
    Findings(Vec<UserSection>),
    Fields(Vec<FieldListing>),
    Users(Vec<UserListing>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub total_records: usize,
    pub records_shown: usize,
    pub include: Vec<String>,
    pub include_all: Vec<String>,
    pub exclude: Vec<String>,
    pub level: Level,
}

impl Summary {
    /// Comma-separated names, or `None` when the set is empty.
    pub fn describe_names(names: &[String]) -> String {
        if names.is_empty() {
            "None".to_string()
        } else {
            names.join(", ")
        }
    }

    /// e.g. `2 (25%)`
    pub fn threshold_description(&self) -> String {
        self.level.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub mode: Mode,
    pub body: ReportBody,
    pub summary: Summary,
}

pub fn build_report(
    records: &[Entry],
    table: &FrequencyTable,
    registry: &StandardRegistry,
    config: &FilterConfig,
    mode: Mode,
) -> Report {
    let classifier = DatasetClassifier::new(table, registry, config.level);
    let total = records.len();

    let (body, shown) = match mode {
        Mode::Report => {
            let sections: Vec<UserSection> = records
                .iter()
                .filter_map(|r| {
                    select_fields(r, &classifier, config).map(|fields| UserSection {
                        identity: r.identity.clone(),
                        fields,
                    })
                })
                .collect();
            let shown = sections.len();
            (ReportBody::Findings(sections), shown)
        }
        Mode::ListFields => {
            let fields = table
                .entries()
                .iter()
                .filter(|e| !config.is_excluded(&e.name))
                .map(|e| FieldListing {
                    name: e.name.clone(),
                    occurrence_count: e.occurrence_count,
                    total_records: e.total_records,
                    relative_frequency: e.relative_frequency,
                    class: classifier.classify(&e.name),
                })
                .collect();
            (ReportBody::Fields(fields), total)
        }
        Mode::ListUsers => {
            let users = records
                .iter()
                .map(|r| UserListing {
                    identity: r.identity.clone(),
                    class: worst_class(r, &classifier, config),
                })
                .collect();
            (ReportBody::Users(users), total)
        }
    };

    Report {
        mode,
        body,
        summary: Summary {
            total_records: total,
            records_shown: shown,
            include: config.include.iter().cloned().collect(),
            include_all: config.include_all.iter().cloned().collect(),
            exclude: config.exclude.iter().cloned().collect(),
            level: config.level,
        },
    }
}
