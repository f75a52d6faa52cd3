//! Export helpers for writing a report to CSV.
//!
//! - findings: one row per shown value `(User, Field, Class, Reason, Value)`
//! - field listing: `(Field, Count, Total, Percentage, Class)`
//! - user listing: `(User, Class)`
use std::path::Path;

use anyhow::{Context, Result};
use csv::Writer;
use serde::Serialize;

use crate::classify::Classification;
use crate::filter::Reason;
use crate::report::{Report, ReportBody};

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct FindingRow<'a> {
    user: &'a str,
    field: &'a str,
    class: Classification,
    reason: Reason,
    value: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct FieldRow<'a> {
    field: &'a str,
    count: usize,
    total: usize,
    percentage: String,
    class: Classification,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct UserRow<'a> {
    user: &'a str,
    class: Classification,
}

pub fn save_report_csv<P: AsRef<Path>>(report: &Report, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut wtr = Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;
    match &report.body {
        ReportBody::Findings(sections) => {
            if sections.is_empty() {
                wtr.write_record(["User", "Field", "Class", "Reason", "Value"])?;
            }
            for section in sections {
                for field in &section.fields {
                    for value in &field.values {
                        wtr.serialize(FindingRow {
                            user: &section.identity,
                            field: &field.name,
                            class: field.class,
                            reason: field.reason,
                            value,
                        })?;
                    }
                }
            }
        }
        ReportBody::Fields(fields) => {
            if fields.is_empty() {
                wtr.write_record(["Field", "Count", "Total", "Percentage", "Class"])?;
            }
            for f in fields {
                wtr.serialize(FieldRow {
                    field: &f.name,
                    count: f.occurrence_count,
                    total: f.total_records,
                    percentage: f.relative_frequency.display_percent(),
                    class: f.class,
                })?;
            }
        }
        ReportBody::Users(users) => {
            if users.is_empty() {
                wtr.write_record(["User", "Class"])?;
            }
            for u in users {
                wtr.serialize(UserRow {
                    user: &u.identity,
                    class: u.class,
                })?;
            }
        }
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterConfig;
    use crate::frequency::FrequencyTable;
    use crate::parser::parse_ldif_contents;
    use crate::registry::StandardRegistry;
    use crate::report::{Mode, build_report};
    use tempfile::tempdir;

    fn report(mode: Mode) -> Report {
        let records = parse_ldif_contents(
            "cn: alice\ninfo: pw=Winter1\ninfo: vpn\n\ncn: bob\n\ncn: carol\n",
        );
        let table = FrequencyTable::analyze(&records);
        build_report(
            &records,
            &table,
            &StandardRegistry::default(),
            &FilterConfig::default(),
            mode,
        )
    }

    #[test]
    fn writes_findings_rows_per_value() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("findings.csv");
        save_report_csv(&report(Mode::Report), &path).unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.starts_with("User,Field,Class,Reason,Value\n"));
        assert!(content.contains("alice,info,NonStandard,Flagged,pw=Winter1\n"));
        assert!(content.contains("alice,info,NonStandard,Flagged,vpn\n"));
        assert!(!content.contains("bob"));
    }

    #[test]
    fn writes_listings() {
        let dir = tempdir().unwrap();
        let fields_path = dir.path().join("fields.csv");
        let users_path = dir.path().join("users.csv");
        save_report_csv(&report(Mode::ListFields), &fields_path).unwrap();
        save_report_csv(&report(Mode::ListUsers), &users_path).unwrap();
        let fields = std::fs::read_to_string(fields_path).unwrap();
        let users = std::fs::read_to_string(users_path).unwrap();
        assert!(fields.starts_with("Field,Count,Total,Percentage,Class\n"));
        assert!(fields.contains("cn,3,3,100.00%,Standard\n"));
        assert!(fields.contains("info,1,3,33.33%,NonStandard\n"));
        assert!(users.contains("alice,NonStandard\n"));
        assert!(users.contains("bob,Standard\n"));
    }

    #[test]
    fn empty_report_still_has_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        let report = build_report(
            &[],
            &FrequencyTable::default(),
            &StandardRegistry::default(),
            &FilterConfig::default(),
            Mode::Report,
        );
        save_report_csv(&report, &path).unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert_eq!(content, "User,Field,Class,Reason,Value\n");
    }
}
