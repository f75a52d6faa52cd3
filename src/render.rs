//! Human-readable report rendering for terminal output.
//!
//! Maps classifications to colors: non-standard fields in magenta/red, rare
//! standard fields in yellow, included fields in green. Labels are always
//! written out as well so the output stays readable with color disabled.
use colored::*;

use crate::classify::Classification;
use crate::filter::{Reason, ShownField};
use crate::report::{Report, ReportBody, Summary};

const TITLE: &str = "LDAPScout: Directory Attribute Analysis Results";

/// Remove ANSI escape sequences (`\x1b[ ... m`).
pub fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut iter = s.chars().peekable();
    while let Some(ch) = iter.next() {
        if ch == '\u{1b}' {
            if let Some('[') = iter.peek().cloned() {
                let _ = iter.next();
            }
            for c in iter.by_ref() {
                if c == 'm' {
                    break;
                }
            }
        } else {
            out.push(ch);
        }
    }
    out
}

fn visible_len(s: &str) -> usize {
    strip_ansi(s).chars().count()
}

fn section_header(title: &str) -> String {
    let len = visible_len(title);
    let mut s = String::new();
    s.push('\n');
    s.push_str(title);
    s.push('\n');
    s.push_str(&"─".repeat(len));
    s.push_str("\n\n");
    s
}

fn paint_class(text: &str, class: Classification) -> ColoredString {
    match class {
        Classification::NonStandard => text.red(),
        Classification::RareStandard => text.yellow(),
        Classification::Standard => text.normal(),
    }
}

fn summary_lines(summary: &Summary) -> Vec<String> {
    vec![
        format!(
            "{}",
            format!(
                "Including fields: {}",
                Summary::describe_names(&summary.include)
            )
            .green()
        ),
        format!(
            "{}",
            format!(
                "Include-All fields: {}",
                Summary::describe_names(&summary.include_all)
            )
            .green()
        ),
        format!(
            "{}",
            format!(
                "Excluding fields: {}",
                Summary::describe_names(&summary.exclude)
            )
            .red()
        ),
        format!(
            "Rare Standard Field Threshold Level: {}",
            summary.threshold_description()
        ),
        format!(
            "Users Shown: {}/{}",
            summary.records_shown, summary.total_records
        ),
    ]
}

fn field_line(field: &ShownField) -> String {
    let (label, name) = match field.reason {
        Reason::Flagged => {
            let name = match field.class {
                Classification::NonStandard => field.name.magenta(),
                _ => field.name.yellow(),
            };
            (field.class.label(), name)
        }
        Reason::Included | Reason::IncludeAll => (field.reason.label(), field.name.green()),
    };
    format!(
        "  {}: {} -> {}",
        label.yellow(),
        name,
        field.values.join(" | ").green()
    )
}

pub fn render_report(report: &Report) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", TITLE.bold().cyan()));

    out.push_str(&section_header(&"Search Summary".bold().yellow().to_string()));
    for line in summary_lines(&report.summary) {
        out.push_str(&line);
        out.push('\n');
    }

    match &report.body {
        ReportBody::Findings(sections) => {
            out.push_str(&section_header(&"Findings".bold().cyan().to_string()));
            if sections.is_empty() {
                out.push_str("(No users with non-standard or rare fields)\n");
            }
            for section in sections {
                out.push_str(&format!(
                    "{}\n",
                    format!("User: {}", section.identity).bold().cyan()
                ));
                for field in &section.fields {
                    out.push_str(&field_line(field));
                    out.push('\n');
                }
                out.push('\n');
            }
        }
        ReportBody::Fields(fields) => {
            out.push_str(&section_header(
                &"Fields Found".bold().cyan().to_string(),
            ));
            if fields.is_empty() {
                out.push_str("(No fields)\n");
            }
            for f in fields {
                let mut line = format!(
                    "  {}: {}/{} ({})",
                    f.name,
                    f.occurrence_count,
                    f.total_records,
                    f.relative_frequency.display_percent()
                );
                if f.class.is_flagged() {
                    line.push_str(&format!(" - {}", f.class.label()));
                }
                out.push_str(&paint_class(&line, f.class).to_string());
                out.push('\n');
            }
        }
        ReportBody::Users(users) => {
            out.push_str(&section_header(&"Users".bold().cyan().to_string()));
            if users.is_empty() {
                out.push_str("(No users)\n");
            }
            for u in users {
                let mut line = format!("  {}", u.identity);
                if u.class.is_flagged() {
                    line.push_str(&format!(" ({})", u.class.label()));
                }
                out.push_str(&paint_class(&line, u.class).to_string());
                out.push('\n');
            }
        }
    }

    out
}
