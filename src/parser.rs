//! Block parser for ldapsearch / LDIF style text dumps.
//!
//! Blocks are separated by blank lines; each block becomes one [`Entry`].
//! Lines of the form `name: value` start a value, anything else continues the
//! last value of the previous attribute. Blocks that yield no attribute (or no
//! usable identity) are skipped and only counted.
use std::sync::OnceLock;

use log::debug;
use regex::Regex;

use crate::entry::Entry;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("malformed line: {0}")]
    MalformedLine(String),
}

/// Counters collected while parsing, reported with `--log-parse-stats`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ParseStats {
    pub entries: usize,
    pub skipped_blocks: usize,
    pub comment_lines: usize,
    pub continuation_lines: usize,
    pub orphan_lines: usize,
}

fn attribute_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // name, then ':' with an optional '::' (base64) or ':<' (url) marker,
    // then whitespace before the value or end of line
    RE.get_or_init(|| {
        Regex::new(r"^([A-Za-z0-9][A-Za-z0-9;._-]*):[:<]?(?:\s+(.*))?$")
            .unwrap_or_else(|e| panic!("attribute line pattern: {e}"))
    })
}

/// Split a trimmed `name: value` line into its attribute name and value.
pub fn parse_attribute_line(line: &str) -> Result<(&str, &str), ParseError> {
    let caps = attribute_line_regex()
        .captures(line)
        .ok_or_else(|| ParseError::MalformedLine(line.to_string()))?;
    let name = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
    let value = caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default();
    Ok((name, value))
}

/// Incremental parser fed one line at a time, so that file loaders can stream
/// lines without holding the whole dump as a single string.
#[derive(Debug, Default)]
pub struct EntryParser {
    current: Entry,
    block_has_text: bool,
    entries: Vec<Entry>,
    stats: ParseStats,
}

impl EntryParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed_line(&mut self, raw: &str) {
        let line = raw.trim();
        if line.is_empty() {
            self.flush_block();
            return;
        }
        // '#' in column 0 is a comment only before the block's first
        // attribute; later it is wrapped value text.
        if raw.starts_with('#') && self.current.is_empty() {
            self.stats.comment_lines += 1;
            return;
        }
        self.block_has_text = true;

        if let Ok((name, value)) = parse_attribute_line(line) {
            self.current.push_value(name, value);
            return;
        }

        // LDIF folds begin with one whitespace character and join without a
        // separator; free-form wrapped text joins with a single space.
        let is_fold = raw.starts_with([' ', '\t']);
        let separator = if is_fold { "" } else { " " };
        let text = if is_fold { raw[1..].trim_end() } else { line };
        if self.current.continue_last(separator, text) {
            self.stats.continuation_lines += 1;
        } else {
            self.stats.orphan_lines += 1;
        }
    }

    fn flush_block(&mut self) {
        let mut entry = std::mem::take(&mut self.current);
        let had_text = std::mem::take(&mut self.block_has_text);
        if entry.is_empty() {
            if had_text {
                debug!("skipping block without attribute lines");
                self.stats.skipped_blocks += 1;
            }
            return;
        }
        if entry.resolve_identity() {
            self.stats.entries += 1;
            self.entries.push(entry);
        } else {
            debug!("skipping block without an identity value");
            self.stats.skipped_blocks += 1;
        }
    }

    /// Close the trailing block and return the parsed entries with stats.
    pub fn finish(mut self) -> (Vec<Entry>, ParseStats) {
        self.flush_block();
        (self.entries, self.stats)
    }
}

pub fn parse_ldif_contents_with_stats(contents: &str) -> (Vec<Entry>, ParseStats) {
    let mut parser = EntryParser::new();
    for line in contents.lines() {
        parser.feed_line(line);
    }
    parser.finish()
}

pub fn parse_ldif_contents(contents: &str) -> Vec<Entry> {
    parse_ldif_contents_with_stats(contents).0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_attribute_lines() {
        assert_eq!(
            parse_attribute_line("cn: Alice Smith").unwrap(),
            ("cn", "Alice Smith")
        );
        assert_eq!(
            parse_attribute_line("description:   spaced out  ").unwrap(),
            ("description", "spaced out")
        );
        assert_eq!(
            parse_attribute_line("userPassword:: c2VjcmV0").unwrap(),
            ("userPassword", "c2VjcmV0")
        );
        assert_eq!(parse_attribute_line("info:").unwrap(), ("info", ""));
        assert_eq!(
            parse_attribute_line("url: http://example.com/a").unwrap(),
            ("url", "http://example.com/a")
        );
    }

    #[test]
    fn reject_non_attribute_lines() {
        assert!(parse_attribute_line("http://example.com").is_err());
        assert!(parse_attribute_line("just some wrapped text").is_err());
        assert!(parse_attribute_line(": value").is_err());
    }

    #[test]
    fn multi_valued_attributes_accumulate() {
        let entries = parse_ldif_contents("A: 1\nA: 2\nB: x\n");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].values("A").unwrap(), ["1", "2"]);
        assert_eq!(entries[0].values("B").unwrap(), ["x"]);
    }

    #[test]
    fn blocks_split_on_blank_lines() {
        let contents = "cn: alice\nmail: a@corp\n\n\n   \ncn: bob\n\n";
        let entries = parse_ldif_contents(contents);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].identity, "alice");
        assert_eq!(entries[1].identity, "bob");
    }

    #[test]
    fn continuation_lines_extend_previous_value() {
        let contents = "cn: carol\ndescription: password is\nSummer2024!\n";
        let entries = parse_ldif_contents(contents);
        assert_eq!(
            entries[0].values("description").unwrap(),
            ["password is Summer2024!"]
        );
    }

    #[test]
    fn ldif_folds_join_without_separator() {
        let contents = "cn: dave\nmemberOf: CN=Domain Ad\n mins,CN=Users,DC=corp\n";
        let (entries, stats) = parse_ldif_contents_with_stats(contents);
        assert_eq!(
            entries[0].values("memberOf").unwrap(),
            ["CN=Domain Admins,CN=Users,DC=corp"]
        );
        assert_eq!(stats.continuation_lines, 1);
    }

    #[test]
    fn folds_starting_with_hash_are_kept() {
        let contents = "sAMAccountName: svc\ninfo: temp pass Summer\n #2024!\n";
        let (entries, stats) = parse_ldif_contents_with_stats(contents);
        assert_eq!(entries[0].values("info").unwrap(), ["temp pass Summer#2024!"]);
        assert_eq!(stats.comment_lines, 0);
        assert_eq!(stats.continuation_lines, 1);
    }

    #[test]
    fn wrapped_text_starting_with_hash_is_kept() {
        let contents = "sAMAccountName: svc\ninfo: password is\n#Hunter2\n";
        let entries = parse_ldif_contents(contents);
        assert_eq!(entries[0].values("info").unwrap(), ["password is #Hunter2"]);
    }

    #[test]
    fn comment_headers_before_entries_are_ignored() {
        let contents = "# alice, Users, corp.local\ndn: CN=alice\nsAMAccountName: alice\n";
        let (entries, stats) = parse_ldif_contents_with_stats(contents);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].len(), 2);
        assert_eq!(stats.comment_lines, 1);
    }

    #[test]
    fn comments_and_stray_blocks_are_skipped() {
        let contents = "# extended LDIF\n#\n\nstray wrapped text\n\ncn: erin\n";
        let (entries, stats) = parse_ldif_contents_with_stats(contents);
        assert_eq!(entries.len(), 1);
        assert_eq!(stats.comment_lines, 2);
        assert_eq!(stats.orphan_lines, 1);
        assert_eq!(stats.skipped_blocks, 1);
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn blocks_without_identity_are_skipped() {
        let contents = "cn:\ndescription:\n\ncn: frank\n";
        let (entries, stats) = parse_ldif_contents_with_stats(contents);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].identity, "frank");
        assert_eq!(stats.skipped_blocks, 1);
    }

    #[test]
    fn empty_input_yields_nothing() {
        let (entries, stats) = parse_ldif_contents_with_stats("");
        assert!(entries.is_empty());
        assert_eq!(stats, ParseStats::default());
    }
}
