//! Directory entry data model for records parsed from ldapsearch / LDIF dumps.
//!
//! An `Entry` keeps its attributes in first-seen order, each attribute holding
//! every value it was given (multi-valued attributes such as `memberOf` keep
//! duplicates). Lookups by name go through a side index so that the frequency
//! pass and the filter engine never scan the attribute list.
//!
//! Use [`Entry::push_value`] while parsing and [`Entry::resolve_identity`]
//! once the block is complete.
use std::collections::HashMap;

/// Attribute names consulted, in order, when picking an entry's identity.
pub const IDENTITY_ATTRIBUTES: [&str; 3] = ["sAMAccountName", "cn", "uid"];

/// One named attribute of an entry with its ordered values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub values: Vec<String>,
}

/// Represents one parsed directory entry.
#[derive(Debug, Clone, Default)]
pub struct Entry {
    pub identity: String,
    attributes: Vec<Attribute>,
    index: HashMap<String, usize>,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity && self.attributes == other.attributes
    }
}

impl Eq for Entry {}

impl Entry {
    /// Construct an entry with no attributes and an empty identity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `value` to attribute `name`, creating the attribute on first use.
    pub fn push_value(&mut self, name: &str, value: &str) {
        match self.index.get(name) {
            Some(&i) => self.attributes[i].values.push(value.to_string()),
            None => {
                self.index.insert(name.to_string(), self.attributes.len());
                self.attributes.push(Attribute {
                    name: name.to_string(),
                    values: vec![value.to_string()],
                });
            }
        }
    }

    /// Append text to the last value of the most recently created attribute.
    /// Returns false when the entry has no attribute to continue yet.
    pub fn continue_last(&mut self, separator: &str, text: &str) -> bool {
        let Some(attr) = self.attributes.last_mut() else {
            return false;
        };
        match attr.values.last_mut() {
            Some(v) => {
                v.push_str(separator);
                v.push_str(text);
            }
            None => attr.values.push(text.to_string()),
        }
        true
    }

    /// Derive `identity` from the entry's own fields. Prefers the well-known
    /// identity attributes, then the first non-empty value in attribute order.
    /// Returns false when no non-empty value exists.
    pub fn resolve_identity(&mut self) -> bool {
        let preferred = IDENTITY_ATTRIBUTES
            .iter()
            .filter_map(|name| self.values(name))
            .flat_map(|vals| vals.iter())
            .find(|v| !v.is_empty());
        let chosen = preferred.or_else(|| {
            self.attributes
                .iter()
                .flat_map(|a| a.values.iter())
                .find(|v| !v.is_empty())
        });
        match chosen {
            Some(v) => {
                self.identity = v.clone();
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn values(&self, name: &str) -> Option<&[String]> {
        self.index
            .get(name)
            .map(|&i| self.attributes[i].values.as_slice())
    }

    /// Attributes in first-seen order.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|a| a.name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_value_accumulates_in_order() {
        let mut e = Entry::new();
        e.push_value("memberOf", "CN=A");
        e.push_value("cn", "alice");
        e.push_value("memberOf", "CN=B");
        e.push_value("memberOf", "CN=A");
        assert_eq!(e.len(), 2);
        assert_eq!(e.values("memberOf").unwrap(), ["CN=A", "CN=B", "CN=A"]);
        let names: Vec<_> = e.attribute_names().collect();
        assert_eq!(names, vec!["memberOf", "cn"]);
    }

    #[test]
    fn identity_prefers_sam_account_name() {
        let mut e = Entry::new();
        e.push_value("dn", "CN=Alice Smith,DC=corp");
        e.push_value("cn", "Alice Smith");
        e.push_value("sAMAccountName", "asmith");
        assert!(e.resolve_identity());
        assert_eq!(e.identity, "asmith");
    }

    #[test]
    fn identity_falls_back_to_first_value() {
        let mut e = Entry::new();
        e.push_value("dn", "");
        e.push_value("description", "service box");
        assert!(e.resolve_identity());
        assert_eq!(e.identity, "service box");
    }

    #[test]
    fn identity_fails_without_values() {
        let mut e = Entry::new();
        assert!(!e.resolve_identity());
        e.push_value("cn", "");
        assert!(!e.resolve_identity());
    }

    #[test]
    fn continue_last_requires_an_attribute() {
        let mut e = Entry::new();
        assert!(!e.continue_last(" ", "orphan"));
        e.push_value("description", "first");
        assert!(e.continue_last(" ", "second"));
        assert_eq!(e.values("description").unwrap(), ["first second"]);
    }
}
