//! Reference set of attribute names expected in a directory schema.
//!
//! The registry is plain data handed to the classifier; callers can start
//! from the built-in set, extend it, or replace it with names read from a
//! file (one per line, `#` comments and blank lines ignored).
use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};

/// Built-in schema fields for user objects in Active Directory exports.
pub const DEFAULT_STANDARD_ATTRIBUTES: &[&str] = &[
    "dn",
    "objectClass",
    "cn",
    "sn",
    "givenName",
    "distinguishedName",
    "instanceType",
    "whenCreated",
    "whenChanged",
    "displayName",
    "uSNCreated",
    "uSNChanged",
    "name",
    "objectGUID",
    "userAccountControl",
    "badPwdCount",
    "codePage",
    "countryCode",
    "badPasswordTime",
    "lastLogoff",
    "lastLogon",
    "pwdLastSet",
    "primaryGroupID",
    "objectSid",
    "adminCount",
    "accountExpires",
    "logonCount",
    "sAMAccountName",
    "sAMAccountType",
    "objectCategory",
    "isCriticalSystemObject",
    "dSCorePropagationData",
    "telephoneNumber",
    "mail",
    "memberOf",
    "description",
    "title",
    "department",
    "company",
    "streetAddress",
    "postalCode",
    "c",
    "l",
    "st",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandardRegistry {
    names: HashSet<String>,
}

impl Default for StandardRegistry {
    fn default() -> Self {
        Self::from_names(DEFAULT_STANDARD_ATTRIBUTES.iter().copied())
    }
}

impl StandardRegistry {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("read registry {}", path.as_ref().display()))?;
        Ok(Self::from_names(parse_registry_names(&contents)))
    }

    pub fn extend<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names.extend(names.into_iter().map(Into::into));
    }

    pub fn merge(&mut self, other: StandardRegistry) {
        self.names.extend(other.names);
    }

    /// Exact, case-sensitive membership test.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

pub fn parse_registry_names(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(|l| l.to_string())
        .collect()
}
