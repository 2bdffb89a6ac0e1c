//! Normalized condition names.
//!
//! Conditions are compared by their normalized form: surrounding whitespace
//! removed, internal whitespace collapsed to one space, lowercased. Two
//! spellings that differ only in case or spacing are the same condition.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConditionName(String);

impl ConditionName {
    /// Normalize a raw condition string. Returns `None` for blank input.
    pub fn new(raw: &str) -> Option<Self> {
        let normalized = normalize_condition(raw);
        if normalized.is_empty() {
            None
        } else {
            Some(Self(normalized))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConditionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for ConditionName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ConditionName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::new(&raw).ok_or_else(|| serde::de::Error::custom("condition name must not be blank"))
    }
}

/// Ordered set of normalized conditions.
pub type ConditionSet = BTreeSet<ConditionName>;

/// Build a condition set from raw strings, dropping blanks and duplicates.
pub fn condition_set<I, S>(raw: I) -> ConditionSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw.into_iter()
        .filter_map(|value| ConditionName::new(value.as_ref()))
        .collect()
}

/// Join condition names with `", "` in set order.
pub fn join_conditions<'a, I>(conditions: I) -> String
where
    I: IntoIterator<Item = &'a ConditionName>,
{
    conditions
        .into_iter()
        .map(ConditionName::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn normalize_condition(raw: &str) -> String {
    raw.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}
