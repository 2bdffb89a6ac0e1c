use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Binary eligibility label, persisted as `1` (eligible) or `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Label {
    NotEligible,
    Eligible,
}

impl Label {
    pub fn from_bool(eligible: bool) -> Self {
        if eligible {
            Label::Eligible
        } else {
            Label::NotEligible
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Label::NotEligible),
            1 => Some(Label::Eligible),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Label::NotEligible => 0,
            Label::Eligible => 1,
        }
    }

    pub fn is_eligible(self) -> bool {
        self == Label::Eligible
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Label::NotEligible => "not eligible",
            Label::Eligible => "eligible",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Label {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}

impl<'de> Deserialize<'de> for Label {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = u8::deserialize(deserializer)?;
        Label::from_u8(value)
            .ok_or_else(|| serde::de::Error::custom(format!("label must be 0 or 1, got {value}")))
    }
}

/// Anything carrying an eligibility label, so it can be balanced or split by class.
pub trait Labeled {
    fn label(&self) -> Label;
}

impl Labeled for Label {
    fn label(&self) -> Label {
        *self
    }
}
