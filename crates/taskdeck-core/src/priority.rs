use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

use crate::error::StoreError;

/// Priority of a task.
///
/// Variants are declared in rank order, so the derived `Ord` sorts
/// `High` before `Medium` before `Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    /// Most urgent.
    High,
    /// Default middle ground.
    Medium,
    /// Can wait.
    Low,
}

impl Priority {
    /// Every priority in rank order.
    pub const ALL: [Self; 3] = [Self::High, Self::Medium, Self::Low];

    /// Canonical title-case label, as written to disk.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(StoreError::validation("priority must not be empty"));
        }
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| {
                StoreError::validation(format!(
                    "unknown priority '{trimmed}' (expected High, Medium or Low)"
                ))
            })
    }
}

impl Serialize for Priority {
    fn serialize<S>(&self, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D>(d: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() -> Result<(), StoreError> {
        assert_eq!("high".parse::<Priority>()?, Priority::High);
        assert_eq!(" LOW ".parse::<Priority>()?, Priority::Low);
        assert_eq!("mEdIuM".parse::<Priority>()?, Priority::Medium);
        Ok(())
    }

    #[test]
    fn rejects_unknown_and_empty_values() {
        assert!(matches!(
            "urgent".parse::<Priority>(),
            Err(StoreError::Validation(_))
        ));
        assert!(matches!("".parse::<Priority>(), Err(StoreError::Validation(_))));
        assert!(matches!("   ".parse::<Priority>(), Err(StoreError::Validation(_))));
    }

    #[test]
    fn sorts_high_to_low() {
        let mut all = vec![Priority::Low, Priority::High, Priority::Medium];
        all.sort();
        assert_eq!(all, Priority::ALL);
        assert!(Priority::High < Priority::Medium);
    }

    #[test]
    fn serializes_in_title_case() -> Result<(), serde_json::Error> {
        assert_eq!(serde_json::to_string(&Priority::Medium)?, "\"Medium\"");
        let parsed: Priority = serde_json::from_str("\"low\"")?;
        assert_eq!(parsed, Priority::Low);
        assert!(serde_json::from_str::<Priority>("\"someday\"").is_err());
        Ok(())
    }
}
