use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Internal identity of a task, stable across renames.
///
/// Serialized as the hyphenated UUID string.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Time-ordered (v7) id for a newly created or restored task.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

impl FromStr for TaskId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::try_parse(s).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_ids_are_v7_and_distinct() {
        let a = TaskId::new();
        let b = TaskId::default();
        assert_eq!(a.0.get_version_num(), 7);
        assert_ne!(a, b);
    }

    #[test]
    fn display_form_parses_back() {
        let id = TaskId::new();
        let parsed: TaskId = id.to_string().parse().expect("must parse task id");
        assert_eq!(parsed, id);
    }

    #[test]
    fn json_form_is_the_display_string() {
        let id = TaskId::new();
        let json = serde_json::to_string(&id).expect("serialize id");
        assert_eq!(json, format!("\"{id}\""));
        let back: TaskId = serde_json::from_str(&json).expect("deserialize id");
        assert_eq!(back, id);
    }

    #[test]
    fn malformed_ids_are_rejected() {
        assert!("not-a-uuid".parse::<TaskId>().is_err());
        assert!(serde_json::from_str::<TaskId>("\"task-1\"").is_err());
    }
}
