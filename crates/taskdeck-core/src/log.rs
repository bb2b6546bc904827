use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{convert::Infallible, fmt, str::FromStr};
use time::Date;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use crate::error::StoreError;

/// ISO calendar date format used in log entries (`YYYY-MM-DD`).
pub const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

const SEPARATOR: &str = ": ";

/// Parse a `YYYY-MM-DD` date.
///
/// # Errors
/// Returns [`StoreError::Validation`] when the input is not a valid calendar date.
pub fn parse_date(input: &str) -> Result<Date, StoreError> {
    Date::parse(input.trim(), DATE_FORMAT)
        .map_err(|err| StoreError::validation(format!("invalid date '{input}': {err}")))
}

/// Format a date as `YYYY-MM-DD`.
#[must_use]
pub fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT).unwrap_or_else(|_| date.to_string())
}

/// A dated progress note attached to a task.
///
/// Kept as a `(date, text)` pair and rendered as `"<date>: <text>"` for
/// display and on disk. Entries read from disk whose prefix is not a valid
/// date are kept verbatim as undated text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    date: Option<Date>,
    text: String,
}

impl LogEntry {
    /// Create a dated entry.
    pub fn new(date: Date, text: impl Into<String>) -> Self {
        Self {
            date: Some(date),
            text: text.into(),
        }
    }

    /// Create an entry with no date prefix.
    pub fn undated(text: impl Into<String>) -> Self {
        Self {
            date: None,
            text: text.into(),
        }
    }

    /// Date the entry was logged for, if known.
    #[must_use]
    pub const fn date(&self) -> Option<Date> {
        self.date
    }

    /// Free-form note text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the text and keep the date.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.date {
            Some(date) => write!(f, "{}{SEPARATOR}{}", format_date(date), self.text),
            None => f.write_str(&self.text),
        }
    }
}

impl FromStr for LogEntry {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Only a canonical date prefix is structured; anything else stays verbatim.
        let dated = s.split_once(SEPARATOR).and_then(|(head, rest)| {
            Date::parse(head, DATE_FORMAT)
                .ok()
                .filter(|date| format_date(*date) == head)
                .map(|date| Self::new(date, rest))
        });
        Ok(dated.unwrap_or_else(|| Self::undated(s)))
    }
}

impl Serialize for LogEntry {
    fn serialize<S>(&self, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for LogEntry {
    fn deserialize<D>(d: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(d)?;
        let Ok(entry) = s.parse::<Self>();
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn renders_date_and_text() {
        let entry = LogEntry::new(date!(2024 - 01 - 01), "x");
        assert_eq!(entry.to_string(), "2024-01-01: x");
    }

    #[test]
    fn parses_dated_string() {
        let Ok(entry) = "2024-09-01: wrote the parser".parse::<LogEntry>();
        assert_eq!(entry.date(), Some(date!(2024 - 09 - 01)));
        assert_eq!(entry.text(), "wrote the parser");
    }

    #[test]
    fn text_may_contain_separator() {
        let Ok(entry) = "2024-09-01: note: keep this".parse::<LogEntry>();
        assert_eq!(entry.text(), "note: keep this");
        assert_eq!(entry.to_string(), "2024-09-01: note: keep this");
    }

    #[test]
    fn invalid_prefix_is_kept_verbatim() {
        let Ok(entry) = "yesterday: did stuff".parse::<LogEntry>();
        assert_eq!(entry.date(), None);
        assert_eq!(entry.to_string(), "yesterday: did stuff");

        let Ok(entry) = "2024-13-45: bad month".parse::<LogEntry>();
        assert_eq!(entry.date(), None);
        assert_eq!(entry.text(), "2024-13-45: bad month");
    }

    #[test]
    fn non_canonical_date_prefix_round_trips_verbatim() {
        for raw in ["+2024-01-01: shipped", "02024-01-01: shipped"] {
            let Ok(entry) = raw.parse::<LogEntry>();
            assert_eq!(entry.date(), None, "{raw}");
            assert_eq!(entry.to_string(), raw);
        }
    }

    #[test]
    fn set_text_keeps_date() {
        let mut entry = LogEntry::new(date!(2023 - 12 - 31), "draft");
        entry.set_text("final");
        assert_eq!(entry.to_string(), "2023-12-31: final");
    }

    #[test]
    fn parse_date_rejects_garbage() {
        assert!(parse_date("2024-02-30").is_err());
        assert!(parse_date("next week").is_err());
        assert!(matches!(parse_date(" 2024-02-29 "), Ok(d) if d == date!(2024 - 02 - 29)));
    }

    #[test]
    fn serializes_as_combined_string() -> Result<(), serde_json::Error> {
        let entry = LogEntry::new(date!(2024 - 05 - 06), "shipped");
        assert_eq!(serde_json::to_string(&entry)?, "\"2024-05-06: shipped\"");
        let back: LogEntry = serde_json::from_str("\"2024-05-06: shipped\"")?;
        assert_eq!(back, entry);
        Ok(())
    }
}
