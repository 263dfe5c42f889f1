use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::instant::{self, RawInstant};

/// Dated free-text log entry; each one adds its own ledger row and XP on
/// the day it was written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub date: Option<RawInstant>,
    #[serde(default, alias = "isPinned")]
    pub pinned: bool,
}

impl JournalEntry {
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        date: impl Into<RawInstant>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            date: Some(date.into()),
            pinned: false,
        }
    }

    pub fn written_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        instant::normalize(self.date.as_ref(), now)
    }
}

pub fn sort_recent_first(entries: &mut [JournalEntry], now: DateTime<Utc>) {
    entries.sort_by_key(|entry| Reverse(entry.written_at(now)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(text: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(text)
            .expect("valid rfc3339 fixture")
            .with_timezone(&Utc)
    }

    #[test]
    fn orders_entries_newest_first() {
        let now = at("2024-05-10T00:00:00Z");
        let mut entries = vec![
            JournalEntry::new("a", "first", at("2024-05-01T08:00:00Z")),
            JournalEntry::new("b", "third", at("2024-05-06T08:00:00Z")),
            JournalEntry::new("c", "second", at("2024-05-03T08:00:00Z")),
        ];
        sort_recent_first(&mut entries, now);
        let ids: Vec<&str> = entries.iter().map(|entry| entry.id.as_str()).collect();
        assert_eq!(ids, ["b", "c", "a"]);
    }

    #[test]
    fn decodes_pin_alias() {
        let entry: JournalEntry = serde_json::from_str(
            "{\"id\": \"j1\", \"text\": \"made it\", \"date\": \"2024-05-01\", \"isPinned\": true}",
        )
        .expect("journal export row");
        assert!(entry.pinned);
        assert_eq!(entry.text, "made it");
    }
}
