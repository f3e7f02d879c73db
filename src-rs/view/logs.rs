use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::task::LogRecord;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub name: String,
    pub last_modified: Option<DateTime<Utc>>,
    pub text: String,
}

/// Flattens log sources into display entries, keeping the caller's order.
///
/// A source with no text still yields an entry so the page shows an empty
/// block for it; an empty input yields an empty list.
pub fn assemble<I, S>(sources: I) -> Vec<LogEntry>
where
    I: IntoIterator<Item = (S, LogRecord)>,
    S: Into<String>,
{
    sources
        .into_iter()
        .map(|(name, record)| LogEntry {
            name: name.into(),
            last_modified: record.last_modified,
            text: record.text.unwrap_or_default(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn no_sources_yield_no_entries() {
        let entries = assemble(Vec::<(String, LogRecord)>::new());
        assert!(entries.is_empty());
    }

    #[test]
    fn empty_text_is_kept() {
        let entries = assemble(vec![(
            "stdout",
            LogRecord {
                last_modified: None,
                text: Some(String::new()),
            },
        )]);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "stdout");
        assert_eq!(entries[0].text, "");
    }

    #[test]
    fn missing_text_becomes_empty_block() {
        let entries = assemble(vec![("stderr", LogRecord::default())]);
        assert_eq!(entries[0].text, "");
        assert_eq!(entries[0].last_modified, None);
    }

    #[test]
    fn order_follows_input() {
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let entries = assemble(vec![
            (
                "worker".to_string(),
                LogRecord {
                    last_modified: Some(at),
                    text: Some("b".into()),
                },
            ),
            ("agent".to_string(), LogRecord::default()),
        ]);
        let names: Vec<&str> = entries.iter().map(|entry| entry.name.as_str()).collect();
        assert_eq!(names, vec!["worker", "agent"]);
        assert_eq!(entries[0].last_modified, Some(at));
    }
}
