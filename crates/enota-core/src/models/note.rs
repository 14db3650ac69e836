//! Note models as returned by `/api/notes/`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A note owned by the signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Note {
    /// Parse an API timestamp. Timestamps without an offset are rejected.
    fn parse_timestamp(value: Option<&str>) -> Option<DateTime<Utc>> {
        value
            .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn created(&self) -> Option<DateTime<Utc>> {
        Self::parse_timestamp(self.created_at.as_deref())
    }

    pub fn updated(&self) -> Option<DateTime<Utc>> {
        Self::parse_timestamp(self.updated_at.as_deref())
    }

    /// Format a timestamp for display, e.g. "Mar 04, 2025 14:30".
    /// Unparseable values are shown as-is.
    pub fn format_timestamp(value: Option<&str>) -> String {
        match (value, Self::parse_timestamp(value)) {
            (_, Some(dt)) => dt.format("%b %d, %Y %H:%M").to_string(),
            (Some(raw), None) => raw.to_string(),
            (None, None) => String::new(),
        }
    }

    /// Relative age of a timestamp: "Just now", "5 minutes ago", "3 hours ago",
    /// "2 days ago", falling back to the full date after a week.
    pub fn relative_time(value: Option<&str>, now: DateTime<Utc>) -> String {
        let Some(dt) = Self::parse_timestamp(value) else {
            return Self::format_timestamp(value);
        };

        let seconds = (now - dt).num_seconds();
        if seconds < 60 {
            // Clock skew lands here too
            "Just now".to_string()
        } else if seconds < 3_600 {
            format!("{} minutes ago", seconds / 60)
        } else if seconds < 86_400 {
            format!("{} hours ago", seconds / 3_600)
        } else if seconds < 604_800 {
            format!("{} days ago", seconds / 86_400)
        } else {
            Self::format_timestamp(value)
        }
    }

    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }

    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }

    pub fn line_count(&self) -> usize {
        self.content.split('\n').count()
    }

    /// Plain-text export: title, blank line, content
    pub fn export_text(&self) -> String {
        format!("{}\n\n{}", self.title, self.content)
    }

    /// File name for an export: whitespace runs become `_`, path separators are dropped
    pub fn export_file_name(&self) -> String {
        let stem = self
            .title
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_")
            .replace(['/', '\\'], "");
        let stem = if stem.is_empty() { format!("note_{}", self.id) } else { stem };
        format!("{}.txt", stem)
    }

    /// Draft pre-filled from this note, for editing
    pub fn to_draft(&self) -> NoteDraft {
        NoteDraft {
            title: self.title.clone(),
            content: self.content.clone(),
        }
    }
}

/// Fields sent when creating or updating a note.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
}

impl NoteDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// Check the draft before sending it; the title may not be blank.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Note title cannot be empty".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn note(created_at: Option<&str>) -> Note {
        Note {
            id: 7,
            title: "Weekly  plan".to_string(),
            content: "buy milk\nwrite  report\n\ncall mom".to_string(),
            created_at: created_at.map(str::to_string),
            updated_at: None,
        }
    }

    #[test]
    fn test_parse_note_from_api() {
        let json = r#"{"id": 3, "title": "Hello", "content": "World", "created_at": "2025-03-04T14:30:00.123456Z"}"#;
        let note: Note = serde_json::from_str(json).unwrap();
        assert_eq!(note.id, 3);
        assert_eq!(note.updated_at, None);
        assert_eq!(
            note.created(),
            Some(Utc.with_ymd_and_hms(2025, 3, 4, 14, 30, 0).unwrap() + Duration::microseconds(123456))
        );
    }

    #[test]
    fn test_relative_time_buckets() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
        let at = |d: Duration| (now - d).to_rfc3339();

        assert_eq!(Note::relative_time(Some(&at(Duration::seconds(30))), now), "Just now");
        assert_eq!(Note::relative_time(Some(&at(Duration::minutes(5))), now), "5 minutes ago");
        assert_eq!(Note::relative_time(Some(&at(Duration::hours(3))), now), "3 hours ago");
        assert_eq!(Note::relative_time(Some(&at(Duration::days(2))), now), "2 days ago");
        assert_eq!(Note::relative_time(Some(&at(Duration::days(8))), now), "Mar 02, 2025 12:00");
        // Future timestamps (clock skew)
        assert_eq!(Note::relative_time(Some(&at(Duration::minutes(-5))), now), "Just now");
    }

    #[test]
    fn test_relative_time_missing_or_invalid() {
        let now = Utc::now();
        assert_eq!(Note::relative_time(None, now), "");
        assert_eq!(Note::relative_time(Some("yesterday"), now), "yesterday");
    }

    #[test]
    fn test_content_stats() {
        let n = note(None);
        assert_eq!(n.word_count(), 6);
        assert_eq!(n.line_count(), 4);
        assert_eq!(n.char_count(), n.content.len());
    }

    #[test]
    fn test_export() {
        let n = note(None);
        assert_eq!(n.export_text(), "Weekly  plan\n\nbuy milk\nwrite  report\n\ncall mom");
        assert_eq!(n.export_file_name(), "Weekly_plan.txt");

        let mut untitled = note(None);
        untitled.title = " / ".to_string();
        assert_eq!(untitled.export_file_name(), "note_7.txt");
    }

    #[test]
    fn test_draft_validation() {
        assert!(NoteDraft::new("Title", "").validate().is_ok());
        assert!(NoteDraft::new("   ", "body").validate().is_err());
        assert_eq!(note(None).to_draft().title, "Weekly  plan");
    }
}
