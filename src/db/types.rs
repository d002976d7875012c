// src/db/types.rs
// Row types shared across the store modules

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of CMS entity being reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Page,
    Block,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Page => "page",
            ContentKind::Block => "block",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "page" => Some(ContentKind::Page),
            "block" => Some(ContentKind::Block),
            _ => None,
        }
    }
}

/// A CMS entity (source or translated counterpart).
#[derive(Debug, Clone)]
pub struct ContentItem {
    pub id: i64,
    pub kind: ContentKind,
    pub lang: String,
    pub title: String,
    pub body: String,
    pub slug: String,
    pub status: String,
    pub parent_id: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
}

/// A structured source record in the batch pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_id: String,
    pub name: String,
    /// Free-form field map; the translated subset is governed by the
    /// field registry, everything else passes through untouched.
    pub fields: serde_json::Map<String, Value>,
    pub created_at: Option<DateTime<Utc>>,
}

impl JobRecord {
    /// String value of a field, empty when missing or non-string.
    pub fn field(&self, name: &str) -> &str {
        self.fields
            .get(name)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
    }
}

/// A stored per-language translation of a job record.
#[derive(Debug, Clone)]
pub struct JobTranslation {
    pub job_id: String,
    pub lang: String,
    pub name: String,
    pub fields: serde_json::Map<String, Value>,
    pub slug: String,
    pub src_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// What happened to one (entity, language) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogAction {
    Create,
    Update,
    Skip,
    Error,
    Batch,
    Begin,
    Summary,
}

impl LogAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogAction::Create => "create",
            LogAction::Update => "update",
            LogAction::Skip => "skip",
            LogAction::Error => "error",
            LogAction::Batch => "batch",
            LogAction::Begin => "begin",
            LogAction::Summary => "summary",
        }
    }
}

/// Why it happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStatus {
    Ok,
    Stale,
    Empty,
    Error,
    Info,
}

impl LogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogStatus::Ok => "ok",
            LogStatus::Stale => "stale",
            LogStatus::Empty => "empty",
            LogStatus::Error => "error",
            LogStatus::Info => "info",
        }
    }
}

/// Word/character metrics attached to audit rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextMetrics {
    pub words_title: u64,
    pub chars_title: u64,
    pub words_content: u64,
    pub chars_content: u64,
}

impl TextMetrics {
    pub fn add(&mut self, other: &TextMetrics) {
        self.words_title += other.words_title;
        self.chars_title += other.chars_title;
        self.words_content += other.words_content;
        self.chars_content += other.chars_content;
    }

    pub fn total_words(&self) -> u64 {
        self.words_title + self.words_content
    }

    pub fn total_chars(&self) -> u64 {
        self.chars_title + self.chars_content
    }
}

/// Immutable audit row, as persisted.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub id: i64,
    pub run_id: String,
    pub content_id: i64,
    pub content_kind: String,
    pub source_lang: String,
    pub target_lang: String,
    pub provider: String,
    pub action: String,
    pub status: String,
    pub metrics: TextMetrics,
    pub src_hash: String,
    pub message: String,
    pub created_at: String,
}

/// Audit row before insertion.
#[derive(Debug, Clone)]
pub struct NewLogEntry {
    pub run_id: String,
    pub content_id: i64,
    pub content_kind: String,
    pub source_lang: String,
    pub target_lang: String,
    pub provider: String,
    pub action: LogAction,
    pub status: LogStatus,
    pub metrics: TextMetrics,
    pub src_hash: String,
    pub message: String,
}

impl NewLogEntry {
    /// Entry with everything defaulted except the run, action and status.
    pub fn new(run_id: &str, action: LogAction, status: LogStatus) -> Self {
        Self {
            run_id: run_id.to_string(),
            content_id: 0,
            content_kind: String::new(),
            source_lang: String::new(),
            target_lang: String::new(),
            provider: String::new(),
            action,
            status,
            metrics: TextMetrics::default(),
            src_hash: String::new(),
            message: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_content_kind_round_trip() {
        assert_eq!(ContentKind::parse("page"), Some(ContentKind::Page));
        assert_eq!(ContentKind::parse("block"), Some(ContentKind::Block));
        assert_eq!(ContentKind::parse("job"), None);
        assert_eq!(ContentKind::Page.as_str(), "page");
    }

    #[test]
    fn test_job_record_field_access() {
        let mut fields = serde_json::Map::new();
        fields.insert("title".to_string(), json!("Baker"));
        fields.insert("count".to_string(), json!(3));
        let record = JobRecord {
            job_id: "42".to_string(),
            name: "Baker".to_string(),
            fields,
            created_at: None,
        };
        assert_eq!(record.field("title"), "Baker");
        assert_eq!(record.field("missing"), "");
        // Non-string values read as empty rather than panicking
        assert_eq!(record.field("count"), "");
    }

    #[test]
    fn test_metrics_accumulate() {
        let mut total = TextMetrics::default();
        total.add(&TextMetrics {
            words_title: 2,
            chars_title: 10,
            words_content: 100,
            chars_content: 600,
        });
        total.add(&TextMetrics {
            words_title: 1,
            chars_title: 5,
            words_content: 50,
            chars_content: 300,
        });
        assert_eq!(total.total_words(), 153);
        assert_eq!(total.total_chars(), 915);
    }
}
