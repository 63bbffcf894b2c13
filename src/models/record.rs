//! Enforcement record data structures.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Untrusted field mapping produced by a source adapter.
///
/// Keys and values are whatever the adapter scraped off the page. Nothing
/// here is validated; the normalizer is the sole translation boundary into
/// [`EnforcementRecord`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    fields: BTreeMap<String, String>,
}

impl RawRecord {
    /// Create an empty raw record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field value, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Builder-style variant of [`set`](Self::set).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Get a field, trimmed. Missing and whitespace-only values are both None.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

/// A canonical enforcement action, as persisted and announced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnforcementRecord {
    /// Stable identity across runs, derived from organisation, date and
    /// document reference
    pub identity_key: String,

    /// Name of the organisation the action was taken against
    pub organisation: String,

    /// Action date, ISO `YYYY-MM-DD`
    pub date: String,

    /// Action kind (enforcement-notice, monetary-penalty, undertaking)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Penalty amount as printed on the page, e.g. "£400,000"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub penalty_amount: Option<String>,

    /// First paragraph of the action description
    pub summary: String,

    /// Full URL of the action page
    pub source_url: String,

    /// URL of the linked decision PDF, when the page has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,

    /// Run in which this record was first persisted; set once, never mutated
    pub first_seen_run_id: String,
}

impl EnforcementRecord {
    /// Format the record for display using a template.
    ///
    /// Supported placeholders:
    /// - `{organisation}`, `{date}`, `{kind}`, `{amount}`
    /// - `{summary}`, `{link}`
    pub fn format(&self, template: &str) -> String {
        let kind = self
            .kind
            .as_deref()
            .unwrap_or("enforcement action")
            .replace('-', " ");
        template
            .replace("{organisation}", &self.organisation)
            .replace("{date}", &self.date)
            .replace("{kind}", &kind)
            .replace("{amount}", self.penalty_amount.as_deref().unwrap_or(""))
            .replace("{summary}", &self.summary)
            .replace("{link}", &self.source_url)
    }
}
