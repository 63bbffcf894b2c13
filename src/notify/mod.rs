//! Notification dispatch.
//!
//! The coordinator alone decides which records are eligible; this module
//! renders the post text and drives one publish attempt per record,
//! reporting per-record outcomes. No deduplication happens here.

pub mod http;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{EnforcementRecord, NotifyConfig, NotifyOutcome};
use crate::utils::text::truncate_graphemes;

// Re-export for convenience
pub use http::HttpPublisher;

/// A publish transport: one human-readable status per call.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, text: &str) -> Result<()>;
}

/// Publisher that prints to stdout. Used by dry runs.
#[derive(Debug, Default)]
pub struct StdoutPublisher;

#[async_trait]
impl Publisher for StdoutPublisher {
    async fn publish(&self, text: &str) -> Result<()> {
        println!("{}", text);
        Ok(())
    }
}

/// Render the post text for a record, bounded to the transport's maximum.
pub fn render_message(record: &EnforcementRecord, config: &NotifyConfig) -> String {
    let text = record.format(&config.template);
    truncate_graphemes(text.trim(), config.max_length)
}

/// Publish one status per record, in order.
///
/// Failures are recorded, never propagated: a stored record whose publish
/// failed is a delivery gap, handled out-of-band.
pub async fn announce(
    records: &[EnforcementRecord],
    publisher: &dyn Publisher,
    config: &NotifyConfig,
) -> Vec<(String, NotifyOutcome)> {
    let mut outcomes = Vec::with_capacity(records.len());
    for record in records {
        let text = render_message(record, config);
        match publisher.publish(&text).await {
            Ok(()) => {
                log::info!("Announced {} ({})", record.organisation, record.identity_key);
                outcomes.push((record.identity_key.clone(), NotifyOutcome::Sent));
            }
            Err(e) => {
                log::warn!("Delivery gap for {}: {}", record.identity_key, e);
                outcomes.push((
                    record.identity_key.clone(),
                    NotifyOutcome::Failed(e.to_string()),
                ));
            }
        }
    }
    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> EnforcementRecord {
        EnforcementRecord {
            identity_key: "abc".to_string(),
            organisation: "Acme Ltd".to_string(),
            date: "2017-12-21".to_string(),
            kind: Some("monetary-penalty".to_string()),
            penalty_amount: Some("£400,000".to_string()),
            summary: "Fined for nuisance calls.".to_string(),
            source_url: "https://ico.org.uk/a/".to_string(),
            pdf_url: None,
            first_seen_run_id: "run1".to_string(),
        }
    }

    #[test]
    fn test_render_message_uses_template() {
        let config = NotifyConfig::default();
        let text = render_message(&sample_record(), &config);
        assert_eq!(
            text,
            "New ICO monetary penalty: Acme Ltd (2017-12-21) https://ico.org.uk/a/"
        );
    }

    #[test]
    fn test_render_message_truncates() {
        let mut config = NotifyConfig::default();
        config.template = "{summary}".to_string();
        config.max_length = 10;
        let text = render_message(&sample_record(), &config);
        assert_eq!(text, "Fined for…");
    }

    #[tokio::test]
    async fn test_announce_reports_per_record_outcomes() {
        struct FailSecond;

        #[async_trait]
        impl Publisher for FailSecond {
            async fn publish(&self, text: &str) -> Result<()> {
                if text.contains("Globex") {
                    return Err(crate::error::AppError::publish("connection reset"));
                }
                Ok(())
            }
        }

        let mut second = sample_record();
        second.identity_key = "def".to_string();
        second.organisation = "Globex Corp".to_string();

        let config = NotifyConfig::default();
        let outcomes = announce(&[sample_record(), second], &FailSecond, &config).await;

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].1.is_sent());
        assert!(!outcomes[1].1.is_sent());
    }
}
