// src/pipeline/normalize.rs

//! Record normalization.
//!
//! Turns an untrusted raw candidate into a canonical [`EnforcementRecord`]
//! with a stable identity key. Pure: no network or storage access, so it is
//! independently testable.

use chrono::NaiveDate;
use sha2::{Digest, Sha256};

use crate::error::{AppError, Result};
use crate::models::{EnforcementRecord, RawRecord};
use crate::utils::text::{canonicalize, collapse_whitespace};

/// Date format used on ICO action pages, e.g. "21 December 2017".
const SOURCE_DATE_FORMAT: &str = "%d %B %Y";

/// Normalize one raw candidate into a canonical record.
///
/// Fails when an identity-forming field (`title`, `date`, `url`) is missing
/// or the date is unparseable. All other fields are optional.
pub fn normalize(raw: &RawRecord, run_id: &str) -> Result<EnforcementRecord> {
    let organisation = collapse_whitespace(required(raw, "title")?);
    let source_url = required(raw, "url")?.to_string();
    let date = parse_date(required(raw, "date")?)?;

    let summary = raw
        .get("description")
        .map(collapse_whitespace)
        .unwrap_or_default();
    let kind = raw.get("kind").map(str::to_string);
    let pdf_url = raw.get("pdf_url").map(str::to_string);
    let penalty_amount = raw
        .get("penalty_amount")
        .map(str::to_string)
        .or_else(|| extract_amount(&summary));

    // The PDF id survives site URL reshuffles; fall back to the page URL
    // for actions that never had a document linked.
    let reference = raw
        .get("pdf_id")
        .map(str::to_string)
        .unwrap_or_else(|| source_url.clone());
    let identity_key = derive_identity_key(&organisation, &date, &reference);

    Ok(EnforcementRecord {
        identity_key,
        organisation,
        date,
        kind,
        penalty_amount,
        summary,
        source_url,
        pdf_url,
        first_seen_run_id: run_id.to_string(),
    })
}

/// Derive the stable identity key for a record.
///
/// Identity fields are lowercased and whitespace-collapsed first, so page
/// re-renders that only touch casing or spacing keep the same key.
pub fn derive_identity_key(organisation: &str, date: &str, reference: &str) -> String {
    let canonical = format!(
        "{}|{}|{}",
        canonicalize(organisation),
        canonicalize(date),
        canonicalize(reference)
    );
    hex::encode(Sha256::digest(canonical.as_bytes()))
}

fn required<'a>(raw: &'a RawRecord, field: &str) -> Result<&'a str> {
    raw.get(field)
        .ok_or_else(|| AppError::normalize(field, "missing required field"))
}

/// Parse a source date into ISO form. Already-ISO dates pass through.
fn parse_date(s: &str) -> Result<String> {
    let cleaned = collapse_whitespace(s);
    let parsed = NaiveDate::parse_from_str(&cleaned, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&cleaned, SOURCE_DATE_FORMAT));
    match parsed {
        Ok(date) => Ok(date.format("%Y-%m-%d").to_string()),
        Err(e) => Err(AppError::normalize(
            "date",
            format!("unparseable date '{cleaned}': {e}"),
        )),
    }
}

/// First sterling amount mentioned in the text, e.g. "£400,000".
fn extract_amount(text: &str) -> Option<String> {
    let pattern = regex::Regex::new(r"£[0-9][0-9,]*(?:\.[0-9]{2})?").ok()?;
    pattern.find(text).map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_raw() -> RawRecord {
        RawRecord::new()
            .with("url", "https://ico.org.uk/action-weve-taken/enforcement/acme-ltd/")
            .with("title", "Acme Ltd")
            .with("date", "21 December 2017")
            .with("description", "Acme Ltd was fined £400,000 for nuisance calls.")
            .with("pdf_id", "2014253")
            .with("kind", "monetary-penalty")
    }

    #[test]
    fn test_normalize_full_record() {
        let record = normalize(&sample_raw(), "run1").unwrap();
        assert_eq!(record.organisation, "Acme Ltd");
        assert_eq!(record.date, "2017-12-21");
        assert_eq!(record.kind.as_deref(), Some("monetary-penalty"));
        assert_eq!(record.penalty_amount.as_deref(), Some("£400,000"));
        assert_eq!(record.first_seen_run_id, "run1");
        assert_eq!(record.identity_key.len(), 64);
    }

    #[test]
    fn test_identity_stable_under_whitespace_and_case() {
        let a = normalize(&sample_raw(), "run1").unwrap();

        let mut variant = sample_raw();
        variant.set("title", "  ACME \n Ltd ");
        let b = normalize(&variant, "run2").unwrap();

        assert_eq!(a.identity_key, b.identity_key);
    }

    #[test]
    fn test_identity_differs_for_different_reference() {
        let a = normalize(&sample_raw(), "run1").unwrap();

        let mut other = sample_raw();
        other.set("pdf_id", "9999999");
        let b = normalize(&other, "run1").unwrap();

        assert_ne!(a.identity_key, b.identity_key);
    }

    #[test]
    fn test_missing_title_is_error() {
        let mut raw = sample_raw();
        raw.set("title", "");
        let err = normalize(&raw, "run1").unwrap_err();
        assert!(matches!(err, AppError::Normalize { .. }));
    }

    #[test]
    fn test_unparseable_date_is_error() {
        let mut raw = sample_raw();
        raw.set("date", "sometime last winter");
        let err = normalize(&raw, "run1").unwrap_err();
        assert!(matches!(err, AppError::Normalize { .. }));
    }

    #[test]
    fn test_iso_date_passes_through() {
        let mut raw = sample_raw();
        raw.set("date", "2017-12-21");
        let record = normalize(&raw, "run1").unwrap();
        assert_eq!(record.date, "2017-12-21");
    }

    #[test]
    fn test_url_fallback_reference_when_no_pdf() {
        let raw = RawRecord::new()
            .with("url", "https://ico.org.uk/action-weve-taken/enforcement/no-pdf/")
            .with("title", "No Pdf Ltd")
            .with("date", "1 March 2018");
        let record = normalize(&raw, "run1").unwrap();
        assert_eq!(record.pdf_url, None);
        assert!(!record.identity_key.is_empty());
    }

    #[test]
    fn test_extract_amount() {
        assert_eq!(
            extract_amount("fined £1,250,000 today"),
            Some("£1,250,000".to_string())
        );
        assert_eq!(extract_amount("no amount here"), None);
    }
}
