// src/pipeline/run.rs

//! Run coordinator.
//!
//! Drives one end-to-end pass: fetch → normalize → diff → persist → notify.
//! Every candidate is persisted before the first publish call, so a crash
//! between those phases replays as a quiet no-op run instead of a double
//! post. The price is the inverse gap: a record persisted right before a
//! crash is never announced.

use chrono::Utc;

use crate::error::Result;
use crate::models::{Config, RunState, RunSummary};
use crate::notify::{self, Publisher};
use crate::pipeline::{diff, normalize};
use crate::source::EnforcementSource;
use crate::store::RecordStore;

/// Execute one run against the injected collaborators.
///
/// Fatal outcomes (fetch transport failure, store failure) return `Err` and
/// leave the run in `FAILED`; per-record problems (malformed candidates,
/// publish failures) are absorbed into the summary and the run ends `DONE`.
pub async fn run_once(
    source: &dyn EnforcementSource,
    store: &dyn RecordStore,
    publisher: &dyn Publisher,
    config: &Config,
) -> Result<RunSummary> {
    let started_at = Utc::now();
    let run_id = started_at.format("%Y%m%dT%H%M%SZ").to_string();
    log::info!("Run {} starting", run_id);

    let mut state = RunState::Fetching;
    log::debug!("Run {} state: {}", run_id, state);
    let raw_candidates = match source.fetch_candidates().await {
        Ok(raw) => raw,
        Err(e) => {
            log::error!(
                "Run {} {} while fetching, store untouched: {}",
                run_id,
                RunState::Failed,
                e
            );
            return Err(e);
        }
    };
    let fetched = raw_candidates.len();
    log::info!("Run {}: fetched {} candidates", run_id, fetched);

    state = RunState::Normalizing;
    log::debug!("Run {} state: {}", run_id, state);
    let mut candidates = Vec::with_capacity(fetched);
    let mut malformed = 0;
    for raw in &raw_candidates {
        match normalize::normalize(raw, &run_id) {
            Ok(record) => candidates.push(record),
            Err(e) => {
                malformed += 1;
                log::warn!("Run {}: skipping malformed candidate: {}", run_id, e);
            }
        }
    }

    state = RunState::Diffing;
    log::debug!("Run {} state: {}", run_id, state);
    let known_keys = match store.known_keys().await {
        Ok(keys) => keys,
        Err(e) => {
            log::error!(
                "Run {} {} reading known keys, store untouched: {}",
                run_id,
                RunState::Failed,
                e
            );
            return Err(e);
        }
    };
    let diff = diff::partition(candidates, &known_keys);
    log::info!(
        "Run {}: {} new, {} known",
        run_id,
        diff.new.len(),
        diff.known.len()
    );

    // All candidates are committed before the first publish call. Notifying
    // first would risk unbounded duplicate posts on crash-retry.
    state = RunState::Persisting;
    log::debug!("Run {} state: {}", run_id, state);
    let mut persisted = 0usize;
    for record in diff.new.iter().chain(diff.known.iter()) {
        if let Err(e) = store.upsert(record).await {
            log::error!(
                "Run {} {} mid-persist after {} of {} upserts; \
                 store state is unknown, reconcile manually: {}",
                run_id,
                RunState::Failed,
                persisted,
                diff.total(),
                e
            );
            return Err(e);
        }
        persisted += 1;
    }
    log::info!("Run {}: persisted {} records", run_id, persisted);

    // Publish failures never fail the run and never roll back the store:
    // the record stays known and is reported as a delivery gap.
    state = RunState::Notifying;
    log::debug!("Run {} state: {}", run_id, state);
    let outcomes = notify::announce(&diff.new, publisher, &config.notify).await;

    state = RunState::Done;
    let summary = RunSummary {
        run_id,
        state,
        started_at,
        finished_at: Utc::now(),
        fetched,
        malformed,
        new_records: diff.new.len(),
        known_records: diff.known.len(),
        outcomes,
    };
    log_summary(&summary);
    Ok(summary)
}

fn log_summary(summary: &RunSummary) {
    log::info!(
        "Run {} {}: {} fetched, {} malformed, {} new, {} known, {} announced",
        summary.run_id,
        summary.state,
        summary.fetched,
        summary.malformed,
        summary.new_records,
        summary.known_records,
        summary.sent_count()
    );

    let gaps = summary.delivery_gaps();
    if !gaps.is_empty() {
        log::warn!(
            "Run {}: {} record(s) stored but not announced and will not be \
             retried: {}",
            summary.run_id,
            gaps.len(),
            gaps.join(", ")
        );
    }
}
