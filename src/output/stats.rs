//! Per-session crawl statistics
//!
//! Counters are updated by the session loop as requests complete and printed
//! by the binary when the crawl ends.

use crate::state::RequestOutcome;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStats {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,

    /// Count of requests by outcome
    pub outcomes: BTreeMap<RequestOutcome, u64>,

    /// Items handed to the item sink
    pub items_emitted: u64,

    /// Descriptors that failed to parse
    pub malformed_descriptors: u64,

    /// Whether the session stopped on cancellation
    pub cancelled: bool,
}

impl Default for CrawlStats {
    fn default() -> Self {
        Self::new()
    }
}

impl CrawlStats {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            outcomes: BTreeMap::new(),
            items_emitted: 0,
            malformed_descriptors: 0,
            cancelled: false,
        }
    }

    pub fn record(&mut self, outcome: RequestOutcome) {
        *self.outcomes.entry(outcome).or_insert(0) += 1;
    }

    pub fn count(&self, outcome: RequestOutcome) -> u64 {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    /// Requests that were dispatched and reached a terminal outcome
    pub fn completed(&self) -> u64 {
        self.outcomes
            .iter()
            .filter(|(outcome, _)| !outcome.is_skipped())
            .map(|(_, count)| count)
            .sum()
    }

    pub fn errors(&self) -> u64 {
        self.outcomes
            .iter()
            .filter(|(outcome, _)| outcome.is_error())
            .map(|(_, count)| count)
            .sum()
    }

    /// Percentage of dispatched requests that succeeded
    pub fn success_rate(&self) -> f64 {
        let completed = self.completed();
        if completed == 0 {
            return 0.0;
        }
        let succeeded = self.count(RequestOutcome::Processed) + self.count(RequestOutcome::Stored);
        (succeeded as f64 / completed as f64) * 100.0
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStats) {
    println!("=== Crawl Statistics ===\n");

    println!("Run:");
    println!("  Started: {}", stats.started_at.to_rfc3339());
    if let Some(finished) = stats.finished_at {
        println!("  Finished: {}", finished.to_rfc3339());
    }
    if let Some(seconds) = stats.duration_seconds() {
        println!("  Duration: {}s", seconds);
    }
    if stats.cancelled {
        println!("  Stopped early: cancelled");
    }
    println!();

    println!("Requests by Outcome:");
    for outcome in RequestOutcome::ALL {
        let count = stats.count(outcome);
        if count > 0 {
            println!("  {}: {}", outcome, count);
        }
    }
    println!();

    println!("Items emitted: {}", stats.items_emitted);
    if stats.malformed_descriptors > 0 {
        println!("Malformed image descriptors: {}", stats.malformed_descriptors);
    }

    println!(
        "Success Rate: {:.1}% ({} errors across {} dispatched requests)",
        stats.success_rate(),
        stats.errors(),
        stats.completed()
    );
}
