//! Frontier and scheduler for the crawl session
//!
//! This module handles:
//! - The FIFO queue of pending requests
//! - Session-wide deduplication on normalized URLs
//! - Tracking in-flight requests for termination
//! - Global concurrency limiting via a semaphore

use crate::crawler::Request;
use crate::url::normalize_url;
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Pending, in-flight and seen requests for one crawl session
///
/// A normalized URL is accepted at most once per session, whether it is still
/// pending, in flight or already finished. All methods take `&self` and are
/// safe to call from concurrent tasks.
#[derive(Debug, Default)]
pub struct Frontier {
    inner: Mutex<FrontierState>,
}

#[derive(Debug, Default)]
struct FrontierState {
    pending: VecDeque<Request>,
    seen: HashSet<String>,
    in_flight: usize,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, FrontierState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Dedup key for a request
    ///
    /// Falls back to the raw URL when it cannot be normalized.
    pub fn fingerprint(request: &Request) -> String {
        normalize_url(request.url().as_str())
            .map(String::from)
            .unwrap_or_else(|_| request.url().to_string())
    }

    /// Adds a request unless its normalized URL was seen this session
    ///
    /// # Returns
    ///
    /// * `true` - The request was queued
    /// * `false` - A request for the same normalized URL was already accepted
    pub fn enqueue(&self, request: Request) -> bool {
        let key = Self::fingerprint(&request);
        let mut state = self.state();

        if !state.seen.insert(key) {
            tracing::trace!("Skipping duplicate {}", request.url());
            return false;
        }

        state.pending.push_back(request);
        true
    }

    /// Takes the oldest pending request and marks it in flight
    pub fn dispatch(&self) -> Option<Request> {
        let mut state = self.state();
        let request = state.pending.pop_front()?;
        state.in_flight += 1;
        Some(request)
    }

    /// Marks one dispatched request as finished
    pub fn complete(&self) {
        let mut state = self.state();
        state.in_flight = state.in_flight.saturating_sub(1);
    }

    /// Returns the number of queued requests
    pub fn pending_len(&self) -> usize {
        self.state().pending.len()
    }

    /// Returns the number of dispatched but unfinished requests
    pub fn in_flight(&self) -> usize {
        self.state().in_flight
    }

    /// Returns the number of distinct URLs accepted this session
    pub fn seen_len(&self) -> usize {
        self.state().seen.len()
    }

    /// True when nothing is pending and nothing is in flight
    pub fn is_exhausted(&self) -> bool {
        let state = self.state();
        state.pending.is_empty() && state.in_flight == 0
    }
}

/// A dispatched request with its concurrency permit
///
/// The permit is released when this value is dropped.
pub struct ScheduledFetch {
    pub request: Request,
    pub _permit: OwnedSemaphorePermit,
}

/// Hands out frontier requests while fewer than the configured limit are open
pub struct Scheduler {
    frontier: Arc<Frontier>,
    semaphore: Arc<Semaphore>,
}

impl Scheduler {
    /// Creates a new scheduler
    ///
    /// # Arguments
    ///
    /// * `frontier` - The session's frontier
    /// * `max_concurrent` - Maximum requests in flight at once (at least 1)
    pub fn new(frontier: Arc<Frontier>, max_concurrent: usize) -> Self {
        Self {
            frontier,
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    pub fn frontier(&self) -> &Arc<Frontier> {
        &self.frontier
    }

    /// Gets the next request if a permit is free and the frontier is not empty
    pub fn try_next(&self) -> Option<ScheduledFetch> {
        let permit = Arc::clone(&self.semaphore).try_acquire_owned().ok()?;
        let request = self.frontier.dispatch()?;
        Some(ScheduledFetch {
            request,
            _permit: permit,
        })
    }

    /// Number of permits currently free
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}
