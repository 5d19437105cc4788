//! Last-write-wins holder for the current outdated map
//!
//! Each computation takes a ticket from `begin`. A result is applied only if
//! no newer computation has started since, and a failed computation leaves
//! the previous map in place.

use crate::domain::OutdatedDependencyInfo;
use crate::error::RegistryError;
use crate::outdated::OutdatedAggregator;
use crate::registry::VersionSource;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Holds the most recent outdated map
#[derive(Debug, Default)]
pub struct OutdatedTracker {
    generation: AtomicU64,
    current: Mutex<BTreeMap<String, OutdatedDependencyInfo>>,
}

impl OutdatedTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a computation and return its ticket
    pub fn begin(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Ticket of the newest computation started so far
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Apply the result of the computation holding `ticket`
    ///
    /// Returns true if the map was replaced.
    pub fn complete(
        &self,
        ticket: u64,
        result: Result<BTreeMap<String, OutdatedDependencyInfo>, RegistryError>,
    ) -> bool {
        if ticket != self.generation() {
            debug!(ticket, newest = self.generation(), "discarding superseded result");
            return false;
        }

        match result {
            Ok(outdated) => {
                *self.lock() = outdated;
                true
            }
            Err(e) => {
                debug!(ticket, error = %e, "keeping previous outdated map");
                false
            }
        }
    }

    /// Run one computation through the tracker
    pub async fn refresh<S: VersionSource>(
        &self,
        aggregator: &OutdatedAggregator<S>,
        constraints: &BTreeMap<String, String>,
    ) -> bool {
        let ticket = self.begin();
        let result = aggregator.compute_outdated(constraints).await;
        self.complete(ticket, result)
    }

    /// Snapshot of the current map
    pub fn current(&self) -> BTreeMap<String, OutdatedDependencyInfo> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, OutdatedDependencyInfo>> {
        self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(name: &str, latest: &str) -> BTreeMap<String, OutdatedDependencyInfo> {
        let mut map = BTreeMap::new();
        map.insert(
            name.to_string(),
            OutdatedDependencyInfo::tracking_latest(latest),
        );
        map
    }

    #[test]
    fn test_new_tracker_is_empty() {
        let tracker = OutdatedTracker::new();
        assert!(tracker.current().is_empty());
        assert_eq!(tracker.generation(), 0);
    }

    #[test]
    fn test_complete_applies_newest() {
        let tracker = OutdatedTracker::new();
        let ticket = tracker.begin();
        assert!(tracker.complete(ticket, Ok(map("a", "1.0.0"))));
        assert!(tracker.current().contains_key("a"));
    }

    #[test]
    fn test_superseded_result_discarded() {
        let tracker = OutdatedTracker::new();
        let first = tracker.begin();
        let second = tracker.begin();

        assert!(tracker.complete(second, Ok(map("b", "2.0.0"))));
        // The older computation settles last but must not win
        assert!(!tracker.complete(first, Ok(map("a", "1.0.0"))));
        assert!(tracker.current().contains_key("b"));
        assert!(!tracker.current().contains_key("a"));
    }

    #[test]
    fn test_failure_keeps_previous_map() {
        let tracker = OutdatedTracker::new();
        let ticket = tracker.begin();
        tracker.complete(ticket, Ok(map("a", "1.0.0")));

        let ticket = tracker.begin();
        let applied = tracker.complete(
            ticket,
            Err(RegistryError::unavailable("npm", "connection refused")),
        );
        assert!(!applied);
        assert!(tracker.current().contains_key("a"));
    }
}
