//! Run-wide counters and dedup tracking
//!
//! `RunState` is the single owner of everything workers share: the seen-key
//! set and the saved/pending counters. All of it sits behind one lock, so a
//! dedup check and the counter update it guards can never interleave with
//! another worker's.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Identity of a frontier task within one run
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DedupKey {
    /// A detail page, keyed by its posting identifier (or its URL when none
    /// can be derived)
    Detail(String),

    /// A list page, keyed by page number within a scope (the keyword for
    /// search pages, the seed URL otherwise)
    ListPage { scope: String, page: u32 },
}

/// Result of offering a detail task to the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Accepted,
    Duplicate,
    CeilingReached,
}

/// Point-in-time copy of the run counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunCounters {
    /// Records accepted by the result sink
    pub saved: usize,

    /// Detail tasks enqueued and not yet resolved
    pub pending_details: usize,

    /// Detail tasks enqueued over the whole run
    pub details_enqueued: usize,

    /// List pages whose discovery step completed
    pub list_pages: usize,

    /// Tasks rejected because their key was already seen
    pub duplicates: usize,

    /// Detail pages dropped for lack of a title
    pub discarded: usize,

    /// Tasks abandoned after a permanent failure or an exhausted retry budget
    pub failed: usize,
}

#[derive(Debug, Default)]
struct Inner {
    counters: RunCounters,
    seen: HashSet<DedupKey>,
}

/// Shared run state
#[derive(Debug)]
pub struct RunState {
    target: usize,
    inner: Mutex<Inner>,
}

impl RunState {
    /// Creates the state for a run that stops after `target` saved records
    pub fn new(target: usize) -> Self {
        Self {
            target,
            inner: Mutex::new(Inner::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Every critical section leaves the counters consistent, so a
        // poisoned lock still holds valid data
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The target record count
    pub fn target(&self) -> usize {
        self.target
    }

    /// Marks a key as seen; returns false if it already was
    pub fn admit(&self, key: DedupKey) -> bool {
        let mut inner = self.lock();
        if inner.seen.insert(key) {
            true
        } else {
            inner.counters.duplicates += 1;
            false
        }
    }

    /// Offers a detail task, enforcing the ceiling before dedup
    ///
    /// A detail task is admitted only while
    /// `saved + pending_details < target`; an admitted task holds a pending
    /// slot until it is resolved.
    pub fn admit_detail(&self, key: DedupKey) -> Admission {
        let mut inner = self.lock();

        if inner.counters.saved + inner.counters.pending_details >= self.target {
            return Admission::CeilingReached;
        }

        if !inner.seen.insert(key) {
            inner.counters.duplicates += 1;
            return Admission::Duplicate;
        }

        inner.counters.pending_details += 1;
        inner.counters.details_enqueued += 1;
        Admission::Accepted
    }

    /// Returns true while more detail tasks may be admitted
    pub fn detail_capacity_left(&self) -> bool {
        let inner = self.lock();
        inner.counters.saved + inner.counters.pending_details < self.target
    }

    /// Counts a saved record and resolves its detail slot
    ///
    /// Returns the new saved count, or `None` if the target was already met
    /// (the record must then be dropped).
    pub fn record_saved(&self) -> Option<usize> {
        let mut inner = self.lock();
        inner.counters.pending_details = inner.counters.pending_details.saturating_sub(1);

        if inner.counters.saved >= self.target {
            return None;
        }

        inner.counters.saved += 1;
        Some(inner.counters.saved)
    }

    /// Resolves a detail slot for a page discarded for lack of a title
    pub fn record_discarded(&self) {
        let mut inner = self.lock();
        inner.counters.pending_details = inner.counters.pending_details.saturating_sub(1);
        inner.counters.discarded += 1;
    }

    /// Resolves a detail slot without counting anything else
    pub fn release_detail(&self) {
        let mut inner = self.lock();
        inner.counters.pending_details = inner.counters.pending_details.saturating_sub(1);
    }

    /// Counts an abandoned task
    pub fn record_failure(&self) {
        self.lock().counters.failed += 1;
    }

    /// Counts a list page whose discovery step completed
    pub fn record_list_page(&self) {
        self.lock().counters.list_pages += 1;
    }

    /// Records accepted so far
    pub fn saved_count(&self) -> usize {
        self.lock().counters.saved
    }

    /// Returns true once the target record count is met
    pub fn target_reached(&self) -> bool {
        self.saved_count() >= self.target
    }

    /// Copies the current counters
    pub fn snapshot(&self) -> RunCounters {
        self.lock().counters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn detail(id: &str) -> DedupKey {
        DedupKey::Detail(id.to_string())
    }

    #[test]
    fn test_admit_dedups() {
        let state = RunState::new(10);
        let key = DedupKey::ListPage {
            scope: "developer".to_string(),
            page: 1,
        };

        assert!(state.admit(key.clone()));
        assert!(!state.admit(key));
        assert_eq!(state.snapshot().duplicates, 1);
    }

    #[test]
    fn test_list_pages_scoped() {
        let state = RunState::new(10);
        assert!(state.admit(DedupKey::ListPage {
            scope: "a".to_string(),
            page: 1
        }));
        assert!(state.admit(DedupKey::ListPage {
            scope: "b".to_string(),
            page: 1
        }));
    }

    #[test]
    fn test_detail_ceiling() {
        let state = RunState::new(2);

        assert_eq!(state.admit_detail(detail("1")), Admission::Accepted);
        assert_eq!(state.admit_detail(detail("1")), Admission::Duplicate);
        assert_eq!(state.admit_detail(detail("2")), Admission::Accepted);
        assert_eq!(state.admit_detail(detail("3")), Admission::CeilingReached);
        assert!(!state.detail_capacity_left());

        // A discarded posting frees its slot
        state.record_discarded();
        assert!(state.detail_capacity_left());
        assert_eq!(state.admit_detail(detail("3")), Admission::Accepted);
    }

    #[test]
    fn test_saved_does_not_double_count() {
        let state = RunState::new(2);
        state.admit_detail(detail("1"));
        state.admit_detail(detail("2"));

        assert_eq!(state.record_saved(), Some(1));
        let counters = state.snapshot();
        assert_eq!(counters.saved, 1);
        assert_eq!(counters.pending_details, 1);
        assert_eq!(state.admit_detail(detail("3")), Admission::CeilingReached);

        assert_eq!(state.record_saved(), Some(2));
        assert!(state.target_reached());
        assert_eq!(state.record_saved(), None);
        assert_eq!(state.saved_count(), 2);
    }

    #[test]
    fn test_release_and_failure() {
        let state = RunState::new(5);
        state.admit_detail(detail("1"));
        state.release_detail();
        state.record_failure();
        state.record_list_page();

        let counters = state.snapshot();
        assert_eq!(counters.pending_details, 0);
        assert_eq!(counters.failed, 1);
        assert_eq!(counters.list_pages, 1);
        assert_eq!(counters.details_enqueued, 1);
    }

    #[test]
    fn test_concurrent_admission_is_serialized() {
        let state = Arc::new(RunState::new(1_000));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let state = Arc::clone(&state);
                std::thread::spawn(move || {
                    (0..200)
                        .filter(|i| state.admit_detail(detail(&i.to_string())) == Admission::Accepted)
                        .count()
                })
            })
            .collect();

        let accepted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(accepted, 200);
        assert_eq!(state.snapshot().details_enqueued, 200);
    }
}
