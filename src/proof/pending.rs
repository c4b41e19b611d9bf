//! Pending Commitment Store
//!
//! Holds the actions and nonce behind each outstanding commitment until
//! the matching reveal consumes them. One store lives for the whole bot
//! process and is shared by every transport.
//!
//! Invariant: a tick is present iff it was committed and not yet revealed.
//! Entries have no expiry; a peer that never reveals leaks its entries.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::warn;

use crate::game::action::Action;

/// Simulation tick number.
pub type Tick = u64;

/// Everything needed to reveal one commitment.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingEntry {
    /// Tick the commitment was made for.
    pub tick: Tick,
    /// Actions in execution order.
    pub actions: Vec<Action>,
    /// Hex nonce mixed into the commitment.
    pub nonce: String,
}

impl PendingEntry {
    /// The reveal payload for a tick that was never committed.
    pub fn empty(tick: Tick) -> Self {
        Self { tick, actions: Vec::new(), nonce: String::new() }
    }
}

/// Process-wide map from tick to pending entry.
///
/// Every operation holds the lock for its whole duration, so a concurrent
/// `take` sees either the complete entry or nothing.
#[derive(Debug, Default)]
pub struct PendingStore {
    entries: Mutex<BTreeMap<Tick, PendingEntry>>,
}

impl PendingStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<Tick, PendingEntry>> {
        // Entries are replaced whole, so a panic elsewhere cannot leave one half-written.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the entry for `tick`, replacing any earlier one.
    pub fn put(&self, tick: Tick, actions: Vec<Action>, nonce: String) {
        let previous = self.lock().insert(tick, PendingEntry { tick, actions, nonce });
        if previous.is_some() {
            warn!(tick, "tick re-committed before reveal, previous commitment replaced");
        }
    }

    /// Remove and return the entry for `tick`.
    ///
    /// Returns `None` when the tick was never committed or was already
    /// revealed.
    pub fn take(&self, tick: Tick) -> Option<PendingEntry> {
        self.lock().remove(&tick)
    }

    /// Remove the entry for `tick`, falling back to `([], "")`.
    pub fn take_or_empty(&self, tick: Tick) -> (Vec<Action>, String) {
        let entry = self.take(tick).unwrap_or_else(|| PendingEntry::empty(tick));
        (entry.actions, entry.nonce)
    }

    /// Whether `tick` has an outstanding commitment.
    pub fn contains(&self, tick: Tick) -> bool {
        self.lock().contains_key(&tick)
    }

    /// Number of outstanding commitments.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True when nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Outstanding ticks in ascending order.
    pub fn pending_ticks(&self) -> Vec<Tick> {
        self.lock().keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::action::UpgradeKind;
    use crate::proof::commitment::commit_hash;
    use std::sync::Arc;
    use std::thread;

    fn sample_actions() -> Vec<Action> {
        vec![
            Action::SendFleet { from_id: 1, to_id: 2, energy: 12.5 },
            Action::Upgrade { planet_id: 1, upgrade: UpgradeKind::Speed },
        ]
    }

    #[test]
    fn test_put_then_take() {
        let store = PendingStore::new();
        let actions = sample_actions();
        let digest = commit_hash(&actions, "00ff00ff00ff00ff").unwrap();

        store.put(7, actions.clone(), "00ff00ff00ff00ff".to_string());
        assert!(store.contains(7));

        let entry = store.take(7).unwrap();
        assert_eq!(entry.tick, 7);
        assert_eq!(entry.actions, actions);
        assert_eq!(entry.nonce, "00ff00ff00ff00ff");
        assert_eq!(commit_hash(&entry.actions, &entry.nonce).unwrap(), digest);
        assert!(store.is_empty());
    }

    #[test]
    fn test_take_is_exactly_once() {
        let store = PendingStore::new();
        store.put(3, sample_actions(), "aa".to_string());

        assert!(store.take(3).is_some());
        assert!(store.take(3).is_none());
        assert_eq!(store.take_or_empty(3), (Vec::new(), String::new()));
    }

    #[test]
    fn test_untracked_tick_is_empty() {
        let store = PendingStore::new();
        assert!(store.take(99).is_none());
        assert_eq!(store.take_or_empty(99), (Vec::new(), String::new()));
    }

    #[test]
    fn test_empty_commit_distinct_from_untracked() {
        let store = PendingStore::new();
        store.put(4, Vec::new(), "bb".to_string());

        assert_eq!(store.take(4), Some(PendingEntry { tick: 4, actions: Vec::new(), nonce: "bb".to_string() }));
        assert_eq!(store.take(4), None);
    }

    #[test]
    fn test_recommit_last_write_wins() {
        let store = PendingStore::new();
        store.put(5, Vec::new(), "first".to_string());
        store.put(5, sample_actions(), "second".to_string());

        assert_eq!(store.len(), 1);
        let entry = store.take(5).unwrap();
        assert_eq!(entry.nonce, "second");
        assert_eq!(entry.actions, sample_actions());
    }

    #[test]
    fn test_pending_ticks_sorted() {
        let store = PendingStore::new();
        for tick in [9, 2, 5] {
            store.put(tick, Vec::new(), String::new());
        }
        assert_eq!(store.pending_ticks(), vec![2, 5, 9]);
    }

    #[test]
    fn test_concurrent_distinct_ticks() {
        let store = Arc::new(PendingStore::new());
        let handles: Vec<_> = (0..16u64)
            .map(|tick| {
                let store = store.clone();
                thread::spawn(move || store.put(tick, sample_actions(), format!("{tick:016x}")))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.len(), 16);
        for tick in 0..16u64 {
            let entry = store.take(tick).unwrap();
            assert_eq!(entry.nonce, format!("{tick:016x}"));
        }
    }

    #[test]
    fn test_racing_take_never_duplicates() {
        let store = Arc::new(PendingStore::new());
        store.put(1, sample_actions(), "cc".to_string());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                thread::spawn(move || store.take(1))
            })
            .collect();
        let winners: Vec<PendingEntry> =
            handles.into_iter().filter_map(|h| h.join().unwrap()).collect();

        assert_eq!(winners.len(), 1);
        assert_eq!(winners[0].actions, sample_actions());
    }
}
