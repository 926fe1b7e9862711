//! Persistence Queue
//!
//! Intents produced by commands wait here until the controller sends them.
//! One intent is in flight at a time; the rest wait in FIFO order.
//!
//! Adjacent full-state intents coalesce: a full-state push sends the store as
//! it is at send time, so a second queued one adds nothing.

use std::collections::VecDeque;

use crate::catalog::SkinId;

use super::command::Undo;

/// What to push to the server
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PersistIntent {
    /// `POST /api/user/update` with the whole state
    FullState,
    /// `POST /api/store/equip`
    Equip(SkinId),
}

/// What to do when a push fails
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Restore the recorded value and redraw
    Rollback(Undo),
    /// Keep the optimistic value and mark the store stale
    Reconcile,
}

impl FailurePolicy {
    /// Intents with an undo roll back; all others reconcile
    pub fn for_undo(undo: Option<Undo>) -> Self {
        undo.map_or(Self::Reconcile, Self::Rollback)
    }
}

/// A queued intent and its failure policy
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingSync {
    /// What to push
    pub intent: PersistIntent,
    /// What to do if the push fails
    pub policy: FailurePolicy,
}

/// FIFO of persistence intents with at most one in flight
#[derive(Debug, Default)]
pub struct SyncQueue {
    waiting: VecDeque<PendingSync>,
    in_flight: Option<PendingSync>,
    coalesce: bool,
}

impl SyncQueue {
    /// Create a queue
    pub fn new(coalesce: bool) -> Self {
        Self {
            coalesce,
            ..Default::default()
        }
    }

    /// Queue an intent. Returns false if it merged into a waiting one.
    pub fn enqueue(&mut self, intent: PersistIntent, undo: Option<Undo>) -> bool {
        let policy = FailurePolicy::for_undo(undo);

        if self.coalesce
            && intent == PersistIntent::FullState
            && policy == FailurePolicy::Reconcile
            && self.waiting.back().is_some_and(|p| p.intent == PersistIntent::FullState)
        {
            tracing::debug!("Coalesced full-state sync");
            return false;
        }

        self.waiting.push_back(PendingSync { intent, policy });
        true
    }

    /// Move the next waiting intent in flight, if nothing is in flight
    pub fn start_next(&mut self) -> Option<&PersistIntent> {
        if self.in_flight.is_some() {
            return None;
        }
        self.in_flight = self.waiting.pop_front();
        self.in_flight.as_ref().map(|p| &p.intent)
    }

    /// The in-flight intent finished; returns it with its policy
    pub fn finish(&mut self) -> Option<PendingSync> {
        self.in_flight.take()
    }

    /// Whether something is in flight
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Whether nothing is waiting or in flight
    pub fn is_idle(&self) -> bool {
        self.in_flight.is_none() && self.waiting.is_empty()
    }

    /// Number of intents waiting (not counting the one in flight)
    pub fn waiting(&self) -> usize {
        self.waiting.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_policy_derived_from_undo() {
        assert_eq!(FailurePolicy::for_undo(None), FailurePolicy::Reconcile);
        let undo = Undo::EquippedSkin {
            previous: SkinId::default(),
            attempted: SkinId::from("skin_1"),
        };
        assert_eq!(
            FailurePolicy::for_undo(Some(undo.clone())),
            FailurePolicy::Rollback(undo)
        );
    }

    #[test]
    fn test_one_in_flight_fifo() {
        let mut queue = SyncQueue::new(false);
        queue.enqueue(PersistIntent::FullState, None);
        queue.enqueue(PersistIntent::Equip(SkinId::from("skin_1")), None);

        assert_eq!(queue.start_next(), Some(&PersistIntent::FullState));
        assert_eq!(queue.start_next(), None);
        assert!(queue.is_busy());

        queue.finish();
        assert_eq!(
            queue.start_next(),
            Some(&PersistIntent::Equip(SkinId::from("skin_1")))
        );
        queue.finish();
        assert!(queue.is_idle());
    }

    #[test]
    fn test_adjacent_full_state_coalesces() {
        let mut queue = SyncQueue::new(true);
        assert!(queue.enqueue(PersistIntent::FullState, None));
        queue.start_next();

        // In-flight push already carries older state; the next one must queue
        assert!(queue.enqueue(PersistIntent::FullState, None));
        assert!(!queue.enqueue(PersistIntent::FullState, None));
        assert_eq!(queue.waiting(), 1);

        queue.enqueue(PersistIntent::Equip(SkinId::from("skin_2")), None);
        assert!(queue.enqueue(PersistIntent::FullState, None));
        assert_eq!(queue.waiting(), 3);
    }

    #[test]
    fn test_no_coalescing_when_disabled() {
        let mut queue = SyncQueue::new(false);
        queue.enqueue(PersistIntent::FullState, None);
        queue.enqueue(PersistIntent::FullState, None);
        assert_eq!(queue.waiting(), 2);
    }
}
