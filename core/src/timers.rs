//! Timers
//!
//! Every delayed action in the client (blink, talk, rocking, daily settle)
//! goes through this module. Production code never sleeps anywhere else.
//!
//! # Design Philosophy
//!
//! Timers deliver *events*, they do not run callbacks. A [`TimerService`]
//! takes a delay and a value and hands the value back once the delay has
//! elapsed. Owners react to the value on their own task, so a fired timer can
//! never race the owner's state.
//!
//! - [`TokioTimers`] delivers through an mpsc channel in real time.
//! - [`ManualTimers`] keeps a virtual clock that tests advance explicitly.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Handle to a scheduled timer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Something that can deliver a value after a delay
pub trait TimerService<E> {
    /// Deliver `event` after `delay`
    fn schedule(&mut self, delay: Duration, event: E) -> TimerId;

    /// Drop a pending timer. Cancelling a fired or unknown timer is a no-op.
    fn cancel(&mut self, id: TimerId);
}

// ============================================================================
// Tokio
// ============================================================================

/// Real-time timers backed by spawned tokio tasks
#[derive(Debug)]
pub struct TokioTimers<E> {
    tx: mpsc::UnboundedSender<(TimerId, E)>,
    handles: HashMap<TimerId, JoinHandle<()>>,
    next_id: u64,
}

impl<E: Send + 'static> TokioTimers<E> {
    /// Create a timer service and the receiver its events arrive on
    pub fn new() -> (Self, mpsc::UnboundedReceiver<(TimerId, E)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let timers = Self {
            tx,
            handles: HashMap::new(),
            next_id: 0,
        };
        (timers, rx)
    }

    /// Abort every pending timer
    pub fn cancel_all(&mut self) {
        for (_, handle) in self.handles.drain() {
            handle.abort();
        }
    }

    /// Number of timers not yet fired
    pub fn pending(&self) -> usize {
        self.handles.values().filter(|h| !h.is_finished()).count()
    }
}

impl<E: Send + 'static> TimerService<E> for TokioTimers<E> {
    fn schedule(&mut self, delay: Duration, event: E) -> TimerId {
        self.handles.retain(|_, handle| !handle.is_finished());

        let id = TimerId(self.next_id);
        self.next_id += 1;

        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver gone means the owner shut down
            let _ = tx.send((id, event));
        });
        self.handles.insert(id, handle);
        id
    }

    fn cancel(&mut self, id: TimerId) {
        if let Some(handle) = self.handles.remove(&id) {
            handle.abort();
        }
    }
}

impl<E> Drop for TokioTimers<E> {
    fn drop(&mut self) {
        for (_, handle) in self.handles.drain() {
            handle.abort();
        }
    }
}

/// Send `value` on `tx` after `delay`, on its own task
pub fn defer<T: Send + 'static>(
    delay: Duration,
    tx: mpsc::UnboundedSender<T>,
    value: T,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        let _ = tx.send(value);
    })
}

// ============================================================================
// Manual
// ============================================================================

/// Virtual-clock timers for deterministic tests
#[derive(Debug)]
pub struct ManualTimers<E> {
    now: Duration,
    next_id: u64,
    pending: Vec<(Duration, TimerId, E)>,
}

impl<E> Default for ManualTimers<E> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            pending: Vec::new(),
        }
    }
}

impl<E> ManualTimers<E> {
    /// Create with the clock at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of timers not yet fired
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Deadline of the earliest pending timer
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.iter().map(|(at, _, _)| *at).min()
    }

    /// Move the clock to the earliest deadline and fire that timer.
    /// Ties fire in scheduling order.
    pub fn fire_next(&mut self) -> Option<(TimerId, E)> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .min_by_key(|(_, (at, id, _))| (*at, *id))
            .map(|(idx, _)| idx)?;
        let (at, id, event) = self.pending.remove(idx);
        self.now = self.now.max(at);
        Some((id, event))
    }

    /// Fire the next timer only if it is due by `deadline`; otherwise move the
    /// clock to `deadline` and return `None`.
    pub fn fire_until(&mut self, deadline: Duration) -> Option<(TimerId, E)> {
        match self.next_deadline() {
            Some(at) if at <= deadline => self.fire_next(),
            _ => {
                self.now = self.now.max(deadline);
                None
            }
        }
    }
}

impl<E> TimerService<E> for ManualTimers<E> {
    fn schedule(&mut self, delay: Duration, event: E) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push((self.now + delay, id, event));
        id
    }

    fn cancel(&mut self, id: TimerId) {
        self.pending.retain(|(_, pending, _)| *pending != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_fires_in_deadline_order() {
        let mut timers = ManualTimers::new();
        timers.schedule(Duration::from_millis(300), "late");
        timers.schedule(Duration::from_millis(100), "early");
        let cancelled = timers.schedule(Duration::from_millis(200), "cancelled");
        timers.cancel(cancelled);

        assert_eq!(timers.fire_next().map(|(_, e)| e), Some("early"));
        assert_eq!(timers.now(), Duration::from_millis(100));
        assert_eq!(timers.fire_next().map(|(_, e)| e), Some("late"));
        assert_eq!(timers.now(), Duration::from_millis(300));
        assert!(timers.fire_next().is_none());
    }

    #[test]
    fn test_manual_fire_until_respects_deadline() {
        let mut timers = ManualTimers::new();
        timers.schedule(Duration::from_millis(500), ());

        assert!(timers.fire_until(Duration::from_millis(400)).is_none());
        assert_eq!(timers.now(), Duration::from_millis(400));
        assert!(timers.fire_until(Duration::from_millis(500)).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_timers_deliver_and_cancel() {
        let (mut timers, mut rx) = TokioTimers::new();
        let kept = timers.schedule(Duration::from_millis(150), "kept");
        let dropped = timers.schedule(Duration::from_millis(100), "dropped");
        timers.cancel(dropped);

        let (id, event) = rx.recv().await.unwrap();
        assert_eq!(id, kept);
        assert_eq!(event, "kept");
    }

    #[tokio::test(start_paused = true)]
    async fn test_defer_delivers_value() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        defer(Duration::from_millis(400), tx, 7u32);
        assert_eq!(rx.recv().await, Some(7));
    }
}
