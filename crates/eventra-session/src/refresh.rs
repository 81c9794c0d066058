//! The single-flight refresh state machine.
//!
//! ```text
//!            join_or_start (idle)             settle(generation)
//!   Idle ───────────────────────→ Refreshing ───────────────────→ Idle
//!                                  │    ↑
//!                                  └────┘ join_or_start (joins)
//! ```
//!
//! While `Refreshing`, every caller gets a clone of the same shared
//! future, so the refresh endpoint is hit once no matter how many requests
//! failed. Each flight carries a generation number; `settle` only returns
//! to `Idle` if the generation still matches, so a late waiter from an old
//! flight cannot cancel a newer one.
//!
//! A session boundary (login, logout, expiry) calls `reset`: the flight in
//! progress, if any, is abandoned to its current waiters and the next
//! caller starts a fresh one.

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};

use crate::SessionError;

/// The new access token, or why there isn't one.
pub(crate) type RefreshOutcome = Result<String, SessionError>;

/// A refresh that any number of requests can await.
pub(crate) type PendingRefresh = Shared<BoxFuture<'static, RefreshOutcome>>;

enum RefreshState {
    Idle,
    Refreshing {
        generation: u64,
        pending: PendingRefresh,
    },
}

pub(crate) struct RefreshFlight {
    state: RefreshState,
    next_generation: u64,
}

/// What a caller got from [`RefreshFlight::join_or_start`].
pub(crate) struct Ticket {
    pub(crate) generation: u64,
    pub(crate) pending: PendingRefresh,
    /// `true` if this caller started the flight.
    pub(crate) started: bool,
}

impl RefreshFlight {
    pub(crate) fn new() -> Self {
        Self {
            state: RefreshState::Idle,
            next_generation: 1,
        }
    }

    pub(crate) fn is_refreshing(&self) -> bool {
        matches!(self.state, RefreshState::Refreshing { .. })
    }

    /// Joins the refresh in flight, or starts one with `start` when idle.
    ///
    /// `start` is only called when a new flight begins. The returned future
    /// is lazy: nothing happens until someone polls it.
    pub(crate) fn join_or_start(
        &mut self,
        start: impl FnOnce() -> BoxFuture<'static, RefreshOutcome>,
    ) -> Ticket {
        if let RefreshState::Refreshing {
            generation,
            pending,
        } = &self.state
        {
            return Ticket {
                generation: *generation,
                pending: pending.clone(),
                started: false,
            };
        }

        let generation = self.next_generation;
        self.next_generation += 1;
        let pending = start().shared();
        self.state = RefreshState::Refreshing {
            generation,
            pending: pending.clone(),
        };
        Ticket {
            generation,
            pending,
            started: true,
        }
    }

    /// Forgets the flight in progress. Its waiters keep their clones of the
    /// shared future; their later `settle` no longer matches anything.
    pub(crate) fn reset(&mut self) {
        self.state = RefreshState::Idle;
    }

    /// Marks the flight with `generation` as finished.
    pub(crate) fn settle(&mut self, generation: u64) {
        if let RefreshState::Refreshing { generation: current, .. } = &self.state {
            if *current == generation {
                self.state = RefreshState::Idle;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// A refresh future that counts how many times its body ran.
    fn counted(runs: &Arc<AtomicUsize>, outcome: RefreshOutcome) -> BoxFuture<'static, RefreshOutcome> {
        let runs = Arc::clone(runs);
        async move {
            runs.fetch_add(1, Ordering::SeqCst);
            outcome
        }
        .boxed()
    }

    #[test]
    fn test_join_or_start_idle_starts_flight() {
        let mut flight = RefreshFlight::new();
        let runs = Arc::new(AtomicUsize::new(0));

        let ticket = flight.join_or_start(|| counted(&runs, Ok("A2".into())));

        assert!(ticket.started);
        assert_eq!(ticket.generation, 1);
        assert!(flight.is_refreshing());
        // Lazy: nothing ran yet.
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_join_or_start_while_refreshing_joins() {
        let mut flight = RefreshFlight::new();
        let runs = Arc::new(AtomicUsize::new(0));

        let first = flight.join_or_start(|| counted(&runs, Ok("A2".into())));
        let second = flight.join_or_start(|| panic!("must not start a second refresh"));

        assert!(!second.started);
        assert_eq!(first.generation, second.generation);
    }

    #[tokio::test]
    async fn test_joined_callers_share_one_run() {
        let mut flight = RefreshFlight::new();
        let runs = Arc::new(AtomicUsize::new(0));

        let a = flight.join_or_start(|| counted(&runs, Ok("A2".into())));
        let b = flight.join_or_start(|| counted(&runs, Ok("never".into())));
        let c = flight.join_or_start(|| counted(&runs, Ok("never".into())));

        let (ra, rb, rc) = tokio::join!(a.pending, b.pending, c.pending);

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(ra.as_deref(), Ok("A2"));
        assert_eq!(rb.as_deref(), Ok("A2"));
        assert_eq!(rc.as_deref(), Ok("A2"));
    }

    #[tokio::test]
    async fn test_failure_is_shared_by_all_waiters() {
        let mut flight = RefreshFlight::new();
        let runs = Arc::new(AtomicUsize::new(0));

        let a = flight.join_or_start(|| counted(&runs, Err(SessionError::RefreshTokenMissing)));
        let b = flight.join_or_start(|| unreachable!());

        let (ra, rb) = tokio::join!(a.pending, b.pending);

        assert_eq!(ra, Err(SessionError::RefreshTokenMissing));
        assert_eq!(rb, Err(SessionError::RefreshTokenMissing));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_settle_returns_to_idle_and_next_flight_is_new() {
        let mut flight = RefreshFlight::new();
        let runs = Arc::new(AtomicUsize::new(0));

        let first = flight.join_or_start(|| counted(&runs, Ok("A2".into())));
        flight.settle(first.generation);
        assert!(!flight.is_refreshing());

        let second = flight.join_or_start(|| counted(&runs, Ok("A3".into())));
        assert!(second.started);
        assert_eq!(second.generation, first.generation + 1);
    }

    #[test]
    fn test_settle_with_stale_generation_is_ignored() {
        let mut flight = RefreshFlight::new();
        let runs = Arc::new(AtomicUsize::new(0));

        let first = flight.join_or_start(|| counted(&runs, Ok("A2".into())));
        flight.settle(first.generation);
        let second = flight.join_or_start(|| counted(&runs, Ok("A3".into())));

        // A slow waiter from the first flight settles late.
        flight.settle(first.generation);

        assert!(flight.is_refreshing(), "newer flight must stay active");
        flight.settle(second.generation);
        assert!(!flight.is_refreshing());
    }

    #[test]
    fn test_reset_abandoned_flight_starts_new_one() {
        let mut flight = RefreshFlight::new();
        let runs = Arc::new(AtomicUsize::new(0));

        // Nobody ever polls or settles the first flight.
        let first = flight.join_or_start(|| counted(&runs, Ok("A2".into())));
        drop(first);
        flight.reset();

        assert!(!flight.is_refreshing());
        let second = flight.join_or_start(|| counted(&runs, Ok("A3".into())));
        assert!(second.started);
        assert_eq!(second.generation, 2);
    }

    #[tokio::test]
    async fn test_reset_then_old_waiter_settle_keeps_new_flight() {
        let mut flight = RefreshFlight::new();
        let runs = Arc::new(AtomicUsize::new(0));

        let old = flight.join_or_start(|| counted(&runs, Ok("A2".into())));
        flight.reset();
        let new = flight.join_or_start(|| counted(&runs, Ok("A3".into())));

        assert_eq!(old.pending.await.as_deref(), Ok("A2"));
        flight.settle(old.generation);

        assert!(flight.is_refreshing());
        assert_eq!(new.pending.await.as_deref(), Ok("A3"));
    }
}
