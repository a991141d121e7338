//! # State Waiter
//!
//! The generic poll loop. A [`StateWaiter`] repeatedly asks a
//! [`StatusRefresher`] for the current status, classifies it against a
//! [`StatusSets`], and suspends between polls until one of these happens:
//!
//! 1. the status enters the target set (success),
//! 2. the resource disappears and the target set is empty (success),
//! 3. the status leaves both sets (terminal failure, no further polls),
//! 4. the refresher errors (propagated as-is, no retry),
//! 5. the deadline passes (timeout, carrying the last observation),
//! 6. the caller cancels (cancellation, distinct from timeout).
//!
//! The waiter holds no per-resource state, so one instance can serve any number
//! of concurrent waits.
//!
//! ```rust
//! use reconcile_framework::mock::ScriptedRefresher;
//! use reconcile_framework::{PollPolicy, StateWaiter, StatusSets};
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//!
//! # #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! # enum Phase { Creating, Available }
//! # impl std::fmt::Display for Phase {
//! #     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{:?}", self) }
//! # }
//! #[tokio::main]
//! async fn main() {
//!     let refresher = ScriptedRefresher::new();
//!     refresher.push_status(Phase::Creating);
//!     refresher.push_status(Phase::Available);
//!
//!     let waiter = StateWaiter::new(
//!         Duration::from_secs(5),
//!         PollPolicy::fixed(Duration::from_millis(1)),
//!     );
//!     let sets = StatusSets::new([Phase::Creating], [Phase::Available]);
//!     let outcome = waiter
//!         .wait(&refresher, &sets, &CancellationToken::new())
//!         .await
//!         .unwrap();
//!     assert_eq!(outcome.status, Some(Phase::Available));
//!     assert_eq!(outcome.polls, 2);
//! }
//! ```

use crate::config::PollPolicy;
use crate::error::WaitError;
use crate::refresh::{Observation, StatusReason, StatusRefresher};
use crate::status::{StatusClass, StatusSets};
use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Roughly 30 years; deadlines past this are treated as unbounded.
const FAR_FUTURE_SECS: u64 = 86_400 * 365 * 30;

/// Final state of a successful wait.
#[derive(Debug, Clone, PartialEq)]
pub struct WaitOutcome<P, S> {
    /// The last payload, or `None` when success meant disappearance.
    pub payload: Option<P>,
    pub status: Option<S>,
    /// Number of refresher calls made.
    pub polls: u32,
}

/// Result type returned by [`StateWaiter::wait`] for a refresher `R`.
pub type WaitResult<R> = Result<
    WaitOutcome<<R as StatusRefresher>::Payload, <R as StatusRefresher>::Status>,
    WaitError<<R as StatusRefresher>::Payload, <R as StatusRefresher>::Error>,
>;

/// Polls a refresher until the resource settles, bounded by a timeout.
#[derive(Debug, Clone, Copy)]
pub struct StateWaiter {
    timeout: Duration,
    poll: PollPolicy,
}

impl StateWaiter {
    pub fn new(timeout: Duration, poll: PollPolicy) -> Self {
        Self { timeout, poll }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Runs the poll loop. See the module docs for the exit conditions.
    pub async fn wait<R>(
        &self,
        refresher: &R,
        sets: &StatusSets<R::Status>,
        cancel: &CancellationToken,
    ) -> WaitResult<R>
    where
        R: StatusRefresher + ?Sized,
    {
        let deadline = instant_after(Instant::now(), self.timeout);
        let mut polls: u32 = 0;
        let mut absent_streak: u32 = 0;
        let mut last: Option<(R::Payload, R::Status)> = None;

        let delay = self.poll.delay();
        if !delay.is_zero() {
            let wake = instant_after(Instant::now(), delay).min(deadline);
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(cancelled(polls, last)),
                _ = sleep_until(wake) => {}
            }
        }

        loop {
            if cancel.is_cancelled() {
                return Err(cancelled(polls, last));
            }
            if polls > 0 && Instant::now() >= deadline {
                return Err(self.timed_out(sets, last));
            }

            polls += 1;
            let observation = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(cancelled(polls, last)),
                result = refresher.refresh() => result.map_err(|e| {
                    warn!(polls, error = %e, "Refresh failed");
                    WaitError::Refresh(e)
                })?,
                _ = sleep_until(deadline) => return Err(self.timed_out(sets, last)),
            };

            match observation {
                Observation::Present { payload, status }
                    if matches!(sets.classify(Some(status)), StatusClass::Target) =>
                {
                    info!(polls, %status, "Target status reached");
                    return Ok(WaitOutcome {
                        payload: Some(payload),
                        status: Some(status),
                        polls,
                    });
                }
                Observation::Present { payload, status }
                    if matches!(sets.classify(Some(status)), StatusClass::Pending) =>
                {
                    absent_streak = 0;
                    debug!(polls, %status, "Still pending");
                    last = Some((payload, status));
                }
                Observation::Present { payload, status } => {
                    let reason = payload.status_reason().map(str::to_owned);
                    warn!(polls, %status, reason = reason.as_deref().unwrap_or(""), "Unexpected status");
                    return Err(WaitError::UnexpectedStatus {
                        status: status.to_string(),
                        target: sets.describe_target(),
                        reason,
                        last: Box::new(payload),
                    });
                }
                Observation::Absent if sets.expects_absence() => {
                    info!(polls, "Resource gone");
                    return Ok(WaitOutcome {
                        payload: None,
                        status: None,
                        polls,
                    });
                }
                Observation::Absent => {
                    absent_streak += 1;
                    debug!(polls, absent_streak, "Resource not found");
                    if absent_streak > self.poll.not_found_checks {
                        warn!(polls, "Resource vanished while waiting");
                        return Err(WaitError::NotFound {
                            target: sets.describe_target(),
                            polls,
                        });
                    }
                }
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(self.timed_out(sets, last));
            }
            let wake = instant_after(now, self.poll.next_interval()).min(deadline);
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(cancelled(polls, last)),
                _ = sleep_until(wake) => {}
            }
        }
    }

    fn timed_out<P, S, E>(
        &self,
        sets: &StatusSets<S>,
        last: Option<(P, S)>,
    ) -> WaitError<P, E>
    where
        P: StatusReason + std::fmt::Debug,
        S: crate::status::Status,
        E: std::error::Error + 'static,
    {
        let (last_status, reason, last) = match last {
            Some((payload, status)) => (
                Some(status.to_string()),
                payload.status_reason().map(str::to_owned),
                Some(Box::new(payload)),
            ),
            None => (None, None, None),
        };
        warn!(timeout = ?self.timeout, last_status = last_status.as_deref().unwrap_or(""), "Wait timed out");
        WaitError::Timeout {
            timeout: self.timeout,
            target: sets.describe_target(),
            last_status,
            reason,
            last,
        }
    }
}

/// `now + duration`, saturating at a point far enough out to never be reached.
fn instant_after(now: Instant, duration: Duration) -> Instant {
    now.checked_add(duration)
        .unwrap_or_else(|| now + Duration::from_secs(FAR_FUTURE_SECS))
}

fn cancelled<P, S, E>(polls: u32, last: Option<(P, S)>) -> WaitError<P, E>
where
    P: std::fmt::Debug,
    S: crate::status::Status,
    E: std::error::Error + 'static,
{
    warn!(polls, "Wait cancelled");
    let (last_status, last) = match last {
        Some((payload, status)) => (Some(status.to_string()), Some(Box::new(payload))),
        None => (None, None),
    };
    WaitError::Cancelled {
        polls,
        last_status,
        last,
    }
}
