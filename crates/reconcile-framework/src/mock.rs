//! # Mock Refresher & Testing Guide
//!
//! [`ScriptedRefresher`] implements [`StatusRefresher`] from a queue of
//! pre-recorded observations. It lets you drive the [`StateWaiter`](crate::StateWaiter)
//! through any status sequence deterministically, without a remote system.
//!
//! ## When to use the Scripted Refresher vs a Real Refresher
//!
//! | Feature | ScriptedRefresher | Resource refresher |
//! |---------|-------------------|--------------------|
//! | **Speed** | Instant (in-memory) | Bound by the remote API |
//! | **Determinism** | 100% deterministic | Subject to the remote schedule |
//! | **Error Injection** | Easy (`push_error`) | Requires a failing remote |
//! | **Use Case** | Testing the wait loop itself | Testing a resource's status mapping |
//!
//! Pair it with `#[tokio::test(start_paused = true)]` so poll intervals and deadlines
//! advance on tokio's virtual clock instead of wall time:
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
//!     refresher.repeat_status(Phase::Creating);
//!
//!     let waiter = StateWaiter::new(
//!         Duration::from_millis(20),
//!         PollPolicy::fixed(Duration::from_millis(5)),
//!     );
//!     let sets = StatusSets::new([Phase::Creating], [Phase::Available]);
//!     let err = waiter
//!         .wait(&refresher, &sets, &CancellationToken::new())
//!         .await
//!         .unwrap_err();
//!     assert!(err.is_timeout());
//! }
//! ```

use crate::refresh::{Observation, StatusReason, StatusRefresher};
use crate::status::Status;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

/// Payload produced by [`ScriptedRefresher`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestPayload {
    pub reason: Option<String>,
}

impl TestPayload {
    pub fn with_reason(reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
        }
    }
}

impl StatusReason for TestPayload {
    fn status_reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }
}

/// Error injected with [`ScriptedRefresher::push_error`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("scripted refresh error: {0}")]
pub struct ScriptedError(pub String);

enum Step<S> {
    Observe(Observation<TestPayload, S>),
    Fail(String),
}

/// A refresher that replays a script of observations.
///
/// Steps are consumed in order. Once the script is empty the refresher either
/// repeats the status set with [`repeat_status`](Self::repeat_status) forever or
/// returns an error.
pub struct ScriptedRefresher<S: Status> {
    script: Mutex<VecDeque<Step<S>>>,
    repeat: Mutex<Option<S>>,
    polls: AtomicU32,
}

impl<S: Status> Default for ScriptedRefresher<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Status> ScriptedRefresher<S> {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            repeat: Mutex::new(None),
            polls: AtomicU32::new(0),
        }
    }

    /// Queues a present observation with an empty payload.
    pub fn push_status(&self, status: S) {
        self.push(Observation::Present {
            payload: TestPayload::default(),
            status,
        });
    }

    /// Queues an arbitrary observation.
    pub fn push(&self, observation: Observation<TestPayload, S>) {
        self.script
            .lock()
            .unwrap()
            .push_back(Step::Observe(observation));
    }

    /// Queues a refresher failure.
    pub fn push_error(&self, message: impl Into<String>) {
        self.script
            .lock()
            .unwrap()
            .push_back(Step::Fail(message.into()));
    }

    /// Status returned forever once the queued steps run out.
    pub fn repeat_status(&self, status: S) {
        *self.repeat.lock().unwrap() = Some(status);
    }

    /// Number of times `refresh` has been called.
    pub fn polls(&self) -> u32 {
        self.polls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<S: Status> StatusRefresher for ScriptedRefresher<S> {
    type Payload = TestPayload;
    type Status = S;
    type Error = ScriptedError;

    async fn refresh(&self) -> Result<Observation<TestPayload, S>, ScriptedError> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Step::Observe(observation)) => Ok(observation),
            Some(Step::Fail(message)) => Err(ScriptedError(message)),
            None => match *self.repeat.lock().unwrap() {
                Some(status) => Ok(Observation::Present {
                    payload: TestPayload::default(),
                    status,
                }),
                None => Err(ScriptedError("script exhausted".to_string())),
            },
        }
    }
}
