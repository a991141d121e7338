//! # Status Refresher
//!
//! A refresher fetches the current state of one remote resource and reduces it to
//! an [`Observation`]. It is the only piece of the wait loop that knows how to talk
//! to the remote API.
//!
//! The contract has three outcomes, and keeping them apart is the whole point:
//!
//! | Remote answer | Refresher returns |
//! |---------------|-------------------|
//! | resource found | `Ok(Observation::Present { payload, status })` |
//! | resource not found | `Ok(Observation::Absent)` |
//! | any other failure | `Err(e)` |
//!
//! "Not found" is **not** an error at this layer. A delete wait succeeds on it, and the
//! [`StateWaiter`](crate::StateWaiter) decides what it means for every other wait.

use crate::status::Status;
use async_trait::async_trait;
use std::fmt::Debug;

/// Payloads that can explain why the resource is in its current status.
pub trait StatusReason {
    /// Human-readable reason reported by the remote system, if any.
    fn status_reason(&self) -> Option<&str> {
        None
    }
}

/// One poll result.
#[derive(Debug, Clone, PartialEq)]
pub enum Observation<P, S> {
    Present { payload: P, status: S },
    Absent,
}

impl<P, S: Copy> Observation<P, S> {
    pub fn status(&self) -> Option<S> {
        match self {
            Observation::Present { status, .. } => Some(*status),
            Observation::Absent => None,
        }
    }

    pub fn into_payload(self) -> Option<P> {
        match self {
            Observation::Present { payload, .. } => Some(payload),
            Observation::Absent => None,
        }
    }
}

/// Fetches the current state of a single resource.
///
/// Implementations capture whatever identifies the resource (id, or id + version)
/// at construction time, so `refresh` takes no arguments and can be called
/// repeatedly by the waiter.
#[async_trait]
pub trait StatusRefresher: Send + Sync {
    /// Full response payload returned to the caller once the wait finishes.
    type Payload: StatusReason + Debug + Send + Sync;

    /// Discrete status token extracted from the payload.
    type Status: Status;

    /// Lookup failure other than "not found".
    type Error: std::error::Error + Send + Sync + 'static;

    async fn refresh(&self) -> Result<Observation<Self::Payload, Self::Status>, Self::Error>;
}
