//! # Wait Errors
//!
//! Every way a [`StateWaiter`](crate::StateWaiter) can stop short of its target.
//! Variants that stop after at least one observation keep the last payload, so the
//! caller can still persist what it learned (for example the identifier of a
//! resource whose create never settled).

use std::time::Duration;

/// Errors returned by [`StateWaiter::wait`](crate::StateWaiter::wait).
///
/// `P` is the refresher payload and `E` the refresher's own error type.
#[derive(Debug, thiserror::Error)]
pub enum WaitError<P, E>
where
    P: std::fmt::Debug,
    E: std::error::Error + 'static,
{
    /// The refresher failed. Never retried by the waiter.
    #[error("refreshing status: {0}")]
    Refresh(#[source] E),

    /// The resource reported a status that is neither pending nor target.
    #[error("unexpected status '{status}', wanted target '{target}'{}", fmt_reason(.reason))]
    UnexpectedStatus {
        status: String,
        target: String,
        reason: Option<String>,
        last: Box<P>,
    },

    /// The resource disappeared during a wait that expects it to exist.
    #[error("resource not found after {polls} poll(s), wanted target '{target}'")]
    NotFound { target: String, polls: u32 },

    /// The deadline elapsed while the resource was still pending.
    #[error(
        "timeout while waiting for status to become '{target}' (last status: '{}', timeout: {timeout:?}){}",
        .last_status.as_deref().unwrap_or(""),
        fmt_reason(.reason)
    )]
    Timeout {
        timeout: Duration,
        target: String,
        last_status: Option<String>,
        reason: Option<String>,
        last: Option<Box<P>>,
    },

    /// The caller's cancellation token fired before the wait finished.
    #[error("wait cancelled after {polls} poll(s) (last status: '{}')", .last_status.as_deref().unwrap_or(""))]
    Cancelled {
        polls: u32,
        last_status: Option<String>,
        last: Option<Box<P>>,
    },
}

impl<P, E> WaitError<P, E>
where
    P: std::fmt::Debug,
    E: std::error::Error + 'static,
{
    pub fn is_timeout(&self) -> bool {
        matches!(self, WaitError::Timeout { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, WaitError::Cancelled { .. })
    }

    /// The last payload observed before the wait stopped, if any.
    pub fn last_payload(&self) -> Option<&P> {
        match self {
            WaitError::UnexpectedStatus { last, .. } => Some(&**last),
            WaitError::Timeout { last, .. } | WaitError::Cancelled { last, .. } => last.as_deref(),
            WaitError::Refresh(_) | WaitError::NotFound { .. } => None,
        }
    }

    /// The last status observed before the wait stopped, if any.
    pub fn last_status(&self) -> Option<&str> {
        match self {
            WaitError::UnexpectedStatus { status, .. } => Some(status.as_str()),
            WaitError::Timeout { last_status, .. } | WaitError::Cancelled { last_status, .. } => {
                last_status.as_deref()
            }
            WaitError::Refresh(_) | WaitError::NotFound { .. } => None,
        }
    }

    /// The status reason lifted from the last payload, if the remote gave one.
    pub fn reason(&self) -> Option<&str> {
        match self {
            WaitError::UnexpectedStatus { reason, .. } | WaitError::Timeout { reason, .. } => {
                reason.as_deref()
            }
            _ => None,
        }
    }
}

fn fmt_reason(reason: &Option<String>) -> String {
    match reason {
        Some(r) if !r.is_empty() => format!(": {r}"),
        _ => String::new(),
    }
}
