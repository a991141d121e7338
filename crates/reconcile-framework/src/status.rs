//! # Status Classification
//!
//! Every remote resource reports a discrete status token. What that token *means*
//! depends on the operation in flight: `Deleting` is progress during a delete but a
//! failure during a create. [`StatusSets`] captures that per-operation meaning once,
//! and [`StatusClass`] is the only vocabulary the [`StateWaiter`](crate::StateWaiter)
//! understands.

use std::fmt::{Debug, Display};

/// Marker trait for resource status enums.
///
/// Implemented automatically for any small, comparable, printable type, so a
/// resource only needs `#[derive(Clone, Copy, Debug, PartialEq, Eq)]` plus `Display`.
pub trait Status: Copy + Eq + Debug + Display + Send + Sync + 'static {}

impl<T> Status for T where T: Copy + Eq + Debug + Display + Send + Sync + 'static {}

/// How the waiter should react to one observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// The operation is still in progress; keep polling.
    Pending,
    /// The operation succeeded.
    Target,
    /// The resource reported a status outside both sets; stop immediately.
    Failed,
    /// The resource could not be found.
    Absent,
}

/// The pending and target sets for one lifecycle operation.
///
/// An empty target set describes a disappearance wait: success means the
/// resource is gone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSets<S: Status> {
    pending: Vec<S>,
    target: Vec<S>,
}

impl<S: Status> StatusSets<S> {
    pub fn new(pending: impl Into<Vec<S>>, target: impl Into<Vec<S>>) -> Self {
        Self {
            pending: pending.into(),
            target: target.into(),
        }
    }

    /// Sets for a wait that succeeds once the resource disappears.
    pub fn until_gone(pending: impl Into<Vec<S>>) -> Self {
        Self::new(pending, Vec::new())
    }

    pub fn pending(&self) -> &[S] {
        &self.pending
    }

    pub fn target(&self) -> &[S] {
        &self.target
    }

    /// True when success is defined as the resource being absent.
    pub fn expects_absence(&self) -> bool {
        self.target.is_empty()
    }

    /// Maps an observed status (or its absence) onto a [`StatusClass`].
    ///
    /// Target membership wins over pending membership if a status appears in both.
    pub fn classify(&self, status: Option<S>) -> StatusClass {
        match status {
            None => StatusClass::Absent,
            Some(s) if self.target.contains(&s) => StatusClass::Target,
            Some(s) if self.pending.contains(&s) => StatusClass::Pending,
            Some(_) => StatusClass::Failed,
        }
    }

    /// Comma-separated target list, for error messages.
    pub(crate) fn describe_target(&self) -> String {
        if self.target.is_empty() {
            return "<gone>".to_string();
        }
        self.target
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
