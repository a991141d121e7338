//! # Reconcile Framework
//!
//! Building blocks for managing remote resources that are provisioned
//! **asynchronously**: a mutating API call returns right away, and the resource then
//! moves through intermediate states (`creating`, `updating`, `deleting`, ...) before
//! it settles. The caller has to poll to find out how it ended.
//!
//! ## Architecture Overview
//!
//! The framework separates the problem into three layers:
//!
//! 1. **Classification** ([`StatusSets`], [`StatusClass`]) - what a status token means
//!    for the operation in flight
//! 2. **Observation** ([`StatusRefresher`], [`Observation`]) - how to fetch the current
//!    status of one resource
//! 3. **Waiting** ([`StateWaiter`]) - the poll loop that ties the two together under a
//!    deadline and a cancellation token
//!
//! A resource implementation writes a refresher and picks its status sets per
//! operation. The framework owns everything else: scheduling, deadlines, cancellation,
//! error reporting, and logging.
//!
//! ## Why a Tagged Status Classifier?
//!
//! Comparing status strings ad hoc in every operation spreads the same decision over
//! many places. Here a resource declares a status `enum`, and each operation hands
//! the waiter a [`StatusSets`] that maps every variant to exactly one of
//! {Pending, Target, Failed, Absent}. The same waiter then serves create, update,
//! and delete.
//!
//! ## Errors
//!
//! [`WaitError`] distinguishes refresher failures, terminal statuses, unexpected
//! disappearance, timeouts, and cancellation. Timeouts and cancellations keep the last
//! observed payload so the caller can persist partial state.
//!
//! ## Configuration
//!
//! [`Timeouts`] and [`PollPolicy`] are `serde` structs with defaults (30 minutes per
//! operation, 10 second polls with 10% jitter).
//!
//! ## Testing
//!
//! The [`mock`] module provides a [`ScriptedRefresher`](mock::ScriptedRefresher) that
//! replays a fixed status sequence. Combine it with `tokio::test(start_paused = true)`
//! to test timeouts without waiting for them.

pub mod config;
pub mod error;
pub mod mock;
pub mod refresh;
pub mod status;
pub mod token;
pub mod tracing;
pub mod waiter;

// Re-export core types for convenience
pub use config::{PollPolicy, Timeouts};
pub use error::WaitError;
pub use refresh::{Observation, StatusReason, StatusRefresher};
pub use status::{Status, StatusClass, StatusSets};
pub use token::{SequentialTokenSource, TokenSource, UuidTokenSource};
pub use waiter::{StateWaiter, WaitOutcome, WaitResult};
