//! # Observability & Tracing
//!
//! Structured logging for the reconciliation engine, built on the `tracing` crate.
//!
//! ## What Gets Traced
//!
//! - **Polls**: every refresher call at `debug`, with the poll count and status
//! - **Outcomes**: target reached / resource gone at `info`
//! - **Failures**: unexpected status, timeout, cancellation, refresh errors at `warn`
//! - **Operations**: each lifecycle call in its own span, keyed by application id
//!
//! ## Usage Examples
//!
//! ```bash
//! # Lifecycle transitions only
//! RUST_LOG=info cargo run
//!
//! # Every poll
//! RUST_LOG=debug cargo run
//!
//! # Only the wait loop
//! RUST_LOG=reconcile_framework=debug cargo run
//! ```
//!
//! **With `RUST_LOG=debug`** a create looks like:
//!
//! ```text
//! INFO create{name="APP1"}: Create accepted application_id="app-1"
//! DEBUG create{name="APP1"}: Still pending polls=1 status=Some(Creating)
//! DEBUG create{name="APP1"}: Still pending polls=2 status=Some(Creating)
//! INFO create{name="APP1"}: Target status reached polls=3 status=Some(Available)
//! INFO create{name="APP1"}: Created application_id="app-1" version=1
//! ```

/// Initializes the global tracing subscriber, filtered by `RUST_LOG`.
///
/// Uses a compact, target-less format so span names carry the context.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
