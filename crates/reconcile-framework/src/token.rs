//! # Idempotency Tokens
//!
//! Every create call carries a client-generated token so the remote system can
//! recognise a retried call it already accepted. A [`TokenSource`] is injected into
//! the orchestrator, which keeps tests deterministic.

use std::sync::atomic::{AtomicU64, Ordering};

/// Produces one token per logical create attempt.
pub trait TokenSource: Send + Sync {
    fn next_token(&self) -> String;
}

/// Random UUID v4 tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidTokenSource;

impl TokenSource for UuidTokenSource {
    fn next_token(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Predictable `<prefix>-<n>` tokens, starting at 1.
#[derive(Debug)]
pub struct SequentialTokenSource {
    prefix: String,
    next: AtomicU64,
}

impl SequentialTokenSource {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl TokenSource for SequentialTokenSource {
    fn next_token(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", self.prefix, n)
    }
}
