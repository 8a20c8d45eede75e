//! Process-wide order token issuance

use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::value_objects::OrderToken;

/// Hands out strictly increasing order tokens.
///
/// The only state shared between requests. `fetch_add` makes every call
/// return a distinct token without a lock.
#[derive(Debug, Default)]
pub struct OrderTokenIssuer {
    last: AtomicU64,
}

impl OrderTokenIssuer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next token. The first token is 1.
    pub fn issue(&self) -> OrderToken {
        OrderToken::new(self.last.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// Number of tokens issued so far
    pub fn issued(&self) -> u64 {
        self.last.load(Ordering::Relaxed)
    }
}
