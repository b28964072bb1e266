//! Session tokens.
//!
//! Every recognition session and every utterance gets a fresh token. Host
//! callbacks carry the token they were issued for, so a callback arriving
//! after its session was stopped or superseded is recognised as stale.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one recognition session or one utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionToken(u64);

impl SessionToken {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Issues strictly increasing tokens, starting at 1.
#[derive(Debug, Default)]
pub struct TokenIssuer {
    last: AtomicU64,
}

impl TokenIssuer {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last: AtomicU64::new(0),
        }
    }

    pub fn issue(&self) -> SessionToken {
        SessionToken(self.last.fetch_add(1, Ordering::SeqCst) + 1)
    }
}
