//! Per-symbol monitoring session ownership.
//!
//! A symbol has at most one live session. A new short execution must
//! acquire the symbol's slot before sweeping; the slot is released when the
//! `SessionGuard` is dropped, whether the session completed or never started.

use crate::error::{ExecutorError, ExecutorResult};
use arb_core::Price;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

#[derive(Debug, Clone)]
struct SessionSlot {
    id: u64,
    target: Price,
    started_at: DateTime<Utc>,
    token: CancellationToken,
}

/// Registry of active monitoring sessions, keyed by symbol.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    slots: Arc<DashMap<String, SessionSlot>>,
    next_id: Arc<AtomicU64>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `symbol` for a new session.
    ///
    /// Fails with `SessionActive` if another session holds it.
    pub fn try_acquire(&self, symbol: &str, target: Price) -> ExecutorResult<SessionGuard> {
        match self.slots.entry(symbol.to_string()) {
            Entry::Occupied(existing) => {
                debug!(
                    symbol,
                    existing_target = %existing.get().target,
                    since = %existing.get().started_at,
                    "Session slot busy"
                );
                Err(ExecutorError::SessionActive(symbol.to_string()))
            }
            Entry::Vacant(vacant) => {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
                let token = CancellationToken::new();
                vacant.insert(SessionSlot {
                    id,
                    target,
                    started_at: Utc::now(),
                    token: token.clone(),
                });
                Ok(SessionGuard {
                    slots: Arc::clone(&self.slots),
                    symbol: symbol.to_string(),
                    id,
                    token,
                })
            }
        }
    }

    pub fn is_active(&self, symbol: &str) -> bool {
        self.slots.contains_key(symbol)
    }

    pub fn active_count(&self) -> usize {
        self.slots.len()
    }

    /// Request cooperative cancellation of `symbol`'s session.
    pub fn cancel(&self, symbol: &str) -> bool {
        match self.slots.get(symbol) {
            Some(slot) => {
                slot.token.cancel();
                true
            }
            None => false,
        }
    }

    /// Request cancellation of every session. Returns how many were signalled.
    pub fn cancel_all(&self) -> usize {
        let mut count = 0;
        for slot in self.slots.iter() {
            slot.token.cancel();
            count += 1;
        }
        if count > 0 {
            info!(count, "Cancelling active monitoring sessions");
        }
        count
    }
}

/// Ownership of one symbol's session slot. Releases the slot on drop.
#[derive(Debug)]
pub struct SessionGuard {
    slots: Arc<DashMap<String, SessionSlot>>,
    symbol: String,
    id: u64,
    token: CancellationToken,
}

impl SessionGuard {
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Token the session must observe.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.slots
            .remove_if(&self.symbol, |_, slot| slot.id == self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_second_acquire_rejected() {
        let registry = SessionRegistry::new();
        let guard = registry.try_acquire("AHRM1IRR", Price::new(dec!(1010))).unwrap();

        let err = registry
            .try_acquire("AHRM1IRR", Price::new(dec!(1020)))
            .unwrap_err();
        assert!(matches!(err, ExecutorError::SessionActive(_)));
        assert!(registry.is_active("AHRM1IRR"));

        // Other symbols are independent.
        let _other = registry.try_acquire("ROBA1IRR", Price::new(dec!(5))).unwrap();
        assert_eq!(registry.active_count(), 2);

        drop(guard);
        assert!(!registry.is_active("AHRM1IRR"));
        assert!(registry.try_acquire("AHRM1IRR", Price::new(dec!(1020))).is_ok());
    }

    #[test]
    fn test_cancel_signals_token() {
        let registry = SessionRegistry::new();
        let guard = registry.try_acquire("AHRM1IRR", Price::new(dec!(1010))).unwrap();
        let token = guard.token();

        assert!(registry.cancel("AHRM1IRR"));
        assert!(token.is_cancelled());
        assert!(!registry.cancel("UNKNOWN"));
    }

    #[test]
    fn test_cancel_all() {
        let registry = SessionRegistry::new();
        let a = registry.try_acquire("A", Price::new(dec!(1))).unwrap();
        let b = registry.try_acquire("B", Price::new(dec!(1))).unwrap();

        assert_eq!(registry.cancel_all(), 2);
        assert!(a.token().is_cancelled());
        assert!(b.token().is_cancelled());
    }
}
