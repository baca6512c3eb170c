//! Deterministic ownership tests for unit and integration tests.

use crate::domain::MatchError;
use crate::ports::OwnershipTest;
use shared_types::{NoteRecord, ViewingKey};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Owns a note iff its payload starts with the key bytes.
///
/// An empty payload cannot be evaluated and yields `MatchError::Malformed`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrefixOwnership;

impl OwnershipTest for PrefixOwnership {
    fn owns(&self, key: &ViewingKey, note: &NoteRecord) -> Result<bool, MatchError> {
        if note.payload.is_empty() {
            return Err(MatchError::Malformed {
                note: note.id,
                reason: "empty payload".to_string(),
            });
        }
        Ok(!key.is_empty() && note.payload.starts_with(key.as_bytes()))
    }
}

/// `PrefixOwnership` that blocks for up to `delay` whenever it evaluates
/// with `slow_key`. `release` ends blocked evaluations within a few
/// milliseconds.
#[derive(Debug, Clone)]
pub struct SlowForKey {
    slow_key: ViewingKey,
    delay: Duration,
    stalling: Arc<AtomicBool>,
}

impl SlowForKey {
    /// Stall every evaluation made with `slow_key`.
    pub fn new(slow_key: ViewingKey, delay: Duration) -> Self {
        Self {
            slow_key,
            delay,
            stalling: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Stop stalling. Clones share the switch.
    pub fn release(&self) {
        self.stalling.store(false, Ordering::SeqCst);
    }
}

impl OwnershipTest for SlowForKey {
    fn owns(&self, key: &ViewingKey, note: &NoteRecord) -> Result<bool, MatchError> {
        if *key == self.slow_key {
            let started = Instant::now();
            while self.stalling.load(Ordering::SeqCst) && started.elapsed() < self.delay {
                std::thread::sleep(Duration::from_millis(5));
            }
        }
        PrefixOwnership.owns(key, note)
    }
}

/// `PrefixOwnership` that counts evaluations.
#[derive(Debug, Clone, Default)]
pub struct CountingOwnership {
    calls: Arc<AtomicUsize>,
}

impl CountingOwnership {
    /// Evaluations so far, across clones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl OwnershipTest for CountingOwnership {
    fn owns(&self, key: &ViewingKey, note: &NoteRecord) -> Result<bool, MatchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        PrefixOwnership.owns(key, note)
    }
}
