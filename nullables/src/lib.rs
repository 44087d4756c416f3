//! Nullable infrastructure for deterministic testing.
//!
//! Every external dependency of the client (gateways, the chain, content
//! storage, wall-clock waits) sits behind a trait. This crate provides
//! test-friendly implementations that:
//! - Answer from a script instead of the network
//! - Record what was asked of them for later assertions
//! - Never sleep or touch the filesystem
//!
//! Usage: swap real implementations for nullables in tests.

pub mod chain;
pub mod sleeper;
pub mod storage;
pub mod transport;

pub use chain::NullChain;
pub use sleeper::NullSleeper;
pub use storage::NullStorage;
pub use transport::{NullCall, NullReply, NullTransport};

use std::sync::{Mutex, MutexGuard};

/// Lock, ignoring poisoning from a panicked test thread.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
