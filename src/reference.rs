//! Transaction reference generation.
//!
//! A transaction reference is 30 digits: a UTC `YYYYMMDDHHMMSS` timestamp
//! (14), the nanosecond component zero-padded to 9, and a process-wide
//! atomic counter modulo 10^7 padded to 7. Counter wraparound is fine - the
//! timestamp and nanoseconds carry the entropy, and the transfers table's
//! unique constraints turn any residual collision into a retried insert.

use std::sync::atomic::{AtomicU32, Ordering};

use chrono::{Timelike, Utc};

static REF_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Generate a fresh 30-digit transaction reference.
pub fn transaction_reference() -> String {
    let now = Utc::now();
    let counter = REF_COUNTER.fetch_add(1, Ordering::Relaxed).wrapping_add(1) % 10_000_000;
    format!(
        "{}{:09}{:07}",
        now.format("%Y%m%d%H%M%S"),
        now.nanosecond(),
        counter
    )
}

/// Generate a 30-character external reference: `EXT` plus the first 27
/// digits of a freshly generated transaction reference.
pub fn external_reference() -> String {
    let base = transaction_reference();
    format!("EXT{}", &base[..27])
}

/// Current counter value. Test-only visibility into the retry loop.
#[cfg(test)]
pub(crate) fn counter_value() -> u32 {
    REF_COUNTER.load(Ordering::Relaxed)
}
