use std::time::Duration;
use std::time::Instant;

use dashmap::DashMap;

/// Thresholds governing the lockout state machine.
#[derive(Debug, Clone, Copy)]
pub struct LockoutPolicy {
    /// Failed attempts that trigger a lock.
    pub max_failures: u32,

    /// Sliding window after which an untouched attempt count vanishes.
    pub attempt_window: Duration,

    /// How long a locked client stays locked.
    pub lock_duration: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_failures: 3,
            attempt_window: Duration::from_secs(15 * 60),
            lock_duration: Duration::from_secs(15 * 60),
        }
    }
}

struct AttemptRecord {
    count: u32,
    expires_at: Instant,
}

/// Per-client failed-login counter with time-boxed lockout.
///
/// Keys are client identifiers derived from the request origin. Both maps
/// are sharded; operations on distinct keys do not contend, and the entry
/// API gives increment-then-compare per-key atomicity, so concurrent
/// failures for one key can neither miss a lock nor corrupt the count.
///
/// Expired records are removed lazily on access; there is no background
/// sweeper. Stale entries persist until next touched, bounded by natural
/// client-address churn. All deadlines use a monotonic clock.
pub struct AttemptTracker {
    policy: LockoutPolicy,
    attempts: DashMap<String, AttemptRecord>,
    locks: DashMap<String, Instant>,
}

impl AttemptTracker {
    pub fn new(policy: LockoutPolicy) -> Self {
        Self {
            policy,
            attempts: DashMap::new(),
            locks: DashMap::new(),
        }
    }

    /// Failed attempts that trigger a lock under the active policy.
    pub fn max_failures(&self) -> u32 {
        self.policy.max_failures
    }

    /// Count a failed login for `key`, returning the updated count.
    ///
    /// Creates the record at 1 if absent (or if its window elapsed) and
    /// refreshes the expiry window. Reaching the failure threshold locks
    /// the key until `lock_duration` from now.
    pub fn record_failure(&self, key: &str) -> u32 {
        let now = Instant::now();

        let count = {
            let mut record = self
                .attempts
                .entry(key.to_string())
                .or_insert(AttemptRecord {
                    count: 0,
                    expires_at: now + self.policy.attempt_window,
                });
            if record.expires_at <= now {
                record.count = 0;
            }
            record.count += 1;
            record.expires_at = now + self.policy.attempt_window;
            record.count
        };

        if count >= self.policy.max_failures {
            self.locks
                .insert(key.to_string(), now + self.policy.lock_duration);
        }

        count
    }

    /// Clear the attempt count for `key` after a successful login.
    ///
    /// Does not remove an existing lock: a successful credential check
    /// cannot happen while locked, so a live lock only ever ends by
    /// expiring.
    pub fn record_success(&self, key: &str) {
        self.attempts.remove(key);
    }

    /// Whether `key` is currently locked.
    ///
    /// Observing an expired lock removes it and clears the attempt count,
    /// so the next strike count starts from zero.
    pub fn is_locked(&self, key: &str) -> bool {
        let now = Instant::now();

        let unlock_at = match self.locks.get(key) {
            Some(entry) => *entry.value(),
            None => return false,
        };

        if now < unlock_at {
            return true;
        }

        // Only remove the lock we observed as expired; a concurrent
        // re-lock with a future deadline survives the predicate.
        self.locks.remove_if(key, |_, unlock| now >= *unlock);
        self.attempts.remove(key);
        false
    }

    /// Seconds until `key` unlocks, rounded up; 0 when not locked.
    pub fn remaining_seconds(&self, key: &str) -> u64 {
        let now = Instant::now();

        match self.locks.get(key) {
            Some(entry) if *entry.value() > now => {
                let remaining = *entry.value() - now;
                let mut seconds = remaining.as_secs();
                if remaining.subsec_nanos() > 0 {
                    seconds += 1;
                }
                seconds
            }
            _ => 0,
        }
    }
}
