//! Bounded retry with exponential backoff for automation calls

use std::time::Duration;

use crate::error::EngineError;
use crate::remote::{Mailbox, RemoteError};

/// Retry policy applied to every call into the automation interface.
///
/// Transient failures are retried up to `max_attempts` with a doubling
/// delay, reconnecting between attempts. Fatal and unsupported failures
/// propagate immediately without retry.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts before giving up (first call included)
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles each attempt after that
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Run `op` against the automation interface, retrying transient
    /// failures with exponential backoff.
    ///
    /// Before each retry the mailbox connection is re-established; a failed
    /// reconnect counts as that attempt's failure. Exhausting all attempts
    /// yields [`EngineError::ConnectionExhausted`] carrying the last
    /// underlying failure.
    pub fn run<T>(
        &self,
        mailbox: &dyn Mailbox,
        mut op: impl FnMut() -> Result<T, RemoteError>,
    ) -> Result<T, EngineError> {
        let attempts = self.max_attempts.max(1);
        let mut delay = self.base_delay;
        let mut last_failure: Option<anyhow::Error> = None;

        for attempt in 1..=attempts {
            if attempt > 1 {
                std::thread::sleep(delay);
                delay *= 2;

                if let Err(err) = mailbox.reconnect() {
                    log::warn!("reconnect before attempt {attempt} failed: {err}");
                    last_failure = Some(anyhow::Error::new(err));
                    continue;
                }
            }

            match op() {
                Ok(value) => return Ok(value),
                Err(RemoteError::Transient(err)) => {
                    log::warn!(
                        "transient automation failure on attempt {attempt}/{attempts}: {err}"
                    );
                    last_failure = Some(err);
                }
                Err(other) => return Err(EngineError::Remote(other)),
            }
        }

        Err(EngineError::ConnectionExhausted {
            attempts,
            source: last_failure
                .unwrap_or_else(|| anyhow::anyhow!("no underlying failure recorded")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::{InMemoryMailbox, RemoteError};
    use anyhow::anyhow;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn quick_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::from_millis(1))
    }

    #[test]
    fn test_success_passes_through() {
        let mailbox = InMemoryMailbox::new();
        let policy = quick_policy(3);

        let result = policy.run(&mailbox, || Ok::<_, RemoteError>(7));
        assert_eq!(result.unwrap(), 7);
        assert_eq!(mailbox.reconnect_count(), 0);
    }

    #[test]
    fn test_transient_failure_recovers() {
        let mailbox = InMemoryMailbox::new();
        let policy = quick_policy(3);
        let calls = AtomicU32::new(0);

        let result = policy.run(&mailbox, || {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(RemoteError::Transient(anyhow!("link dropped")))
            } else {
                Ok(42)
            }
        });

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // One reconnect per retry
        assert_eq!(mailbox.reconnect_count(), 2);
    }

    #[test]
    fn test_fatal_failure_not_retried() {
        let mailbox = InMemoryMailbox::new();
        let policy = quick_policy(3);
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = policy.run(&mailbox, || {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(RemoteError::Fatal(anyhow!("bad argument")))
        });

        assert!(matches!(result, Err(EngineError::Remote(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(mailbox.reconnect_count(), 0);
    }

    #[test]
    fn test_exhaustion_reports_attempt_count() {
        let mailbox = InMemoryMailbox::new();
        let policy = quick_policy(3);
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = policy.run(&mailbox, || {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(RemoteError::Transient(anyhow!("still down")))
        });

        match result {
            Err(EngineError::ConnectionExhausted { attempts, .. }) => assert_eq!(attempts, 3),
            other => panic!("expected ConnectionExhausted, got {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_unsupported_propagates_immediately() {
        let mailbox = InMemoryMailbox::new();
        let policy = quick_policy(3);

        let result: Result<(), _> = policy.run(&mailbox, || {
            Err(RemoteError::Unsupported("no restrict".to_string()))
        });

        assert!(matches!(
            result,
            Err(EngineError::Remote(RemoteError::Unsupported(_)))
        ));
    }
}
