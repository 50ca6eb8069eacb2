// Fixed-bound, fixed-delay retry around fetch operations
use crate::config::RetryConfig;
use crate::diagnostics::Diagnostics;
use crate::model::FetchError;
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(10),
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(cfg: &RetryConfig) -> Self {
        Self {
            max_attempts: cfg.max_attempts,
            delay: Duration::from_secs(cfg.delay_seconds),
        }
    }
}

#[async_trait::async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioSleeper;

#[async_trait::async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// The last error plus how many attempts were spent before giving up.
#[derive(Debug)]
pub struct Exhausted {
    pub attempts: u32,
    pub last: FetchError,
}

/// Runs `op` until it succeeds, fails with a non-transient error, or the
/// attempt budget is spent. `op` receives the 1-based attempt number and
/// always runs at least once.
pub async fn retry_fetch<T, F, Fut>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    diagnostics: &dyn Diagnostics,
    what: &str,
    mut op: F,
) -> Result<T, Exhausted>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let max_attempts = policy.max_attempts;
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_transient() => {
                return Err(Exhausted { attempts: attempt, last: e });
            }
            Err(e) if attempt >= max_attempts => {
                return Err(Exhausted { attempts: attempt, last: e });
            }
            Err(e) => {
                diagnostics.warning(&format!(
                    "🔁 {} attempt {}/{} failed: {}. Retrying in {}s...",
                    what,
                    attempt,
                    max_attempts,
                    e,
                    policy.delay.as_secs()
                ));
                sleeper.sleep(policy.delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::diagnostics::MemoryDiagnostics;
    use std::sync::Mutex;

    /// Records requested delays instead of waiting.
    #[derive(Default)]
    pub(crate) struct RecordingSleeper {
        pub(crate) delays: Mutex<Vec<Duration>>,
    }

    impl RecordingSleeper {
        pub(crate) fn delays(&self) -> Vec<Duration> {
            self.delays.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.delays.lock().unwrap().push(duration);
        }
    }

    fn refused() -> FetchError {
        FetchError::Transport { url: "http://x".into(), message: "refused".into() }
    }

    #[tokio::test]
    async fn succeeds_on_third_attempt_after_two_delays() {
        let sleeper = RecordingSleeper::default();
        let sink = MemoryDiagnostics::new();
        let policy = RetryPolicy::default();

        let result = retry_fetch(&policy, &sleeper, &sink, "feed", |attempt| async move {
            if attempt < 3 { Err(refused()) } else { Ok(attempt) }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(sleeper.delays(), vec![Duration::from_secs(10); 2]);
    }

    #[tokio::test]
    async fn gives_up_after_budget() {
        let sleeper = RecordingSleeper::default();
        let sink = MemoryDiagnostics::new();
        let policy = RetryPolicy::default();

        let err = retry_fetch::<(), _, _>(&policy, &sleeper, &sink, "feed", |_| async { Err(refused()) })
            .await
            .unwrap_err();

        assert_eq!(err.attempts, 3);
        assert!(matches!(err.last, FetchError::Transport { .. }));
        assert_eq!(sleeper.delays().len(), 2);
    }

    #[tokio::test]
    async fn non_transient_error_stops_immediately() {
        let sleeper = RecordingSleeper::default();
        let sink = MemoryDiagnostics::new();
        let policy = RetryPolicy::default();

        let err = retry_fetch::<(), _, _>(&policy, &sleeper, &sink, "badges", |_| async {
            Err(FetchError::Decode { url: "http://x".into(), message: "eof".into() })
        })
        .await
        .unwrap_err();

        assert_eq!(err.attempts, 1);
        assert!(sleeper.delays().is_empty());
    }

    #[tokio::test]
    async fn zero_budget_still_makes_one_attempt() {
        let sleeper = RecordingSleeper::default();
        let sink = MemoryDiagnostics::new();
        let policy = RetryPolicy { max_attempts: 0, delay: Duration::from_secs(10) };
        let calls = std::sync::atomic::AtomicU32::new(0);

        let err = retry_fetch::<(), _, _>(&policy, &sleeper, &sink, "feed", |_| {
            calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            async { Err(refused()) }
        })
        .await
        .unwrap_err();

        assert_eq!(err.attempts, 1);
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert!(sleeper.delays().is_empty());
    }

    #[test]
    fn policy_from_config() {
        let policy = RetryPolicy::from(&RetryConfig { max_attempts: 5, delay_seconds: 2 });
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.delay, Duration::from_secs(2));
    }
}
