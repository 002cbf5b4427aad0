use std::future::Future;
use std::time::Duration;
use odl_lab_schemas::settings::DiscoveryConfig;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// How long to keep polling and how long to sleep between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl PollPolicy {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self { timeout, poll_interval }
    }
}

impl From<&DiscoveryConfig> for PollPolicy {
    fn from(config: &DiscoveryConfig) -> Self {
        Self::new(config.timeout(), config.poll_interval())
    }
}

/// Terminal state of [`poll_until`]. `attempts` counts the attempts that were started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    Ready { value: T, attempts: u32, elapsed: Duration },
    TimedOut { attempts: u32, elapsed: Duration },
    Cancelled { attempts: u32, elapsed: Duration },
}

impl<T> PollOutcome<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, PollOutcome::Ready { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            PollOutcome::Ready { attempts, .. }
            | PollOutcome::TimedOut { attempts, .. }
            | PollOutcome::Cancelled { attempts, .. } => *attempts,
        }
    }

    pub fn elapsed(&self) -> Duration {
        match self {
            PollOutcome::Ready { elapsed, .. }
            | PollOutcome::TimedOut { elapsed, .. }
            | PollOutcome::Cancelled { elapsed, .. } => *elapsed,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            PollOutcome::Ready { value, .. } => Some(value),
            _ => None,
        }
    }
}

/// Call `attempt` until it yields `Some`, the timeout passes or `cancel` fires.
///
/// The timeout is checked before each attempt and the poll interval is slept after an
/// unsuccessful one. Attempts and sleeps are both cut off at the deadline, an attempt still
/// running then counts as unsuccessful, so a run that never succeeds ends exactly at the timeout.
/// Cancelling interrupts both a running attempt and the sleep. The attempt number, starting at 1,
/// is passed to `attempt`.
pub async fn poll_until<T, F, Fut>(
    policy: PollPolicy,
    cancel: &CancellationToken,
    mut attempt: F,
) -> PollOutcome<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let start = Instant::now();
    let deadline = start + policy.timeout;
    let mut attempts = 0;
    while Instant::now() < deadline {
        if cancel.is_cancelled() {
            return PollOutcome::Cancelled { attempts, elapsed: start.elapsed() };
        }
        attempts += 1;
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return PollOutcome::Cancelled { attempts, elapsed: start.elapsed() };
            }
            result = tokio::time::timeout_at(deadline, attempt(attempts)) => result.ok().flatten(),
        };
        if let Some(value) = result {
            return PollOutcome::Ready { value, attempts, elapsed: start.elapsed() };
        }
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return PollOutcome::Cancelled { attempts, elapsed: start.elapsed() };
            }
            _ = tokio::time::sleep_until((Instant::now() + policy.poll_interval).min(deadline)) => {}
        }
    }
    PollOutcome::TimedOut { attempts, elapsed: start.elapsed() }
}
