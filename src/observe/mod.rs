//! The observation loop: poll execution status until a terminal phase,
//! relaying new log lines along the way.

pub mod logs;

use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::engine::client::EngineClient;
use crate::engine::types::{ExecutionHandle, ExecutionStatus, Phase};
use crate::error::{Error, Result};
use self::logs::LogRelay;

/// Bounded exponential backoff applied to transient transport failures
/// during status polling. Explicit so tests can exercise the schedule
/// without a clock.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (zero-based): base * multiplier^attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.mul_f64(self.multiplier.powi(attempt as i32))
    }
}

/// Drives one execution to a terminal phase within a wall-clock budget.
#[derive(Debug, Clone)]
pub struct StatusPoller {
    poll_interval: Duration,
    max_wait: Duration,
    retry: RetryPolicy,
}

impl StatusPoller {
    pub fn new(poll_interval: Duration, max_wait: Duration) -> Self {
        Self::with_retry(poll_interval, max_wait, RetryPolicy::default())
    }

    pub fn with_retry(poll_interval: Duration, max_wait: Duration, retry: RetryPolicy) -> Self {
        Self {
            poll_interval,
            max_wait,
            retry,
        }
    }

    /// Poll until the engine reports a terminal phase, pulling the log relay
    /// once per iteration and handing each new line to `on_line`.
    ///
    /// Returns `Error::Timeout` carrying the last observed status once
    /// `max_wait` elapses without a terminal phase. Suspension happens only
    /// at the loop boundary, between iterations. `Unknown` counts as
    /// not-yet-terminal, bounded by the same budget.
    pub async fn observe<F>(
        &self,
        client: &EngineClient,
        handle: &ExecutionHandle,
        relay: &mut LogRelay,
        mut on_line: F,
    ) -> Result<ExecutionStatus>
    where
        F: FnMut(&str),
    {
        let started = Instant::now();
        let mut last_phase: Option<Phase> = None;

        loop {
            let status = self.status_with_retry(client, handle).await?;
            if last_phase != Some(status.phase) {
                info!(execution = %handle, phase = %status.phase, "phase observed");
                last_phase = Some(status.phase);
            }

            // Log relay is best-effort: a failed pull is retried implicitly
            // on the next iteration, status polling decides liveness.
            match relay.pull(client, handle).await {
                Ok(lines) => {
                    for line in &lines {
                        on_line(line);
                    }
                }
                Err(err) => warn!(execution = %handle, %err, "log fetch failed, skipping"),
            }

            if status.phase.is_terminal() {
                return Ok(status);
            }
            if started.elapsed() >= self.max_wait {
                return Err(Error::Timeout {
                    waited: started.elapsed(),
                    last: status,
                });
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn status_with_retry(
        &self,
        client: &EngineClient,
        handle: &ExecutionHandle,
    ) -> Result<ExecutionStatus> {
        let mut attempt = 0u32;
        loop {
            match client.get_status(handle).await {
                Ok(status) => return Ok(status),
                Err(err) if err.is_transient() && attempt + 1 < self.retry.max_attempts => {
                    let delay = self.retry.delay_for(attempt);
                    warn!(execution = %handle, attempt, ?delay, %err, "status fetch failed, backing off");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_schedule_doubles_from_base() {
        let policy = RetryPolicy {
            max_attempts: 4,
            base_delay: Duration::from_millis(100),
            multiplier: 2.0,
        };
        assert_eq!(policy.delay_for(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for(2), Duration::from_millis(400));
    }

    #[test]
    fn unit_multiplier_keeps_delay_constant() {
        let policy = RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(50),
            multiplier: 1.0,
        };
        assert_eq!(policy.delay_for(0), policy.delay_for(2));
    }
}
