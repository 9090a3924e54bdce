use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};

use super::TranscriptClient;
use crate::config::PollingConfig;
use crate::error::{ApiError, Result};
use crate::models::{JobStatus, Transcript};

/// Timing for a job poll loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    /// Delay between status checks (not applied before the first)
    pub interval: Duration,

    /// Ceiling on the whole loop, measured from its start
    pub timeout: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            timeout: Duration::from_secs(1200),
        }
    }
}

impl From<&PollingConfig> for PollOptions {
    fn from(config: &PollingConfig) -> Self {
        Self {
            interval: config.interval(),
            timeout: config.timeout(),
        }
    }
}

impl TranscriptClient {
    /// Poll an ASR job until it completes, fails or runs out of time.
    pub async fn wait_for_job(&self, job_id: &str, options: PollOptions) -> Result<Transcript> {
        let started = Instant::now();
        let mut check_count = 0u32;

        loop {
            check_count += 1;
            let job = self.get_job(job_id).await?;

            tracing::debug!(
                job_id,
                status = %job.status,
                check = check_count,
                elapsed_secs = started.elapsed().as_secs(),
                "Polled job status"
            );

            match job.status {
                JobStatus::Completed => {
                    if let Some(transcript) = job.transcript {
                        tracing::info!(job_id, checks = check_count, "Job completed");
                        return Ok(transcript);
                    }
                }
                JobStatus::Failed => {
                    let reason = job.error_message();
                    tracing::warn!(job_id, %reason, "Job failed");
                    return Err(ApiError::JobFailed {
                        job_id: job_id.to_string(),
                        reason,
                    });
                }
                _ => {}
            }

            if started.elapsed() > options.timeout {
                return Err(ApiError::Timeout(format!(
                    "Job {} did not finish within {}s",
                    job_id,
                    options.timeout.as_secs()
                )));
            }

            sleep(options.interval).await;
        }
    }

    /// [`wait_for_job`](Self::wait_for_job), abandoned as soon as `cancel` resolves.
    pub async fn wait_for_job_until<F>(
        &self,
        job_id: &str,
        options: PollOptions,
        cancel: F,
    ) -> Result<Transcript>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            result = self.wait_for_job(job_id, options) => result,
            _ = cancel => {
                tracing::info!(job_id, "Job polling cancelled");
                Err(ApiError::Cancelled)
            }
        }
    }
}
