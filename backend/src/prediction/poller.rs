use std::time::Duration;

use log::{debug, warn};

use super::model::PredictionStatus;
use super::{PredictionBackend, PredictionError};

/// Polling cadence and attempt budget. Configurable so tests can run
/// with short intervals; production defaults are one query per second
/// for at most 30 attempts.
#[derive(Debug, Clone)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_attempts: 30,
        }
    }
}

/// Resolve a submitted job into its output reference, or fail
/// deterministically.
///
/// Issues at most `max_attempts` status queries on a fixed cadence.
/// Success is only terminal once the output reference is attached;
/// terminal failure and transport errors end the loop immediately with
/// no retry. Exhausting the budget yields a timeout, distinct from a
/// job failure. The loop sleeps between queries but never after the
/// final one.
pub async fn poll_until_complete<B>(
    backend: &B,
    job_id: &str,
    config: &PollConfig,
) -> Result<String, PredictionError>
where
    B: PredictionBackend + ?Sized,
{
    for attempt in 1..=config.max_attempts {
        let job = backend.poll(job_id).await?;

        match (job.status, job.output) {
            (PredictionStatus::Succeeded, Some(output)) => {
                return Ok(output);
            }
            (PredictionStatus::Failed, _) => {
                warn!("Prediction {} reported failure", job_id);
                return Err(PredictionError::JobFailed(
                    "Image processing failed".to_string(),
                ));
            }
            // The service can report success before the output
            // reference is attached; keep polling until it appears.
            _ => {
                debug!(
                    "Prediction {} not ready (attempt {}/{})",
                    job_id, attempt, config.max_attempts
                );
                if attempt < config.max_attempts {
                    tokio::time::sleep(config.interval).await;
                }
            }
        }
    }

    warn!(
        "Prediction {} did not complete within {} attempts",
        job_id, config.max_attempts
    );
    Err(PredictionError::Timeout(config.max_attempts))
}
