pub mod client;
pub mod model;
pub mod poller;

use async_trait::async_trait;
use thiserror::Error;

use self::model::{PredictionInput, PredictionJob};

#[derive(Error, Debug)]
pub enum PredictionError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("prediction service error: {0}")]
    Service(reqwest::StatusCode),
    #[error("Image processing failed: {0}")]
    JobFailed(String),
    #[error("Processing timeout after {0} attempts")]
    Timeout(u32),
}

/// Capability interface over the asynchronous prediction service, so
/// the poll loop can run against a scripted fake in tests.
#[async_trait]
pub trait PredictionBackend: Send + Sync {
    /// Submit a transformation job, returning the job identifier.
    async fn submit(&self, input: &PredictionInput) -> Result<String, PredictionError>;

    /// Query the current state of a previously submitted job.
    async fn poll(&self, job_id: &str) -> Result<PredictionJob, PredictionError>;
}

/// One-shot text-to-image generation used by the Ghibli style path,
/// which has no job lifecycle to poll.
#[async_trait]
pub trait TextToImageBackend: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, PredictionError>;
}
