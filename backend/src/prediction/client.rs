use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::json;

use super::model::{PredictionInput, PredictionJob};
use super::{PredictionBackend, PredictionError, TextToImageBackend};

/// Client for the Replicate prediction API: POST /v1/predictions to
/// submit, GET /v1/predictions/{id} to query.
#[derive(Clone)]
pub struct ReplicateClient {
    http_client: HttpClient,
    base_url: String,
    api_token: String,
    model_version: String,
}

impl ReplicateClient {
    pub fn new(base_url: String, api_token: String, model_version: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            base_url,
            api_token,
            model_version,
        }
    }
}

#[async_trait]
impl PredictionBackend for ReplicateClient {
    async fn submit(&self, input: &PredictionInput) -> Result<String, PredictionError> {
        let response = self
            .http_client
            .post(format!("{}/v1/predictions", self.base_url))
            .header("Authorization", format!("Token {}", self.api_token))
            .json(&json!({
                "version": self.model_version,
                "input": input,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PredictionError::Service(response.status()));
        }

        let prediction: PredictionJob = response.json().await?;
        info!("Submitted prediction {}", prediction.id);
        Ok(prediction.id)
    }

    async fn poll(&self, job_id: &str) -> Result<PredictionJob, PredictionError> {
        let response = self
            .http_client
            .get(format!("{}/v1/predictions/{}", self.base_url, job_id))
            .header("Authorization", format!("Token {}", self.api_token))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PredictionError::Service(response.status()));
        }

        let job: PredictionJob = response.json().await?;
        debug!("Prediction {} status: {:?}", job_id, job.status);
        Ok(job)
    }
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    data: Vec<String>,
}

/// Client for the synchronous stable-diffusion integration endpoint.
/// The generated image URL comes back as the first element of `data`.
#[derive(Clone)]
pub struct StableDiffusionClient {
    http_client: HttpClient,
    base_url: String,
}

impl StableDiffusionClient {
    pub fn new(base_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            base_url,
        }
    }
}

#[async_trait]
impl TextToImageBackend for StableDiffusionClient {
    async fn generate(&self, prompt: &str) -> Result<String, PredictionError> {
        let url = format!(
            "{}/integrations/stable-diffusion-v-3/?prompt={}",
            self.base_url,
            urlencoding::encode(prompt)
        );

        let response = self.http_client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(PredictionError::Service(response.status()));
        }

        let generation: GenerationResponse = response.json().await?;
        generation.data.into_iter().next().ok_or_else(|| {
            PredictionError::JobFailed(
                "No processed image received from Stable Diffusion".to_string(),
            )
        })
    }
}
