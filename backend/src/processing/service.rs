use std::sync::Arc;

use log::info;
use serde_json::json;
use thiserror::Error;

use shared::{FilterType, GhibliRequest, ProcessedImage, TransformRequest};

use crate::db::image_repository::{ImageStore, NewProcessedImage, StoreError};
use crate::prediction::model::PredictionInput;
use crate::prediction::poller::{PollConfig, poll_until_complete};
use crate::prediction::{PredictionBackend, PredictionError, TextToImageBackend};

const GHIBLI_PROMPT: &str = "Transform this image into Studio Ghibli animation style, \
    maintaining the same composition but with Ghibli's signature soft colors, \
    hand-drawn aesthetic, and magical atmosphere";

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Prediction(#[from] PredictionError),
    #[error("failed to save processed image: {0}")]
    Database(#[from] StoreError),
}

impl ProcessingError {
    fn validation(message: &str) -> Self {
        Self::Validation(message.to_string())
    }
}

/// Orchestrates one transformation request: validate, submit the job,
/// poll it to completion, persist the result. Holds no per-request
/// state, so concurrent requests share nothing but the clients.
#[derive(Clone)]
pub struct ProcessingService {
    backend: Arc<dyn PredictionBackend>,
    text_to_image: Arc<dyn TextToImageBackend>,
    store: Arc<dyn ImageStore>,
    poll: PollConfig,
}

impl ProcessingService {
    pub fn new(
        backend: Arc<dyn PredictionBackend>,
        text_to_image: Arc<dyn TextToImageBackend>,
        store: Arc<dyn ImageStore>,
        poll: PollConfig,
    ) -> Self {
        Self {
            backend,
            text_to_image,
            store,
            poll,
        }
    }

    /// Generic filter path. Validation happens before any network
    /// call; a record is written only for jobs that succeeded within
    /// the attempt budget.
    pub async fn process_image(
        &self,
        request: TransformRequest,
    ) -> Result<ProcessedImage, ProcessingError> {
        if request.image_url.is_empty() {
            return Err(ProcessingError::validation("Image URL is required"));
        }
        if request.filter_type.is_empty() {
            return Err(ProcessingError::validation(
                "Image URL and filter type are required",
            ));
        }
        let filter: FilterType = request
            .filter_type
            .parse()
            .map_err(|_| ProcessingError::validation("Invalid filter type"))?;

        let input = PredictionInput {
            image: request.image_url.clone(),
            filter: filter.to_string(),
            settings: request.settings.clone(),
        };
        let job_id = self.backend.submit(&input).await?;
        let processed_url = poll_until_complete(self.backend.as_ref(), &job_id, &self.poll).await?;

        let record = self
            .store
            .insert(NewProcessedImage {
                original_url: request.image_url,
                processed_url,
                filter_type: filter,
                filter_settings: serde_json::Value::Object(request.settings),
            })
            .await?;
        info!("Processed image {} with filter {}", record.id, filter);
        Ok(record)
    }

    pub async fn get_image(
        &self,
        id: uuid::Uuid,
    ) -> Result<Option<ProcessedImage>, ProcessingError> {
        Ok(self.store.get(id).await?)
    }

    /// Ghibli style path. Synchronous at the HTTP level: a single
    /// text-to-image call with a fixed prompt, no job to poll.
    pub async fn process_ghibli(
        &self,
        request: GhibliRequest,
    ) -> Result<ProcessedImage, ProcessingError> {
        if request.image_url.is_empty() {
            return Err(ProcessingError::validation("Image URL is required"));
        }

        let processed_url = self.text_to_image.generate(GHIBLI_PROMPT).await?;

        let record = self
            .store
            .insert(NewProcessedImage {
                original_url: request.image_url,
                processed_url,
                filter_type: FilterType::Ghibli,
                filter_settings: json!({ "prompt": GHIBLI_PROMPT }),
            })
            .await?;
        info!("Processed image {} with filter ghibli", record.id);
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::prediction::model::PredictionStatus;
    use crate::processing::testing::{FakePredictionBackend, FakeTextToImage, MemoryStore};

    fn service(
        backend: Arc<FakePredictionBackend>,
        store: Arc<MemoryStore>,
    ) -> ProcessingService {
        ProcessingService::new(
            backend,
            Arc::new(FakeTextToImage::returning("https://x/ghibli.png")),
            store,
            PollConfig {
                interval: Duration::from_millis(1),
                max_attempts: 30,
            },
        )
    }

    fn request(image_url: &str, filter_type: &str) -> TransformRequest {
        TransformRequest {
            image_url: image_url.to_string(),
            filter_type: filter_type.to_string(),
            settings: serde_json::Map::new(),
        }
    }

    #[tokio::test]
    async fn empty_image_url_is_rejected_before_any_network_call() {
        let backend = Arc::new(FakePredictionBackend::succeeding("https://x/out.png"));
        let store = Arc::new(MemoryStore::default());
        let service = service(backend.clone(), store.clone());

        let error = service
            .process_image(request("", "grayscale"))
            .await
            .unwrap_err();

        assert_eq!(error.to_string(), "Image URL is required");
        assert_eq!(backend.network_calls(), 0);
        assert!(store.images.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_filter_type_is_rejected_before_any_network_call() {
        let backend = Arc::new(FakePredictionBackend::succeeding("https://x/out.png"));
        let service = service(backend.clone(), Arc::new(MemoryStore::default()));

        let error = service
            .process_image(request("https://cdn.example/in.png", ""))
            .await
            .unwrap_err();

        assert_eq!(error.to_string(), "Image URL and filter type are required");
        assert_eq!(backend.network_calls(), 0);
    }

    #[tokio::test]
    async fn unknown_filter_type_is_rejected_before_any_network_call() {
        let backend = Arc::new(FakePredictionBackend::succeeding("https://x/out.png"));
        let service = service(backend.clone(), Arc::new(MemoryStore::default()));

        let error = service
            .process_image(request("https://cdn.example/in.png", "vaporwave"))
            .await
            .unwrap_err();

        assert_eq!(error.to_string(), "Invalid filter type");
        assert_eq!(backend.network_calls(), 0);
    }

    #[tokio::test]
    async fn successful_job_is_persisted_exactly_once() {
        let backend = Arc::new(FakePredictionBackend::succeeding("https://x/out.png"));
        let store = Arc::new(MemoryStore::default());
        let service = service(backend.clone(), store.clone());

        let mut request = request("https://cdn.example/in.png", "sepia");
        request.settings.insert("intensity".into(), json!(50));

        let record = service.process_image(request).await.unwrap();

        assert_eq!(record.original_url, "https://cdn.example/in.png");
        assert_eq!(record.processed_url, "https://x/out.png");
        assert_eq!(record.filter_type, FilterType::Sepia);
        assert_eq!(record.filter_settings["intensity"], 50);
        assert_eq!(store.images.lock().unwrap().len(), 1);
        assert_eq!(backend.submits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_job_persists_nothing() {
        let backend = Arc::new(FakePredictionBackend::with_statuses(vec![(
            PredictionStatus::Failed,
            None,
        )]));
        let store = Arc::new(MemoryStore::default());
        let service = service(backend, store.clone());

        let error = service
            .process_image(request("https://cdn.example/in.png", "blur"))
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            ProcessingError::Prediction(PredictionError::JobFailed(_))
        ));
        assert!(store.images.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn timed_out_job_persists_nothing() {
        let backend = Arc::new(FakePredictionBackend::with_statuses(vec![(
            PredictionStatus::Processing,
            None,
        )]));
        let store = Arc::new(MemoryStore::default());
        let service = service(backend.clone(), store.clone());

        let error = service
            .process_image(request("https://cdn.example/in.png", "contrast"))
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            ProcessingError::Prediction(PredictionError::Timeout(30))
        ));
        assert_eq!(backend.queries.load(Ordering::SeqCst), 30);
        assert!(store.images.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn ghibli_path_records_prompt_settings() {
        let store = Arc::new(MemoryStore::default());
        let service = ProcessingService::new(
            Arc::new(FakePredictionBackend::succeeding("unused")),
            Arc::new(FakeTextToImage::returning("https://x/ghibli.png")),
            store.clone(),
            PollConfig::default(),
        );

        let record = service
            .process_ghibli(GhibliRequest {
                image_url: "https://cdn.example/in.png".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(record.processed_url, "https://x/ghibli.png");
        assert_eq!(record.filter_type, FilterType::Ghibli);
        assert!(
            record.filter_settings["prompt"]
                .as_str()
                .unwrap()
                .contains("Studio Ghibli")
        );
        assert_eq!(store.images.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn ghibli_path_requires_an_image_url() {
        let text_to_image = Arc::new(FakeTextToImage::returning("https://x/ghibli.png"));
        let service = ProcessingService::new(
            Arc::new(FakePredictionBackend::succeeding("unused")),
            text_to_image.clone(),
            Arc::new(MemoryStore::default()),
            PollConfig::default(),
        );

        let error = service
            .process_ghibli(GhibliRequest {
                image_url: String::new(),
            })
            .await
            .unwrap_err();

        assert_eq!(error.to_string(), "Image URL is required");
        assert_eq!(text_to_image.calls.load(Ordering::SeqCst), 0);
    }
}
