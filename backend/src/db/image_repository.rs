use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use shared::{FilterType, ProcessedImage};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("stored record is malformed: {0}")]
    Malformed(String),
}

/// Row data for a record that has not been assigned an id yet.
#[derive(Debug, Clone)]
pub struct NewProcessedImage {
    pub original_url: String,
    pub processed_url: String,
    pub filter_type: FilterType,
    pub filter_settings: serde_json::Value,
}

/// Persistence seam for processed-image records. The processing
/// service only ever performs one insert per successful job, plus
/// reads for the lookup endpoint.
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn insert(&self, image: NewProcessedImage) -> Result<ProcessedImage, StoreError>;
    async fn get(&self, id: Uuid) -> Result<Option<ProcessedImage>, StoreError>;
}

#[derive(Clone)]
pub struct ImageRepository {
    pool: PgPool,
}

impl ImageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ProcessedImageRow {
    id: Uuid,
    original_url: String,
    processed_url: String,
    filter_type: String,
    filter_settings: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl ProcessedImageRow {
    fn into_record(self) -> Result<ProcessedImage, StoreError> {
        let filter_type: FilterType = self
            .filter_type
            .parse()
            .map_err(|_| StoreError::Malformed(format!("unknown filter type {:?}", self.filter_type)))?;
        Ok(ProcessedImage {
            id: self.id,
            original_url: self.original_url,
            processed_url: self.processed_url,
            filter_type,
            filter_settings: self.filter_settings,
            created_at: self.created_at,
        })
    }
}

#[async_trait]
impl ImageStore for ImageRepository {
    async fn insert(&self, image: NewProcessedImage) -> Result<ProcessedImage, StoreError> {
        let row = sqlx::query_as::<_, ProcessedImageRow>(
            r#"
            INSERT INTO processed_images
                (id, original_url, processed_url, filter_type, filter_settings, created_at)
            VALUES ($1, $2, $3, $4, $5, now())
            RETURNING id, original_url, processed_url, filter_type, filter_settings, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&image.original_url)
        .bind(&image.processed_url)
        .bind(image.filter_type.to_string())
        .bind(&image.filter_settings)
        .fetch_one(&self.pool)
        .await?;
        row.into_record()
    }

    async fn get(&self, id: Uuid) -> Result<Option<ProcessedImage>, StoreError> {
        let row = sqlx::query_as::<_, ProcessedImageRow>(
            r#"
            SELECT id, original_url, processed_url, filter_type, filter_settings, created_at
            FROM processed_images WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(ProcessedImageRow::into_record).transpose()
    }
}
