use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use uuid::Uuid;

/// Filters the service recognizes. The first four are rendered
/// client-side; `Ghibli` is delegated to the prediction service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FilterType {
    Grayscale,
    Sepia,
    Blur,
    Contrast,
    Ghibli,
}

/// One transformation request as submitted by the client.
///
/// `filter_type` stays a raw string here so an unknown value reaches
/// the validation layer instead of failing JSON deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformRequest {
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub filter_type: String,
    #[serde(default)]
    pub settings: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GhibliRequest {
    #[serde(default)]
    pub image_url: String,
}

/// A persisted original/processed mapping, created exactly once per
/// successfully completed transformation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedImage {
    pub id: Uuid,
    pub original_url: String,
    pub processed_url: String,
    pub filter_type: FilterType,
    pub filter_settings: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Caller-facing result shape. Every failure path is folded into the
/// `Failure` variant; the processing endpoints never surface a fault.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ProcessResponse {
    Success(ProcessedImage),
    Failure { error: String },
}

impl ProcessResponse {
    pub fn failure<S: Into<String>>(message: S) -> Self {
        Self::Failure {
            error: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_type_parses_lowercase_names() {
        assert_eq!("ghibli".parse::<FilterType>().unwrap(), FilterType::Ghibli);
        assert_eq!("blur".parse::<FilterType>().unwrap(), FilterType::Blur);
        assert!("vaporwave".parse::<FilterType>().is_err());
    }

    #[test]
    fn filter_type_displays_as_wire_name() {
        assert_eq!(FilterType::Grayscale.to_string(), "grayscale");
    }

    #[test]
    fn transform_request_tolerates_missing_fields() {
        let request: TransformRequest = serde_json::from_str("{}").unwrap();
        assert!(request.image_url.is_empty());
        assert!(request.filter_type.is_empty());
        assert!(request.settings.is_empty());
    }

    #[test]
    fn failure_response_uses_error_key() {
        let body = serde_json::to_value(ProcessResponse::failure("Invalid filter type")).unwrap();
        assert_eq!(body["error"], "Invalid filter type");
    }
}
