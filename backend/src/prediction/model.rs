use serde::{Deserialize, Serialize};

/// Lifecycle states reported by the prediction service. `Failed` is
/// terminal; `Succeeded` is terminal once an output reference is
/// present. Everything else consumes one polling attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionStatus {
    Starting,
    Processing,
    Succeeded,
    Failed,
    #[serde(other)]
    Unknown,
}

/// Snapshot of a prediction job as returned by a status query. The
/// poll loop observes these; only the external service mutates them.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictionJob {
    pub id: String,
    pub status: PredictionStatus,
    pub output: Option<String>,
}

/// Input payload for a filter transformation job. Free-form settings
/// are spread alongside the fixed fields, mirroring the service's
/// `input` object.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionInput {
    pub image: String,
    pub filter: String,
    #[serde(flatten)]
    pub settings: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn settings_are_spread_into_the_input_object() {
        let mut settings = serde_json::Map::new();
        settings.insert("intensity".into(), json!(50));

        let input = PredictionInput {
            image: "https://cdn.example/in.png".into(),
            filter: "sepia".into(),
            settings,
        };

        let body = serde_json::to_value(&input).unwrap();
        assert_eq!(body["image"], "https://cdn.example/in.png");
        assert_eq!(body["filter"], "sepia");
        assert_eq!(body["intensity"], 50);
    }

    #[test]
    fn unrecognized_status_is_non_terminal() {
        let job: PredictionJob =
            serde_json::from_value(json!({ "id": "abc", "status": "canceled", "output": null }))
                .unwrap();
        assert_eq!(job.status, PredictionStatus::Unknown);
    }
}
