use crate::model::{FeatureAttribution, Outcome};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct ScoreResponse {
    pub request_id: Uuid,
    pub scored_at: DateTime<Utc>,
    pub probability_fully_paid: f64,
    pub probability_default: f64,
    pub predicted_outcome: Outcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribution: Option<Vec<FeatureAttribution>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_value: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub explainable: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
