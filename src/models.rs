use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of `POST /predict`.
///
/// `features` is kept as a raw JSON object so that missing or mistyped fields
/// surface as prediction errors rather than extractor rejections.
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub features: Option<Map<String, Value>>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PredictionResponse {
    pub prediction: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}
