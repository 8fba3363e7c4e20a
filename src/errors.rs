//! Error types for the recommender service.
//!
//! Startup failures (`AppError`, `DatasetError`) abort the process. Request-time
//! failures (`PredictError`) are turned into a JSON error payload at the handler
//! boundary.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::models::ErrorResponse;

/// Failures while reading the tabular dataset.
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Failed to read dataset: {0}")]
    Csv(#[from] csv::Error),

    #[error("Dataset is missing required column '{column}'")]
    MissingColumn { column: String },
}

/// Failures while loading or invoking the predictive model.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Failed to load model from {path}: {message}")]
    Load { path: String, message: String },

    #[error("Inference failed: {message}")]
    Inference { message: String },

    #[error("Unexpected model output: {message}")]
    UnexpectedOutput { message: String },

    #[error("Predicted class index {index} has no label ({labels} labels known)")]
    UnknownClass { index: usize, labels: usize },
}

/// Failures while serving `POST /predict`.
///
/// Every variant maps to HTTP 500 with `{"error": <message>}`. Malformed client
/// input is not distinguished from internal faults.
#[derive(Error, Debug)]
pub enum PredictError {
    #[error("Model not loaded")]
    ModelNotLoaded,

    #[error("Failed to read request body: {message}")]
    Payload { message: String },

    #[error("Request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("Invalid request body: {0}")]
    InvalidBody(#[from] serde_json::Error),

    #[error("Request body has no 'features' object")]
    MissingFeatures,

    #[error("Missing feature '{field}'")]
    MissingField { field: &'static str },

    #[error("Feature '{field}' must be a string")]
    NotAString { field: &'static str },

    #[error("Unknown value '{value}' for feature '{field}'")]
    UnknownCategory { field: &'static str, value: String },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ResponseError for PredictError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
        })
    }
}

/// Failures that prevent the service from starting.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error("Dataset categories have no encoding: {}", .mismatches.join("; "))]
    InconsistentCategories { mismatches: Vec<String> },
}
