//! HTTP service that serves haircut recommendations from a pre-trained
//! classifier, along with the category lists observed in its dataset.

pub mod classifier;
pub mod config;
pub mod dataset;
pub mod encoding;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod state;

pub use classifier::{Classifier, OnnxClassifier};
pub use config::Config;
pub use errors::{AppError, ModelError, PredictError};
pub use state::{AppState, CategoryLists};
