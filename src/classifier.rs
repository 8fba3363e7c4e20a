//! Predictive model abstraction and its ONNX implementation.

use std::fmt::Display;
use std::path::Path;
use std::sync::Arc;

use tracing::{error, info};
use tract_onnx::prelude::*;

use crate::config::ModelConfig;
use crate::errors::ModelError;

/// Width of the encoded feature vector.
pub const FEATURE_COUNT: usize = 5;

/// A trained classifier: one encoded feature vector in, one label out.
pub trait Classifier: Send + Sync {
    fn predict(&self, features: &[i64]) -> Result<String, ModelError>;
}

/// Classifier backed by an ONNX export of the trained model, run with tract.
pub struct OnnxClassifier {
    plan: TypedRunnableModel<TypedModel>,
    labels: Vec<String>,
}

impl OnnxClassifier {
    /// Load, optimize and prepare the model for single-row batches.
    ///
    /// `labels` maps class indices to names when the model emits indices or
    /// scores instead of string labels.
    pub fn load(path: impl AsRef<Path>, labels: Vec<String>) -> Result<Self, ModelError> {
        let path = path.as_ref();

        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .map_err(|e| load_error(path, e))?
            .with_input_fact(0, f32::fact([1, FEATURE_COUNT]).into())
            .map_err(|e| load_error(path, e))?
            .into_optimized()
            .map_err(|e| load_error(path, e))?
            .into_runnable()
            .map_err(|e| load_error(path, e))?;

        Ok(Self { plan, labels })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

impl Classifier for OnnxClassifier {
    fn predict(&self, features: &[i64]) -> Result<String, ModelError> {
        if features.len() != FEATURE_COUNT {
            return Err(ModelError::Inference {
                message: format!(
                    "expected {} features, got {}",
                    FEATURE_COUNT,
                    features.len()
                ),
            });
        }

        let row: Vec<f32> = features.iter().map(|&v| v as f32).collect();
        let input = tract_ndarray::Array2::from_shape_vec((1, FEATURE_COUNT), row)
            .map_err(|e| ModelError::Inference {
                message: e.to_string(),
            })?
            .into_tensor();

        let outputs = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|e| ModelError::Inference {
                message: e.to_string(),
            })?;

        let output = outputs.first().ok_or_else(|| ModelError::UnexpectedOutput {
            message: "model produced no outputs".to_string(),
        })?;
        label_from_output(output, &self.labels)
    }
}

fn load_error(path: &Path, e: impl Display) -> ModelError {
    ModelError::Load {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

/// Read the first row's prediction from a model output tensor.
///
/// String tensors carry the label directly, i64 tensors carry a class index,
/// and f32 tensors carry per-class scores whose argmax is the class index.
pub fn label_from_output(output: &Tensor, labels: &[String]) -> Result<String, ModelError> {
    let unexpected = |message: String| ModelError::UnexpectedOutput { message };

    match output.datum_type() {
        DatumType::String => {
            let view = output
                .to_array_view::<String>()
                .map_err(|e| unexpected(e.to_string()))?;
            view.iter()
                .next()
                .cloned()
                .ok_or_else(|| unexpected("empty label tensor".to_string()))
        }
        DatumType::I64 => {
            let view = output
                .to_array_view::<i64>()
                .map_err(|e| unexpected(e.to_string()))?;
            let index = *view
                .iter()
                .next()
                .ok_or_else(|| unexpected("empty class tensor".to_string()))?;
            let index = usize::try_from(index)
                .map_err(|_| unexpected(format!("negative class index {}", index)))?;
            label_at(labels, index)
        }
        DatumType::F32 => {
            let view = output
                .to_array_view::<f32>()
                .map_err(|e| unexpected(e.to_string()))?;
            let row_width = view.shape().last().copied().unwrap_or(0);
            let (index, _) = view
                .iter()
                .take(row_width)
                .enumerate()
                .max_by(|(_, a), (_, b)| a.total_cmp(b))
                .ok_or_else(|| unexpected("empty score tensor".to_string()))?;
            label_at(labels, index)
        }
        other => Err(unexpected(format!("unsupported output type {:?}", other))),
    }
}

fn label_at(labels: &[String], index: usize) -> Result<String, ModelError> {
    labels.get(index).cloned().ok_or(ModelError::UnknownClass {
        index,
        labels: labels.len(),
    })
}

/// Load the configured model. A failure is logged and yields `None`, leaving
/// the service up with prediction disabled.
pub fn load_classifier(config: &ModelConfig, labels: Vec<String>) -> Option<Arc<dyn Classifier>> {
    match OnnxClassifier::load(&config.path, labels) {
        Ok(classifier) => {
            info!(
                "Model loaded from {} ({} class labels)",
                config.path.display(),
                classifier.labels().len()
            );
            Some(Arc::new(classifier))
        }
        Err(e) => {
            error!("Error loading the model: {}", e);
            None
        }
    }
}
