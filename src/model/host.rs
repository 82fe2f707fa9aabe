//! ONNX model host: owns the loaded artifact and its execution session.

use crate::config::ModelConfig;
use crate::error::ModelError;
use crate::preprocess::InputTensor;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use std::path::Path;
use tracing::{error, info};

/// File name of the model artifact inside the configured directory
pub const MODEL_FILE: &str = "model.onnx";

/// Raw output tensor from a graph execution
#[derive(Debug, Clone)]
pub struct RawOutput {
    /// Output tensor dimensions
    pub shape: Vec<i64>,
    /// Flat output data, row-major
    pub data: Vec<f32>,
}

impl RawOutput {
    /// Scalar at position (0, 0) of the 2-D output.
    /// Returns `None` if the output is not a non-empty 2-D tensor.
    pub fn scalar(&self) -> Option<f32> {
        if self.shape.len() == 2 && !self.data.is_empty() {
            Some(self.data[0])
        } else {
            None
        }
    }
}

/// Owns the model artifact and its execution session.
///
/// Loaded exactly once per process lifetime and immutable afterwards.
/// `release` (or drop) frees the native session; after that every `run`
/// fails fast with `NotLoaded`.
pub struct ModelHost {
    session: Option<Session>,
    input_name: String,
    output_name: String,
}

impl ModelHost {
    /// Load the model artifact from the configured directory.
    ///
    /// Fails with `NotFound` if the artifact file is absent, or `Load` if
    /// it is present but malformed or missing the configured tensor
    /// names. On any failure nothing is retained; a partially built
    /// session drops before the error returns.
    pub fn load(config: &ModelConfig) -> Result<Self, ModelError> {
        let artifact = Path::new(&config.model_dir).join(MODEL_FILE);
        if !artifact.exists() {
            let err = ModelError::NotFound { path: artifact };
            error!(error = %err, "Model load failed");
            return Err(err);
        }

        match Self::load_artifact(&artifact, config) {
            Ok(host) => {
                info!(
                    path = %artifact.display(),
                    input = %host.input_name,
                    output = %host.output_name,
                    "Model loaded successfully"
                );
                Ok(host)
            }
            Err(err) => {
                error!(path = %artifact.display(), error = %err, "Model load failed");
                Err(err)
            }
        }
    }

    fn load_artifact(artifact: &Path, config: &ModelConfig) -> Result<Self, ModelError> {
        ort::init().commit().map_err(|e| ModelError::Load {
            reason: e.to_string(),
        })?;

        let session = Session::builder()
            .and_then(|b| b.with_optimization_level(GraphOptimizationLevel::Level3))
            .and_then(|b| b.with_intra_threads(config.onnx_threads))
            .and_then(|b| b.commit_from_file(artifact))
            .map_err(|e| ModelError::Load {
                reason: e.to_string(),
            })?;

        // The tensor names are a contract with the trained artifact; a
        // mismatch must fail at load, not at the first classification.
        if !session.inputs.iter().any(|i| i.name == config.input_tensor) {
            return Err(ModelError::Load {
                reason: format!(
                    "graph has no input tensor named {:?}",
                    config.input_tensor
                ),
            });
        }
        if !session
            .outputs
            .iter()
            .any(|o| o.name == config.output_tensor)
        {
            return Err(ModelError::Load {
                reason: format!(
                    "graph has no output tensor named {:?}",
                    config.output_tensor
                ),
            });
        }

        Ok(Self {
            session: Some(session),
            input_name: config.input_tensor.clone(),
            output_name: config.output_tensor.clone(),
        })
    }

    /// Execute the graph on one input tensor and return the raw output.
    ///
    /// Fails with `NotLoaded` before a successful load or after release,
    /// and with `Inference` on execution failure. Neither affects the
    /// host's state.
    pub fn run(&mut self, input: InputTensor) -> Result<RawOutput, ModelError> {
        let session = self.session.as_mut().ok_or(ModelError::NotLoaded)?;

        let (shape, data) = input.into_parts();
        let tensor = Tensor::from_array((shape, data)).map_err(|e| ModelError::Inference {
            reason: e.to_string(),
        })?;

        let outputs = session
            .run(ort::inputs![&self.input_name => tensor])
            .map_err(|e| ModelError::Inference {
                reason: e.to_string(),
            })?;

        let output = outputs
            .get(self.output_name.as_str())
            .ok_or_else(|| ModelError::Inference {
                reason: format!("output tensor {:?} missing from results", self.output_name),
            })?;

        let (shape, data) =
            output
                .try_extract_tensor::<f32>()
                .map_err(|e| ModelError::Inference {
                    reason: e.to_string(),
                })?;

        Ok(RawOutput {
            shape: shape.iter().copied().collect(),
            data: data.to_vec(),
        })
    }

    /// Release the execution session and the artifact's native resources.
    /// Idempotent; also runs on drop, so every exit path releases.
    pub fn release(&mut self) {
        if self.session.take().is_some() {
            info!("Model released");
        }
    }

    /// Whether the host holds a live session.
    pub fn is_loaded(&self) -> bool {
        self.session.is_some()
    }

    /// Host in the released state, for exercising the `NotLoaded` paths.
    #[cfg(test)]
    pub(crate) fn unloaded() -> Self {
        Self {
            session: None,
            input_name: "input".to_string(),
            output_name: "output".to_string(),
        }
    }
}

impl Drop for ModelHost {
    fn drop(&mut self) {
        self.release();
    }
}
