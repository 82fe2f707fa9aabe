//! Error taxonomy for model hosting and the inference pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from the model host lifecycle and graph execution.
///
/// Load errors are terminal for a host instance: nothing is retained and
/// every subsequent `run` fails fast with `NotLoaded`.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The model artifact file is absent at the configured path.
    #[error("model artifact not found at {}", path.display())]
    NotFound { path: PathBuf },

    /// The artifact exists but could not be loaded into the runtime,
    /// or does not expose the configured tensor names.
    #[error("failed to load model: {reason}")]
    Load { reason: String },

    /// `run` was called before a successful load, or after release.
    #[error("model not loaded")]
    NotLoaded,

    /// Graph execution failed.
    #[error("inference failed: {reason}")]
    Inference { reason: String },
}

/// Errors from a single classification call.
///
/// Contained to that call: they never affect the model host's state or
/// other in-flight calls. `predict` surfaces only `Decode` to its caller;
/// everything else degrades to a negative verdict plus a logged
/// diagnostic.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input bytes are not a supported image encoding or are corrupt.
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error(transparent)]
    Model(#[from] ModelError),

    /// The model produced an output the pipeline cannot interpret as a
    /// 2-D tensor with a scalar at (0, 0).
    #[error("unexpected output tensor shape {0:?}")]
    OutputShape(Vec<i64>),

    #[error("worker task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_the_path() {
        let err = ModelError::NotFound {
            path: PathBuf::from("/opt/rice/models/model.onnx"),
        };
        assert!(err.to_string().contains("/opt/rice/models/model.onnx"));
    }

    #[test]
    fn model_errors_convert_into_pipeline_errors() {
        let err: PipelineError = ModelError::NotLoaded.into();
        assert!(matches!(err, PipelineError::Model(ModelError::NotLoaded)));
    }
}
