//! Rice Infection Classifier Library
//!
//! Loads a pretrained ONNX model once and turns raw image bytes into an
//! infected / not-infected verdict through a fixed preprocessing
//! pipeline (resize to 100x100, desaturate, normalize to [0, 1]).

pub mod classifier;
pub mod config;
pub mod error;
pub mod metrics;
pub mod model;
pub mod preprocess;
pub mod types;

pub use classifier::RiceClassifier;
pub use config::AppConfig;
pub use error::{ModelError, PipelineError};
pub use model::host::ModelHost;
pub use preprocess::InputTensor;
pub use types::prediction::Prediction;
