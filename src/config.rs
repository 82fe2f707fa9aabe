//! Configuration management for the rice infection classifier.

use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub model: ModelConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Model artifact configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Directory containing the model artifact (model.onnx)
    #[serde(default = "default_model_dir")]
    pub model_dir: String,
    /// Name of the graph input tensor. This is a contract with the
    /// trained artifact and is validated at load time.
    #[serde(default = "default_input_tensor")]
    pub input_tensor: String,
    /// Name of the graph output tensor
    #[serde(default = "default_output_tensor")]
    pub output_tensor: String,
    /// Number of intra-op threads for graph execution (default: 1)
    #[serde(default = "default_onnx_threads")]
    pub onnx_threads: usize,
}

fn default_model_dir() -> String {
    "models".to_string()
}

fn default_input_tensor() -> String {
    // Names from the converted artifact, see saved_model_cli output
    "serving_default_input_1:0".to_string()
}

fn default_output_tensor() -> String {
    "StatefulPartitionedCall:0".to_string()
}

fn default_onnx_threads() -> usize {
    1
}

/// Detection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DetectionConfig {
    /// Scalar cutoff separating infected from not infected.
    /// The comparison is strict: a score exactly at the threshold is
    /// classified as not infected.
    #[serde(default = "default_threshold")]
    pub threshold: f32,
}

fn default_threshold() -> f32 {
    0.5
}

/// Upload limits enforced by the collaborator before bytes reach the core
#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Maximum accepted image size in bytes (default: 10 MiB)
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,
}

fn default_max_bytes() -> u64 {
    10 * 1024 * 1024
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl AppConfig {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            detection: DetectionConfig::default(),
            upload: UploadConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_dir: default_model_dir(),
            input_tensor: default_input_tensor(),
            output_tensor: default_output_tensor(),
            onnx_threads: default_onnx_threads(),
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_max_bytes(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.model.model_dir, "models");
        assert_eq!(config.model.input_tensor, "serving_default_input_1:0");
        assert_eq!(config.model.output_tensor, "StatefulPartitionedCall:0");
        assert_eq!(config.model.onnx_threads, 1);
        assert_eq!(config.detection.threshold, 0.5);
        assert_eq!(config.upload.max_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = AppConfig::load_from_path("/nonexistent/config.toml");
        assert!(result.is_err());
    }
}
