//! Rice infection classifier: image bytes in, boolean verdict out.

use crate::error::{ModelError, PipelineError};
use crate::model::host::ModelHost;
use crate::preprocess;
use crate::types::prediction::Prediction;
use std::sync::{Arc, RwLock};
use tokio::task;
use tracing::{debug, error};

/// Default decision threshold on the model's scalar output
pub const DEFAULT_THRESHOLD: f32 = 0.5;

/// Inference pipeline over a shared model host.
///
/// Created once at startup after the host has finished loading, then
/// cloned into every caller. The host is read-only after load, so
/// concurrent classifications against it are safe; graph execution is
/// serialized behind the lock.
#[derive(Clone)]
pub struct RiceClassifier {
    host: Arc<RwLock<ModelHost>>,
    threshold: f32,
}

impl RiceClassifier {
    /// Create a classifier over an already-loaded model host.
    pub fn new(host: Arc<RwLock<ModelHost>>, threshold: f32) -> Self {
        Self { host, threshold }
    }

    /// Classify image bytes, surfacing every failure distinctly.
    ///
    /// Decode, resize and normalization run on a blocking worker, as does
    /// graph execution, so the caller's task is never blocked. Errors are
    /// contained to this call and leave the host untouched.
    pub async fn classify(&self, image_bytes: Vec<u8>) -> Result<Prediction, PipelineError> {
        let tensor =
            task::spawn_blocking(move || preprocess::image_to_tensor(&image_bytes)).await??;

        let host = Arc::clone(&self.host);
        let output = task::spawn_blocking(move || {
            let mut host = host.write().map_err(|_| ModelError::Inference {
                reason: "model host lock poisoned".to_string(),
            })?;
            host.run(tensor)
        })
        .await??;

        let score = output
            .scalar()
            .ok_or_else(|| PipelineError::OutputShape(output.shape.clone()))?;

        debug!(score, threshold = self.threshold, "Inference complete");
        Ok(Prediction::from_score(score, self.threshold))
    }

    /// Classify image bytes into a boolean verdict.
    ///
    /// Malformed input propagates as a decode error; that is a
    /// caller-input problem, not a model problem. Every model-side
    /// failure is logged and degrades to `false`, so callers never crash
    /// on a broken model. They may receive a wrong,
    /// availability-preserving answer. Callers that need to distinguish
    /// "classified negative" from "could not classify" use [`classify`].
    ///
    /// [`classify`]: RiceClassifier::classify
    pub async fn predict(&self, image_bytes: Vec<u8>) -> Result<bool, PipelineError> {
        match self.classify(image_bytes).await {
            Ok(prediction) => Ok(prediction.infected),
            Err(PipelineError::Decode(e)) => Err(PipelineError::Decode(e)),
            Err(e) => {
                error!(error = %e, "Inference failed, defaulting to not infected");
                Ok(false)
            }
        }
    }

    /// The configured decision threshold.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn released_classifier() -> RiceClassifier {
        let host = Arc::new(RwLock::new(ModelHost::unloaded()));
        RiceClassifier::new(host, DEFAULT_THRESHOLD)
    }

    fn png_bytes() -> Vec<u8> {
        let img = RgbImage::from_pixel(40, 40, Rgb([120, 130, 140]));
        let mut cursor = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut cursor, ImageOutputFormat::Png)
            .unwrap();
        cursor.into_inner()
    }

    #[tokio::test]
    async fn classify_on_released_host_reports_not_loaded() {
        let classifier = released_classifier();
        let result = classifier.classify(png_bytes()).await;
        assert!(matches!(
            result,
            Err(PipelineError::Model(ModelError::NotLoaded))
        ));
    }

    #[tokio::test]
    async fn predict_swallows_model_failure_and_returns_false() {
        let classifier = released_classifier();
        let verdict = classifier.predict(png_bytes()).await.unwrap();
        assert!(!verdict);
    }

    #[tokio::test]
    async fn predict_propagates_decode_errors() {
        let classifier = released_classifier();
        let garbage = vec![0xDE, 0xAD, 0xBE, 0xEF];
        let result = classifier.predict(garbage).await;
        assert!(matches!(result, Err(PipelineError::Decode(_))));
    }

    #[tokio::test]
    async fn concurrent_predicts_do_not_panic() {
        let classifier = released_classifier();
        let mut handles = Vec::new();
        for _ in 0..8 {
            let classifier = classifier.clone();
            let bytes = png_bytes();
            handles.push(tokio::spawn(async move { classifier.predict(bytes).await }));
        }
        for handle in handles {
            let verdict = handle.await.unwrap().unwrap();
            assert!(!verdict);
        }
    }

    #[test]
    fn threshold_is_exposed() {
        assert_eq!(released_classifier().threshold(), DEFAULT_THRESHOLD);
    }
}
