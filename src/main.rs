//! Rice Infection Classifier - Main Entry Point
//!
//! Loads the model once at startup, classifies each image path given on
//! the command line, and prints one JSON prediction per line.

use anyhow::Result;
use rice_vision::{
    classifier::RiceClassifier,
    config::AppConfig,
    error::PipelineError,
    metrics::{ClassifierMetrics, MetricsReporter},
    model::host::ModelHost,
};
use std::sync::{Arc, RwLock};
use std::time::Instant;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("rice_vision=info".parse()?),
        )
        .init();

    info!("Starting rice infection classifier");

    // Load configuration
    let config = match AppConfig::load() {
        Ok(config) => {
            info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            warn!(error = %e, "No configuration file, using defaults");
            AppConfig::default()
        }
    };

    let images: Vec<String> = std::env::args().skip(1).collect();
    if images.is_empty() {
        anyhow::bail!("usage: rice-vision <image>...");
    }

    // Initialize metrics
    let metrics = Arc::new(ClassifierMetrics::new());

    // Load the model before any classification is issued. A load failure
    // is terminal: there is nothing useful to do without the model.
    let host = Arc::new(RwLock::new(ModelHost::load(&config.model)?));
    let classifier = RiceClassifier::new(Arc::clone(&host), config.detection.threshold);
    info!(
        threshold = config.detection.threshold,
        images = images.len(),
        "Classifier ready"
    );

    // Periodic metrics summaries for long runs
    let reporter_metrics = Arc::clone(&metrics);
    tokio::spawn(async move {
        MetricsReporter::new(reporter_metrics, 30).start().await;
    });

    for path in &images {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(path = %path, error = %e, "Failed to read image file");
                continue;
            }
        };

        // The upload cap belongs to the collaborator boundary, so it is
        // enforced here before the bytes ever reach the pipeline.
        if bytes.len() as u64 > config.upload.max_bytes {
            warn!(
                path = %path,
                size = bytes.len(),
                limit = config.upload.max_bytes,
                "Image exceeds upload limit, skipping"
            );
            continue;
        }

        let start = Instant::now();
        match classifier.classify(bytes).await {
            Ok(prediction) => {
                metrics.record_prediction(start.elapsed(), prediction.score, prediction.infected);
                info!(
                    path = %path,
                    infected = prediction.infected,
                    score = prediction.score,
                    processing_time_us = start.elapsed().as_micros(),
                    "Image classified"
                );
                println!("{}", serde_json::to_string(&prediction)?);
            }
            Err(PipelineError::Decode(e)) => {
                metrics.record_decode_failure();
                error!(path = %path, error = %e, "Image could not be decoded");
            }
            Err(e) => {
                metrics.record_inference_failure();
                error!(path = %path, error = %e, "Inference failed");
            }
        }
    }

    // Orderly shutdown: no classifications are in flight any more.
    metrics.print_summary();
    if let Ok(mut host) = host.write() {
        host.release();
    }
    info!("Shutdown complete");

    Ok(())
}
