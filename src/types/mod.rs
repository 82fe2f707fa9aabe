//! Type definitions for the rice infection classifier

pub mod prediction;

pub use prediction::Prediction;
