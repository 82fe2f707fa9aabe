//! Image preprocessing for rice infection model inference.
//!
//! This module turns raw image bytes into the exact tensor the model was
//! trained with: 100x100 pixels, desaturated, three channels normalized
//! to [0, 1]. A mismatch with the training-time preprocessing silently
//! produces wrong predictions, so every step here is fixed.

use crate::error::PipelineError;
use image::imageops::FilterType;

/// Model input width in pixels
pub const INPUT_WIDTH: u32 = 100;
/// Model input height in pixels
pub const INPUT_HEIGHT: u32 = 100;
/// Channels per pixel in the model input
pub const CHANNELS: usize = 3;

/// Model input tensor: shape [1, 100, 100, 3], NHWC, row-major,
/// f32 values in [0, 1]. Built fresh per request and consumed by the
/// model host.
#[derive(Debug, Clone, PartialEq)]
pub struct InputTensor {
    data: Vec<f32>,
}

impl InputTensor {
    /// Tensor shape as the runtime expects it.
    pub fn shape() -> [i64; 4] {
        [1, INPUT_HEIGHT as i64, INPUT_WIDTH as i64, CHANNELS as i64]
    }

    /// Flat view of the tensor data.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Consume into (shape, data) for runtime tensor construction.
    pub fn into_parts(self) -> (Vec<i64>, Vec<f32>) {
        (Self::shape().to_vec(), self.data)
    }

    /// Value at (row, column, channel) for batch index 0.
    pub fn at(&self, y: u32, x: u32, c: usize) -> f32 {
        let idx = (y as usize * INPUT_WIDTH as usize + x as usize) * CHANNELS + c;
        self.data[idx]
    }

    /// All-zero tensor of the model input shape.
    #[cfg(test)]
    pub(crate) fn zeros() -> Self {
        Self {
            data: vec![0.0; INPUT_HEIGHT as usize * INPUT_WIDTH as usize * CHANNELS],
        }
    }
}

/// Decode image bytes and build the model input tensor.
///
/// Steps: decode as a color image, resize to exactly 100x100, desaturate,
/// then write R/255, G/255, B/255 per pixel. The desaturation happens
/// before channel extraction, so all three channel planes come out
/// numerically identical. The trained model expects exactly this
/// encoding; do not "fix" it.
pub fn image_to_tensor(image_bytes: &[u8]) -> Result<InputTensor, PipelineError> {
    let decoded = image::load_from_memory(image_bytes)?;
    let resized = decoded.resize_exact(INPUT_WIDTH, INPUT_HEIGHT, FilterType::Triangle);
    let desaturated = resized.grayscale().to_rgb8();

    let mut data =
        Vec::with_capacity(INPUT_HEIGHT as usize * INPUT_WIDTH as usize * CHANNELS);
    for y in 0..INPUT_HEIGHT {
        for x in 0..INPUT_WIDTH {
            let pixel = desaturated.get_pixel(x, y);
            data.push(pixel.0[0] as f32 / 255.0);
            data.push(pixel.0[1] as f32 / 255.0);
            data.push(pixel.0[2] as f32 / 255.0);
        }
    }

    Ok(InputTensor { data })
}
