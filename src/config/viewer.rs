use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::rasterizer::{PixelFormat, PixelFormatPreset, HEIGHT, WIDTH};

/// Largest target edge the viewer accepts. The presented texture takes u16
/// sizes, and this keeps one frame under a few hundred MB.
pub const MAX_DIMENSION: usize = 8192;

/// Settings for the framebuffer viewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub width: usize,
    pub height: usize,
    pub pixel_format: PixelFormatPreset,
    /// RGB used by the per-frame clear
    pub clear_color: (u8, u8, u8),
    /// Raw value the depth buffer is cleared to
    pub clear_depth: u32,
    /// Window pixels per framebuffer pixel
    pub scale: f32,
    /// PNG bound as the current texture for the overlay layer
    pub texture: Option<PathBuf>,
    /// `env_logger` filter, overrides RUST_LOG when set
    pub log_filter: Option<String>,
}

impl ViewerConfig {
    pub fn pixel_format(&self) -> PixelFormat {
        self.pixel_format.format()
    }

    /// Clamp the target size to `1..=MAX_DIMENSION` and reset a scale that
    /// is not a positive finite number.
    pub fn sanitized(mut self) -> Self {
        let width = self.width.clamp(1, MAX_DIMENSION);
        let height = self.height.clamp(1, MAX_DIMENSION);
        if (width, height) != (self.width, self.height) {
            log::warn!(
                "target size {}x{} out of range, using {}x{}",
                self.width,
                self.height,
                width,
                height
            );
        }
        self.width = width;
        self.height = height;
        if !(self.scale.is_finite() && self.scale > 0.0) {
            self.scale = 1.0;
        }
        self
    }

    /// Window size in screen pixels
    pub fn window_size(&self) -> (i32, i32) {
        let scale = if self.scale > 0.0 { self.scale } else { 1.0 };
        (
            (self.width as f32 * scale) as i32,
            (self.height as f32 * scale) as i32,
        )
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            width: WIDTH,
            height: HEIGHT,
            pixel_format: PixelFormatPreset::Rgb565,
            clear_color: (30, 30, 40),
            clear_depth: u32::MAX,
            scale: 2.0,
            texture: None,
            log_filter: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitized_clamps_size() {
        let config = ViewerConfig {
            width: 70_000,
            height: 0,
            scale: f32::NAN,
            ..Default::default()
        }
        .sanitized();
        assert_eq!((config.width, config.height), (MAX_DIMENSION, 1));
        assert_eq!(config.scale, 1.0);
        assert!(config.width <= u16::MAX as usize);
    }

    #[test]
    fn test_sanitized_keeps_defaults() {
        assert_eq!(ViewerConfig::default().sanitized(), ViewerConfig::default());
    }
}
