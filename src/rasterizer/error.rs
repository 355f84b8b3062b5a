//! Buffer allocation errors

/// Error type for framebuffer and offscreen buffer construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// The allocator could not provide `bytes` bytes
    Allocation { bytes: usize },
    /// width/height/pixel size multiply past `usize`
    SizeOverflow { width: usize, height: usize },
    /// A caller-supplied color buffer is shorter than `height * linesize`
    BufferTooSmall { needed: usize, got: usize },
    /// Pixel size outside 1-4 bytes, or a channel shifted past 32 bits
    UnsupportedFormat { bytes_per_pixel: u8 },
}

impl std::fmt::Display for BufferError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BufferError::Allocation { bytes } => {
                write!(f, "Allocation error: could not allocate {} bytes", bytes)
            }
            BufferError::SizeOverflow { width, height } => {
                write!(f, "Allocation error: {}x{} buffer size overflows", width, height)
            }
            BufferError::BufferTooSmall { needed, got } => {
                write!(f, "Color buffer too small: need {} bytes, got {}", needed, got)
            }
            BufferError::UnsupportedFormat { bytes_per_pixel } => {
                write!(f, "Unsupported pixel format ({} bytes per pixel)", bytes_per_pixel)
            }
        }
    }
}

impl std::error::Error for BufferError {}
