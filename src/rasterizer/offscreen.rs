//! Offscreen color + depth buffers

use super::error::BufferError;
use super::storage::{try_alloc, Layout};

/// A detachable color/depth pair that can be selected as the draw target of a
/// [`FrameBuffer`](super::FrameBuffer) and later merged back by depth.
///
/// The caller owns it. Selecting moves it into the framebuffer and
/// deselecting hands it back, so a buffer can never be dropped while it is
/// the active target.
#[derive(Debug, Clone)]
pub struct OffscreenBuffer {
    pub(super) layout: Layout,
    pub(super) color: Vec<u8>,
    pub(super) depth: Vec<u32>,
    pub(super) used: bool,
}

impl OffscreenBuffer {
    pub(super) fn new(layout: Layout) -> Result<Self, BufferError> {
        let overflow = BufferError::SizeOverflow {
            width: layout.width,
            height: layout.height,
        };
        let color = try_alloc(layout.color_len().ok_or(overflow.clone())?)?;
        let depth = try_alloc(layout.depth_len().ok_or(overflow)?)?;
        Ok(Self {
            layout,
            color,
            depth,
            used: false,
        })
    }

    /// True once the buffer has been selected as a draw target since its last
    /// clear.
    pub fn is_used(&self) -> bool {
        self.used
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn color(&self) -> &[u8] {
        &self.color
    }

    pub fn depth(&self) -> &[u32] {
        &self.depth
    }

    /// Zero both regions and mark the buffer unused.
    pub fn clear(&mut self) {
        self.color.fill(0);
        self.depth.fill(0);
        self.used = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::PixelFormat;

    #[test]
    fn test_new_reports_allocation_error() {
        let layout = Layout::new(1 << 30, 1 << 30, PixelFormat::RGB565).unwrap();
        let err = OffscreenBuffer::new(layout).unwrap_err();
        assert!(matches!(err, BufferError::Allocation { .. }));
    }

    #[test]
    fn test_clear_zeroes_and_resets() {
        let layout = Layout::new(3, 2, PixelFormat::RGB565).unwrap();
        let mut buf = OffscreenBuffer::new(layout).unwrap();
        buf.color.fill(0xAB);
        buf.depth.fill(9);
        buf.used = true;
        buf.clear();
        assert!(!buf.is_used());
        assert!(buf.color().iter().all(|&b| b == 0));
        assert!(buf.depth().iter().all(|&d| d == 0));
    }
}
