//! Framebuffer for software rendering
//! Color + depth target with offscreen buffers and depth-tested compositing

use std::path::Path;
use std::rc::Rc;

use super::error::BufferError;
use super::offscreen::OffscreenBuffer;
use super::pixel_format::PixelFormat;
use super::state::{alpha_ref_from_normalized, BlendFactor, CompareFunc, RenderState};
use super::storage::{fill_color, fill_depth, try_alloc, ColorStorage, Layout};
use super::types::{Color, Texture};

/// Color and depth target of the software renderer.
///
/// The depth buffer is always owned. The color buffer is either allocated
/// here or borrowed from the caller (typically a display surface), in which
/// case dropping the framebuffer leaves it alone.
///
/// Clears and fragment writes go to the *active* pair: the framebuffer's own
/// buffers, or an [`OffscreenBuffer`] moved in with
/// [`select_offscreen_buffer`](Self::select_offscreen_buffer).
pub struct FrameBuffer<'a> {
    pub(super) layout: Layout,
    pub(super) color: ColorStorage<'a>,
    pub(super) depth: Vec<u32>,
    pub(super) selected: Option<OffscreenBuffer>,
    pub(super) state: RenderState,
}

impl<'a> FrameBuffer<'a> {
    /// Allocate a framebuffer with its own color buffer.
    pub fn new(width: usize, height: usize, format: PixelFormat) -> Result<Self, BufferError> {
        let layout = Layout::new(width, height, format)?;
        let color = try_alloc(color_len(&layout)?)?;
        Self::build(layout, ColorStorage::Owned(color))
    }

    /// Render into a caller-supplied color buffer of at least
    /// `height * linesize` bytes, laid out with this framebuffer's linesize.
    pub fn with_color_buffer(
        width: usize,
        height: usize,
        format: PixelFormat,
        pixels: &'a mut [u8],
    ) -> Result<Self, BufferError> {
        let layout = Layout::new(width, height, format)?;
        let needed = color_len(&layout)?;
        if pixels.len() < needed {
            return Err(BufferError::BufferTooSmall {
                needed,
                got: pixels.len(),
            });
        }
        Self::build(layout, ColorStorage::Borrowed(pixels))
    }

    fn build(layout: Layout, color: ColorStorage<'a>) -> Result<Self, BufferError> {
        let depth_len = layout.depth_len().ok_or(BufferError::SizeOverflow {
            width: layout.width,
            height: layout.height,
        })?;
        let depth = try_alloc(depth_len)?;
        log::debug!(
            "framebuffer {}x{} ({} bpp, linesize {}, {} color buffer)",
            layout.width,
            layout.height,
            layout.bytes_per_pixel(),
            layout.linesize,
            if color.is_owned() { "owned" } else { "borrowed" },
        );
        Ok(Self {
            layout,
            color,
            depth,
            selected: None,
            state: RenderState::default(),
        })
    }

    pub fn width(&self) -> usize {
        self.layout.width
    }

    pub fn height(&self) -> usize {
        self.layout.height
    }

    pub fn linesize(&self) -> usize {
        self.layout.linesize
    }

    pub fn pixel_format(&self) -> &PixelFormat {
        &self.layout.format
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn owns_color_buffer(&self) -> bool {
        self.color.is_owned()
    }

    // --- Active pair ---------------------------------------------------------

    pub fn is_offscreen_selected(&self) -> bool {
        self.selected.is_some()
    }

    /// Active color and depth buffers, borrowed together.
    pub fn active_mut(&mut self) -> (&mut [u8], &mut [u32]) {
        match &mut self.selected {
            Some(buf) => (buf.color.as_mut_slice(), buf.depth.as_mut_slice()),
            None => (self.color.as_mut_slice(), self.depth.as_mut_slice()),
        }
    }

    pub fn active_color_mut(&mut self) -> &mut [u8] {
        self.active_mut().0
    }

    pub fn active_depth_mut(&mut self) -> &mut [u32] {
        self.active_mut().1
    }

    fn active(&self) -> (&[u8], &[u32]) {
        match &self.selected {
            Some(buf) => (buf.color.as_slice(), buf.depth.as_slice()),
            None => (self.color.as_slice(), self.depth.as_slice()),
        }
    }

    /// Packed color at (x, y) in the active buffer
    pub fn read_pixel(&self, x: usize, y: usize) -> Option<u32> {
        if x >= self.layout.width || y >= self.layout.height {
            return None;
        }
        let offset = self.layout.color_offset(x, y);
        Some(self.layout.format.read_color(&self.active().0[offset..]))
    }

    /// Depth at (x, y) in the active buffer
    pub fn read_depth(&self, x: usize, y: usize) -> Option<u32> {
        if x >= self.layout.width || y >= self.layout.height {
            return None;
        }
        Some(self.active().1[self.layout.depth_index(x, y)])
    }

    // --- Main pair (presentation) --------------------------------------------

    /// Main color buffer, regardless of what is selected
    pub fn pixel_buffer(&self) -> &[u8] {
        self.color.as_slice()
    }

    /// Main depth buffer, regardless of what is selected
    pub fn depth_buffer(&self) -> &[u32] {
        &self.depth
    }

    /// Main color buffer converted to tightly packed RGBA8
    pub fn to_rgba8(&self) -> Vec<u8> {
        let bpp = self.layout.bytes_per_pixel();
        let row_bytes = self.layout.row_bytes();
        let mut out = Vec::with_capacity(self.layout.pixel_count() * 4);
        if row_bytes == 0 {
            return out;
        }
        for row in self.color.as_slice().chunks(self.layout.linesize).take(self.layout.height) {
            for px in row[..row_bytes].chunks_exact(bpp) {
                let packed = self.layout.format.read_color(px);
                out.extend_from_slice(&Color::unpack(&self.layout.format, packed).to_bytes());
            }
        }
        out
    }

    /// Write the main color buffer to a PNG file
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<(), String> {
        let path = path.as_ref();
        let img = image::RgbaImage::from_raw(
            self.layout.width as u32,
            self.layout.height as u32,
            self.to_rgba8(),
        )
        .ok_or_else(|| "Framebuffer size does not fit an image".to_string())?;
        img.save(path)
            .map_err(|e| format!("Failed to save {}: {}", path.display(), e))?;
        log::info!("saved framebuffer to {}", path.display());
        Ok(())
    }

    // --- Clearing ------------------------------------------------------------

    /// Clear the active depth and/or color buffer.
    ///
    /// Depth is a raw 32-bit fill. Color is packed through the pixel format and
    /// written to the visible part of each row only.
    pub fn clear(&mut self, clear_depth: bool, depth_value: u32, clear_color: bool, r: u8, g: u8, b: u8) {
        let layout = self.layout;
        let (color, depth) = self.active_mut();
        if clear_depth {
            fill_depth(depth, depth_value);
        }
        if clear_color {
            fill_color(color, &layout, layout.format.rgb_to_color(r, g, b));
        }
    }

    // --- Offscreen buffers ---------------------------------------------------

    /// Allocate an unused offscreen buffer sized like this framebuffer.
    pub fn create_offscreen_buffer(&self) -> Result<OffscreenBuffer, BufferError> {
        let buf = OffscreenBuffer::new(self.layout)?;
        log::debug!("offscreen buffer {}x{} created", self.layout.width, self.layout.height);
        Ok(buf)
    }

    /// Free an offscreen buffer. A selected buffer is held by the framebuffer
    /// and has to be deselected before it can be passed here.
    pub fn destroy_offscreen_buffer(&self, buf: OffscreenBuffer) {
        log::debug!("offscreen buffer {}x{} destroyed", buf.layout.width, buf.layout.height);
        drop(buf);
    }

    /// Make `buf` the active pair, or restore the main pair with `None`.
    ///
    /// The selected buffer is marked used. Whatever offscreen buffer was
    /// selected before is handed back. No pixels are copied.
    pub fn select_offscreen_buffer(&mut self, buf: Option<OffscreenBuffer>) -> Option<OffscreenBuffer> {
        let buf = buf.map(|mut b| {
            debug_assert!(b.layout.same_size(&self.layout), "offscreen buffer size mismatch");
            b.used = true;
            b
        });
        std::mem::replace(&mut self.selected, buf)
    }

    /// Zero-fill `buf` and mark it unused, whatever is currently active.
    pub fn clear_offscreen_buffer(&self, buf: &mut OffscreenBuffer) {
        buf.clear();
    }

    /// Merge `buf` into the main pair: where its depth is strictly greater
    /// than the main depth, its color and depth replace the main pixel.
    ///
    /// Does nothing if `buf` was never selected since its last clear. This
    /// uses its own "greater wins" rule, independent of the depth func.
    pub fn composite_offscreen_buffer(&mut self, buf: &OffscreenBuffer) {
        if !buf.used {
            log::debug!("skipping composite of unused offscreen buffer");
            return;
        }
        debug_assert!(buf.layout.same_size(&self.layout), "offscreen buffer size mismatch");

        let layout = self.layout;
        let bpp = layout.bytes_per_pixel();
        let main_color = self.color.as_mut_slice();
        for y in 0..layout.height {
            for x in 0..layout.width {
                let i = layout.depth_index(x, y);
                let incoming = buf.depth[i];
                if incoming > self.depth[i] {
                    let offset = layout.color_offset(x, y);
                    main_color[offset..offset + bpp]
                        .copy_from_slice(&buf.color[offset..offset + bpp]);
                    self.depth[i] = incoming;
                }
            }
        }
    }

    // --- Render state --------------------------------------------------------

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    pub fn set_texture(&mut self, texture: Option<Rc<Texture>>) {
        self.state.texture = texture;
    }

    pub fn current_texture(&self) -> Option<&Rc<Texture>> {
        self.state.texture.as_ref()
    }

    pub fn set_blending_factors(&mut self, src: BlendFactor, dst: BlendFactor) {
        self.state.src_blend = src;
        self.state.dst_blend = dst;
    }

    pub fn enable_blending(&mut self, enable: bool) {
        self.state.blending_enabled = enable;
    }

    /// `reference` is expected in [0, 1] and stored as `reference * 255`,
    /// truncated.
    pub fn set_alpha_test_func(&mut self, func: CompareFunc, reference: f32) {
        self.state.alpha_func = func;
        self.state.alpha_ref = alpha_ref_from_normalized(reference);
    }

    pub fn enable_alpha_test(&mut self, enable: bool) {
        self.state.alpha_test_enabled = enable;
    }

    pub fn set_depth_func(&mut self, func: CompareFunc) {
        self.state.depth_func = func;
    }

    pub fn enable_depth_write(&mut self, enable: bool) {
        self.state.depth_write = enable;
    }
}

impl Drop for FrameBuffer<'_> {
    fn drop(&mut self) {
        if self.selected.is_some() {
            log::warn!("framebuffer dropped with an offscreen buffer still selected");
        }
    }
}

fn color_len(layout: &Layout) -> Result<usize, BufferError> {
    layout.color_len().ok_or(BufferError::SizeOverflow {
        width: layout.width,
        height: layout.height,
    })
}
