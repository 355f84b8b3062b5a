//! Per-pixel write path
//!
//! Applies the framebuffer's render state to one incoming fragment:
//! alpha test, depth test, depth write, blending, then stores the packed
//! color in the active buffer. Triangle and line setup live elsewhere and
//! only feed fragments through here.

use super::framebuffer::FrameBuffer;
use super::state::{BlendFactor, RenderState};
use super::types::Color;

impl FrameBuffer<'_> {
    /// Write one fragment at (x, y) with depth `z`.
    ///
    /// Returns false when the fragment is off-target or rejected by the alpha
    /// or depth test.
    pub fn write_fragment(&mut self, x: i32, y: i32, z: u32, color: Color) -> bool {
        if !self.layout.contains(x, y) {
            return false;
        }
        let (x, y) = (x as usize, y as usize);

        let state = &self.state;
        if !alpha_test_passes(state, color.a) {
            return false;
        }

        let layout = self.layout;
        let idx = layout.depth_index(x, y);
        let offset = layout.color_offset(x, y);
        let bpp = layout.bytes_per_pixel();

        let depth_func = state.depth_func;
        let depth_write = state.depth_write;
        let blend = state.blending_enabled.then(|| (state.src_blend, state.dst_blend));

        let (pixels, depth) = self.active_mut();
        if !depth_func.passes(z, depth[idx]) {
            return false;
        }
        if depth_write {
            depth[idx] = z;
        }

        let dst = &mut pixels[offset..offset + bpp];
        let out = match blend {
            Some((src_factor, dst_factor)) => {
                let existing = Color::unpack(&layout.format, layout.format.read_color(dst));
                blend_colors(color, existing, src_factor, dst_factor)
            }
            None => color,
        };
        layout.format.write_color(dst, out.pack(&layout.format));
        true
    }

    /// Write a horizontal run of fragments sharing one color, interpolating
    /// depth linearly from `z0` at `x0` to `z1` at `x1`. The run is clipped to
    /// the target before any fragment is generated. Returns how many were
    /// stored.
    pub fn write_span(&mut self, x0: i32, x1: i32, y: i32, z0: u32, z1: u32, color: Color) -> usize {
        if x1 < x0 || y < 0 || y as usize >= self.layout.height || self.layout.width == 0 {
            return 0;
        }
        let last = self.layout.width as i64 - 1;
        let start = (x0 as i64).max(0);
        let end = (x1 as i64).min(last);
        if start > end {
            return 0;
        }

        let steps = x1 as i64 - x0 as i64;
        let dz = z1 as i128 - z0 as i128;
        let mut written = 0;
        for x in start..=end {
            let z = if steps == 0 {
                z0
            } else {
                let t = (x - x0 as i64) as i128;
                (z0 as i128 + dz * t / steps as i128) as u32
            };
            if self.write_fragment(x as i32, y, z, color) {
                written += 1;
            }
        }
        written
    }
}

/// Render state helper: does the alpha test accept `alpha`?
pub fn alpha_test_passes(state: &RenderState, alpha: u8) -> bool {
    !state.alpha_test_enabled || state.alpha_func.passes(alpha as i32, state.alpha_ref)
}

/// `out = src * sf + dst * df`, per channel, with factors in 0..=255.
pub fn blend_colors(src: Color, dst: Color, sf: BlendFactor, df: BlendFactor) -> Color {
    let s = factor(sf, src, dst);
    let d = factor(df, src, dst);
    let mix = |sc: u8, dc: u8, fs: u32, fd: u32| -> u8 {
        let v = (sc as u32 * fs + dc as u32 * fd) / 255;
        v.min(255) as u8
    };
    Color {
        r: mix(src.r, dst.r, s[0], d[0]),
        g: mix(src.g, dst.g, s[1], d[1]),
        b: mix(src.b, dst.b, s[2], d[2]),
        a: mix(src.a, dst.a, s[3], d[3]),
    }
}

/// Per-channel (r, g, b, a) weight for a blend factor
fn factor(f: BlendFactor, src: Color, dst: Color) -> [u32; 4] {
    let rgba = |c: Color| [c.r as u32, c.g as u32, c.b as u32, c.a as u32];
    let inv = |c: [u32; 4]| c.map(|v| 255 - v);
    match f {
        BlendFactor::Zero => [0; 4],
        BlendFactor::One => [255; 4],
        BlendFactor::SrcColor => rgba(src),
        BlendFactor::OneMinusSrcColor => inv(rgba(src)),
        BlendFactor::DstColor => rgba(dst),
        BlendFactor::OneMinusDstColor => inv(rgba(dst)),
        BlendFactor::SrcAlpha => [src.a as u32; 4],
        BlendFactor::OneMinusSrcAlpha => [255 - src.a as u32; 4],
        BlendFactor::DstAlpha => [dst.a as u32; 4],
        BlendFactor::OneMinusDstAlpha => [255 - dst.a as u32; 4],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::{CompareFunc, PixelFormat};

    fn fb() -> FrameBuffer<'static> {
        let mut fb = FrameBuffer::new(4, 4, PixelFormat::RGBA8888).unwrap();
        fb.clear(true, u32::MAX, true, 0, 0, 0);
        fb
    }

    fn pixel(fb: &FrameBuffer, x: usize, y: usize) -> Color {
        Color::unpack(fb.pixel_format(), fb.read_pixel(x, y).unwrap())
    }

    #[test]
    fn test_default_depth_test_keeps_nearer() {
        let mut fb = fb();
        let red = Color::new(255, 0, 0);
        let blue = Color::new(0, 0, 255);
        assert!(fb.write_fragment(1, 1, 100, red));
        assert!(!fb.write_fragment(1, 1, 200, blue));
        assert!(!fb.write_fragment(1, 1, 100, blue));
        assert_eq!(pixel(&fb, 1, 1), red);
        assert!(fb.write_fragment(1, 1, 50, blue));
        assert_eq!(pixel(&fb, 1, 1), blue);
        assert_eq!(fb.read_depth(1, 1), Some(50));
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let mut fb = fb();
        assert!(!fb.write_fragment(-1, 0, 0, Color::WHITE));
        assert!(!fb.write_fragment(0, 4, 0, Color::WHITE));
    }

    #[test]
    fn test_depth_write_disabled() {
        let mut fb = fb();
        fb.enable_depth_write(false);
        assert!(fb.write_fragment(0, 0, 10, Color::WHITE));
        assert_eq!(fb.read_depth(0, 0), Some(u32::MAX));
        assert_eq!(pixel(&fb, 0, 0), Color::WHITE);
    }

    #[test]
    fn test_alpha_test_greater() {
        let mut fb = fb();
        fb.set_depth_func(CompareFunc::Always);
        fb.set_alpha_test_func(CompareFunc::Greater, 0.5);
        fb.enable_alpha_test(true);
        assert!(!fb.write_fragment(0, 0, 0, Color::with_alpha(255, 255, 255, 127)));
        assert!(fb.write_fragment(0, 0, 0, Color::with_alpha(255, 255, 255, 128)));
        assert!(alpha_test_passes(fb.state(), 200));
        assert!(!alpha_test_passes(fb.state(), 10));
    }

    #[test]
    fn test_alpha_test_disabled_ignores_func() {
        let mut fb = fb();
        fb.set_alpha_test_func(CompareFunc::Never, 1.0);
        assert!(fb.write_fragment(2, 2, 0, Color::TRANSPARENT));
    }

    #[test]
    fn test_src_alpha_blending() {
        let mut fb = fb();
        fb.set_depth_func(CompareFunc::Always);
        fb.clear(false, 0, true, 0, 0, 200);
        fb.set_blending_factors(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha);
        fb.enable_blending(true);

        fb.write_fragment(0, 0, 0, Color::with_alpha(255, 0, 0, 255));
        assert_eq!(pixel(&fb, 0, 0), Color::with_alpha(255, 0, 0, 255));

        fb.write_fragment(1, 0, 0, Color::with_alpha(255, 0, 0, 0));
        assert_eq!(pixel(&fb, 1, 0), Color::with_alpha(0, 0, 200, 255));
    }

    #[test]
    fn test_additive_blending_saturates() {
        let src = Color::new(200, 10, 0);
        let dst = Color::new(100, 10, 0);
        let out = blend_colors(src, dst, BlendFactor::One, BlendFactor::One);
        assert_eq!(out, Color::with_alpha(255, 20, 0, 255));
    }

    #[test]
    fn test_blend_zero_one_keeps_destination() {
        let src = Color::new(1, 2, 3);
        let dst = Color::new(9, 8, 7);
        assert_eq!(blend_colors(src, dst, BlendFactor::Zero, BlendFactor::One), dst);
    }

    #[test]
    fn test_fragments_go_to_selected_buffer() {
        let mut fb = fb();
        let buf = fb.create_offscreen_buffer().unwrap();
        fb.select_offscreen_buffer(Some(buf));
        fb.set_depth_func(CompareFunc::Always);
        assert!(fb.write_fragment(3, 3, 5, Color::WHITE));
        let buf = fb.select_offscreen_buffer(None).unwrap();
        assert_eq!(fb.read_depth(3, 3), Some(u32::MAX));
        assert_eq!(buf.depth()[15], 5);
    }

    #[test]
    fn test_write_span_interpolates_depth() {
        let mut fb = fb();
        assert_eq!(fb.write_span(0, 3, 2, 0, 300, Color::WHITE), 4);
        assert_eq!(fb.read_depth(0, 2), Some(0));
        assert_eq!(fb.read_depth(1, 2), Some(100));
        assert_eq!(fb.read_depth(3, 2), Some(300));
        // clipped at the right edge
        assert_eq!(fb.write_span(2, 9, 0, 0, 0, Color::WHITE), 2);
        assert_eq!(fb.write_span(3, 1, 0, 0, 0, Color::WHITE), 0);
    }

    #[test]
    fn test_write_span_extreme_coordinates() {
        let mut fb = fb();
        let n = fb.write_span(-2_000_000_000, 2_000_000_000, 0, 0, 0, Color::WHITE);
        assert_eq!(n, 4);
        assert_eq!(fb.write_span(i32::MIN, i32::MAX, 1, 0, u32::MAX, Color::WHITE), 4);
        // depth along the clipped part still follows the full span
        let mid = fb.read_depth(0, 1).unwrap();
        assert!(mid > u32::MAX / 2 - 4 && mid < u32::MAX / 2 + 4);
        assert_eq!(fb.write_span(i32::MIN, -1, 2, 0, 0, Color::WHITE), 0);
        assert_eq!(fb.write_span(4, i32::MAX, 2, 0, 0, Color::WHITE), 0);
        assert_eq!(fb.write_span(0, 3, -5, 0, 0, Color::WHITE), 0);
    }
}
