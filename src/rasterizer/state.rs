//! Per-pixel render state consumed by the fragment stage

use std::rc::Rc;

use super::types::Texture;

/// Comparison used by the alpha and depth tests: `incoming <op> stored`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareFunc {
    Never,
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    Always,
}

impl CompareFunc {
    #[inline]
    pub fn passes<T: PartialOrd>(self, incoming: T, stored: T) -> bool {
        match self {
            CompareFunc::Never => false,
            CompareFunc::Less => incoming < stored,
            CompareFunc::Equal => incoming == stored,
            CompareFunc::LessEqual => incoming <= stored,
            CompareFunc::Greater => incoming > stored,
            CompareFunc::NotEqual => incoming != stored,
            CompareFunc::GreaterEqual => incoming >= stored,
            CompareFunc::Always => true,
        }
    }
}

/// Blend factor, applied per channel to the source or destination color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    DstColor,
    OneMinusDstColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
}

/// Render state of one framebuffer.
///
/// Written through the `FrameBuffer` setters, read by the fragment stage and
/// by external rasterizers.
#[derive(Debug, Clone)]
pub struct RenderState {
    pub blending_enabled: bool,
    pub src_blend: BlendFactor,
    pub dst_blend: BlendFactor,
    pub alpha_test_enabled: bool,
    pub alpha_func: CompareFunc,
    /// Alpha reference scaled to 0-255
    pub alpha_ref: i32,
    pub depth_func: CompareFunc,
    pub depth_write: bool,
    /// Shared with the caller, never owned exclusively
    pub texture: Option<Rc<Texture>>,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            blending_enabled: false,
            src_blend: BlendFactor::One,
            dst_blend: BlendFactor::Zero,
            alpha_test_enabled: false,
            alpha_func: CompareFunc::Always,
            alpha_ref: 0,
            depth_func: CompareFunc::Less,
            depth_write: true,
            texture: None,
        }
    }
}

/// Scale a [0, 1] alpha reference to an integer, truncating (0.5 -> 127).
///
/// Out-of-range input is the caller's problem; `as` saturates at the i32
/// limits rather than clamping to 0-255.
pub fn alpha_ref_from_normalized(reference: f32) -> i32 {
    (reference * 255.0) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_funcs() {
        assert!(CompareFunc::Less.passes(1, 2));
        assert!(!CompareFunc::Less.passes(2, 2));
        assert!(CompareFunc::LessEqual.passes(2, 2));
        assert!(CompareFunc::Greater.passes(3, 2));
        assert!(!CompareFunc::Never.passes(0, 0));
        assert!(CompareFunc::Always.passes(9, 0));
        assert!(CompareFunc::NotEqual.passes(1, 0));
        assert!(CompareFunc::Equal.passes(4, 4));
        assert!(CompareFunc::GreaterEqual.passes(4, 4));
    }

    #[test]
    fn test_alpha_ref_truncates() {
        assert_eq!(alpha_ref_from_normalized(0.5), 127);
        assert_eq!(alpha_ref_from_normalized(1.0), 255);
        assert_eq!(alpha_ref_from_normalized(0.0), 0);
    }

    #[test]
    fn test_default_state() {
        let s = RenderState::default();
        assert!(s.depth_write);
        assert!(!s.blending_enabled);
        assert!(!s.alpha_test_enabled);
        assert_eq!(s.depth_func, CompareFunc::Less);
        assert!(s.texture.is_none());
    }
}
