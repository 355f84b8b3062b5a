//! TinyGL-style software framebuffer
//!
//! Features:
//! - Color buffer in any packed pixel format, rows padded to 4 bytes
//! - 32-bit depth buffer
//! - Offscreen buffers, selected as the draw target and merged back by depth
//! - Alpha test, depth test and blending on the fragment path

mod error;
mod fragment;
mod framebuffer;
mod offscreen;
mod pixel_format;
mod state;
mod storage;
mod types;

pub use error::*;
pub use fragment::*;
pub use framebuffer::*;
pub use offscreen::*;
pub use pixel_format::*;
pub use state::*;
pub use storage::{ColorStorage, Layout};
pub use types::*;

/// Default target size
pub const WIDTH: usize = 640;
pub const HEIGHT: usize = 480;
