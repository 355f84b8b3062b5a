//! Viewer configuration
//!
//! Stored as RON next to the binary:
//! - target size and pixel format of the framebuffer
//! - clear color and depth
//! - window scale, optional overlay texture, log filter

mod file;
mod viewer;

pub use file::*;
pub use viewer::*;
