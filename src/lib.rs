//! grim-raster: software framebuffer for 3D adventure-game runtimes
//!
//! The TinyGL-style backend target:
//! - Color + depth buffers for any packed pixel format
//! - Offscreen buffers with depth-tested compositing
//! - Fragment path with alpha test, depth test and blending

pub mod config;
pub mod logging;
pub mod rasterizer;

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
