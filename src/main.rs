//! grim-raster viewer
//!
//! Drives one software framebuffer per frame and presents its main color
//! buffer in a window:
//! - a background band written through the fragment path
//! - an overlay layer drawn into an offscreen buffer, then merged by depth
//! - P saves a PNG screenshot, Escape quits

use std::path::PathBuf;
use std::rc::Rc;

use grim_raster::config::{load_config_or_default, ViewerConfig, CONFIG_FILE};
use grim_raster::logging::{init_logging, LoggingConfig};
use grim_raster::rasterizer::{
    BlendFactor, Color as RasterColor, CompareFunc, FrameBuffer, Texture,
};
use grim_raster::VERSION;
use macroquad::prelude::*;

/// Depth of the background band (main buffer)
const BAND_DEPTH: u32 = 0x8000_0000;
/// Depth of the translucent stripe (main buffer)
const STRIPE_DEPTH: u32 = 0x4000_0000;
/// Depth of the overlay layer; beats the band and stripe, loses to cleared depth
const OVERLAY_DEPTH: u32 = 0xC000_0000;

fn config_path() -> PathBuf {
    std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE))
}

fn window_conf() -> Conf {
    let config = load_config_or_default(config_path())
        .unwrap_or_default()
        .sanitized();
    let (window_width, window_height) = config.window_size();
    Conf {
        window_title: format!("grim-raster v{}", VERSION),
        window_width,
        window_height,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    let config = match load_config_or_default(config_path()) {
        Ok(config) => config,
        Err(e) => {
            // logger isn't installed yet
            eprintln!("Failed to load config: {}", e);
            ViewerConfig::default().sanitized()
        }
    };

    init_logging(LoggingConfig::for_viewer(&config));
    log::info!("=== grim-raster v{} ===", VERSION);

    let mut fb = match FrameBuffer::new(config.width, config.height, config.pixel_format()) {
        Ok(fb) => fb,
        Err(e) => {
            log::error!("{}", e);
            return;
        }
    };

    let mut layer = match fb.create_offscreen_buffer() {
        Ok(buf) => Some(buf),
        Err(e) => {
            log::warn!("overlay disabled: {}", e);
            None
        }
    };

    fb.set_texture(Some(Rc::new(load_overlay_texture(&config))));

    let mut screenshot_index = 0;

    loop {
        if is_key_pressed(KeyCode::Escape) {
            break;
        }
        let t = get_time() as f32;

        let (r, g, b) = config.clear_color;
        fb.clear(true, config.clear_depth, true, r, g, b);
        draw_backdrop(&mut fb, t);

        // Overlay goes to its own buffer, then merges where it is deeper
        if let Some(mut buf) = layer.take() {
            fb.clear_offscreen_buffer(&mut buf);
            fb.select_offscreen_buffer(Some(buf));
            draw_overlay(&mut fb, t);
            layer = fb.select_offscreen_buffer(None);
        }
        if let Some(buf) = &layer {
            fb.composite_offscreen_buffer(buf);
        }

        if is_key_pressed(KeyCode::P) {
            let path = format!("grim-raster-{:03}.png", screenshot_index);
            screenshot_index += 1;
            if let Err(e) = fb.save_png(&path) {
                log::error!("{}", e);
            }
        }

        present(&fb);
        next_frame().await;
    }

    if let Some(buf) = layer {
        fb.destroy_offscreen_buffer(buf);
    }
}

fn load_overlay_texture(config: &ViewerConfig) -> Texture {
    let fallback = || {
        Texture::checkerboard(
            32,
            32,
            RasterColor::new(220, 180, 60),
            RasterColor::with_alpha(90, 40, 20, 0),
        )
    };
    match &config.texture {
        Some(path) => Texture::from_file(path).unwrap_or_else(|e| {
            log::warn!("{}", e);
            fallback()
        }),
        None => fallback(),
    }
}

/// Opaque gradient band across the middle third, plus a translucent wave
fn draw_backdrop(fb: &mut FrameBuffer, t: f32) {
    let w = fb.width() as i32;
    let h = fb.height() as i32;

    for y in h / 3..2 * h / 3 {
        let shade = (y * 255 / h.max(1)) as u8;
        fb.write_span(0, w - 1, y, BAND_DEPTH, BAND_DEPTH, RasterColor::new(40, shade, 120));
    }

    fb.set_blending_factors(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha);
    fb.enable_blending(true);
    let stripe = RasterColor::with_alpha(255, 255, 255, 96);
    for x in 0..w {
        let phase = x as f32 * 0.03 + t * 2.0;
        let cy = h / 2 + (phase.sin() * h as f32 * 0.2) as i32;
        for y in cy - 2..=cy + 2 {
            fb.write_fragment(x, y, STRIPE_DEPTH, stripe);
        }
    }
    fb.enable_blending(false);
}

/// Textured square sweeping across the target, drawn into whatever buffer is
/// selected. Transparent texels are dropped by the alpha test.
fn draw_overlay(fb: &mut FrameBuffer, t: f32) {
    let Some(texture) = fb.current_texture().cloned() else {
        return;
    };
    let w = fb.width() as i32;
    let h = fb.height() as i32;
    let size = (h / 2).max(1);
    let x0 = ((t * 0.25).fract() * (w + size) as f32) as i32 - size;
    let y0 = h / 4;

    fb.set_depth_func(CompareFunc::Always);
    fb.set_alpha_test_func(CompareFunc::Greater, 0.5);
    fb.enable_alpha_test(true);

    for y in 0..size {
        let v = y as f32 / size as f32;
        for x in 0..size {
            let u = x as f32 / size as f32;
            fb.write_fragment(x0 + x, y0 + y, OVERLAY_DEPTH, texture.sample(u * 2.0, v * 2.0));
        }
    }

    fb.enable_alpha_test(false);
    fb.set_depth_func(CompareFunc::Less);
}

/// Upload the main color buffer and draw it letterboxed to the window
fn present(fb: &FrameBuffer) {
    let (Ok(width), Ok(height)) = (u16::try_from(fb.width()), u16::try_from(fb.height())) else {
        return;
    };
    let rgba = fb.to_rgba8();
    let texture = Texture2D::from_rgba8(width, height, &rgba);
    texture.set_filter(FilterMode::Nearest);

    let screen_w = screen_width();
    let screen_h = screen_height();
    let aspect = fb.width() as f32 / fb.height().max(1) as f32;
    let (draw_w, draw_h) = if screen_w / screen_h > aspect {
        (screen_h * aspect, screen_h)
    } else {
        (screen_w, screen_w / aspect)
    };

    clear_background(BLACK);
    draw_texture_ex(
        &texture,
        (screen_w - draw_w) * 0.5,
        (screen_h - draw_h) * 0.5,
        WHITE,
        DrawTextureParams {
            dest_size: Some(vec2(draw_w, draw_h)),
            ..Default::default()
        },
    );
}
