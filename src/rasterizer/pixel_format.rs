//! Packed color layouts
//!
//! A pixel format describes how an RGB(A) triple is packed into 1-4 bytes:
//! per-channel bit loss and shift, plus the byte width of one pixel.

use serde::{Deserialize, Serialize};

/// Color channel layout of a framebuffer or texture.
///
/// `*_loss` is the number of low bits dropped from an 8-bit channel,
/// `*_shift` is where the remaining bits land in the packed value.
/// A loss of 8 means the channel is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelFormat {
    pub bytes_per_pixel: u8,
    pub r_loss: u8,
    pub g_loss: u8,
    pub b_loss: u8,
    pub a_loss: u8,
    pub r_shift: u8,
    pub g_shift: u8,
    pub b_shift: u8,
    pub a_shift: u8,
}

impl PixelFormat {
    /// 16-bit 5:6:5, no alpha
    pub const RGB565: PixelFormat = PixelFormat {
        bytes_per_pixel: 2,
        r_loss: 3,
        g_loss: 2,
        b_loss: 3,
        a_loss: 8,
        r_shift: 11,
        g_shift: 5,
        b_shift: 0,
        a_shift: 0,
    };

    /// 32-bit, red in the top byte
    pub const RGBA8888: PixelFormat = PixelFormat {
        bytes_per_pixel: 4,
        r_loss: 0,
        g_loss: 0,
        b_loss: 0,
        a_loss: 0,
        r_shift: 24,
        g_shift: 16,
        b_shift: 8,
        a_shift: 0,
    };

    /// 32-bit, alpha in the top byte
    pub const ARGB8888: PixelFormat = PixelFormat {
        bytes_per_pixel: 4,
        r_loss: 0,
        g_loss: 0,
        b_loss: 0,
        a_loss: 0,
        r_shift: 16,
        g_shift: 8,
        b_shift: 0,
        a_shift: 24,
    };

    /// 32-bit, blue in the top byte
    pub const BGRA8888: PixelFormat = PixelFormat {
        bytes_per_pixel: 4,
        r_loss: 0,
        g_loss: 0,
        b_loss: 0,
        a_loss: 0,
        r_shift: 8,
        g_shift: 16,
        b_shift: 24,
        a_shift: 0,
    };

    pub fn bytes_per_pixel(&self) -> usize {
        self.bytes_per_pixel as usize
    }

    /// 1-4 bytes per pixel, and every present channel lands inside a u32.
    pub fn is_supported(&self) -> bool {
        let channels = [
            (self.r_loss, self.r_shift),
            (self.g_loss, self.g_shift),
            (self.b_loss, self.b_shift),
            (self.a_loss, self.a_shift),
        ];
        (1..=4).contains(&self.bytes_per_pixel)
            && channels
                .iter()
                .all(|&(loss, shift)| loss >= 8 || (shift as u32) + (8 - loss as u32) <= 32)
    }

    pub fn has_alpha(&self) -> bool {
        self.a_loss < 8
    }

    /// Pack an opaque color. Alpha bits (if any) are set to full.
    pub fn rgb_to_color(&self, r: u8, g: u8, b: u8) -> u32 {
        self.argb_to_color(0xFF, r, g, b)
    }

    pub fn argb_to_color(&self, a: u8, r: u8, g: u8, b: u8) -> u32 {
        pack(a, self.a_loss, self.a_shift)
            | pack(r, self.r_loss, self.r_shift)
            | pack(g, self.g_loss, self.g_shift)
            | pack(b, self.b_loss, self.b_shift)
    }

    pub fn color_to_rgb(&self, color: u32) -> (u8, u8, u8) {
        let (_, r, g, b) = self.color_to_argb(color);
        (r, g, b)
    }

    /// Unpack to 8-bit channels, replicating high bits into the lost low bits
    /// so that full-intensity channels come back as 255.
    pub fn color_to_argb(&self, color: u32) -> (u8, u8, u8, u8) {
        let a = if self.has_alpha() {
            unpack(color, self.a_loss, self.a_shift)
        } else {
            0xFF
        };
        (
            a,
            unpack(color, self.r_loss, self.r_shift),
            unpack(color, self.g_loss, self.g_shift),
            unpack(color, self.b_loss, self.b_shift),
        )
    }

    /// Store `color` in the first `bytes_per_pixel` bytes of `dst`, in native
    /// byte order (the layout a display surface expects for the packed value).
    #[inline]
    pub fn write_color(&self, dst: &mut [u8], color: u32) {
        match self.bytes_per_pixel {
            1 => dst[0] = color as u8,
            2 => dst[..2].copy_from_slice(&(color as u16).to_ne_bytes()),
            3 => dst[..3].copy_from_slice(&low_24_ne(color)),
            _ => dst[..4].copy_from_slice(&color.to_ne_bytes()),
        }
    }

    #[inline]
    pub fn read_color(&self, src: &[u8]) -> u32 {
        match self.bytes_per_pixel {
            1 => src[0] as u32,
            2 => u16::from_ne_bytes([src[0], src[1]]) as u32,
            3 => {
                if cfg!(target_endian = "little") {
                    u32::from_le_bytes([src[0], src[1], src[2], 0])
                } else {
                    u32::from_be_bytes([0, src[0], src[1], src[2]])
                }
            }
            _ => u32::from_ne_bytes([src[0], src[1], src[2], src[3]]),
        }
    }
}

impl Default for PixelFormat {
    fn default() -> Self {
        PixelFormat::RGB565
    }
}

/// Named formats, used where a format is picked by name (config files).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PixelFormatPreset {
    #[default]
    Rgb565,
    Rgba8888,
    Argb8888,
    Bgra8888,
}

impl PixelFormatPreset {
    pub fn format(self) -> PixelFormat {
        match self {
            PixelFormatPreset::Rgb565 => PixelFormat::RGB565,
            PixelFormatPreset::Rgba8888 => PixelFormat::RGBA8888,
            PixelFormatPreset::Argb8888 => PixelFormat::ARGB8888,
            PixelFormatPreset::Bgra8888 => PixelFormat::BGRA8888,
        }
    }
}

impl From<PixelFormatPreset> for PixelFormat {
    fn from(preset: PixelFormatPreset) -> Self {
        preset.format()
    }
}

#[inline]
fn pack(value: u8, loss: u8, shift: u8) -> u32 {
    if loss >= 8 {
        return 0;
    }
    ((value >> loss) as u32).checked_shl(shift as u32).unwrap_or(0)
}

#[inline]
fn unpack(color: u32, loss: u8, shift: u8) -> u8 {
    if loss >= 8 {
        return 0;
    }
    let bits = 8 - loss as u32;
    let v = color.checked_shr(shift as u32).unwrap_or(0) & ((1 << bits) - 1);
    // replicate the top bits downwards
    let mut out = v << (8 - bits);
    let mut filled = bits;
    while filled < 8 {
        out |= out >> filled;
        filled *= 2;
    }
    out as u8
}

fn low_24_ne(color: u32) -> [u8; 3] {
    if cfg!(target_endian = "little") {
        let b = color.to_le_bytes();
        [b[0], b[1], b[2]]
    } else {
        let b = color.to_be_bytes();
        [b[1], b[2], b[3]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb565_pack() {
        let f = PixelFormat::RGB565;
        assert_eq!(f.rgb_to_color(255, 255, 255), 0xFFFF);
        assert_eq!(f.rgb_to_color(255, 0, 0), 0xF800);
        assert_eq!(f.rgb_to_color(0, 255, 0), 0x07E0);
        assert_eq!(f.rgb_to_color(0, 0, 255), 0x001F);
    }

    #[test]
    fn test_rgb565_unpack_expands() {
        let f = PixelFormat::RGB565;
        assert_eq!(f.color_to_rgb(0xFFFF), (255, 255, 255));
        assert_eq!(f.color_to_argb(0x0000), (255, 0, 0, 0));
    }

    #[test]
    fn test_rgba8888_layout() {
        let f = PixelFormat::RGBA8888;
        assert_eq!(f.rgb_to_color(0x11, 0x22, 0x33), 0x112233FF);
        assert_eq!(f.argb_to_color(0x44, 0x11, 0x22, 0x33), 0x11223344);
        assert_eq!(f.color_to_argb(0x11223344), (0x44, 0x11, 0x22, 0x33));
    }

    #[test]
    fn test_write_read_bytes() {
        let f = PixelFormat::RGB565;
        let mut buf = [0u8; 3];
        f.write_color(&mut buf, 0xABCD);
        assert_eq!(f.read_color(&buf), 0xABCD);
        // only the pixel's own bytes are touched
        assert_eq!(buf[2], 0);
    }

    #[test]
    fn test_supported_formats() {
        assert!(PixelFormat::RGB565.is_supported());
        assert!(PixelFormat::BGRA8888.is_supported());
        let zero = PixelFormat { bytes_per_pixel: 0, ..PixelFormat::RGB565 };
        assert!(!zero.is_supported());
        let wide = PixelFormat { bytes_per_pixel: 8, ..PixelFormat::RGBA8888 };
        assert!(!wide.is_supported());
        let shifted = PixelFormat { r_shift: 40, ..PixelFormat::RGBA8888 };
        assert!(!shifted.is_supported());
        // bad shifts pack to nothing instead of panicking
        assert_eq!(shifted.argb_to_color(0, 255, 0, 0), 0);
        assert_eq!(shifted.color_to_rgb(u32::MAX).0, 0);
    }

    #[test]
    fn test_preset_lookup() {
        assert_eq!(PixelFormat::from(PixelFormatPreset::Argb8888), PixelFormat::ARGB8888);
        assert_eq!(PixelFormatPreset::default().format(), PixelFormat::RGB565);
    }
}
