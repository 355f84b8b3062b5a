//! Raw color/depth memory
//!
//! Buffer geometry, fallible allocation, and the row-aware fills shared by
//! the main framebuffer and offscreen buffers.

use super::error::BufferError;
use super::pixel_format::PixelFormat;

/// Geometry of a color + depth pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub width: usize,
    pub height: usize,
    pub format: PixelFormat,
    /// Padded byte stride of one color row (multiple of 4)
    pub linesize: usize,
}

impl Layout {
    pub fn new(width: usize, height: usize, format: PixelFormat) -> Result<Self, BufferError> {
        if !format.is_supported() {
            return Err(BufferError::UnsupportedFormat {
                bytes_per_pixel: format.bytes_per_pixel,
            });
        }
        let overflow = BufferError::SizeOverflow { width, height };
        let row = width
            .checked_mul(format.bytes_per_pixel())
            .ok_or(overflow.clone())?;
        let linesize = row.checked_add(3).ok_or(overflow.clone())? & !3;
        let layout = Self { width, height, format, linesize };
        // validate both totals up front so later arithmetic can't wrap
        layout.color_len().ok_or(overflow.clone())?;
        layout.depth_len().ok_or(overflow)?;
        Ok(layout)
    }

    pub fn bytes_per_pixel(&self) -> usize {
        self.format.bytes_per_pixel()
    }

    /// Bytes of real pixel data per row (linesize minus padding)
    pub fn row_bytes(&self) -> usize {
        self.width * self.bytes_per_pixel()
    }

    pub fn color_len(&self) -> Option<usize> {
        self.height.checked_mul(self.linesize)
    }

    pub fn depth_len(&self) -> Option<usize> {
        self.width.checked_mul(self.height)
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Byte offset of pixel (x, y) in the color buffer
    #[inline]
    pub fn color_offset(&self, x: usize, y: usize) -> usize {
        y * self.linesize + x * self.bytes_per_pixel()
    }

    #[inline]
    pub fn depth_index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    pub fn same_size(&self, other: &Layout) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.linesize == other.linesize
            && self.format.bytes_per_pixel == other.format.bytes_per_pixel
    }
}

/// Color memory that is either allocated here or lent by the caller.
///
/// Dropping an `Owned` buffer frees it; a `Borrowed` one is only released
/// back to its owner.
pub enum ColorStorage<'a> {
    Owned(Vec<u8>),
    Borrowed(&'a mut [u8]),
}

impl<'a> ColorStorage<'a> {
    pub fn is_owned(&self) -> bool {
        matches!(self, ColorStorage::Owned(_))
    }

    pub fn as_slice(&self) -> &[u8] {
        match self {
            ColorStorage::Owned(v) => v.as_slice(),
            ColorStorage::Borrowed(s) => &s[..],
        }
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        match self {
            ColorStorage::Owned(v) => v.as_mut_slice(),
            ColorStorage::Borrowed(s) => &mut s[..],
        }
    }
}

/// Allocate `len` default-initialised elements, reporting failure instead of
/// aborting.
pub fn try_alloc<T: Copy + Default>(len: usize) -> Result<Vec<T>, BufferError> {
    let bytes = len.saturating_mul(std::mem::size_of::<T>());
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|_| BufferError::Allocation { bytes })?;
    v.resize(len, T::default());
    Ok(v)
}

/// Fill the visible part of every row with one packed color. Padding bytes at
/// the end of each row are left alone.
pub fn fill_color(color: &mut [u8], layout: &Layout, value: u32) {
    let bpp = layout.bytes_per_pixel();
    let row_bytes = layout.row_bytes();
    if bpp == 0 || row_bytes == 0 {
        return;
    }

    let mut pattern = [0u8; 4];
    layout.format.write_color(&mut pattern, value);
    let pattern = &pattern[..bpp];

    for row in color.chunks_mut(layout.linesize).take(layout.height) {
        for px in row[..row_bytes].chunks_exact_mut(bpp) {
            px.copy_from_slice(pattern);
        }
    }
}

pub fn fill_depth(depth: &mut [u32], value: u32) {
    depth.fill(value);
}
