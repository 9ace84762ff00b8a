use crate::format::pixel_format::{PixelFormat, compute_image_size_bytes};

/// Owned, tightly packed 2D pixel array.
///
/// Compressed formats store whole blocks; [`Bitmap::row_pitch`] is then the
/// size of one row of blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixel_format: PixelFormat,
    data: Vec<u8>,
}

impl Bitmap {
    /// Zero-filled bitmap.
    #[must_use]
    pub fn new(width: u32, height: u32, pixel_format: PixelFormat) -> Self {
        Self {
            width,
            height,
            pixel_format,
            data: vec![0; compute_image_size_bytes(pixel_format, width, height, 1)],
        }
    }

    /// Wraps `data`, which must be exactly the size the dimensions imply.
    #[must_use]
    pub fn from_data(width: u32, height: u32, pixel_format: PixelFormat, data: Vec<u8>) -> Option<Self> {
        let expected = compute_image_size_bytes(pixel_format, width, height, 1);
        if data.len() != expected {
            log::warn!(
                "Bitmap {}x{} {}: expected {} bytes, got {}",
                width,
                height,
                pixel_format,
                expected,
                data.len()
            );
            return None;
        }
        Some(Self {
            width,
            height,
            pixel_format,
            data,
        })
    }

    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    #[must_use]
    pub fn pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }

    #[inline]
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    #[inline]
    #[must_use]
    pub fn data_size(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn row_pitch(&self) -> usize {
        compute_image_size_bytes(self.pixel_format, self.width, 1, 1)
    }

    #[must_use]
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}
