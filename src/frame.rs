use std::path::Path;

use image::{codecs::jpeg::JpegEncoder, ColorType, DynamicImage, ImageBuffer, Rgba, RgbaImage};

use crate::error::{EffectError, Result};

/// Extension of the single codec photos are stored in
pub const PHOTO_EXTENSION: &str = "jpg";

/// A captured or processed photo
///
/// This is a thin wrapper around an RGBA image buffer. Effect stages read a
/// `&Frame` and return a fresh one; nothing mutates a frame it was handed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    buffer: RgbaImage,
}

impl Frame {
    /// Create a new frame from an RGBA image buffer
    pub fn new(buffer: RgbaImage) -> Self {
        Self { buffer }
    }

    /// Create a new frame with the given dimensions filled with the specified color
    pub fn new_filled(width: u32, height: u32, color: [u8; 4]) -> Self {
        let buffer = ImageBuffer::from_pixel(width, height, Rgba(color));
        Self { buffer }
    }

    /// Decode an encoded image (any format the codec set understands)
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(bytes)
            .map_err(|e| EffectError::Decode { reason: e.to_string() })?;
        Ok(Self::from(image))
    }

    /// Load and decode an image file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|e| EffectError::Decode {
            reason: format!("{}: {}", path.display(), e),
        })?;
        Ok(Self::from(image))
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }

    /// Get a pixel at the given coordinates (returns RGBA array)
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.buffer.get_pixel(x, y).0
    }

    /// Set a pixel at the given coordinates
    pub fn set_pixel(&mut self, x: u32, y: u32, color: [u8; 4]) {
        self.buffer.put_pixel(x, y, Rgba(color));
    }

    /// Get the underlying image buffer
    pub fn as_image(&self) -> &RgbaImage {
        &self.buffer
    }

    /// Get a mutable reference to the underlying image buffer
    pub fn as_image_mut(&mut self) -> &mut RgbaImage {
        &mut self.buffer
    }

    /// Raw interleaved RGBA bytes
    pub fn as_raw(&self) -> &[u8] {
        self.buffer.as_raw()
    }

    /// Encode as JPEG; alpha is dropped since the codec has none
    pub fn encode_jpeg(&self, quality: u8) -> Result<Vec<u8>> {
        let rgb = DynamicImage::ImageRgba8(self.buffer.clone()).to_rgb8();
        let mut bytes = Vec::new();
        JpegEncoder::new_with_quality(&mut bytes, quality)
            .encode(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)
            .map_err(|e| EffectError::Encode { reason: e.to_string() })?;
        Ok(bytes)
    }
}

impl From<DynamicImage> for Frame {
    fn from(image: DynamicImage) -> Self {
        Self::new(image.to_rgba8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filled_frame() {
        let frame = Frame::new_filled(4, 3, [10, 20, 30, 255]);
        assert_eq!(frame.dimensions(), (4, 3));
        assert_eq!(frame.get_pixel(3, 2), [10, 20, 30, 255]);
        assert_eq!(frame.as_raw().len(), 4 * 3 * 4);
    }

    #[test]
    fn test_jpeg_encode_decodes_to_same_shape() {
        let frame = Frame::new_filled(16, 8, [200, 120, 40, 255]);
        let bytes = frame.encode_jpeg(90).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);

        let decoded = Frame::decode(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (16, 8));
        assert_eq!(decoded.get_pixel(0, 0)[3], 255);
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(Frame::decode(b"not an image").is_err());
    }
}
