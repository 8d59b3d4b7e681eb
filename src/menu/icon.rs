//! Icon bitmaps attached to menu items.

use image::{DynamicImage, ImageError, ImageFormat, RgbaImage};
use std::io::Cursor;
use std::sync::Arc;

/// An RGBA bitmap carried by a menu item.
///
/// Cheap to clone; the pixel buffer is shared.
#[derive(Debug, Clone, PartialEq)]
pub struct IconImage {
    image: Arc<RgbaImage>,
}

impl IconImage {
    pub fn new(image: RgbaImage) -> Self {
        Self {
            image: Arc::new(image),
        }
    }

    /// Build from raw RGBA8 pixels. Returns `None` if the buffer length does
    /// not match `width * height * 4`.
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Option<Self> {
        RgbaImage::from_raw(width, height, rgba).map(Self::new)
    }

    /// Decode any image format supported by the `image` crate.
    pub fn load_from_memory(bytes: &[u8]) -> Result<Self, ImageError> {
        Ok(Self::new(image::load_from_memory(bytes)?.into_rgba8()))
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn as_rgba(&self) -> &RgbaImage {
        &self.image
    }

    /// Serialize into an in-memory PNG byte stream.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>, ImageError> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8((*self.image).clone())
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }
}
