use std::{path::Path, sync::Arc};

use anyhow::Context;

use crate::foundation::{
    core::Size,
    error::{CollageError, CollageResult},
    math::premultiply_rgba8_in_place,
};

/// Base photo in premultiplied RGBA8 form at its native resolution.
///
/// Pixels are shared behind an [`Arc`] so the live preview and a background export can read the
/// same image without copying.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BaseImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl BaseImage {
    /// Build a base image from straight-alpha RGBA8 pixels.
    pub fn from_rgba8(width: u32, height: u32, mut rgba8: Vec<u8>) -> CollageResult<Self> {
        if width == 0 || height == 0 {
            return Err(CollageError::invalid_argument(
                "base image width/height must be > 0",
            ));
        }
        let expected = width as usize * height as usize * 4;
        if rgba8.len() != expected {
            return Err(CollageError::invalid_argument(format!(
                "base image byte length {} does not match {width}x{height} rgba8 ({expected})",
                rgba8.len()
            )));
        }
        premultiply_rgba8_in_place(&mut rgba8);
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8),
        })
    }

    /// Solid-color image, mostly useful for tests and previews.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> CollageResult<Self> {
        let px = width as usize * height as usize;
        Self::from_rgba8(width, height, rgba.repeat(px))
    }

    /// Native pixel size.
    pub fn size(&self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }
}

/// Decode an encoded image (PNG, JPEG, ...) into a [`BaseImage`].
pub fn decode_image(bytes: &[u8]) -> CollageResult<BaseImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    BaseImage::from_rgba8(width, height, rgba.into_raw())
}

/// Read and decode an image file into a [`BaseImage`].
pub fn load_image(path: impl AsRef<Path>) -> CollageResult<BaseImage> {
    let path = path.as_ref();
    let bytes =
        std::fs::read(path).with_context(|| format!("read image from '{}'", path.display()))?;
    let img = decode_image(&bytes)?;
    tracing::debug!(
        path = %path.display(),
        width = img.width,
        height = img.height,
        "loaded base image"
    );
    Ok(img)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
