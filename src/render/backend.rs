use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::{
    assets::{decode::BaseImage, font::FontFace},
    compose::plan::CompositePlan,
    foundation::{error::CollageResult, math::unpremultiply_rgba8_in_place},
};

/// Flattened export output as RGBA8 pixels at the base image's native resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlattenedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FlattenedImage {
    /// Straight-alpha copy of the pixels, as image encoders expect.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        if self.premultiplied {
            unpremultiply_rgba8_in_place(&mut out);
        }
        out
    }

    /// RGBA8 bytes of pixel `(x, y)`, if in bounds and backed by data.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// Shared flag used to abandon an in-flight export.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Return `true` once [`CancelToken::cancel`] was called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A rasterizer that executes a [`CompositePlan`] over a base image.
pub trait CompositeBackend {
    /// Flatten `base` plus the plan's draw ops into a new image of the base's size.
    ///
    /// The token is polled between draw ops; a cancelled render returns
    /// [`crate::CollageError::Cancelled`] and no image.
    fn render_plan(
        &mut self,
        plan: &CompositePlan,
        base: &BaseImage,
        cancel: &CancelToken,
    ) -> CollageResult<FlattenedImage>;
}

/// Available backend kinds.
#[derive(Clone, Copy, Debug, Default)]
pub enum BackendKind {
    /// CPU raster backend powered by `vello_cpu`.
    #[default]
    Cpu,
}

/// Backend-agnostic render settings.
///
/// Text size comes from the session's [`crate::TextStyle`] and is baked into each plan op.
#[derive(Clone, Debug, Default)]
pub struct RenderSettings {
    /// Font used for overlay glyphs. Without one, characters are drawn as placeholder blocks.
    pub font: Option<FontFace>,
}

impl RenderSettings {
    /// Defaults with the font read from `COLLAGE_FONT_PATH`, if set.
    ///
    /// An unreadable font path is an error.
    pub fn from_env() -> CollageResult<Self> {
        let mut settings = Self::default();
        if let Some(path) = std::env::var_os("COLLAGE_FONT_PATH").filter(|p| !p.is_empty()) {
            settings.font = Some(crate::assets::font::load_font(path)?);
        }
        Ok(settings)
    }
}

/// Create a compositing backend.
pub fn create_backend(
    kind: BackendKind,
    settings: &RenderSettings,
) -> CollageResult<Box<dyn CompositeBackend>> {
    match kind {
        BackendKind::Cpu => Ok(Box::new(crate::render::cpu::CpuBackend::new(
            settings.clone(),
        ))),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/backend.rs"]
mod tests;
