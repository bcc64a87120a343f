use crate::{
    foundation::{
        core::{Point, Rgba8},
        error::{CollageError, CollageResult},
    },
    geometry::fit::DisplayGeometry,
    overlay::model::{OverlayId, TextOverlay},
};

/// Nominal text size at overlay scale 1.0, in display points.
pub const DEFAULT_FONT_SIZE_PX: f32 = 17.0;

/// Text styling shared by preview and export.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextStyle {
    /// Font size (display space) of an overlay at scale 1.0.
    #[serde(default = "default_font_size_px")]
    pub base_font_size_px: f32,
}

fn default_font_size_px() -> f32 {
    DEFAULT_FONT_SIZE_PX
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            base_font_size_px: DEFAULT_FONT_SIZE_PX,
        }
    }
}

impl TextStyle {
    /// Validate the style.
    pub fn validate(&self) -> CollageResult<()> {
        if !self.base_font_size_px.is_finite() || self.base_font_size_px <= 0.0 {
            return Err(CollageError::invalid_argument(
                "base_font_size_px must be finite and > 0",
            ));
        }
        Ok(())
    }

    /// Apply `COLLAGE_FONT_SIZE_PX`, if set.
    pub fn with_env_overrides(self) -> Self {
        self.with_font_size_override(std::env::var("COLLAGE_FONT_SIZE_PX").ok().as_deref())
    }

    /// Replace the base font size with a raw setting. Unparseable, non-finite and non-positive
    /// values are ignored.
    pub fn with_font_size_override(mut self, raw: Option<&str>) -> Self {
        if let Some(size) = raw
            .and_then(|v| v.trim().parse::<f32>().ok())
            .filter(|v| v.is_finite() && *v > 0.0)
        {
            self.base_font_size_px = size;
        }
        self
    }
}

/// Backend-agnostic description of one export, entirely in image space.
#[derive(Clone, Debug, PartialEq)]
pub struct CompositePlan {
    /// Output width, equal to the base image width.
    pub width: u32,
    /// Output height, equal to the base image height.
    pub height: u32,
    /// Draw operations in paint order.
    pub ops: Vec<DrawOp>,
}

/// A draw operation emitted by [`compile_plan`].
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    /// Draw a text overlay centered on `image_position`.
    Text {
        /// Overlay the op was compiled from.
        overlay: OverlayId,
        /// Text content.
        text: String,
        /// Center of the text in image pixels.
        image_position: Point,
        /// Overlay scale mapped into image space (`scale / fit.scale`).
        effective_scale: f64,
        /// Font size in image pixels.
        font_size_px: f32,
        /// Text color.
        color: Rgba8,
    },
}

/// Map display-space overlays onto a `width x height` base image.
///
/// Positions go through the inverse fit transform; scales are divided by the fit scale so text
/// keeps the size it had on screen relative to the photo.
pub fn compile_plan(
    width: u32,
    height: u32,
    overlays: &[TextOverlay],
    geometry: &DisplayGeometry,
    style: &TextStyle,
) -> CollageResult<CompositePlan> {
    if width == 0 || height == 0 {
        return Err(CollageError::invalid_argument(
            "composite target width/height must be > 0",
        ));
    }
    style.validate()?;

    let fit = geometry.fit;
    let mut ops = Vec::with_capacity(overlays.len());
    for overlay in overlays {
        let effective_scale = overlay.scale() / fit.scale;
        let font_size_px = (f64::from(style.base_font_size_px) * effective_scale) as f32;
        if !font_size_px.is_finite() || font_size_px <= 0.0 {
            return Err(CollageError::invalid_argument(format!(
                "overlay {} maps to an unusable font size {font_size_px}",
                overlay.id()
            )));
        }
        ops.push(DrawOp::Text {
            overlay: overlay.id(),
            text: overlay.text().to_string(),
            image_position: fit.to_image(overlay.position()),
            effective_scale,
            font_size_px,
            color: overlay.color(),
        });
    }

    tracing::debug!(width, height, ops = ops.len(), "compiled composite plan");
    Ok(CompositePlan { width, height, ops })
}

#[cfg(test)]
#[path = "../../tests/unit/compose/plan.rs"]
mod tests;
