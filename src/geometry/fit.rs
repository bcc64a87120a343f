use crate::foundation::{
    core::{Affine, Point, Rect, Size, Vec2},
    error::{CollageError, CollageResult},
};

/// Scale + offset mapping image space to display space: `display = image * scale + offset`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FitTransform {
    /// Uniform image-to-display scale, always finite and > 0.
    pub scale: f64,
    /// Letterbox offset of the displayed image inside the viewport.
    pub offset: Vec2,
}

impl FitTransform {
    /// Build a transform from explicit parts.
    pub fn new(scale: f64, offset: Vec2) -> CollageResult<Self> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(CollageError::invalid_argument(
                "fit scale must be finite and > 0",
            ));
        }
        if !offset.x.is_finite() || !offset.y.is_finite() {
            return Err(CollageError::invalid_argument("fit offset must be finite"));
        }
        Ok(Self { scale, offset })
    }

    /// Aspect-fit `image` inside `viewport`, centering the letterboxed result.
    pub fn aspect_fit(image: Size, viewport: Size) -> CollageResult<Self> {
        validate_size(image, "image")?;
        validate_size(viewport, "viewport")?;

        let scale = (viewport.width / image.width).min(viewport.height / image.height);
        let offset = Vec2::new(
            (viewport.width - image.width * scale) / 2.0,
            (viewport.height - image.height * scale) / 2.0,
        );
        Self::new(scale, offset)
    }

    /// Map an image-space point into display space.
    pub fn to_display(self, p: Point) -> Point {
        Point::new(p.x * self.scale, p.y * self.scale) + self.offset
    }

    /// Map a display-space point back into image space.
    pub fn to_image(self, p: Point) -> Point {
        let q = p - self.offset;
        Point::new(q.x / self.scale, q.y / self.scale)
    }

    /// Image-to-display affine.
    pub fn to_display_affine(self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.scale)
    }

    /// Display-to-image affine.
    pub fn to_image_affine(self) -> Affine {
        self.to_display_affine().inverse()
    }
}

/// How the base image was presented on screen when overlay positions were recorded.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DisplayGeometry {
    /// On-screen viewport size.
    pub viewport: Size,
    /// Aspect-fit transform of the image inside `viewport`.
    pub fit: FitTransform,
}

impl DisplayGeometry {
    /// Aspect-fit a `width x height` image inside `viewport`.
    pub fn aspect_fit(width: u32, height: u32, viewport: Size) -> CollageResult<Self> {
        let image = Size::new(f64::from(width), f64::from(height));
        let fit = FitTransform::aspect_fit(image, viewport)?;
        Ok(Self { viewport, fit })
    }

    /// Rectangle the image occupies inside the viewport, in display space.
    pub fn displayed_image_rect(&self, width: u32, height: u32) -> Rect {
        let origin = self.fit.to_display(Point::ORIGIN);
        let far = self
            .fit
            .to_display(Point::new(f64::from(width), f64::from(height)));
        Rect::from_points(origin, far)
    }

    /// Return `true` when a display-space tap lands on the displayed image (edges inclusive).
    pub fn contains_display_point(&self, width: u32, height: u32, p: Point) -> bool {
        let r = self.displayed_image_rect(width, height);
        p.x >= r.x0 && p.x <= r.x1 && p.y >= r.y0 && p.y <= r.y1
    }
}

fn validate_size(size: Size, what: &str) -> CollageResult<()> {
    let finite = size.width.is_finite() && size.height.is_finite();
    if !finite || size.width <= 0.0 || size.height <= 0.0 {
        return Err(CollageError::invalid_argument(format!(
            "{what} size must be finite and > 0 (got {}x{})",
            size.width, size.height
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/fit.rs"]
mod tests;
