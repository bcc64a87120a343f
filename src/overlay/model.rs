use std::sync::Arc;

use crate::foundation::{
    core::{Point, Rgba8, is_finite_point},
    error::{CollageError, CollageResult},
};

/// Identifier of a [`TextOverlay`], unique within one editing session.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct OverlayId(u64);

impl OverlayId {
    /// Construct an id from its raw value.
    pub fn from_u64(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw id value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for OverlayId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A text stamp placed over the base image.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TextOverlay {
    id: OverlayId,
    text: String,
    position: Point,
    scale: f64,
    pending_scale: Option<f64>,
    color: Rgba8,
}

impl TextOverlay {
    /// Session-unique id.
    pub fn id(&self) -> OverlayId {
        self.id
    }

    /// Text content.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Center of the text in display space.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Committed scale.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Scale of an in-progress pinch, if any.
    pub fn pending_scale(&self) -> Option<f64> {
        self.pending_scale
    }

    /// Scale the live preview should draw with: the pinch scale while one is active.
    pub fn effective_scale(&self) -> f64 {
        self.pending_scale.unwrap_or(self.scale)
    }

    /// Text color.
    pub fn color(&self) -> Rgba8 {
        self.color
    }
}

/// Immutable copy of the overlay sequence, taken when an export begins.
///
/// Pending pinch scales are dropped: exports only see committed state.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlaySnapshot {
    overlays: Arc<[TextOverlay]>,
}

impl OverlaySnapshot {
    /// Overlays in paint order.
    pub fn overlays(&self) -> &[TextOverlay] {
        &self.overlays
    }

    /// Number of overlays captured.
    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    /// Return `true` when no overlays were captured.
    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }
}

/// Ordered overlays of one editing session. Insertion order is paint order.
///
/// Every operation validates its inputs before touching state, so a failed call leaves the model
/// exactly as it was.
#[derive(Clone, Debug, Default)]
pub struct OverlayModel {
    overlays: Vec<TextOverlay>,
    next_id: u64,
}

impl OverlayModel {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new overlay with `scale = 1.0` and the default (black) color.
    pub fn add_overlay(
        &mut self,
        text: impl Into<String>,
        position: Point,
    ) -> CollageResult<OverlayId> {
        self.add_overlay_with_color(text, position, Rgba8::default())
    }

    /// Append a new overlay with an explicit color.
    pub fn add_overlay_with_color(
        &mut self,
        text: impl Into<String>,
        position: Point,
        color: Rgba8,
    ) -> CollageResult<OverlayId> {
        let text = text.into();
        validate_text(&text)?;
        validate_position(position)?;

        self.next_id += 1;
        let id = OverlayId(self.next_id);
        self.overlays.push(TextOverlay {
            id,
            text,
            position,
            scale: 1.0,
            pending_scale: None,
            color,
        });
        tracing::debug!(%id, x = position.x, y = position.y, "overlay added");
        Ok(id)
    }

    /// Replace the text of an overlay.
    pub fn update_text(&mut self, id: OverlayId, text: impl Into<String>) -> CollageResult<()> {
        let text = text.into();
        validate_text(&text)?;
        self.get_mut(id)?.text = text;
        tracing::debug!(%id, "overlay text updated");
        Ok(())
    }

    /// Move an overlay. Positions outside the image are accepted.
    pub fn update_position(&mut self, id: OverlayId, new_position: Point) -> CollageResult<()> {
        validate_position(new_position)?;
        self.get_mut(id)?.position = new_position;
        tracing::trace!(%id, x = new_position.x, y = new_position.y, "overlay moved");
        Ok(())
    }

    /// Commit a new scale. Clears any in-progress pinch on the overlay.
    pub fn update_scale(&mut self, id: OverlayId, new_scale: f64) -> CollageResult<()> {
        validate_scale(new_scale)?;
        let overlay = self.get_mut(id)?;
        overlay.scale = new_scale;
        overlay.pending_scale = None;
        tracing::debug!(%id, scale = new_scale, "overlay scale committed");
        Ok(())
    }

    /// Change the text color.
    pub fn set_color(&mut self, id: OverlayId, color: Rgba8) -> CollageResult<()> {
        self.get_mut(id)?.color = color;
        Ok(())
    }

    /// Start or update an in-progress pinch.
    pub fn update_pending_scale(&mut self, id: OverlayId, scale: f64) -> CollageResult<()> {
        validate_scale(scale)?;
        self.get_mut(id)?.pending_scale = Some(scale);
        Ok(())
    }

    /// Commit the in-progress pinch, if any. Returns the committed scale.
    pub fn commit_pending_scale(&mut self, id: OverlayId) -> CollageResult<f64> {
        let overlay = self.get_mut(id)?;
        if let Some(scale) = overlay.pending_scale.take() {
            overlay.scale = scale;
            tracing::debug!(%id, scale, "pinch committed");
        }
        Ok(overlay.scale)
    }

    /// Drop the in-progress pinch, restoring the committed scale for display.
    pub fn cancel_pending_scale(&mut self, id: OverlayId) -> CollageResult<()> {
        self.get_mut(id)?.pending_scale = None;
        Ok(())
    }

    /// Remove an overlay and return it.
    pub fn remove_overlay(&mut self, id: OverlayId) -> CollageResult<TextOverlay> {
        let idx = self.index_of(id)?;
        let removed = self.overlays.remove(idx);
        tracing::debug!(%id, "overlay removed");
        Ok(removed)
    }

    /// Look up an overlay.
    pub fn get(&self, id: OverlayId) -> CollageResult<&TextOverlay> {
        self.overlays
            .iter()
            .find(|o| o.id == id)
            .ok_or(CollageError::NotFound(id))
    }

    /// Return `true` when `id` names a live overlay.
    pub fn contains(&self, id: OverlayId) -> bool {
        self.overlays.iter().any(|o| o.id == id)
    }

    /// Overlays in paint order.
    pub fn iter(&self) -> impl Iterator<Item = &TextOverlay> {
        self.overlays.iter()
    }

    /// Number of overlays.
    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    /// Return `true` when there are no overlays.
    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }

    /// Capture the committed overlay state for export.
    pub fn snapshot(&self) -> OverlaySnapshot {
        let overlays: Vec<TextOverlay> = self
            .overlays
            .iter()
            .map(|o| TextOverlay {
                pending_scale: None,
                ..o.clone()
            })
            .collect();
        OverlaySnapshot {
            overlays: overlays.into(),
        }
    }

    fn index_of(&self, id: OverlayId) -> CollageResult<usize> {
        self.overlays
            .iter()
            .position(|o| o.id == id)
            .ok_or(CollageError::NotFound(id))
    }

    fn get_mut(&mut self, id: OverlayId) -> CollageResult<&mut TextOverlay> {
        self.overlays
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(CollageError::NotFound(id))
    }
}

fn validate_text(text: &str) -> CollageResult<()> {
    if text.is_empty() {
        return Err(CollageError::invalid_argument("overlay text must be non-empty"));
    }
    Ok(())
}

fn validate_position(p: Point) -> CollageResult<()> {
    if !is_finite_point(p) {
        return Err(CollageError::invalid_argument(format!(
            "overlay position must be finite (got {}, {})",
            p.x, p.y
        )));
    }
    Ok(())
}

fn validate_scale(scale: f64) -> CollageResult<()> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(CollageError::invalid_argument(format!(
            "overlay scale must be finite and > 0 (got {scale})"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/model.rs"]
mod tests;
