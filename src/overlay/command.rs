use crate::{
    foundation::{
        core::{Point, Rgba8},
        error::CollageResult,
    },
    overlay::model::{OverlayId, OverlayModel},
};

/// One discrete gesture outcome, applied atomically to an [`OverlayModel`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum OverlayCommand {
    /// Append a new overlay.
    Add {
        /// Text content, must be non-empty.
        text: String,
        /// Display-space center.
        position: Point,
        /// Optional color; black when omitted.
        #[serde(default)]
        color: Option<Rgba8>,
    },
    /// Finish a text-entry interaction.
    ///
    /// Empty text cancels the entry. With a `target` the existing overlay takes the new text and
    /// position, otherwise a new overlay is added.
    Commit {
        /// Overlay being edited, if any.
        #[serde(default)]
        target: Option<OverlayId>,
        /// Entered text.
        text: String,
        /// Where the entry field was shown, in display space.
        position: Point,
    },
    /// Replace an overlay's text.
    EditText {
        /// Target overlay.
        id: OverlayId,
        /// New text, must be non-empty.
        text: String,
    },
    /// Drag update.
    Move {
        /// Target overlay.
        id: OverlayId,
        /// New display-space center.
        position: Point,
    },
    /// Set a committed scale directly.
    Scale {
        /// Target overlay.
        id: OverlayId,
        /// New scale, must be > 0.
        scale: f64,
    },
    /// Pinch in progress.
    PinchChanged {
        /// Target overlay.
        id: OverlayId,
        /// Current pinch magnification.
        scale: f64,
    },
    /// Pinch released; `scale` becomes the committed scale.
    PinchEnded {
        /// Target overlay.
        id: OverlayId,
        /// Final pinch magnification.
        scale: f64,
    },
    /// Pinch interrupted; the committed scale is kept.
    PinchCancelled {
        /// Target overlay.
        id: OverlayId,
    },
    /// Change an overlay's color.
    Recolor {
        /// Target overlay.
        id: OverlayId,
        /// New color.
        color: Rgba8,
    },
    /// Delete an overlay.
    Remove {
        /// Target overlay.
        id: OverlayId,
    },
}

/// What applying a command did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandOutcome {
    /// A new overlay was created.
    Added(OverlayId),
    /// An existing overlay changed.
    Updated(OverlayId),
    /// An overlay was removed.
    Removed(OverlayId),
    /// The command was a no-op (empty text entry).
    Ignored,
}

impl OverlayCommand {
    /// Apply the command. On error the model is left unchanged.
    pub fn apply(&self, model: &mut OverlayModel) -> CollageResult<CommandOutcome> {
        match self {
            Self::Add {
                text,
                position,
                color,
            } => model
                .add_overlay_with_color(text.as_str(), *position, color.unwrap_or_default())
                .map(CommandOutcome::Added),
            Self::Commit {
                target,
                text,
                position,
            } => {
                if text.is_empty() {
                    return Ok(CommandOutcome::Ignored);
                }
                match target {
                    Some(id) => {
                        // Text is non-empty here, so only the position write can fail.
                        model.update_position(*id, *position)?;
                        model.update_text(*id, text.as_str())?;
                        Ok(CommandOutcome::Updated(*id))
                    }
                    None => model
                        .add_overlay(text.as_str(), *position)
                        .map(CommandOutcome::Added),
                }
            }
            Self::EditText { id, text } => {
                model.update_text(*id, text.as_str())?;
                Ok(CommandOutcome::Updated(*id))
            }
            Self::Move { id, position } => {
                model.update_position(*id, *position)?;
                Ok(CommandOutcome::Updated(*id))
            }
            Self::Scale { id, scale } => {
                model.update_scale(*id, *scale)?;
                Ok(CommandOutcome::Updated(*id))
            }
            Self::PinchChanged { id, scale } => {
                model.update_pending_scale(*id, *scale)?;
                Ok(CommandOutcome::Updated(*id))
            }
            Self::PinchEnded { id, scale } => {
                model.update_scale(*id, *scale)?;
                Ok(CommandOutcome::Updated(*id))
            }
            Self::PinchCancelled { id } => {
                model.cancel_pending_scale(*id)?;
                Ok(CommandOutcome::Updated(*id))
            }
            Self::Recolor { id, color } => {
                model.set_color(*id, *color)?;
                Ok(CommandOutcome::Updated(*id))
            }
            Self::Remove { id } => {
                model.remove_overlay(*id)?;
                Ok(CommandOutcome::Removed(*id))
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/command.rs"]
mod tests;
