use std::sync::Arc;

use crate::{
    assets::decode::BaseImage,
    compose::plan::TextStyle,
    export::sink::ExportSink,
    foundation::{
        core::{Point, Size},
        error::{CollageError, CollageResult},
    },
    geometry::fit::DisplayGeometry,
    overlay::{
        command::{CommandOutcome, OverlayCommand},
        model::OverlayModel,
    },
    render::backend::{CancelToken, CompositeBackend, FlattenedImage},
    session::export::{ExportJob, ExportReport, ExportTicket},
};

/// Observable state of an editing session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// No base image yet.
    NoImage,
    /// A base image is loaded and no command has been applied since.
    ImageLoaded,
    /// Overlays are being edited.
    Editing {
        /// Current overlay count (may be zero).
        overlays: usize,
    },
    /// An export is rendering or waiting for completion.
    Exporting,
    /// The last export succeeded.
    Exported,
}

#[derive(Clone, Debug)]
enum Phase {
    NoImage,
    ImageLoaded,
    Editing,
    Exporting {
        ticket: ExportTicket,
        cancel: CancelToken,
    },
    Exported,
}

/// One editing session: a base image, its display geometry and the overlays placed on it.
///
/// All overlay mutations go through [`EditorSession::apply`]. Exports read an immutable snapshot
/// taken by [`EditorSession::begin_export`].
#[derive(Debug)]
pub struct EditorSession {
    style: TextStyle,
    base: Option<Arc<BaseImage>>,
    geometry: Option<DisplayGeometry>,
    overlays: OverlayModel,
    phase: Phase,
    exports_started: u64,
    last_export: Option<Arc<FlattenedImage>>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(TextStyle::default())
    }
}

impl EditorSession {
    /// Create an empty session.
    pub fn new(style: TextStyle) -> Self {
        Self {
            style,
            base: None,
            geometry: None,
            overlays: OverlayModel::new(),
            phase: Phase::NoImage,
            exports_started: 0,
            last_export: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        match self.phase {
            Phase::NoImage => SessionState::NoImage,
            Phase::ImageLoaded => SessionState::ImageLoaded,
            Phase::Editing => SessionState::Editing {
                overlays: self.overlays.len(),
            },
            Phase::Exporting { .. } => SessionState::Exporting,
            Phase::Exported => SessionState::Exported,
        }
    }

    /// Text style used for exports.
    pub fn style(&self) -> &TextStyle {
        &self.style
    }

    /// The base image, once loaded.
    pub fn base_image(&self) -> Option<&Arc<BaseImage>> {
        self.base.as_ref()
    }

    /// Display geometry recorded when the image was loaded.
    pub fn geometry(&self) -> Option<&DisplayGeometry> {
        self.geometry.as_ref()
    }

    /// Live overlays, read-only.
    pub fn overlays(&self) -> &OverlayModel {
        &self.overlays
    }

    /// Output of the last successful export, kept for the save preview.
    pub fn last_export(&self) -> Option<&Arc<FlattenedImage>> {
        self.last_export.as_ref()
    }

    /// Supply the base image and the viewport it is shown in.
    pub fn load_image(
        &mut self,
        base: impl Into<Arc<BaseImage>>,
        viewport: Size,
    ) -> CollageResult<DisplayGeometry> {
        if !matches!(self.phase, Phase::NoImage) {
            return Err(CollageError::invalid_state(
                "session already has a base image",
            ));
        }
        let base = base.into();
        let geometry = DisplayGeometry::aspect_fit(base.width, base.height, viewport)?;

        tracing::info!(
            width = base.width,
            height = base.height,
            viewport_w = viewport.width,
            viewport_h = viewport.height,
            fit_scale = geometry.fit.scale,
            "base image loaded"
        );
        self.base = Some(base);
        self.geometry = Some(geometry);
        self.phase = Phase::ImageLoaded;
        Ok(geometry)
    }

    /// Return `true` when a tap at display point `p` lands on the displayed image.
    pub fn accepts_tap(&self, p: Point) -> bool {
        match (&self.base, &self.geometry) {
            (Some(base), Some(geo)) => geo.contains_display_point(base.width, base.height, p),
            _ => false,
        }
    }

    /// Apply one gesture command. Failures leave overlays and state untouched.
    pub fn apply(&mut self, command: &OverlayCommand) -> CollageResult<CommandOutcome> {
        match self.phase {
            Phase::NoImage => {
                return Err(CollageError::invalid_state(
                    "cannot edit overlays before a base image is loaded",
                ));
            }
            Phase::Exporting { .. } => {
                return Err(CollageError::invalid_state(
                    "cannot edit overlays while an export is in progress",
                ));
            }
            Phase::ImageLoaded | Phase::Editing | Phase::Exported => {}
        }

        let outcome = command.apply(&mut self.overlays)?;
        if outcome != CommandOutcome::Ignored && !matches!(self.phase, Phase::Editing) {
            tracing::info!(from = ?self.state(), "session entered editing");
            self.phase = Phase::Editing;
        }
        Ok(outcome)
    }

    /// Capture the current state for an export and enter `Exporting`.
    pub fn begin_export(&mut self) -> CollageResult<ExportJob> {
        let (base, geometry) = match (&self.phase, &self.base, &self.geometry) {
            (Phase::Exporting { .. }, _, _) => {
                return Err(CollageError::invalid_state("an export is already in progress"));
            }
            (_, Some(base), Some(geometry)) => (base.clone(), *geometry),
            _ => {
                return Err(CollageError::invalid_state(
                    "cannot export without a base image",
                ));
            }
        };

        self.exports_started += 1;
        let ticket = ExportTicket(self.exports_started);
        let cancel = CancelToken::new();
        let job = ExportJob {
            ticket,
            base,
            geometry,
            overlays: self.overlays.snapshot(),
            style: self.style,
            cancel: cancel.clone(),
        };
        tracing::info!(overlays = job.overlays.len(), ?ticket, "export started");
        self.phase = Phase::Exporting { ticket, cancel };
        Ok(job)
    }

    /// Abandon the in-flight export and return to `Editing` right away.
    ///
    /// The worker, if any, is told to stop. A result delivered later for the abandoned ticket is
    /// discarded by [`EditorSession::complete_export`].
    pub fn cancel_export(&mut self) -> CollageResult<()> {
        match &self.phase {
            Phase::Exporting { ticket, cancel } => {
                cancel.cancel();
                tracing::info!(ticket = ?*ticket, "export cancelled");
                self.phase = Phase::Editing;
                Ok(())
            }
            _ => Err(CollageError::invalid_state("no export in progress")),
        }
    }

    /// Finish the export identified by `ticket`.
    ///
    /// Render failures and cancellations return the session to `Editing` without touching the
    /// sink. A sink failure also returns to `Editing` and is reported as
    /// [`CollageError::ExportFailed`]. A result for an export that was cancelled or superseded
    /// is discarded with [`CollageError::Cancelled`] and leaves the session as it is.
    pub fn complete_export(
        &mut self,
        ticket: ExportTicket,
        rendered: CollageResult<FlattenedImage>,
        sink: &mut dyn ExportSink,
    ) -> CollageResult<ExportReport> {
        let cancelled = match &self.phase {
            Phase::Exporting {
                ticket: current,
                cancel,
            } if *current == ticket => cancel.is_cancelled(),
            _ if ticket.0 >= 1 && ticket.0 <= self.exports_started => {
                tracing::warn!(?ticket, "discarding result of an abandoned export");
                return Err(CollageError::Cancelled);
            }
            _ => return Err(CollageError::invalid_state("no export in progress")),
        };
        self.phase = Phase::Editing;

        let image = match rendered {
            Ok(_) if cancelled => {
                tracing::warn!("export cancelled; discarding output");
                return Err(CollageError::Cancelled);
            }
            Ok(image) => image,
            Err(err) => {
                tracing::warn!(error = %err, "export render failed");
                return Err(err);
            }
        };

        if let Err(err) = sink.save(&image) {
            tracing::warn!(error = %err, "export sink failed");
            return Err(match err {
                CollageError::ExportFailed(msg) => CollageError::ExportFailed(msg),
                other => CollageError::export_failed(format!("{other:#}")),
            });
        }

        let report = ExportReport {
            width: image.width,
            height: image.height,
            overlays: self.overlays.len(),
        };
        tracing::info!(width = report.width, height = report.height, "export saved");
        self.last_export = Some(Arc::new(image));
        self.phase = Phase::Exported;
        Ok(report)
    }

    /// Export synchronously: snapshot, render with `backend`, hand the result to `sink`.
    pub fn export(
        &mut self,
        backend: &mut dyn CompositeBackend,
        sink: &mut dyn ExportSink,
    ) -> CollageResult<ExportReport> {
        let job = self.begin_export()?;
        let rendered = job.render(backend);
        self.complete_export(job.ticket(), rendered, sink)
    }

    /// Go back to editing after previewing an export.
    pub fn continue_editing(&mut self) -> CollageResult<()> {
        if !matches!(self.phase, Phase::Exported) {
            return Err(CollageError::invalid_state(
                "continue_editing is only valid after a successful export",
            ));
        }
        self.phase = Phase::Editing;
        Ok(())
    }

    /// End the session after the export was confirmed, returning the last export if any.
    pub fn finish(self) -> Option<Arc<FlattenedImage>> {
        tracing::info!(state = ?self.state(), "session finished");
        self.last_export
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/editor.rs"]
mod tests;
