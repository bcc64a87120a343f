use std::{sync::Arc, thread::JoinHandle};

use anyhow::anyhow;

use crate::{
    assets::decode::BaseImage,
    compose::plan::{CompositePlan, TextStyle, compile_plan},
    foundation::error::{CollageError, CollageResult},
    geometry::fit::DisplayGeometry,
    overlay::model::OverlaySnapshot,
    render::backend::{
        BackendKind, CancelToken, CompositeBackend, FlattenedImage, RenderSettings, create_backend,
    },
};

/// Summary of a successful export.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExportReport {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Number of overlays flattened into the output.
    pub overlays: usize,
}

/// Identifies one export started by an [`crate::EditorSession`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ExportTicket(pub(crate) u64);

/// Everything an export needs, captured when it begins.
///
/// The job owns `Arc` clones of the base image and an immutable overlay snapshot, so it can be
/// rendered on another thread while the session keeps serving the live preview.
#[derive(Clone, Debug)]
pub struct ExportJob {
    pub(crate) ticket: ExportTicket,
    pub(crate) base: Arc<BaseImage>,
    pub(crate) geometry: DisplayGeometry,
    pub(crate) overlays: OverlaySnapshot,
    pub(crate) style: TextStyle,
    pub(crate) cancel: CancelToken,
}

impl ExportJob {
    /// Ticket to pass back to [`crate::EditorSession::complete_export`].
    pub fn ticket(&self) -> ExportTicket {
        self.ticket
    }

    /// Overlays captured for this export.
    pub fn overlays(&self) -> &OverlaySnapshot {
        &self.overlays
    }

    /// Token that abandons this export when cancelled.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Compile the captured state into an image-space plan.
    pub fn plan(&self) -> CollageResult<CompositePlan> {
        compile_plan(
            self.base.width,
            self.base.height,
            self.overlays.overlays(),
            &self.geometry,
            &self.style,
        )
    }

    /// Render on the calling thread.
    pub fn render(&self, backend: &mut dyn CompositeBackend) -> CollageResult<FlattenedImage> {
        let _span = tracing::info_span!(
            "export_render",
            width = self.base.width,
            height = self.base.height,
            overlays = self.overlays.len()
        )
        .entered();
        let plan = self.plan()?;
        backend.render_plan(&plan, &self.base, &self.cancel)
    }

    /// Render on a background thread with a CPU backend built from `settings`.
    pub fn spawn(self, settings: RenderSettings) -> CollageResult<ExportHandle> {
        let ticket = self.ticket;
        let cancel = self.cancel.clone();
        let thread = std::thread::Builder::new()
            .name("collage-export".to_string())
            .spawn(move || {
                let mut backend = create_backend(BackendKind::Cpu, &settings)?;
                self.render(backend.as_mut())
            })
            .map_err(|e| anyhow!("spawn export worker: {e}"))?;
        Ok(ExportHandle {
            ticket,
            cancel,
            thread,
        })
    }
}

/// Handle to an export rendering on a background thread.
#[derive(Debug)]
pub struct ExportHandle {
    ticket: ExportTicket,
    cancel: CancelToken,
    thread: JoinHandle<CollageResult<FlattenedImage>>,
}

impl ExportHandle {
    /// Ticket of the export this worker renders.
    pub fn ticket(&self) -> ExportTicket {
        self.ticket
    }

    /// Ask the worker to stop. Its result, whatever it is, will be discarded by the session.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Return `true` once the worker has finished.
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Wait for the worker and return its result.
    pub fn join(self) -> CollageResult<FlattenedImage> {
        let result = self
            .thread
            .join()
            .map_err(|_| CollageError::Other(anyhow!("export worker panicked")))?;
        if self.cancel.is_cancelled() {
            return Err(CollageError::Cancelled);
        }
        result
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/export.rs"]
mod tests;
