//! Collage is the core of a photo text-overlay editor.
//!
//! A user places text overlays on a photo shown aspect-fit in a viewport, then exports the photo
//! with the text flattened into it at the photo's native resolution.
//!
//! # Pipeline overview
//!
//! 1. **Edit**: [`OverlayCommand`]s mutate an [`OverlayModel`] owned by an [`EditorSession`]
//!    (positions and scales live in display space)
//! 2. **Snapshot**: [`EditorSession::begin_export`] captures an immutable [`ExportJob`]
//! 3. **Compile**: the job maps every overlay through the inverse of the display
//!    [`FitTransform`] into a [`CompositePlan`] in image space
//! 4. **Render**: a [`CompositeBackend`] flattens base image and plan into a [`FlattenedImage`]
//! 5. **Save**: an [`ExportSink`] receives the result
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic**: the same base image, overlays and settings give identical pixels.
//! - **Premultiplied RGBA8** end-to-end; [`PngFileSink`] converts to straight alpha on write.
//! - **Background export**: a job renders on a worker thread from its snapshot while the
//!   session stays readable, and can be cancelled through a [`CancelToken`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod compose;
mod export;
mod foundation;
mod geometry;
mod overlay;
mod project;
mod render;
mod session;

pub use assets::decode::{BaseImage, decode_image, load_image};
pub use assets::font::{FontFace, TextBrush, TextLayoutEngine, load_font};
pub use compose::plan::{CompositePlan, DEFAULT_FONT_SIZE_PX, DrawOp, TextStyle, compile_plan};
pub use export::sink::{ExportSink, InMemorySink, PngFileSink};
pub use foundation::core::{Affine, Point, Rect, Rgba8, Size, Vec2};
pub use foundation::error::{CollageError, CollageResult};
pub use geometry::fit::{DisplayGeometry, FitTransform};
pub use overlay::command::{CommandOutcome, OverlayCommand};
pub use overlay::model::{OverlayId, OverlayModel, OverlaySnapshot, TextOverlay};
pub use project::file::{Project, load_project};
pub use render::backend::{
    BackendKind, CancelToken, CompositeBackend, FlattenedImage, RenderSettings, create_backend,
};
pub use render::cpu::CpuBackend;
pub use session::editor::{EditorSession, SessionState};
pub use session::export::{ExportHandle, ExportJob, ExportReport, ExportTicket};
